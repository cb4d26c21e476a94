use crate::domain::{PlayerId, RepoError, SkillId, Year};

/// One attribute rating for one season, joined with its catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillValue {
    pub player_id: PlayerId,
    pub skill_id: SkillId,
    pub code: String,
    pub name: String,
    pub year: Year,
    pub value: i32,
}

#[async_trait::async_trait]
pub trait SkillValueRepository {
    async fn upsert_skill_value(
        &self,
        player_id: PlayerId,
        skill_id: SkillId,
        year: Year,
        value: i32,
    ) -> Result<SkillValue, RepoError>;
    /// No ordering guarantee.
    async fn list_skill_values(&self, player_id: PlayerId) -> Result<Vec<SkillValue>, RepoError>;
}
