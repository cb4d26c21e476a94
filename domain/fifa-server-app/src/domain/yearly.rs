use std::collections::BTreeMap;

use crate::domain::{
    PlayerId, RepoUpdateError, SkillId, Year,
    catalog::{SkillCatalog, SkillCode},
};

/// Everything known about a player for one season, before it is checked
/// against the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct YearlyFacts {
    pub year: Year,
    pub overall_rating: Option<i32>,
    pub skills: BTreeMap<SkillCode, i32>,
}

impl YearlyFacts {
    pub fn new(year: Year) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }

    pub fn with_rating(mut self, rating: Option<i32>) -> Self {
        self.overall_rating = rating;
        self
    }

    pub fn with_skills(mut self, skills: BTreeMap<SkillCode, i32>) -> Self {
        self.skills = skills;
        self
    }

    /// Keeps only the skills that exist in the catalog. Catalog skills with
    /// no fact are not written at all, never defaulted.
    pub fn resolve(&self, catalog: &SkillCatalog) -> YearlyWrite {
        let skill_values = self
            .skills
            .iter()
            .filter_map(|(code, value)| catalog.get(*code).map(|skill| (skill.id, *value)))
            .collect();
        YearlyWrite {
            year: self.year,
            overall_rating: self.overall_rating,
            skill_values,
        }
    }
}

/// The concrete set of upserts one `apply_year` call performs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearlyWrite {
    pub year: Year,
    pub overall_rating: Option<i32>,
    pub skill_values: Vec<(SkillId, i32)>,
}

impl YearlyWrite {
    pub fn is_empty(&self) -> bool {
        self.overall_rating.is_none() && self.skill_values.is_empty()
    }
}

#[async_trait::async_trait]
pub trait SeasonRepository {
    /// Applies the version upsert and then every skill-value upsert inside a
    /// single transaction. Nothing is committed if any step fails.
    async fn apply_year(
        &self,
        player_id: PlayerId,
        write: &YearlyWrite,
    ) -> Result<(), RepoUpdateError>;
}
