use std::{collections::BTreeMap, sync::Arc};

use validator::Validate;

use crate::{
    domain::{
        RepoError, Year,
        catalog::SkillCode,
        player::{NewPlayer, Player, PlayerRepository},
        yearly::YearlyFacts,
    },
    workflow::season::{apply_year::ApplyYearWorkflow, current_year},
};

#[derive(Clone, Debug, Default)]
pub struct CreatePlayerRequest {
    pub profile: NewPlayer,
    pub year: Option<Year>,
    pub skills: Option<BTreeMap<SkillCode, i32>>,
}

#[async_trait::async_trait]
pub trait PlayerCreateUseCase {
    /// Inserts the player. A given year also records a version carrying the
    /// player's rating; skills land in the given year or the current one.
    async fn create_player(&self, request: CreatePlayerRequest)
    -> Result<Player, CreatePlayerError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum CreatePlayerError {
    InvalidInput(String),
    RepositoryError,
}

pub struct PlayerCreateUseCaseImpl<P: PlayerRepository, A: ApplyYearWorkflow> {
    player_repository: Arc<P>,
    apply_year_workflow: Arc<A>,
}

impl<P: PlayerRepository, A: ApplyYearWorkflow> PlayerCreateUseCaseImpl<P, A> {
    pub fn new(player_repository: Arc<P>, apply_year_workflow: Arc<A>) -> Self {
        Self {
            player_repository,
            apply_year_workflow,
        }
    }
}

fn validate_request(request: &CreatePlayerRequest) -> Result<(), CreatePlayerError> {
    if request.profile.name.trim().is_empty() {
        return Err(CreatePlayerError::InvalidInput("name requerido".to_string()));
    }
    request
        .profile
        .validate()
        .map_err(|e| CreatePlayerError::InvalidInput(e.to_string()))?;
    if let Some(year) = request.year
        && year <= 0
    {
        return Err(CreatePlayerError::InvalidInput("year inválido".to_string()));
    }
    Ok(())
}

fn initial_facts(
    player: &Player,
    year: Option<Year>,
    skills: Option<BTreeMap<SkillCode, i32>>,
) -> Option<YearlyFacts> {
    match (year, skills) {
        (None, None) => None,
        (Some(year), skills) => Some(
            YearlyFacts::new(year)
                .with_rating(Some(player.rating))
                .with_skills(skills.unwrap_or_default()),
        ),
        (None, Some(skills)) => Some(YearlyFacts::new(current_year()).with_skills(skills)),
    }
}

#[async_trait::async_trait]
impl<
    P: PlayerRepository + Send + Sync + 'static,
    A: ApplyYearWorkflow + Send + Sync + 'static,
> PlayerCreateUseCase for PlayerCreateUseCaseImpl<P, A>
{
    async fn create_player(
        &self,
        request: CreatePlayerRequest,
    ) -> Result<Player, CreatePlayerError> {
        validate_request(&request)?;
        let CreatePlayerRequest {
            mut profile,
            year,
            skills,
        } = request;
        profile.name = profile.name.trim().to_string();

        let player = match self.player_repository.create_player(&profile).await {
            Ok(player) => player,
            Err(RepoError::StorageError(e)) => {
                log::error!("Error creating player {}: {}", profile.name, e);
                return Err(CreatePlayerError::RepositoryError);
            }
        };
        log::info!("Created player {} ({})", player.name, player.id);

        if let Some(facts) = initial_facts(&player, year, skills) {
            self.apply_year_workflow
                .apply_year(player.id, facts)
                .await
                .map_err(|e| {
                    log::error!("Error recording history for player {}: {}", player.id, e);
                    CreatePlayerError::RepositoryError
                })?;
        }

        Ok(player)
    }
}
