use std::sync::Arc;

use crate::{
    domain::{
        RepoError,
        catalog::{SkillCatalogRepository, base_skill_seeds, ensure_seeded},
        player::PlayerRepository,
        skill_value::SkillValueRepository,
        version::VersionRepository,
        yearly::SeasonRepository,
    },
    workflow::{
        player::{
            create::{PlayerCreateUseCase, PlayerCreateUseCaseImpl},
            delete::{PlayerDeleteUseCase, PlayerDeleteUseCaseImpl},
            export::{PlayerExportUseCase, PlayerExportUseCaseImpl},
            get::{PlayerGetDetailUseCase, PlayerGetDetailUseCaseImpl},
            import::{ImportPlayersUseCase, ImportPlayersUseCaseImpl},
            search::{PlayerSearchUseCase, PlayerSearchUseCaseImpl},
            update::{PlayerUpdateUseCase, PlayerUpdateUseCaseImpl},
        },
        season::apply_year::ApplyYearWorkflowImpl,
    },
};

pub mod domain;
pub mod workflow;

#[cfg(test)]
mod testing;

pub struct Application {
    pub player_search_use_case: Box<dyn PlayerSearchUseCase + Send + Sync + 'static>,
    pub player_export_use_case: Box<dyn PlayerExportUseCase + Send + Sync + 'static>,
    pub player_get_detail_use_case: Box<dyn PlayerGetDetailUseCase + Send + Sync + 'static>,
    pub player_create_use_case: Box<dyn PlayerCreateUseCase + Send + Sync + 'static>,
    pub player_update_use_case: Box<dyn PlayerUpdateUseCase + Send + Sync + 'static>,
    pub player_delete_use_case: Box<dyn PlayerDeleteUseCase + Send + Sync + 'static>,

    pub player_import_use_case: Box<dyn ImportPlayersUseCase + Send + Sync + 'static>,
}

/// Wires every use case and seeds the skill catalog once before the
/// application starts serving.
pub async fn build_application<
    PR: PlayerRepository + Send + Sync + 'static,
    VR: VersionRepository + Send + Sync + 'static,
    SVR: SkillValueRepository + Send + Sync + 'static,
    SC: SkillCatalogRepository + Send + Sync + 'static,
    S: SeasonRepository + Send + Sync + 'static,
>(
    player_repository: Arc<PR>,
    version_repository: Arc<VR>,
    skill_value_repository: Arc<SVR>,
    skill_catalog_repository: Arc<SC>,
    season_repository: Arc<S>,
) -> Result<Application, RepoError> {
    ensure_seeded(skill_catalog_repository.as_ref(), &base_skill_seeds()).await?;

    let apply_year_workflow = Arc::new(ApplyYearWorkflowImpl::new(
        skill_catalog_repository.clone(),
        season_repository.clone(),
    ));

    let application = Application {
        player_search_use_case: Box::new(PlayerSearchUseCaseImpl::new(player_repository.clone())),
        player_export_use_case: Box::new(PlayerExportUseCaseImpl::new(player_repository.clone())),
        player_get_detail_use_case: Box::new(PlayerGetDetailUseCaseImpl::new(
            player_repository.clone(),
            version_repository.clone(),
            skill_value_repository.clone(),
        )),
        player_create_use_case: Box::new(PlayerCreateUseCaseImpl::new(
            player_repository.clone(),
            apply_year_workflow.clone(),
        )),
        player_update_use_case: Box::new(PlayerUpdateUseCaseImpl::new(
            player_repository.clone(),
            apply_year_workflow.clone(),
        )),
        player_delete_use_case: Box::new(PlayerDeleteUseCaseImpl::new(player_repository.clone())),

        player_import_use_case: Box::new(ImportPlayersUseCaseImpl::new(
            skill_catalog_repository.clone(),
            player_repository.clone(),
            apply_year_workflow.clone(),
        )),
    };

    Ok(application)
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use crate::{
        domain::PlayerId, testing::MockStore,
        workflow::player::search::PlayerSearchRequest,
    };

    use super::*;

    #[tokio::test]
    async fn test_build_application_seeds_catalog() {
        let store = Arc::new(MockStore::default());
        let app = build_application(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )
        .await
        .unwrap();
        assert_eq!(store.skill_count(), 6);

        let report = app
            .player_import_use_case
            .import(
                "name,club,position,rating,nationality,year,PAC,SHO,PAS,DRI,DEF,PHY\nRaphinha,Barcelona,LW,86,Brazil,2024,90,84,82,87,50,68",
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(store.skill_count(), 6);

        let page = app
            .player_search_use_case
            .search(PlayerSearchRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        let detail = app
            .player_get_detail_use_case
            .get_player(PlayerId(1))
            .await
            .unwrap();
        assert_eq!(detail.snapshot.skills_latest.len(), 6);
    }
}
