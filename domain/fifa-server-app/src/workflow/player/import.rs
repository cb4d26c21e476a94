use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    domain::{
        RepoRetrieveError, RepoUpdateError,
        catalog::{SkillCatalogRepository, base_skill_seeds, ensure_seeded},
        import::{CsvHeader, ImportReport, ImportRow, ImportRowError, parse_csv},
        player::{Player, PlayerRepository},
    },
    workflow::season::apply_year::ApplyYearWorkflow,
};

#[async_trait::async_trait]
pub trait ImportPlayersUseCase {
    /// Structural problems reject the whole file inside the report. Row
    /// problems are collected per line and never abort the run. Once `cancel`
    /// fires, the row in flight and all later rows are reported as not
    /// processed while earlier rows stay committed.
    ///
    /// The row in flight is dropped at its current store call. Steps it had
    /// already finished stay committed: a profile may be created or patched
    /// without its season write, which only ever commits as a whole. Importing
    /// the same file again completes such a row.
    async fn import(
        &self,
        text: &str,
        cancel: CancellationToken,
    ) -> Result<ImportReport, ImportPlayersError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum ImportPlayersError {
    RepositoryError,
}

pub struct ImportPlayersUseCaseImpl<
    C: SkillCatalogRepository,
    P: PlayerRepository,
    A: ApplyYearWorkflow,
> {
    catalog_repository: Arc<C>,
    player_repository: Arc<P>,
    apply_year_workflow: Arc<A>,
}

impl<C: SkillCatalogRepository, P: PlayerRepository, A: ApplyYearWorkflow>
    ImportPlayersUseCaseImpl<C, P, A>
{
    pub fn new(
        catalog_repository: Arc<C>,
        player_repository: Arc<P>,
        apply_year_workflow: Arc<A>,
    ) -> Self {
        Self {
            catalog_repository,
            player_repository,
            apply_year_workflow,
        }
    }
}

impl<
    C: SkillCatalogRepository + Send + Sync + 'static,
    P: PlayerRepository + Send + Sync + 'static,
    A: ApplyYearWorkflow + Send + Sync + 'static,
> ImportPlayersUseCaseImpl<C, P, A>
{
    /// Existing players only receive the cells that carry a value.
    async fn resolve_player(&self, name: &str, row: &ImportRow) -> Result<Player, ImportRowError> {
        match self.player_repository.find_player_by_name(name).await {
            Ok(existing) => {
                let update = row.profile_update();
                if update.is_empty() {
                    return Ok(existing);
                }
                self.player_repository
                    .update_player(existing.id, &update)
                    .await
                    .map_err(|e| match e {
                        RepoUpdateError::NotFound => {
                            ImportRowError::Failed("jugador no encontrado".to_string())
                        }
                        RepoUpdateError::StorageError(e) => ImportRowError::Failed(e),
                    })
            }
            Err(RepoRetrieveError::NotFound) => self
                .player_repository
                .create_player(&row.new_player(name))
                .await
                .map_err(|e| ImportRowError::Failed(e.to_string())),
            Err(RepoRetrieveError::StorageError(e)) => Err(ImportRowError::Failed(e)),
        }
    }

    async fn import_row(&self, header: &CsvHeader, line: &str) -> Result<(), ImportRowError> {
        let row = header.read_row(line);
        let name = row.name.as_deref().ok_or(ImportRowError::BlankName)?;
        let player = self.resolve_player(name, &row).await?;

        if let Some(facts) = row.yearly_facts() {
            self.apply_year_workflow
                .apply_year(player.id, facts)
                .await
                .map_err(|e| ImportRowError::Failed(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<
    C: SkillCatalogRepository + Send + Sync + 'static,
    P: PlayerRepository + Send + Sync + 'static,
    A: ApplyYearWorkflow + Send + Sync + 'static,
> ImportPlayersUseCase for ImportPlayersUseCaseImpl<C, P, A>
{
    async fn import(
        &self,
        text: &str,
        cancel: CancellationToken,
    ) -> Result<ImportReport, ImportPlayersError> {
        let parsed = match parse_csv(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::info!("Rejected CSV import: {}", e);
                return Ok(ImportReport::rejected(e));
            }
        };

        ensure_seeded(self.catalog_repository.as_ref(), &base_skill_seeds())
            .await
            .map_err(|e| {
                log::error!("Error seeding skill catalog before import: {}", e);
                ImportPlayersError::RepositoryError
            })?;

        let mut report = ImportReport::default();
        let mut rows = parsed.rows.iter();
        while let Some(line) = rows.next() {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.import_row(&parsed.header, line.text) => Some(result),
            };
            match outcome {
                Some(Ok(())) => report.imported += 1,
                Some(Err(e)) => report.record_row_error(line.number, &e),
                None => {
                    report.record_row_error(line.number, &ImportRowError::Cancelled);
                    for skipped in rows.by_ref() {
                        report.record_row_error(skipped.number, &ImportRowError::Cancelled);
                    }
                    log::warn!("CSV import cancelled after {} row(s)", report.imported);
                    break;
                }
            }
        }

        log::info!(
            "Imported {} row(s) with {} error(s)",
            report.imported,
            report.errors.len()
        );
        Ok(report)
    }
}
