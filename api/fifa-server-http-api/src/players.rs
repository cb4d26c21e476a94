use std::{collections::BTreeMap, str::FromStr};

use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use fifa_server_app::{
    domain::{
        PlayerId,
        catalog::SkillCode,
        import::ImportReport,
        parse_loose_int,
        player::{NewPlayer, Player, PlayerFilter, PlayerUpdate},
        snapshot::PlayerSnapshot,
    },
    workflow::player::{
        create::{CreatePlayerError, CreatePlayerRequest},
        delete::DeletePlayerError,
        export::PlayerExportError,
        get::{GetPlayerError, PlayerDetailView},
        import::ImportPlayersError,
        search::{PlayerSearchError, PlayerSearchRequest},
        update::{UpdatePlayerError, UpdatePlayerRequest},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::{
    AppState, ServiceError,
    export::{CSV_CONTENT_TYPE, CSV_DISPOSITION, render_players_csv},
    jwt::Claims,
};

#[derive(Deserialize)]
pub struct PlayerFilterParams {
    name: Option<String>,
    club: Option<String>,
    position: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

impl PlayerFilterParams {
    fn filter(&self) -> PlayerFilter {
        PlayerFilter {
            name: self.name.clone(),
            club: self.club.clone(),
            position: self.position.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayer {
    id: i64,
    name: String,
    club: Option<String>,
    position: Option<String>,
    rating: i32,
    nationality: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<Player> for JsonPlayer {
    fn from(player: Player) -> Self {
        JsonPlayer {
            id: player.id.0,
            name: player.name,
            club: player.club,
            position: player.position,
            rating: player.rating,
            nationality: player.nationality,
            created_at: player.created_at.to_rfc3339(),
            updated_at: player.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct JsonPlayerPage {
    page: usize,
    limit: usize,
    total: usize,
    data: Vec<JsonPlayer>,
}

#[derive(Serialize)]
pub struct JsonVersion {
    year: i32,
    age: Option<i32>,
    rating: Option<i32>,
}

#[derive(Serialize)]
pub struct JsonSkillReading {
    code: String,
    name: String,
    value: i32,
}

#[derive(Serialize)]
pub struct JsonTimelinePoint {
    year: i32,
    value: i32,
}

#[derive(Serialize)]
pub struct JsonSkillTimeline {
    code: String,
    name: String,
    points: Vec<JsonTimelinePoint>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayerDetail {
    #[serde(flatten)]
    player: JsonPlayer,
    versions: Vec<JsonVersion>,
    latest_year: Option<i32>,
    skills_latest: Vec<JsonSkillReading>,
    skills_timeline: Vec<JsonSkillTimeline>,
}

impl From<PlayerDetailView> for JsonPlayerDetail {
    fn from(view: PlayerDetailView) -> Self {
        let PlayerSnapshot {
            versions,
            latest_year,
            skills_latest,
            skills_timeline,
        } = view.snapshot;
        JsonPlayerDetail {
            player: view.player.into(),
            versions: versions
                .into_iter()
                .map(|v| JsonVersion {
                    year: v.year,
                    age: v.age,
                    rating: v.rating,
                })
                .collect(),
            latest_year,
            skills_latest: skills_latest
                .into_iter()
                .map(|s| JsonSkillReading {
                    code: s.code,
                    name: s.name,
                    value: s.value,
                })
                .collect(),
            skills_timeline: skills_timeline
                .into_iter()
                .map(|t| JsonSkillTimeline {
                    code: t.code,
                    name: t.name,
                    points: t
                        .points
                        .into_iter()
                        .map(|p| JsonTimelinePoint {
                            year: p.year,
                            value: p.value,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct JsonImportReport {
    imported: usize,
    errors: Vec<String>,
}

impl From<ImportReport> for JsonImportReport {
    fn from(report: ImportReport) -> Self {
        JsonImportReport {
            imported: report.imported,
            errors: report.errors,
        }
    }
}

#[derive(Deserialize)]
pub struct JsonCreatePlayer {
    name: Option<String>,
    club: Option<String>,
    position: Option<String>,
    rating: Option<i32>,
    nationality: Option<String>,
    year: Option<i32>,
    skills: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct JsonUpdatePlayer {
    club: Option<String>,
    position: Option<String>,
    rating: Option<i32>,
    nationality: Option<String>,
    year: Option<i32>,
    skills: Option<Map<String, Value>>,
}

/// Unknown codes and values that are neither numbers nor numeric strings
/// are dropped.
fn skill_map(raw: &Map<String, Value>) -> BTreeMap<SkillCode, i32> {
    raw.iter()
        .filter_map(|(key, value)| {
            let code = SkillCode::from_str(key).ok()?;
            let value = match value {
                Value::Number(n) => n
                    .as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .or_else(|| n.as_f64().and_then(|f| parse_loose_int(&f.to_string()))),
                Value::String(s) => parse_loose_int(s),
                _ => None,
            }?;
            Some((code, value))
        })
        .collect()
}

fn player_id(path: Result<Path<i64>, PathRejection>) -> Result<PlayerId, ServiceError> {
    let Path(id) = path.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    Ok(PlayerId(id))
}

pub async fn search(
    _claims: Claims,
    State(state): State<AppState>,
    Query(params): Query<PlayerFilterParams>,
) -> Result<Json<JsonPlayerPage>, ServiceError> {
    let request = PlayerSearchRequest {
        filter: params.filter(),
        page: params.page.as_deref().and_then(parse_loose_int).map(i64::from),
        limit: params.limit.as_deref().and_then(parse_loose_int).map(i64::from),
    };
    let page = state
        .app
        .player_search_use_case
        .search(request)
        .await
        .map_err(|PlayerSearchError::RepositoryError| {
            ServiceError::Internal("Failed to search players".to_string())
        })?;

    Ok(Json(JsonPlayerPage {
        page: page.page,
        limit: page.limit,
        total: page.total,
        data: page.players.into_iter().map(JsonPlayer::from).collect(),
    }))
}

pub async fn export_csv(
    _claims: Claims,
    State(state): State<AppState>,
    Query(params): Query<PlayerFilterParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let players = state
        .app
        .player_export_use_case
        .export(params.filter())
        .await
        .map_err(|PlayerExportError::RepositoryError| {
            ServiceError::Internal("Failed to export players".to_string())
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CSV_DISPOSITION),
        ],
        render_players_csv(&players),
    ))
}

pub async fn get_by_id(
    _claims: Claims,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<JsonPlayerDetail>, ServiceError> {
    let player_id = player_id(path)?;
    let detail = state
        .app
        .player_get_detail_use_case
        .get_player(player_id)
        .await
        .map_err(|e| match e {
            GetPlayerError::NotFound => ServiceError::NotFound("Jugador no encontrado".to_string()),
            GetPlayerError::RepositoryError => {
                ServiceError::Internal("Failed to load player".to_string())
            }
        })?;
    Ok(Json(detail.into()))
}

pub async fn create(
    _claims: Claims,
    State(state): State<AppState>,
    body: Result<Json<JsonCreatePlayer>, JsonRejection>,
) -> Result<(StatusCode, Json<JsonPlayer>), ServiceError> {
    let Json(body) = body.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let request = CreatePlayerRequest {
        profile: NewPlayer {
            name: body.name.unwrap_or_default(),
            club: body.club,
            position: body.position,
            rating: body.rating,
            nationality: body.nationality,
        },
        year: body.year,
        skills: body.skills.as_ref().map(skill_map),
    };
    let player = state
        .app
        .player_create_use_case
        .create_player(request)
        .await
        .map_err(|e| match e {
            CreatePlayerError::InvalidInput(msg) => ServiceError::BadRequest(msg),
            CreatePlayerError::RepositoryError => {
                ServiceError::Internal("Failed to create player".to_string())
            }
        })?;
    Ok((StatusCode::CREATED, Json(player.into())))
}

pub async fn update(
    _claims: Claims,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<JsonUpdatePlayer>, JsonRejection>,
) -> Result<Json<JsonPlayer>, ServiceError> {
    let player_id = player_id(path)?;
    let Json(body) = body.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let request = UpdatePlayerRequest {
        update: PlayerUpdate {
            club: body.club,
            position: body.position,
            rating: body.rating,
            nationality: body.nationality,
        },
        year: body.year,
        skills: body.skills.as_ref().map(skill_map),
    };
    let player = state
        .app
        .player_update_use_case
        .update_player(player_id, request)
        .await
        .map_err(|e| match e {
            UpdatePlayerError::NotFound => {
                ServiceError::NotFound("Jugador no encontrado".to_string())
            }
            UpdatePlayerError::InvalidInput(msg) => ServiceError::BadRequest(msg),
            UpdatePlayerError::RepositoryError => {
                ServiceError::Internal("Failed to update player".to_string())
            }
        })?;
    Ok(Json(player.into()))
}

pub async fn delete(
    _claims: Claims,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ServiceError> {
    let player_id = player_id(path)?;
    state
        .app
        .player_delete_use_case
        .delete_player(player_id)
        .await
        .map_err(|e| match e {
            DeletePlayerError::NotFound => {
                ServiceError::NotFound("Jugador no encontrado".to_string())
            }
            DeletePlayerError::RepositoryError => {
                ServiceError::Internal("Failed to delete player".to_string())
            }
        })?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Runs the import under the configured deadline. Rows that had not been
/// reached when it expires show up as not processed in the report.
async fn run_import(state: &AppState, text: &str) -> Result<JsonImportReport, ServiceError> {
    let cancel = CancellationToken::new();
    let deadline = {
        let cancel = cancel.clone();
        let timeout = state.import_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            log::warn!("CSV import exceeded {:?}, cancelling", timeout);
            cancel.cancel();
        })
    };

    let result = state
        .app
        .player_import_use_case
        .import(text, cancel)
        .await;
    deadline.abort();

    let report = result.map_err(|ImportPlayersError::RepositoryError| {
        ServiceError::Internal("Failed to import players".to_string())
    })?;
    Ok(report.into())
}

pub async fn import_text(
    _claims: Claims,
    State(state): State<AppState>,
    body: String,
) -> Result<Json<JsonImportReport>, ServiceError> {
    Ok(Json(run_import(&state, &body).await?))
}

pub async fn import_file(
    _claims: Claims,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<JsonImportReport>, ServiceError> {
    let missing_file = || ServiceError::BadRequest("Archivo requerido".to_string());
    let mut multipart = multipart.map_err(|_| missing_file())?;

    let mut text = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::BadRequest(e.body_text()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServiceError::BadRequest(e.body_text()))?;
            text = Some(String::from_utf8_lossy(&bytes).into_owned());
            break;
        }
    }
    let text = text.ok_or_else(missing_file)?;
    Ok(Json(run_import(&state, &text).await?))
}
