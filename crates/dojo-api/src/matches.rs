//! Handlers for `/matches` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/matches` | Optional `status`, `matchType`; ordered by match number |
//! | `GET`    | `/matches/:id` | 404 if not found |
//! | `POST`   | `/matches/generate` | Pairs the stored roster; `?dryRun=true` skips saving |
//! | `POST`   | `/matches/manual` | Body: [`ManualMatchBody`]; 201 + stored match |
//! | `PUT`    | `/matches/:id/result` | Body: [`ResultBody`]; completes the match |
//! | `DELETE` | `/matches/:id` | 404 if not found |
//! | `DELETE` | `/matches` | Removes every match |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use dojo_core::{
  GenerationReport, generate_matches,
  lifecycle::{create_manual_match, declare_result, parse_marks},
  matches::PlayerSnapshot,
  store::{CompetitorQuery, MatchQuery, StoredMatch, TournamentStore},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// Parse optional wire marks; absence is left for the lifecycle rules to
/// reject.
fn marks(value: Option<&Value>) -> Result<Option<f64>, ApiError> {
  Ok(value.map(parse_marks).transpose()?)
}

async fn find<S>(store: &S, id: Uuid) -> Result<StoredMatch, ApiError>
where
  S: TournamentStore,
{
  store
    .get_match(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("match {id} not found")))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /matches[?status=...][&matchType=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(query): Query<MatchQuery>,
) -> Result<Json<Vec<StoredMatch>>, ApiError>
where
  S: TournamentStore,
{
  let matches = state
    .store
    .list_matches(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(matches))
}

/// `GET /matches/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StoredMatch>, ApiError>
where
  S: TournamentStore,
{
  Ok(Json(find(state.store.as_ref(), id).await?))
}

// ─── Generate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateParams {
  /// Return the report without saving the matches.
  #[serde(default)]
  pub dry_run: bool,
}

/// `POST /matches/generate[?dryRun=true]`
///
/// Numbers continue after the highest stored match number.
pub async fn generate<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<GenerateParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TournamentStore,
{
  let roster = state
    .store
    .list_competitors(&CompetitorQuery::default())
    .await
    .map_err(ApiError::store)?;
  let first_number = state
    .store
    .next_match_number()
    .await
    .map_err(ApiError::store)?;

  let pairing = state.pairing;
  let report: GenerationReport = tokio::task::spawn_blocking(move || {
    generate_matches(&roster, first_number, &pairing)
  })
  .await
  .map_err(ApiError::store)??;

  if params.dry_run {
    return Ok((StatusCode::OK, Json(report)));
  }

  state
    .store
    .insert_matches(report.matches.clone())
    .await
    .map_err(ApiError::store)?;
  tracing::info!(saved = report.matches.len(), first_number, "saved generated matches");
  Ok((StatusCode::CREATED, Json(report)))
}

// ─── Manual ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /matches/manual`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMatchBody {
  /// Defaults to the next free match number.
  pub match_number:  Option<u32>,
  pub player1:       PlayerSnapshot,
  pub player2:       PlayerSnapshot,
  pub player1_marks: Option<Value>,
  pub player2_marks: Option<Value>,
  pub winner:        Option<String>,
}

/// `POST /matches/manual`
pub async fn create_manual<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ManualMatchBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TournamentStore,
{
  let p1 = marks(body.player1_marks.as_ref())?;
  let p2 = marks(body.player2_marks.as_ref())?;
  let match_number = match body.match_number {
    Some(n) if n > 0 => n,
    Some(_) => return Err(ApiError::BadRequest("matchNumber must be positive".to_owned())),
    None => state.store.next_match_number().await.map_err(ApiError::store)?,
  };

  let record =
    create_manual_match(match_number, body.player1, body.player2, p1, p2, body.winner)?;
  let stored = state
    .store
    .insert_match(record)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(stored)))
}

// ─── Result ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /matches/:id/result`. Marks may be numbers or
/// numeric strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBody {
  pub player1_marks: Option<Value>,
  pub player2_marks: Option<Value>,
  pub winner:        Option<String>,
}

/// `PUT /matches/:id/result`
pub async fn declare<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ResultBody>,
) -> Result<Json<StoredMatch>, ApiError>
where
  S: TournamentStore,
{
  let current = find(state.store.as_ref(), id).await?;
  let p1 = marks(body.player1_marks.as_ref())?;
  let p2 = marks(body.player2_marks.as_ref())?;
  let completed = declare_result(&current.record, p1, p2, body.winner)?;

  let stored = state
    .store
    .update_match(id, completed)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stored))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /matches/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: TournamentStore,
{
  let removed = state
    .store
    .delete_match(id)
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound(format!("match {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /matches`
pub async fn clear<S>(State(state): State<ApiState<S>>) -> Result<Json<Value>, ApiError>
where
  S: TournamentStore,
{
  let removed = state
    .store
    .clear_matches()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "deletedCount": removed })))
}
