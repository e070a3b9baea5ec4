//! Handlers for `/competitors` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/competitors` | Optional `name`, `master`, `district`, `belt`, `age`, `weight`, `limit`, `offset` |
//! | `POST`   | `/competitors` | Body: [`NewCompetitor`]; 201 + stored competitor |
//! | `POST`   | `/competitors/bulk` | Body: array of [`NewCompetitor`]; rows without a name are skipped |
//! | `DELETE` | `/competitors` | Clears the roster |
//! | `DELETE` | `/competitors/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use dojo_core::{
  competitor::{Competitor, NewCompetitor},
  store::{CompetitorQuery, TournamentStore},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /competitors[?master=...&age=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(query): Query<CompetitorQuery>,
) -> Result<Json<Vec<Competitor>>, ApiError>
where
  S: TournamentStore,
{
  let competitors = state
    .store
    .list_competitors(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(competitors))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /competitors`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewCompetitor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TournamentStore,
{
  let input = body.validate()?;
  let competitor = state
    .store
    .add_competitor(input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(competitor)))
}

/// `POST /competitors/bulk`: inserts every row with a name, in one batch.
pub async fn create_many<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<Vec<NewCompetitor>>,
) -> Result<Json<Value>, ApiError>
where
  S: TournamentStore,
{
  let received = body.len();
  let valid: Vec<NewCompetitor> = body
    .into_iter()
    .filter_map(|row| row.validate().ok())
    .collect();
  if valid.is_empty() {
    return Err(ApiError::BadRequest("no valid rows to insert".to_owned()));
  }

  let inserted = state
    .store
    .add_competitors(valid)
    .await
    .map_err(ApiError::store)?
    .len();
  tracing::info!(received, inserted, "bulk competitor import");
  Ok(Json(json!({ "inserted": inserted })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /competitors`
pub async fn clear<S>(State(state): State<ApiState<S>>) -> Result<Json<Value>, ApiError>
where
  S: TournamentStore,
{
  let removed = state
    .store
    .clear_competitors()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "deletedCount": removed })))
}

/// `DELETE /competitors/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: TournamentStore,
{
  let removed = state
    .store
    .delete_competitor(id)
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound(format!("competitor {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
