//! Strategy CRUD endpoints
//!
//! No ownership model: any client may create, update or delete any strategy.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use tracing::{error, info};

use crate::database::models::{Strategy, StrategyInput, StrategySummary};
use crate::error::ApiError;
use crate::server::AppState;

const MAX_NAME_LEN: usize = 255;

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("'{}' is not a valid strategy id", raw)))
}

fn validate(body: Result<Json<StrategyInput>, JsonRejection>) -> Result<StrategyInput, ApiError> {
    let Json(mut input) = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    input.display_name = input.display_name.trim().to_string();
    if input.display_name.is_empty() {
        return Err(ApiError::Validation("displayName must not be empty".to_string()));
    }
    if input.display_name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "displayName must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(input)
}

fn log_db_error(action: &str) -> impl FnOnce(crate::database::DbError) -> ApiError + '_ {
    move |e| {
        error!("Error {} strategy: {}", action, e);
        ApiError::from(e)
    }
}

/// `GET /api/strategies`
pub async fn list_strategies(
    State(state): State<AppState>,
) -> Result<Json<Vec<StrategySummary>>, ApiError> {
    let strategies = state.strategies.list().await.map_err(log_db_error("listing"))?;
    Ok(Json(strategies.into_iter().map(StrategySummary::from).collect()))
}

/// `GET /api/strategies/{id}`
///
/// An unknown id answers 200 with a `null` body; clients rely on it.
pub async fn get_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Strategy>>, ApiError> {
    let id = parse_id(&id)?;
    let strategy = state.strategies.get(id).await.map_err(log_db_error("getting"))?;
    Ok(Json(strategy))
}

/// `POST /api/strategies`
pub async fn create_strategy(
    State(state): State<AppState>,
    body: Result<Json<StrategyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Strategy>), ApiError> {
    let input = validate(body)?;
    let strategy = state.strategies.create(&input).await.map_err(log_db_error("creating"))?;
    info!("Strategy {} created", strategy.id);
    Ok((StatusCode::CREATED, Json(strategy)))
}

/// `PUT /api/strategies/{id}`
pub async fn update_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StrategyInput>, JsonRejection>,
) -> Result<Json<Strategy>, ApiError> {
    let id = parse_id(&id)?;
    let input = validate(body)?;
    match state.strategies.update(id, &input).await.map_err(log_db_error("updating"))? {
        Some(strategy) => {
            info!("Strategy {} updated", id);
            Ok(Json(strategy))
        }
        None => Err(ApiError::NotFound(format!("strategy {}", id))),
    }
}

/// `DELETE /api/strategies/{id}`
pub async fn delete_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if state.strategies.delete(id).await.map_err(log_db_error("deleting"))? {
        info!("Strategy {} deleted", id);
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound(format!("strategy {}", id)))
    }
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/strategies", get(list_strategies).post(create_strategy))
        .route(
            "/api/strategies/{id}",
            get(get_strategy).put(update_strategy).delete(delete_strategy),
        )
}
