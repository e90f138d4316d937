//! Map reference data endpoints

use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::debug;

use crate::database::models::{MapView, DEFAULT_GAMEMODE};
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MapQuery {
    pub gamemode: Option<String>,
}

/// `GET /api/maps?gamemode=` (defaults to competitive)
pub async fn list_maps(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> Result<Json<Vec<MapView>>, ApiError> {
    let gamemode = query.gamemode.filter(|g| !g.trim().is_empty());
    fetch_maps(&state, gamemode.as_deref().unwrap_or(DEFAULT_GAMEMODE)).await
}

/// `GET /api/maps/{gamemode}`
pub async fn list_maps_by_gamemode(
    State(state): State<AppState>,
    Path(gamemode): Path<String>,
) -> Result<Json<Vec<MapView>>, ApiError> {
    fetch_maps(&state, &gamemode).await
}

async fn fetch_maps(state: &AppState, gamemode: &str) -> Result<Json<Vec<MapView>>, ApiError> {
    let maps = state.maps.list_by_gamemode(gamemode).await.map_err(|e| {
        tracing::error!("Error listing maps: {}", e);
        ApiError::from(e)
    })?;
    debug!("Listing {} '{}' maps", maps.len(), gamemode);

    Ok(Json(maps.into_iter().map(MapView::from).collect()))
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/maps", get(list_maps))
        .route("/api/maps/{gamemode}", get(list_maps_by_gamemode))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::database::memory::MemoryStore;
    use crate::database::models::NewMap;
    use crate::server::AppState;

    fn map(uuid: &str, name: &str) -> NewMap {
        NewMap {
            uuid: uuid.to_string(),
            display_name: name.to_string(),
            display_icon: Some(format!("https://media.valorant-api.com/maps/{uuid}/displayicon.png")),
            list_view_icon: None,
            list_view_icon_tall: None,
            splash: None,
            stylized_background_image: None,
            premier_background_image: None,
        }
    }

    async fn seeded_app() -> axum::Router {
        let store = Arc::new(MemoryStore::new());
        store.seed_map(map("a1", "Ascent"), "competitive").await;
        store.seed_map(map("b2", "Bind"), "competitive").await;
        store.seed_map(map("r3", "The Range"), "practice").await;
        super::create_routes().with_state(AppState::new(store.clone(), store))
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn defaults_to_competitive_and_hides_identifiers() {
        let (status, body) = get_json(seeded_app().await, "/api/maps").await;

        assert_eq!(status, StatusCode::OK);
        let maps = body.as_array().unwrap();
        assert_eq!(maps.len(), 2);
        for map in maps {
            assert_eq!(map["gamemode"], "competitive");
            assert!(map.get("id").is_none());
            assert!(map.get("uuid").is_none());
        }
        assert_eq!(maps[0]["displayName"], "Ascent");
    }

    #[tokio::test]
    async fn filters_by_query_and_path_gamemode() {
        let (_, by_query) = get_json(seeded_app().await, "/api/maps?gamemode=practice").await;
        let (_, by_path) = get_json(seeded_app().await, "/api/maps/practice").await;

        assert_eq!(by_query, by_path);
        assert_eq!(by_query.as_array().unwrap().len(), 1);
        assert_eq!(by_query[0]["displayName"], "The Range");
    }

    #[tokio::test]
    async fn disconnected_database_is_503() {
        let store = Arc::new(MemoryStore::disconnected());
        let app = super::create_routes().with_state(AppState::new(store.clone(), store));

        let (status, body) = get_json(app, "/api/maps").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], 503);
    }
}
