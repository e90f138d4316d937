//! Map-sync job
//!
//! Pulls the current map list from the public game API and upserts every
//! record into the local `maps` table. Runs once per process lifetime.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::SyncConfig;
use crate::database::models::{NewMap, UpsertOutcome};
use crate::database::MapRepository;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("database is not connected")]
    NotConnected,

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream answered HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("upstream payload is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One map record as published upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMap {
    pub uuid: String,
    pub display_name: String,
    #[serde(default)]
    pub display_icon: Option<String>,
    #[serde(default)]
    pub list_view_icon: Option<String>,
    #[serde(default)]
    pub list_view_icon_tall: Option<String>,
    #[serde(default)]
    pub splash: Option<String>,
    #[serde(default)]
    pub stylized_background_image: Option<String>,
    #[serde(default)]
    pub premier_background_image: Option<String>,
}

impl From<RemoteMap> for NewMap {
    fn from(remote: RemoteMap) -> Self {
        Self {
            uuid: remote.uuid,
            display_name: remote.display_name,
            display_icon: remote.display_icon,
            list_view_icon: remote.list_view_icon,
            list_view_icon_tall: remote.list_view_icon_tall,
            splash: remote.splash,
            stylized_background_image: remote.stylized_background_image,
            premier_background_image: remote.premier_background_image,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapListResponse {
    data: Vec<Value>,
}

/// Decode an upstream `{ "data": [...] }` body. Records are kept raw so one
/// malformed entry does not sink the whole list.
pub fn parse_map_list(body: &str) -> Result<Vec<Value>, SyncError> {
    Ok(serde_json::from_str::<MapListResponse>(body)?.data)
}

#[async_trait]
pub trait MapSource: Send + Sync {
    /// Fetch the raw upstream map records
    async fn fetch_maps(&self) -> Result<Vec<Value>, SyncError>;
}

/// HTTP client for the public map endpoint
pub struct ValorantApi {
    client: Client,
    url: Url,
}

impl ValorantApi {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.maps_api_url.clone(),
        })
    }
}

#[async_trait]
impl MapSource for ValorantApi {
    async fn fetch_maps(&self) -> Result<Vec<Value>, SyncError> {
        let response = self.client.get(self.url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::Status {
                status: response.status().as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await?;
        parse_map_list(&body)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Fetch, project and upsert every upstream map.
///
/// Rows are written one at a time in upstream order. A row that fails to
/// decode or to write is logged and skipped; the rest still go through.
pub async fn sync_maps(source: &dyn MapSource, repo: &dyn MapRepository) -> Result<SyncReport, SyncError> {
    if !repo.is_connected() {
        return Err(SyncError::NotConnected);
    }

    let records = source.fetch_maps().await?;
    let mut report = SyncReport {
        fetched: records.len(),
        ..SyncReport::default()
    };

    for record in records {
        let map: NewMap = match serde_json::from_value::<RemoteMap>(record) {
            Ok(remote) => remote.into(),
            Err(e) => {
                warn!("Skipping malformed upstream map: {}", e);
                report.failed += 1;
                continue;
            }
        };

        match repo.upsert(&map).await {
            Ok(UpsertOutcome::Inserted) => report.inserted += 1,
            Ok(UpsertOutcome::Updated) => report.updated += 1,
            Err(e) => {
                error!("Error while saving map {} ({}): {}", map.display_name, map.uuid, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Startup entry point: run the sync once and log the outcome
pub async fn run(source: Arc<dyn MapSource>, repo: Arc<dyn MapRepository>) -> Option<SyncReport> {
    debug!("Map sync started");
    match sync_maps(source.as_ref(), repo.as_ref()).await {
        Ok(report) => {
            info!(
                "🗺️  Updated {} maps ({} new, {} refreshed, {} failed)",
                report.inserted + report.updated,
                report.inserted,
                report.updated,
                report.failed
            );
            Some(report)
        }
        Err(SyncError::NotConnected) => {
            error!("Map sync skipped: database is not connected");
            None
        }
        Err(e) => {
            error!("Map sync failed: {}", e);
            None
        }
    }
}
