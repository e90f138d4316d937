use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Gamemode assigned to maps that the upstream does not classify
pub const DEFAULT_GAMEMODE: &str = "competitive";

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>
    where
        Self: Sized;
}

// ============================================================================
// MAPS
// ============================================================================

/// Map row as stored locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Map {
    pub id: i32,
    pub uuid: String,
    pub display_name: String,
    pub display_icon: Option<String>,
    pub list_view_icon: Option<String>,
    pub list_view_icon_tall: Option<String>,
    pub splash: Option<String>,
    pub stylized_background_image: Option<String>,
    pub premier_background_image: Option<String>,
    pub gamemode: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for Map {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            uuid: row.try_get("uuid")?,
            display_name: row.try_get("display_name")?,
            display_icon: row.try_get("display_icon")?,
            list_view_icon: row.try_get("list_view_icon")?,
            list_view_icon_tall: row.try_get("list_view_icon_tall")?,
            splash: row.try_get("splash")?,
            stylized_background_image: row.try_get("stylized_background_image")?,
            premier_background_image: row.try_get("premier_background_image")?,
            gamemode: row.try_get("gamemode")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Map projected from the upstream API, keyed by its upstream uuid
#[derive(Debug, Clone, PartialEq)]
pub struct NewMap {
    pub uuid: String,
    pub display_name: String,
    pub display_icon: Option<String>,
    pub list_view_icon: Option<String>,
    pub list_view_icon_tall: Option<String>,
    pub splash: Option<String>,
    pub stylized_background_image: Option<String>,
    pub premier_background_image: Option<String>,
}

/// Public shape of a map; internal identifiers are never serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub display_name: String,
    pub display_icon: Option<String>,
    pub list_view_icon: Option<String>,
    pub list_view_icon_tall: Option<String>,
    pub splash: Option<String>,
    pub stylized_background_image: Option<String>,
    pub premier_background_image: Option<String>,
    pub gamemode: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Map> for MapView {
    fn from(map: Map) -> Self {
        Self {
            display_name: map.display_name,
            display_icon: map.display_icon,
            list_view_icon: map.list_view_icon,
            list_view_icon_tall: map.list_view_icon_tall,
            splash: map.splash,
            stylized_background_image: map.stylized_background_image,
            premier_background_image: map.premier_background_image,
            gamemode: map.gamemode,
            created_at: map.created_at,
            updated_at: map.updated_at,
        }
    }
}

/// Whether an upsert created a new row or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

// ============================================================================
// STRATEGIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: i32,
    pub uuid: Uuid,
    pub display_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for Strategy {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            uuid: row.try_get("uuid")?,
            display_name: row.try_get("display_name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Strategy as listed; identifiers are stripped like map listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub display_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Strategy> for StrategySummary {
    fn from(strategy: Strategy) -> Self {
        Self {
            display_name: strategy.display_name,
            description: strategy.description,
            created_at: strategy.created_at,
            updated_at: strategy.updated_at,
        }
    }
}

/// Create/update strategy request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInput {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}
