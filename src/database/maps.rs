//! Map persistence

use async_trait::async_trait;

use crate::database::connection::{DatabaseConnection, DbError};
use crate::database::models::{FromRow, Map, NewMap, UpsertOutcome};

#[async_trait]
pub trait MapRepository: Send + Sync {
    /// Whether statements can currently be issued
    fn is_connected(&self) -> bool;

    /// All maps of one gamemode, ordered by name
    async fn list_by_gamemode(&self, gamemode: &str) -> Result<Vec<Map>, DbError>;

    /// Insert the map, or refresh the row that already carries its uuid.
    /// Must be a single atomic statement so overlapping syncs cannot duplicate.
    async fn upsert(&self, map: &NewMap) -> Result<UpsertOutcome, DbError>;
}

#[async_trait]
impl MapRepository for DatabaseConnection {
    fn is_connected(&self) -> bool {
        DatabaseConnection::is_connected(self)
    }

    async fn list_by_gamemode(&self, gamemode: &str) -> Result<Vec<Map>, DbError> {
        let rows = self
            .client()?
            .query(
                "SELECT * FROM maps WHERE gamemode = $1 ORDER BY display_name",
                &[&gamemode],
            )
            .await?;

        Ok(rows.iter().map(Map::from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn upsert(&self, map: &NewMap) -> Result<UpsertOutcome, DbError> {
        // xmax is zero only for a freshly inserted tuple
        let query = r#"
            INSERT INTO maps (
                uuid, display_name, display_icon, list_view_icon, list_view_icon_tall,
                splash, stylized_background_image, premier_background_image
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (uuid) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                display_icon = EXCLUDED.display_icon,
                list_view_icon = EXCLUDED.list_view_icon,
                list_view_icon_tall = EXCLUDED.list_view_icon_tall,
                splash = EXCLUDED.splash,
                stylized_background_image = EXCLUDED.stylized_background_image,
                premier_background_image = EXCLUDED.premier_background_image,
                updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
        "#;

        let row = self
            .client()?
            .query_one(
                query,
                &[
                    &map.uuid,
                    &map.display_name,
                    &map.display_icon,
                    &map.list_view_icon,
                    &map.list_view_icon_tall,
                    &map.splash,
                    &map.stylized_background_image,
                    &map.premier_background_image,
                ],
            )
            .await?;

        let inserted: bool = row.try_get("inserted")?;
        tracing::debug!("[upsert] map {} ({}) inserted={}", map.display_name, map.uuid, inserted);

        Ok(if inserted { UpsertOutcome::Inserted } else { UpsertOutcome::Updated })
    }
}
