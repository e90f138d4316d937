//! Strategy persistence

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::connection::{DatabaseConnection, DbError};
use crate::database::models::{FromRow, Strategy, StrategyInput};

#[async_trait]
pub trait StrategyRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Strategy>, DbError>;

    async fn get(&self, id: i32) -> Result<Option<Strategy>, DbError>;

    async fn create(&self, input: &StrategyInput) -> Result<Strategy, DbError>;

    /// Returns `None` when no strategy has this id
    async fn update(&self, id: i32, input: &StrategyInput) -> Result<Option<Strategy>, DbError>;

    /// Returns `false` when no strategy has this id
    async fn delete(&self, id: i32) -> Result<bool, DbError>;
}

#[async_trait]
impl StrategyRepository for DatabaseConnection {
    async fn list(&self) -> Result<Vec<Strategy>, DbError> {
        let rows = self
            .client()?
            .query("SELECT * FROM strategies ORDER BY id", &[])
            .await?;

        Ok(rows.iter().map(Strategy::from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn get(&self, id: i32) -> Result<Option<Strategy>, DbError> {
        let row = self
            .client()?
            .query_opt("SELECT * FROM strategies WHERE id = $1", &[&id])
            .await?;

        Ok(row.as_ref().map(Strategy::from_row).transpose()?)
    }

    async fn create(&self, input: &StrategyInput) -> Result<Strategy, DbError> {
        let uuid = Uuid::new_v4();
        let row = self
            .client()?
            .query_one(
                "INSERT INTO strategies (uuid, display_name, description) VALUES ($1, $2, $3) RETURNING *",
                &[&uuid, &input.display_name, &input.description],
            )
            .await?;

        let strategy = Strategy::from_row(&row)?;
        tracing::info!("Created strategy {} ({})", strategy.id, strategy.display_name);
        Ok(strategy)
    }

    async fn update(&self, id: i32, input: &StrategyInput) -> Result<Option<Strategy>, DbError> {
        let row = self
            .client()?
            .query_opt(
                "UPDATE strategies SET display_name = $1, description = $2, updated_at = NOW() \
                 WHERE id = $3 RETURNING *",
                &[&input.display_name, &input.description, &id],
            )
            .await?;

        Ok(row.as_ref().map(Strategy::from_row).transpose()?)
    }

    async fn delete(&self, id: i32) -> Result<bool, DbError> {
        let affected = self
            .client()?
            .execute("DELETE FROM strategies WHERE id = $1", &[&id])
            .await?;

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::live::live_database;

    fn input(name: &str) -> StrategyInput {
        StrategyInput {
            display_name: name.to_string(),
            description: "smoke mid, split A".to_string(),
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let Some(db) = live_database().await else { return };

        let created = db.create(&input("A execute")).await.unwrap();
        assert_eq!(db.get(created.id).await.unwrap().unwrap().display_name, "A execute");
        assert!(db.list().await.unwrap().iter().any(|s| s.id == created.id));

        let updated = db.update(created.id, &input("B execute")).await.unwrap().unwrap();
        assert_eq!(updated.display_name, "B execute");
        assert_eq!(updated.uuid, created.uuid);

        assert!(db.delete(created.id).await.unwrap());
        assert_eq!(db.get(created.id).await.unwrap(), None);
        assert!(!db.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_id_is_absent_not_an_error() {
        let Some(db) = live_database().await else { return };

        assert_eq!(db.get(i32::MAX).await.unwrap(), None);
        assert_eq!(db.update(i32::MAX, &input("ghost")).await.unwrap(), None);
        assert!(!db.delete(i32::MAX).await.unwrap());
    }
}
