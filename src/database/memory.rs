//! In-memory repositories for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::connection::DbError;
use crate::database::maps::MapRepository;
use crate::database::models::{Map, NewMap, Strategy, StrategyInput, UpsertOutcome, DEFAULT_GAMEMODE};
use crate::database::strategies::StrategyRepository;

#[derive(Default)]
struct Tables {
    maps: Vec<Map>,
    strategies: Vec<Strategy>,
    next_map_id: i32,
    next_strategy_id: i32,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    connected: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            connected: AtomicBool::new(true),
        }
    }

    pub fn disconnected() -> Self {
        let store = Self::new();
        store.connected.store(false, Ordering::SeqCst);
        store
    }

    pub async fn maps(&self) -> Vec<Map> {
        self.tables.lock().await.maps.clone()
    }

    /// Seed a map row directly, bypassing the sync path
    pub async fn seed_map(&self, map: NewMap, gamemode: &str) {
        self.upsert(&map).await.unwrap();
        let mut tables = self.tables.lock().await;
        if let Some(row) = tables.maps.iter_mut().find(|m| m.uuid == map.uuid) {
            row.gamemode = gamemode.to_string();
        }
    }

    fn check(&self) -> Result<(), DbError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::NotConnected)
        }
    }
}

#[async_trait]
impl MapRepository for MemoryStore {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn list_by_gamemode(&self, gamemode: &str) -> Result<Vec<Map>, DbError> {
        self.check()?;
        let tables = self.tables.lock().await;
        let mut maps: Vec<Map> = tables.maps.iter().filter(|m| m.gamemode == gamemode).cloned().collect();
        maps.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(maps)
    }

    async fn upsert(&self, map: &NewMap) -> Result<UpsertOutcome, DbError> {
        self.check()?;
        // Yield while holding nothing so overlapping callers really interleave
        tokio::task::yield_now().await;

        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        if let Some(row) = tables.maps.iter_mut().find(|m| m.uuid == map.uuid) {
            row.display_name = map.display_name.clone();
            row.display_icon = map.display_icon.clone();
            row.list_view_icon = map.list_view_icon.clone();
            row.list_view_icon_tall = map.list_view_icon_tall.clone();
            row.splash = map.splash.clone();
            row.stylized_background_image = map.stylized_background_image.clone();
            row.premier_background_image = map.premier_background_image.clone();
            row.updated_at = now;
            return Ok(UpsertOutcome::Updated);
        }

        tables.next_map_id += 1;
        let id = tables.next_map_id;
        tables.maps.push(Map {
            id,
            uuid: map.uuid.clone(),
            display_name: map.display_name.clone(),
            display_icon: map.display_icon.clone(),
            list_view_icon: map.list_view_icon.clone(),
            list_view_icon_tall: map.list_view_icon_tall.clone(),
            splash: map.splash.clone(),
            stylized_background_image: map.stylized_background_image.clone(),
            premier_background_image: map.premier_background_image.clone(),
            gamemode: DEFAULT_GAMEMODE.to_string(),
            created_at: now,
            updated_at: now,
        });
        Ok(UpsertOutcome::Inserted)
    }
}

#[async_trait]
impl StrategyRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Strategy>, DbError> {
        self.check()?;
        Ok(self.tables.lock().await.strategies.clone())
    }

    async fn get(&self, id: i32) -> Result<Option<Strategy>, DbError> {
        self.check()?;
        Ok(self.tables.lock().await.strategies.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, input: &StrategyInput) -> Result<Strategy, DbError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        tables.next_strategy_id += 1;
        let now = Utc::now();
        let strategy = Strategy {
            id: tables.next_strategy_id,
            uuid: Uuid::new_v4(),
            display_name: input.display_name.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.strategies.push(strategy.clone());
        Ok(strategy)
    }

    async fn update(&self, id: i32, input: &StrategyInput) -> Result<Option<Strategy>, DbError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        Ok(tables.strategies.iter_mut().find(|s| s.id == id).map(|s| {
            s.display_name = input.display_name.clone();
            s.description = input.description.clone();
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, DbError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let before = tables.strategies.len();
        tables.strategies.retain(|s| s.id != id);
        Ok(tables.strategies.len() < before)
    }
}
