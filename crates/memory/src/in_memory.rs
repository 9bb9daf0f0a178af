//! In-Memory Store
//!
//! Thread-safe, process-local implementation of `MemoryStore`.
//! Useful for tests and for sessions that should leave nothing on disk.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use shared::{GameId, PlayerId};

use crate::record::MemoryRecord;
use crate::store::{MemoryStore, StoreError};

type Key = (GameId, PlayerId);

/// In-memory store shared through cheap clones
#[derive(Debug, Clone, Default)]
pub struct InMemoryMemoryStore {
    records: Arc<RwLock<HashMap<Key, MemoryRecord>>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all games
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MemoryStore for InMemoryMemoryStore {
    fn get(&self, game: &GameId, player: &PlayerId) -> Result<Option<MemoryRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Lock {
            message: "Failed to acquire read lock".to_string(),
        })?;
        Ok(records.get(&(game.clone(), player.clone())).cloned())
    }

    fn put(
        &self,
        game: &GameId,
        player: &PlayerId,
        record: &MemoryRecord,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Lock {
            message: "Failed to acquire write lock".to_string(),
        })?;
        records.insert((game.clone(), player.clone()), record.clone());
        Ok(())
    }

    fn games_for(&self, player: &PlayerId) -> Result<Vec<GameId>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Lock {
            message: "Failed to acquire read lock".to_string(),
        })?;
        let mut games: Vec<GameId> = records
            .keys()
            .filter(|(_, p)| p == player)
            .map(|(g, _)| g.clone())
            .collect();
        games.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(games)
    }
}
