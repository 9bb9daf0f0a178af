//! Memory Store - Abstract persistence for working memory
//!
//! The store only maps (game, player) to a record. It never interprets the
//! content, and keying by game id keeps memories of unrelated games apart.

use shared::{GameId, PlayerId};
use thiserror::Error;

use crate::record::MemoryRecord;

/// Errors that can occur during memory store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed
    #[error("Memory I/O error at {path}: {message}")]
    Io { path: String, message: String },
    /// Stored data could not be parsed
    #[error("Corrupt memory record at {path}: {reason}")]
    Corrupt { path: String, reason: String },
    /// Internal lock poisoned
    #[error("Memory store lock error: {message}")]
    Lock { message: String },
}

/// Memory Store Trait
///
/// This is a PORT: the orchestrator and agents depend on it, adapters
/// decide where records live. Implementations must be safe to share between
/// concurrently running sessions.
pub trait MemoryStore: Send + Sync {
    /// Fetch the record for a player in a game
    ///
    /// `Ok(None)` means the player has no memory for this game yet.
    fn get(&self, game: &GameId, player: &PlayerId) -> Result<Option<MemoryRecord>, StoreError>;

    /// Create or replace the record for a player in a game
    fn put(&self, game: &GameId, player: &PlayerId, record: &MemoryRecord)
        -> Result<(), StoreError>;

    /// Games for which this player has a stored record
    fn games_for(&self, player: &PlayerId) -> Result<Vec<GameId>, StoreError>;
}
