//! AgentPlayer - A side driven by a strategist, with working memory

use std::sync::Arc;

use async_trait::async_trait;
use memory::{MemoryRecord, MemoryStore, StoreError};
use shared::{GameId, PlayerId, Side};
use tracing::debug;

use super::strategist::{Strategist, StrategistRequest};
use super::{MoveRequest, Player, PlayerError, PlayerProfile, PlayerReply};

/// Access to one player's memory records
///
/// Only agents hold one, which makes them the only writers of memory.
#[derive(Clone)]
pub struct MemoryHandle {
    store: Arc<dyn MemoryStore>,
    player: PlayerId,
}

impl MemoryHandle {
    pub fn new(store: Arc<dyn MemoryStore>, player: PlayerId) -> Self {
        Self { store, player }
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn load(&self, game: &GameId) -> Result<Option<MemoryRecord>, StoreError> {
        self.store.get(game, &self.player)
    }

    pub fn save(&self, game: &GameId, content: &str, turn: u32) -> Result<(), StoreError> {
        self.store
            .put(game, &self.player, &MemoryRecord::new(content, turn))
    }
}

impl std::fmt::Debug for MemoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHandle")
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

/// Autonomous side
pub struct AgentPlayer {
    profile: PlayerProfile,
    strategist: Arc<dyn Strategist>,
    memory: MemoryHandle,
}

impl AgentPlayer {
    pub fn new(
        name: impl Into<String>,
        side: Side,
        strategist: Arc<dyn Strategist>,
        store: Arc<dyn MemoryStore>,
    ) -> Self {
        let profile = PlayerProfile::agent(name, side, strategist.identifier());
        let memory = MemoryHandle::new(store, profile.id.clone());
        Self {
            profile,
            strategist,
            memory,
        }
    }
}

#[async_trait]
impl Player for AgentPlayer {
    fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// One strategist call, no retry: failures are the orchestrator's to handle
    async fn request_move(&mut self, request: &MoveRequest) -> Result<PlayerReply, PlayerError> {
        let memory = request
            .prior_memory
            .clone()
            .unwrap_or_else(MemoryRecord::template)
            .content;

        let strategist_request = StrategistRequest {
            game_id: request.game_id.clone(),
            player_name: self.profile.name.clone(),
            side: request.side,
            fen: request.fen.clone(),
            move_number: request.move_number,
            legal_moves: request.legal_moves.clone(),
            transcript: request.transcript.clone(),
            board: request.board.clone(),
            evaluation: request.evaluation.clone(),
            memory,
        };

        debug!(
            player = %self.profile.id,
            strategist = %self.strategist.identifier(),
            "Requesting move from strategist"
        );
        let reply = self.strategist.generate(&strategist_request).await?;

        Ok(PlayerReply::freeform(reply.text, reply.memory))
    }

    fn memory(&self) -> Option<&MemoryHandle> {
        Some(&self.memory)
    }
}
