//! Orchestrator - Drives a session from first move to result
//!
//! One turn:
//! 1. Await: ask the player for the side to move (the only suspension point)
//! 2. Resolve: reconcile the reply with the legal moves, or fall back
//! 3. Apply: commit the move, store the agent's memory, check for the end
//!
//! Player misbehavior never stops the game: illegal or unparseable output
//! and outright strategist failures all end in a random legal move that is
//! announced to the presentation sink and written to the diagnostic log.

use audit::{DiagnosticEntry, DiagnosticEventType, DiagnosticLog};
use rules::ApplyOutcome;
use shared::{GameId, PieceKind, Side, TerminalStatus};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::player::{MoveIntent, MoveRequest, Player, PlayerError, PlayerReply};
use crate::record::{GameRecord, RecordSink};
use crate::resolver::{FallbackReason, MoveResolver, Resolution, ResolveError};
use crate::session::{AttemptOutcome, GameResult, GameSession, MoveAttempt, TurnState};
use crate::sink::{NullPresenter, PresentationSink, TurnView};

const DEFAULT_EVENT: &str = "Chessmind Casual Game";

/// Errors that stop the turn loop
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// `run_turn` on a finished game
    #[error("Game {game_id} is already over")]
    GameOver { game_id: GameId },

    /// The human quit or the cancellation token fired
    #[error("Session cancelled")]
    Cancelled,

    /// The rules engine contradicted itself
    #[error("Rules engine contract violated: {reason}")]
    RulesContract { reason: String },

    /// The two players cannot share this board
    #[error("Invalid seating: {reason}")]
    Seating { reason: String },
}

impl From<ResolveError> for OrchestratorError {
    fn from(err: ResolveError) -> Self {
        OrchestratorError::RulesContract {
            reason: err.to_string(),
        }
    }
}

/// What one turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub side: Side,
    /// Move actually applied
    pub san: String,
    pub attempt: MoveAttempt,
    /// Set when `san` was chosen automatically
    pub fallback: Option<FallbackReason>,
    /// 1-based ply number of this move
    pub ply: u32,
    pub captured: Option<PieceKind>,
    pub status: TerminalStatus,
}

impl TurnOutcome {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Announcement for automatically played moves
    pub fn fallback_notice(&self) -> Option<String> {
        self.fallback
            .as_ref()
            .map(|reason| format!("{} played automatically due to {}", self.san, reason))
    }
}

/// How `run` ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Finished(GameResult),
    /// Cancelled before the game was over; nothing is persisted
    Abandoned { plies: u32 },
}

/// Orchestrator - The turn loop
pub struct Orchestrator {
    /// Indexed by `Side::index()`
    players: [Box<dyn Player>; 2],
    resolver: MoveResolver,
    presenter: Box<dyn PresentationSink>,
    records: Option<Box<dyn RecordSink>>,
    diagnostics: DiagnosticLog,
    cancel: CancellationToken,
    event: String,
}

impl Orchestrator {
    /// Create an orchestrator for two players
    ///
    /// `white` and `black` must carry those sides in their profiles, and two
    /// players with working memory must not share a player id.
    pub fn new(white: Box<dyn Player>, black: Box<dyn Player>) -> Result<Self, OrchestratorError> {
        for (player, side) in [(&white, Side::White), (&black, Side::Black)] {
            let profile = player.profile();
            if profile.side != side {
                return Err(OrchestratorError::Seating {
                    reason: format!("{} plays {} but was seated as {side}", profile.name, profile.side),
                });
            }
        }
        if let (Some(w), Some(b)) = (white.memory(), black.memory()) {
            if w.player() == b.player() {
                return Err(OrchestratorError::Seating {
                    reason: format!("both players would share the memory of '{}'", w.player()),
                });
            }
        }

        Ok(Self {
            players: [white, black],
            resolver: MoveResolver::new(),
            presenter: Box::new(NullPresenter),
            records: None,
            diagnostics: DiagnosticLog::default(),
            cancel: CancellationToken::new(),
            event: DEFAULT_EVENT.to_string(),
        })
    }

    pub fn with_resolver(mut self, resolver: MoveResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_presenter(mut self, presenter: Box<dyn PresentationSink>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn with_record_sink(mut self, records: Box<dyn RecordSink>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticLog) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    // ========== Getters ==========

    pub fn player(&self, side: Side) -> &dyn Player {
        self.players[side.index()].as_ref()
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Token that interrupts a pending player request
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ========== Turn loop ==========

    /// Play turns until the game is over, then hand the record over once
    ///
    /// Running a session that was already recorded returns its result again
    /// without saving a second record.
    pub async fn run(&mut self, session: &mut GameSession) -> Result<SessionEnd, OrchestratorError> {
        info!(game_id = %session.id(), "Session started");

        let result = loop {
            if let Some(result) = session.result() {
                break result.clone();
            }
            match self.run_turn(session).await {
                Ok(_) => {}
                Err(OrchestratorError::Cancelled) => {
                    info!(game_id = %session.id(), plies = session.ply_count(), "Session abandoned");
                    return Ok(SessionEnd::Abandoned {
                        plies: session.ply_count(),
                    });
                }
                Err(e) => return Err(e),
            }
        };

        if session.mark_recorded() {
            info!(game_id = %session.id(), result = %result.summary(), "Session finished");
            self.persist(session, &result);
        } else {
            debug!(game_id = %session.id(), "Session already recorded");
        }
        Ok(SessionEnd::Finished(result))
    }

    /// Play exactly one turn
    ///
    /// A cancelled turn leaves the board untouched. Once a move has been
    /// resolved it is always committed.
    pub async fn run_turn(&mut self, session: &mut GameSession) -> Result<TurnOutcome, OrchestratorError> {
        if session.is_terminal() {
            return Err(OrchestratorError::GameOver {
                game_id: session.id().clone(),
            });
        }

        let side = session.side_to_move();
        let legal = session.legal_moves();
        if legal.is_empty() {
            return Err(OrchestratorError::RulesContract {
                reason: format!(
                    "no legal moves in a position reported as {}",
                    session.rules().terminal_status().as_str()
                ),
            });
        }

        // ---- Await ----
        session.set_state(TurnState::AwaitingTurn(side));
        let view = self.view(session);
        self.presenter.on_turn_start(&view);

        let prior_memory = self.load_memory(session, side);
        let request = MoveRequest {
            game_id: session.id().clone(),
            side,
            fen: view.fen.clone(),
            move_number: view.move_number,
            ply: view.ply,
            legal_moves: legal.clone(),
            transcript: session.transcript().to_vec(),
            board: view.board.clone(),
            evaluation: view.evaluation.clone(),
            prior_memory,
        };

        let cancel = self.cancel.clone();
        let player = &mut self.players[side.index()];
        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PlayerError::Cancelled),
            reply = player.request_move(&request) => reply,
        };

        // ---- Resolve ----
        let (resolution, attempt, updated_memory) = match reply {
            Ok(reply) => {
                session.set_state(TurnState::ResolvingMove {
                    side,
                    raw_output: reply.text.clone(),
                });
                let resolution = self.resolve(&reply, &legal)?;
                let attempt = MoveAttempt {
                    raw_output: reply.text,
                    candidate: resolution.candidate.clone(),
                    outcome: match &resolution.fallback {
                        None => AttemptOutcome::Applied,
                        Some(FallbackReason::NoMoveFound) => AttemptOutcome::Unparseable,
                        Some(FallbackReason::IllegalMove { .. }) => AttemptOutcome::RejectedIllegal,
                        Some(FallbackReason::PlayerFailure { .. }) => AttemptOutcome::FallbackRandom,
                    },
                };
                if let Some(reason) = &resolution.fallback {
                    self.record_unusable_output(session, side, &attempt, reason);
                }
                (resolution, attempt, reply.updated_memory)
            }
            Err(PlayerError::Cancelled) => {
                self.record_cancellation(session, side);
                session.set_state(TurnState::AwaitingTurn(side));
                return Err(OrchestratorError::Cancelled);
            }
            Err(PlayerError::Strategist(e)) => {
                let detail = e.to_string();
                error!(
                    game_id = %session.id(),
                    side = %side,
                    error = %detail,
                    "Strategist failed, forcing a random move"
                );
                self.log_diagnostic(
                    session,
                    side,
                    DiagnosticEventType::StrategistFailure,
                    detail.clone(),
                );

                let san = self.resolver.random_move(&legal)?;
                let resolution = Resolution {
                    san,
                    candidate: None,
                    fallback: Some(FallbackReason::PlayerFailure { detail }),
                };
                let attempt = MoveAttempt {
                    raw_output: String::new(),
                    candidate: None,
                    outcome: AttemptOutcome::FallbackRandom,
                };
                (resolution, attempt, None)
            }
        };

        // ---- Apply ----
        session.set_state(TurnState::Applying {
            side,
            san: resolution.san.clone(),
        });
        let applied: ApplyOutcome = session.commit(&resolution.san);
        if !applied.applied {
            session.set_state(TurnState::AwaitingTurn(side));
            return Err(OrchestratorError::RulesContract {
                reason: format!("engine rejected '{}' from its own legal moves", resolution.san),
            });
        }
        let ply = session.ply_count();
        debug!(game_id = %session.id(), side = %side, san = %resolution.san, ply, "Move applied");

        if let Some(content) = updated_memory {
            self.store_memory(session, side, &content, ply);
        }

        let result = session.conclude();
        if result.is_none() {
            session.set_state(TurnState::AwaitingTurn(side.opposite()));
        }

        let outcome = TurnOutcome {
            side,
            san: resolution.san,
            attempt,
            fallback: resolution.fallback,
            ply,
            captured: applied.captured,
            status: session.rules().terminal_status(),
        };

        let view = self.view(session);
        self.presenter.on_turn_end(&view, &outcome);
        if let Some(result) = &result {
            self.presenter.on_game_over(result);
        }

        Ok(outcome)
    }

    // ========== Helpers ==========

    fn view(&self, session: &GameSession) -> TurnView {
        let side = session.side_to_move();
        let board = session.snapshot();
        TurnView {
            game_id: session.id().clone(),
            side,
            player: self.players[side.index()].profile().clone(),
            move_number: session.move_number(),
            ply: session.ply_count(),
            fen: session.fen(),
            evaluation: rules::evaluate(&board),
            board,
            last_move: session.last_move().map(str::to_string),
        }
    }

    fn resolve(&mut self, reply: &PlayerReply, legal: &[String]) -> Result<Resolution, OrchestratorError> {
        if reply.intent == MoveIntent::Exact {
            if let Some(san) = MoveResolver::match_exact(&reply.text, legal) {
                return Ok(Resolution {
                    san,
                    candidate: Some(reply.text.clone()),
                    fallback: None,
                });
            }
        }
        Ok(self.resolver.resolve(&reply.text, legal)?)
    }

    /// A failed read counts as "no memory yet"
    fn load_memory(&mut self, session: &GameSession, side: Side) -> Option<memory::MemoryRecord> {
        let handle = self.players[side.index()].memory()?;
        match handle.load(session.id()) {
            Ok(record) => record,
            Err(e) => {
                warn!(game_id = %session.id(), side = %side, error = %e, "Memory read failed");
                self.log_diagnostic(
                    session,
                    side,
                    DiagnosticEventType::MemoryReadFailure,
                    e.to_string(),
                );
                None
            }
        }
    }

    /// A failed write is logged and skipped
    fn store_memory(&mut self, session: &GameSession, side: Side, content: &str, ply: u32) {
        let Some(handle) = self.players[side.index()].memory() else {
            return;
        };
        if let Err(e) = handle.save(session.id(), content, ply) {
            warn!(game_id = %session.id(), side = %side, error = %e, "Memory write failed");
            self.log_diagnostic(
                session,
                side,
                DiagnosticEventType::MemoryWriteFailure,
                e.to_string(),
            );
        }
    }

    fn record_unusable_output(
        &mut self,
        session: &GameSession,
        side: Side,
        attempt: &MoveAttempt,
        reason: &FallbackReason,
    ) {
        warn!(
            game_id = %session.id(),
            side = %side,
            reason = %reason,
            "Unusable move output, playing a random move"
        );
        let event_type = match reason {
            FallbackReason::IllegalMove { .. } => DiagnosticEventType::IllegalMove,
            _ => DiagnosticEventType::UnparseableOutput,
        };
        let entry = self
            .entry(session, side, event_type, reason.to_string())
            .with_metadata(serde_json::json!({
                "rawOutput": attempt.raw_output,
                "candidate": attempt.candidate,
            }));
        self.diagnostics.log(entry);
    }

    fn record_cancellation(&mut self, session: &GameSession, side: Side) {
        info!(game_id = %session.id(), side = %side, "Session cancelled while awaiting a move");
        self.log_diagnostic(
            session,
            side,
            DiagnosticEventType::SessionCancelled,
            format!("cancelled after {} plies", session.ply_count()),
        );
    }

    fn log_diagnostic(
        &mut self,
        session: &GameSession,
        side: Side,
        event_type: DiagnosticEventType,
        detail: String,
    ) {
        let entry = self.entry(session, side, event_type, detail);
        self.diagnostics.log(entry);
    }

    fn entry(
        &self,
        session: &GameSession,
        side: Side,
        event_type: DiagnosticEventType,
        detail: String,
    ) -> DiagnosticEntry {
        DiagnosticEntry::new(event_type, session.id(), detail)
            .with_side(side)
            .with_player(&self.players[side.index()].profile().id)
            .with_fen(session.fen())
    }

    fn persist(&mut self, session: &GameSession, result: &GameResult) {
        let Some(records) = self.records.as_mut() else {
            return;
        };
        let record = GameRecord::new(
            self.event.clone(),
            session,
            result,
            self.players[Side::White.index()].profile(),
            self.players[Side::Black.index()].profile(),
        );
        if let Err(e) = records.save(&record) {
            error!(game_id = %session.id(), error = %e, "Failed to save game record");
        }
    }
}
