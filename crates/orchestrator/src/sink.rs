//! Presentation Sink - Observers of the turn loop
//!
//! Notifications are fire-and-forget: the orchestrator never reads anything
//! back and never waits on a sink.

use rules::{BoardSnapshot, Evaluation};
use shared::{GameId, Side};
use tokio::sync::mpsc;

use crate::orchestrator::TurnOutcome;
use crate::player::PlayerProfile;
use crate::session::GameResult;

/// Read-only view of the game at a turn boundary
#[derive(Debug, Clone)]
pub struct TurnView {
    pub game_id: GameId,
    /// Side to move
    pub side: Side,
    pub player: PlayerProfile,
    pub move_number: u32,
    /// Plies played so far
    pub ply: u32,
    pub fen: String,
    pub board: BoardSnapshot,
    pub evaluation: Evaluation,
    pub last_move: Option<String>,
}

/// Presentation Sink Trait
pub trait PresentationSink: Send {
    fn on_turn_start(&mut self, view: &TurnView);

    fn on_turn_end(&mut self, view: &TurnView, outcome: &TurnOutcome);

    fn on_game_over(&mut self, result: &GameResult);
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl PresentationSink for NullPresenter {
    fn on_turn_start(&mut self, _view: &TurnView) {}

    fn on_turn_end(&mut self, _view: &TurnView, _outcome: &TurnOutcome) {}

    fn on_game_over(&mut self, _result: &GameResult) {}
}

/// Messages sent from the orchestrator to a UI
#[derive(Debug, Clone)]
pub enum PresentationEvent {
    TurnStarted(TurnView),
    TurnEnded {
        view: TurnView,
        outcome: TurnOutcome,
    },
    GameOver(GameResult),
}

/// Sink that forwards every notification over a channel
///
/// A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<PresentationEvent>,
}

impl ChannelPresenter {
    pub fn new(tx: mpsc::UnboundedSender<PresentationEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PresentationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl PresentationSink for ChannelPresenter {
    fn on_turn_start(&mut self, view: &TurnView) {
        let _ = self.tx.send(PresentationEvent::TurnStarted(view.clone()));
    }

    fn on_turn_end(&mut self, view: &TurnView, outcome: &TurnOutcome) {
        let _ = self.tx.send(PresentationEvent::TurnEnded {
            view: view.clone(),
            outcome: outcome.clone(),
        });
    }

    fn on_game_over(&mut self, result: &GameResult) {
        let _ = self.tx.send(PresentationEvent::GameOver(result.clone()));
    }
}
