//! # Chessmind Orchestrator
//!
//! The turn-orchestration core: a state machine that alternates turns
//! between heterogeneous players, reconciles their output with the legal
//! move set, recovers from misbehaving agents and hands the finished game
//! to a record sink.
//!
//! ## Components
//!
//! - `GameSession` - One game: rules engine, transcript and turn state
//! - `MoveResolver` - Pulls a legal move out of free text
//! - `Player` - Human and agent players behind one interface
//! - `Orchestrator` - Drives turns until the game is over
//! - `PresentationSink` / `RecordSink` - Observers of the game

pub mod orchestrator;
pub mod player;
pub mod record;
pub mod resolver;
pub mod session;
pub mod sink;

pub use orchestrator::{Orchestrator, OrchestratorError, SessionEnd, TurnOutcome};
pub use player::{
    AgentPlayer, ChannelInput, HumanPlayer, InputEvent, MemoryHandle, MoveInput, MoveIntent,
    MovePrompt, MoveRequest, Player, PlayerError, PlayerProfile, PlayerReply, Strategist,
    StrategistError, StrategistReply, StrategistRequest,
};
pub use record::{GameRecord, PgnDocument, PgnFileSink, RecordError, RecordSink};
pub use resolver::{FallbackReason, MoveResolver, Resolution, ResolveError};
pub use session::{
    AttemptOutcome, GameReason, GameResult, GameSession, MoveAttempt, TurnState, Winner,
};
pub use sink::{ChannelPresenter, NullPresenter, PresentationEvent, PresentationSink, TurnView};
