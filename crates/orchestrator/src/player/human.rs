//! HumanPlayer - Waits on an input source for the move itself

use async_trait::async_trait;
use shared::Side;
use tokio::sync::mpsc;
use tracing::debug;

use super::{MoveRequest, Player, PlayerError, PlayerProfile, PlayerReply};
use crate::resolver::MoveResolver;

/// What a human typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Move(String),
    Quit,
}

/// Shown to the human when input is needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePrompt {
    pub side: Side,
    pub move_number: u32,
    pub legal_moves: Vec<String>,
    /// Why the previous input was refused
    pub rejection: Option<String>,
}

/// Source of human input (terminal, channel, ...)
#[async_trait]
pub trait MoveInput: Send {
    async fn next_input(&mut self, prompt: &MovePrompt) -> InputEvent;
}

/// Input fed through a tokio channel
///
/// A closed channel reads as `Quit`.
#[derive(Debug)]
pub struct ChannelInput {
    rx: mpsc::UnboundedReceiver<InputEvent>,
    prompts: Option<mpsc::UnboundedSender<MovePrompt>>,
}

impl ChannelInput {
    pub fn new(rx: mpsc::UnboundedReceiver<InputEvent>) -> Self {
        Self { rx, prompts: None }
    }

    /// Sender and input in one go
    pub fn pair() -> (mpsc::UnboundedSender<InputEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Forward every prompt to `tx`, so a UI can show rejections
    pub fn with_prompts(mut self, tx: mpsc::UnboundedSender<MovePrompt>) -> Self {
        self.prompts = Some(tx);
        self
    }
}

#[async_trait]
impl MoveInput for ChannelInput {
    async fn next_input(&mut self, prompt: &MovePrompt) -> InputEvent {
        if let Some(tx) = &self.prompts {
            let _ = tx.send(prompt.clone());
        }
        self.rx.recv().await.unwrap_or(InputEvent::Quit)
    }
}

/// Human-controlled side
pub struct HumanPlayer {
    profile: PlayerProfile,
    input: Box<dyn MoveInput>,
}

impl HumanPlayer {
    pub fn new(name: impl Into<String>, side: Side, input: Box<dyn MoveInput>) -> Self {
        Self {
            profile: PlayerProfile::human(name, side),
            input,
        }
    }
}

#[async_trait]
impl Player for HumanPlayer {
    fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Re-prompts until the input is legal or the human quits
    async fn request_move(&mut self, request: &MoveRequest) -> Result<PlayerReply, PlayerError> {
        let mut prompt = MovePrompt {
            side: request.side,
            move_number: request.move_number,
            legal_moves: request.legal_moves.clone(),
            rejection: None,
        };

        loop {
            match self.input.next_input(&prompt).await {
                InputEvent::Quit => return Err(PlayerError::Cancelled),
                InputEvent::Move(text) => {
                    if let Some(san) = MoveResolver::match_exact(&text, &request.legal_moves) {
                        return Ok(PlayerReply::exact(san));
                    }
                    debug!(player = %self.profile.id, input = %text, "Rejected human input");
                    prompt.rejection = Some(if text.trim().is_empty() {
                        "no move entered".to_string()
                    } else {
                        format!("'{}' is not a legal move", text.trim())
                    });
                }
            }
        }
    }
}
