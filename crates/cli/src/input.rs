//! Keyboard input for human players

use async_trait::async_trait;
use console::style;
use orchestrator::{InputEvent, MoveInput, MovePrompt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// What the terminal is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Normal,
    AwaitingMoveInput,
    ConfirmingQuit,
}

/// One line typed at the move prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Move(String),
    ListMoves,
    Help,
    Quit,
    Empty,
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => InputCommand::Empty,
            "quit" | "exit" | "resign" | "/quit" | "/q" => InputCommand::Quit,
            "moves" | "/moves" | "?" => InputCommand::ListMoves,
            "help" | "/help" | "/h" => InputCommand::Help,
            _ => InputCommand::Move(line.to_string()),
        }
    }
}

/// Reads moves from a line-oriented source, stdin by default
pub struct TerminalInput<R = BufReader<Stdin>> {
    lines: Lines<R>,
    state: UiState,
    confirm_quit: bool,
}

impl TerminalInput {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> TerminalInput<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            state: UiState::Normal,
            confirm_quit: true,
        }
    }

    /// Quit without the confirmation dialog
    pub fn without_confirmation(mut self) -> Self {
        self.confirm_quit = false;
        self
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read from terminal");
                None
            }
        }
    }

    async fn confirm(&mut self) -> bool {
        if !self.confirm_quit {
            return true;
        }
        self.state = UiState::ConfirmingQuit;
        let answer = tokio::task::spawn_blocking(|| {
            dialoguer::Confirm::new()
                .with_prompt("Abandon this game?")
                .default(false)
                .interact()
        })
        .await;

        // No terminal to ask on means nobody can answer, so quit
        match answer {
            Ok(Ok(yes)) => yes,
            Ok(Err(_)) | Err(_) => true,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MoveInput for TerminalInput<R> {
    async fn next_input(&mut self, prompt: &MovePrompt) -> InputEvent {
        if let Some(reason) = &prompt.rejection {
            println!("{}", style(reason).red());
        }
        println!(
            "{} to move ({}). Enter a move in SAN, 'moves' or 'quit'.",
            style(prompt.side).bold(),
            prompt.move_number
        );

        loop {
            self.state = UiState::AwaitingMoveInput;
            let Some(line) = self.read_line().await else {
                self.state = UiState::Normal;
                return InputEvent::Quit;
            };

            match InputCommand::parse(&line) {
                InputCommand::Empty => continue,
                InputCommand::Help => {
                    println!("  <san>   play a move, e.g. e4, Nf3, O-O, exd5, e8=Q");
                    println!("  moves   list the legal moves");
                    println!("  quit    abandon the game");
                }
                InputCommand::ListMoves => {
                    println!("  {}", prompt.legal_moves.join(" "));
                }
                InputCommand::Quit => {
                    if self.confirm().await {
                        self.state = UiState::Normal;
                        return InputEvent::Quit;
                    }
                    println!("Continuing.");
                }
                InputCommand::Move(san) => {
                    self.state = UiState::Normal;
                    return InputEvent::Move(san);
                }
            }
        }
    }
}
