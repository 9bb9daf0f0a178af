//! TerminalPresenter - Draws the game in the terminal

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::{
    GameResult, PlayerProfile, PresentationSink, TurnOutcome, TurnView, Winner,
};
use shared::Side;

/// Prints boards for humans and a spinner while agents think
pub struct TerminalPresenter {
    spinner: Option<ProgressBar>,
    /// Also draw the board before agent turns
    always_show_board: bool,
    mover: Option<PlayerProfile>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            spinner: None,
            always_show_board: false,
            mover: None,
        }
    }

    pub fn with_boards(mut self, always: bool) -> Self {
        self.always_show_board = always;
        self
    }

    fn print_board(view: &TurnView) {
        println!();
        println!("{}", view.board.render_ascii());
        println!("{}", style(view.evaluation.summary()).dim());
        if view.board.side_in_check() == Some(view.side) {
            println!("{}", style(format!("{} is in check", view.side)).yellow());
        }
    }

    fn start_spinner(&mut self, player: &PlayerProfile) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message(format!(
            "{} ({}) is thinking...",
            player.name,
            player.model.as_deref().unwrap_or("agent")
        ));
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for TerminalPresenter {
    fn on_turn_start(&mut self, view: &TurnView) {
        if view.player.is_human() || self.always_show_board {
            Self::print_board(view);
        }
        if !view.player.is_human() {
            self.start_spinner(&view.player);
        }
        self.mover = Some(view.player.clone());
    }

    fn on_turn_end(&mut self, view: &TurnView, outcome: &TurnOutcome) {
        self.stop_spinner();

        let number = mover_move_number(view.move_number, outcome.side);
        let name = self.mover.take().map(|p| p.name).unwrap_or_default();
        println!(
            "{}  {}",
            style(move_label(number, outcome.side, &outcome.san)).bold(),
            style(name).dim()
        );
        if let Some(notice) = outcome.fallback_notice() {
            println!("{}", style(notice).yellow());
        }
    }

    fn on_game_over(&mut self, result: &GameResult) {
        self.stop_spinner();
        println!();
        println!("{} {}", style("Game over:").bold(), game_over_line(result));
    }
}

/// Full-move number of a move, given the number after it was played
fn mover_move_number(after: u32, side: Side) -> u32 {
    match side {
        Side::White => after,
        Side::Black => after.saturating_sub(1).max(1),
    }
}

/// `12. e4` for white, `12... e5` for black
pub fn move_label(number: u32, side: Side, san: &str) -> String {
    match side {
        Side::White => format!("{number}. {san}"),
        Side::Black => format!("{number}... {san}"),
    }
}

pub fn game_over_line(result: &GameResult) -> String {
    let headline = match result.winner {
        Winner::White => "White wins".to_string(),
        Winner::Black => "Black wins".to_string(),
        Winner::Draw => "Draw".to_string(),
    };
    format!("{headline}, {}", result.summary())
}
