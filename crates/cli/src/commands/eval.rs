//! chessmind eval command

use clap::Args;
use console::style;
use rules::{evaluate, RulesEngine, ShakmatyRules};

#[derive(Debug, Args)]
pub struct EvalCommand {
    /// Position in FEN
    pub fen: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl EvalCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let rules = ShakmatyRules::from_fen(&self.fen)?;
        let board = rules.snapshot();
        let evaluation = evaluate(&board);

        if self.json {
            let value = serde_json::json!({
                "fen": rules.serialize(),
                "sideToMove": rules.side_to_move(),
                "status": rules.terminal_status().as_str(),
                "legalMoves": rules.legal_moves(),
                "evaluation": evaluation,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        println!("{}", board.render_ascii());
        println!();
        println!("{}", style(evaluation.summary()).bold());
        println!(
            "{} to move, {} legal moves, {}",
            rules.side_to_move(),
            rules.legal_moves().len(),
            rules.terminal_status()
        );
        Ok(())
    }
}
