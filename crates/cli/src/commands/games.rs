//! chessmind games command

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use orchestrator::{PgnDocument, PgnFileSink};
use shared::GameConfig;
use std::path::{Path, PathBuf};

use crate::session::GlobalArgs;

#[derive(Debug, Args)]
pub struct GamesCommand {
    #[command(subcommand)]
    pub action: GamesAction,
}

#[derive(Debug, Subcommand)]
pub enum GamesAction {
    /// List saved games
    List,
    /// Print one saved game
    Show {
        /// PGN file, or the id of a saved game
        game: String,
    },
}

impl GamesCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = global.config_or(GameConfig::agent_vs_agent())?;
        let sink = PgnFileSink::new(config.games_dir());

        match &self.action {
            GamesAction::List => {
                let paths = sink.list()?;
                if paths.is_empty() {
                    println!("No saved games in {}", sink.dir().display());
                    return Ok(());
                }
                for path in paths {
                    match PgnFileSink::load(&path) {
                        Ok(doc) => println!("{}", list_line(&doc)),
                        Err(e) => println!("{}  {}", style("unreadable").red(), e),
                    }
                }
            }
            GamesAction::Show { game } => {
                let path = find_game(&sink, game)?;
                let doc = PgnFileSink::load(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                for (name, value) in &doc.headers {
                    println!("[{name} \"{value}\"]");
                }
                println!();
                println!("{}", doc.movetext);
            }
        }
        Ok(())
    }
}

/// One summary line per saved game
pub fn list_line(doc: &PgnDocument) -> String {
    let header = |name: &str| doc.header(name).unwrap_or("?").to_string();
    format!(
        "{}  {}  {} vs {}  {}  ({})",
        header("Date"),
        header("GameId"),
        header("White"),
        header("Black"),
        header("Result"),
        header("Termination"),
    )
}

/// Resolve a path or a game id to a PGN file
pub fn find_game(sink: &PgnFileSink, game: &str) -> anyhow::Result<PathBuf> {
    let direct = Path::new(game);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let suffix = format!("_{game}.pgn");
    sink.list()?
        .into_iter()
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix))
        })
        .with_context(|| format!("No saved game matches '{game}'"))
}
