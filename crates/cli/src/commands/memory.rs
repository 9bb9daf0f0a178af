//! chessmind memory command

use clap::{Args, Subcommand};
use memory::{FileMemoryStore, MemoryStore};
use shared::{GameConfig, GameId, PlayerId};

use crate::session::GlobalArgs;

#[derive(Debug, Args)]
pub struct MemoryCommand {
    #[command(subcommand)]
    pub action: MemoryAction,
}

#[derive(Debug, Subcommand)]
pub enum MemoryAction {
    /// Print an agent's notes for one game
    Show {
        /// Game id
        game: String,
        /// Player name or id
        player: String,
    },
    /// List the games a player has notes for
    List {
        /// Player name or id
        player: String,
    },
}

impl MemoryCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = global.config_or(GameConfig::agent_vs_agent())?;
        let store = FileMemoryStore::new(config.memory_dir());

        match &self.action {
            MemoryAction::Show { game, player } => {
                let player = PlayerId::from_name(player);
                match store.get(&GameId::new(game.as_str()), &player)? {
                    Some(record) => {
                        println!("# {player} in {game} (turn {})", record.last_updated_turn);
                        println!();
                        println!("{}", record.content);
                    }
                    None => println!("No memory recorded for {player} in {game}"),
                }
            }
            MemoryAction::List { player } => {
                let player = PlayerId::from_name(player);
                let games = store.games_for(&player)?;
                if games.is_empty() {
                    println!("No memory recorded for {player}");
                }
                for game in games {
                    println!("{game}");
                }
            }
        }
        Ok(())
    }
}
