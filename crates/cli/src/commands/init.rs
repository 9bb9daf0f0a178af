//! chessmind init command

use clap::Args;
use std::path::PathBuf;

use crate::session::DEFAULT_CONFIG_FILE;

const STARTER_CONFIG: &str = r#"# Chessmind configuration
#
# Event label written to the PGN header of every saved game.
event: Chessmind Casual Game

# Seed for fallback moves and heuristic agents. Remove for a fresh game
# every time.
# seed: 42

# Memory, saved games and diagnostics live here.
dataDir: .chessmind

# Start from a custom position instead of the initial one.
# startFen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"

white:
  name: Human
  kind: human

black:
  name: Black Agent
  kind: agent
  strategist:
    # heuristic: offline, no network
    # openai: any OpenAI-compatible chat-completions endpoint
    provider: heuristic
    # model: gpt-4o
    # baseUrl: https://api.openai.com/v1
    # apiKeyEnv: OPENAI_API_KEY
    # timeoutSecs: 60
    # temperature: 0.7
"#;

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Directory to initialize
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        println!("Initializing Chessmind in {:?}", self.directory);

        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(DEFAULT_CONFIG_FILE);
        if path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        std::fs::write(&path, STARTER_CONFIG)?;

        println!("✓ Wrote {}", path.display());
        println!("  Run `chessmind play` to start a game");
        Ok(())
    }
}
