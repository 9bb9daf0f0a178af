//! Chessmind CLI - Chess between humans and language-model agents
//!
//! Usage:
//!   chessmind play [--color black]      - Play against an agent
//!   chessmind watch                     - Watch two agents play
//!   chessmind init [dir]                - Write a starter chessmind.yaml
//!   chessmind games list                - List saved games
//!   chessmind games show <game>         - Print a saved game
//!   chessmind memory show <game> <who>  - Print an agent's notes
//!   chessmind eval <fen>                - Evaluate a position

use clap::{Parser, Subcommand};
use cli::commands::{
    EvalCommand, GamesCommand, InitCommand, MemoryCommand, PlayCommand, WatchCommand,
};
use cli::session::GlobalArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chessmind")]
#[command(about = "Chessmind - Chess between humans and language-model agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against an agent
    Play(PlayCommand),
    /// Watch two agents play each other
    Watch(WatchCommand),
    /// Write a starter configuration file
    Init(InitCommand),
    /// Browse saved games
    Games(GamesCommand),
    /// Inspect agent memory
    Memory(MemoryCommand),
    /// Evaluate a position
    Eval(EvalCommand),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging; the board owns stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(cmd) => cmd.run(&cli.global),
        Commands::Watch(cmd) => cmd.run(&cli.global),
        Commands::Init(cmd) => cmd.run(),
        Commands::Games(cmd) => cmd.run(&cli.global),
        Commands::Memory(cmd) => cmd.run(&cli.global),
        Commands::Eval(cmd) => cmd.run(),
    }
}
