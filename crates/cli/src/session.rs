//! Session wiring - Turns a `GameConfig` into a running game

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use audit::DiagnosticLog;
use memory::{FileMemoryStore, MemoryStore};
use orchestrator::{
    AgentPlayer, GameSession, HumanPlayer, MoveInput, MoveResolver, Orchestrator, PgnFileSink,
    Player, PresentationSink, SessionEnd,
};
use rules::ShakmatyRules;
use shared::{GameConfig, PlayerConfig, PlayerKind, Side, StrategistConfig, StrategistProvider};
use tracing::info;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "chessmind.yaml";

/// Flags shared by every command
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GlobalArgs {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the configuration file, if any, and apply `--data-dir`
    pub fn load_config(&self) -> anyhow::Result<Option<GameConfig>> {
        let path = match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        let Some(path) = path else {
            return Ok(None);
        };
        let mut config = GameConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(Some(config))
    }

    /// Configuration file, or `fallback` when there is none
    pub fn config_or(&self, fallback: GameConfig) -> anyhow::Result<GameConfig> {
        match self.load_config()? {
            Some(config) => Ok(config),
            None => {
                let mut config = fallback;
                if let Some(dir) = &self.data_dir {
                    config.data_dir = dir.clone();
                }
                Ok(config)
            }
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Put the human on `side` and make sure the other side is an agent
pub fn seat_human(config: &mut GameConfig, side: Side) {
    let seat = config.player_mut(side);
    if !seat.is_human() {
        *seat = PlayerConfig::human("Human");
    }
    let opponent = config.player_mut(side.opposite());
    if opponent.is_human() {
        *opponent = default_agent(side.opposite());
    }
}

/// Replace every human seat with a heuristic agent
pub fn seat_agents(config: &mut GameConfig) {
    for side in Side::ALL {
        let seat = config.player_mut(side);
        if seat.is_human() {
            *seat = default_agent(side);
        }
    }
}

/// Point every agent at an OpenAI-compatible `model`
pub fn override_model(config: &mut GameConfig, model: &str) {
    for side in Side::ALL {
        let seat = config.player_mut(side);
        if seat.kind != PlayerKind::Agent {
            continue;
        }
        let base = seat.strategist.clone().unwrap_or_default();
        seat.strategist = Some(StrategistConfig {
            provider: StrategistProvider::OpenAi,
            model: Some(model.to_string()),
            ..base
        });
    }
}

fn default_agent(side: Side) -> PlayerConfig {
    PlayerConfig::agent(
        format!("{} Agent", capitalize(side.as_str())),
        StrategistConfig::heuristic(),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// Source of input for a human seat
pub type InputFactory<'a> = dyn FnMut(Side) -> Box<dyn MoveInput> + 'a;

/// Everything needed to play one game
pub struct PreparedGame {
    pub orchestrator: Orchestrator,
    pub session: GameSession,
}

/// Build players, stores and sinks for `config`
pub fn prepare(
    config: &GameConfig,
    presenter: Box<dyn PresentationSink>,
    inputs: &mut InputFactory<'_>,
) -> anyhow::Result<PreparedGame> {
    config.validate()?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

    let store: Arc<dyn MemoryStore> = Arc::new(FileMemoryStore::new(config.memory_dir()));
    let white = build_player(config, Side::White, &store, inputs)?;
    let black = build_player(config, Side::Black, &store, inputs)?;

    let rules = match &config.start_fen {
        Some(fen) => ShakmatyRules::from_fen(fen)?,
        None => ShakmatyRules::new(),
    };
    let session = GameSession::new(Box::new(rules));

    let resolver = match config.seed {
        Some(seed) => MoveResolver::seeded(seed),
        None => MoveResolver::new(),
    };

    let orchestrator = Orchestrator::new(white, black)?
        .with_resolver(resolver)
        .with_presenter(presenter)
        .with_record_sink(Box::new(PgnFileSink::new(config.games_dir())))
        .with_diagnostics(DiagnosticLog::default().with_file(config.diagnostics_path()))
        .with_event(config.event.clone());

    Ok(PreparedGame {
        orchestrator,
        session,
    })
}

fn build_player(
    config: &GameConfig,
    side: Side,
    store: &Arc<dyn MemoryStore>,
    inputs: &mut InputFactory<'_>,
) -> anyhow::Result<Box<dyn Player>> {
    let seat = config.player(side);
    match seat.kind {
        PlayerKind::Human => Ok(Box::new(HumanPlayer::new(&seat.name, side, inputs(side)))),
        PlayerKind::Agent => {
            let strategist_config = seat
                .strategist
                .as_ref()
                .ok_or_else(|| anyhow!("{side} agent has no strategist configured"))?;
            // Distinct seeds so two heuristic agents do not mirror each other
            let seed = config.seed.map(|s| s.wrapping_add(side.index() as u64 + 1));
            let strategist = strategist::build_strategist(strategist_config, seed)
                .with_context(|| format!("Failed to set up the {side} strategist"))?;
            Ok(Box::new(AgentPlayer::new(
                &seat.name,
                side,
                strategist,
                store.clone(),
            )))
        }
    }
}

/// Play the prepared game to the end, cancelling on Ctrl-C
pub async fn play(mut game: PreparedGame) -> anyhow::Result<(SessionEnd, GameSession)> {
    let token = game.orchestrator.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    info!(game_id = %game.session.id(), "Starting game");
    let end = game.orchestrator.run(&mut game.session).await;
    ctrl_c.abort();

    Ok((end?, game.session))
}

/// Where a finished game's record was written
pub fn record_path(config: &GameConfig, session: &GameSession) -> Option<PathBuf> {
    let sink = PgnFileSink::new(config.games_dir());
    let suffix = format!("_{}.pgn", session.id());
    sink.list().ok()?.into_iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix))
    })
}

/// Block on a future from synchronous command code
pub fn block_on<F: std::future::Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestrator::{ChannelInput, GameReason, NullPresenter, Winner};

    fn no_input() -> impl FnMut(Side) -> Box<dyn MoveInput> {
        |_| -> Box<dyn MoveInput> { Box::new(ChannelInput::pair().1) }
    }

    #[test]
    fn test_seat_human_swaps_sides() {
        let mut config = GameConfig::human_vs_agent(Side::White);
        seat_human(&mut config, Side::Black);

        assert!(config.black.is_human());
        assert!(!config.white.is_human());
        assert_eq!(config.white.name, "White Agent");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_seat_agents() {
        let mut config = GameConfig::human_vs_agent(Side::Black);
        seat_agents(&mut config);

        assert!(!config.black.is_human());
        assert_eq!(config.black.name, "Black Agent");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_override_model_only_touches_agents() {
        let mut config = GameConfig::human_vs_agent(Side::White);
        override_model(&mut config, "gpt-4o-mini");

        assert!(config.white.strategist.is_none());
        let strategist = config.black.strategist.as_ref().unwrap();
        assert_eq!(strategist.provider, StrategistProvider::OpenAi);
        assert_eq!(strategist.identifier(), "gpt-4o-mini");
    }

    #[test]
    fn test_config_or_applies_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = GlobalArgs {
            config: None,
            data_dir: Some(dir.path().to_path_buf()),
        };

        // No chessmind.yaml is expected in the crate directory
        let config = args.config_or(GameConfig::agent_vs_agent()).unwrap();
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(
            &path,
            r#"{"event":"Club Night","white":{"name":"A","strategist":{}},"black":{"name":"B","strategist":{}}}"#,
        )
        .unwrap();
        let args = GlobalArgs {
            config: Some(path),
            data_dir: None,
        };

        let config = args.load_config().unwrap().unwrap();
        assert_eq!(config.event, "Club Night");
    }

    #[test]
    fn test_prepare_rejects_invalid_config() {
        let mut config = GameConfig::agent_vs_agent();
        config.white.strategist = None;

        let result = prepare(&config, Box::new(NullPresenter), &mut no_input());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_agent_game_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GameConfig::agent_vs_agent();
        config.data_dir = dir.path().to_path_buf();
        config.seed = Some(11);
        // Black to move with Qh4# on the board
        config.start_fen =
            Some("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2".to_string());

        let game = prepare(&config, Box::new(NullPresenter), &mut no_input()).unwrap();
        let (end, session) = play(game).await.unwrap();

        match end {
            SessionEnd::Finished(result) => {
                assert_eq!(result.winner, Winner::Black);
                assert_eq!(result.reason, GameReason::Checkmate);
            }
            other => panic!("unexpected end: {other:?}"),
        }

        let path = record_path(&config, &session).unwrap();
        let pgn = std::fs::read_to_string(path).unwrap();
        assert!(pgn.contains("[FEN \""));
        assert!(pgn.contains("Qh4#"));

        let memory = FileMemoryStore::new(config.memory_dir());
        let notes = memory
            .get(session.id(), &shared::PlayerId::from_name("Black Agent"))
            .unwrap()
            .unwrap();
        assert!(notes.content.contains("## Critical Moments"));
        // Nothing went wrong, so nothing was diagnosed
        assert!(!config.diagnostics_path().exists());
    }

    #[tokio::test]
    async fn test_human_quit_abandons_without_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GameConfig::human_vs_agent(Side::White);
        config.data_dir = dir.path().to_path_buf();

        let mut inputs = |_side: Side| -> Box<dyn MoveInput> {
            let (tx, input) = ChannelInput::pair();
            tx.send(orchestrator::InputEvent::Quit).unwrap();
            Box::new(input)
        };
        let game = prepare(&config, Box::new(NullPresenter), &mut inputs).unwrap();
        let (end, session) = play(game).await.unwrap();

        assert_eq!(end, SessionEnd::Abandoned { plies: 0 });
        assert!(record_path(&config, &session).is_none());
    }
}
