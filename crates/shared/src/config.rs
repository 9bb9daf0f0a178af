//! Configuration types for Chessmind

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::chess::Side;
use crate::error::InvalidConfigError;
use crate::ids::PlayerId;

const DEFAULT_EVENT: &str = "Chessmind Casual Game";
const DEFAULT_DATA_DIR: &str = ".chessmind";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Who controls a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    #[default]
    Agent,
}

/// Which strategist backend drives an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategistProvider {
    /// Offline one-ply material heuristic
    #[default]
    Heuristic,
    /// Any OpenAI-compatible chat-completions endpoint
    #[serde(rename = "openai")]
    OpenAi,
}

impl fmt::Display for StrategistProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategistProvider::Heuristic => f.write_str("heuristic"),
            StrategistProvider::OpenAi => f.write_str("openai"),
        }
    }
}

/// Configuration for a strategist behind an agent player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategistConfig {
    #[serde(default)]
    pub provider: StrategistProvider,

    /// Model name sent to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Override for the provider endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Request timeout enforced by the strategist itself
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl StrategistConfig {
    /// Offline heuristic strategist
    pub fn heuristic() -> Self {
        Self {
            provider: StrategistProvider::Heuristic,
            model: None,
            base_url: None,
            api_key_env: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: None,
        }
    }

    /// OpenAI-compatible strategist with the given model
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            provider: StrategistProvider::OpenAi,
            model: Some(model.into()),
            ..Self::heuristic()
        }
    }

    /// Model/strategy identifier recorded in game records
    pub fn identifier(&self) -> String {
        match (&self.provider, &self.model) {
            (_, Some(model)) => model.clone(),
            (provider, None) => provider.to_string(),
        }
    }
}

impl Default for StrategistConfig {
    fn default() -> Self {
        Self::heuristic()
    }
}

/// Configuration for one side of the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Display name
    pub name: String,

    #[serde(default)]
    pub kind: PlayerKind,

    /// Required for agents, ignored for humans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategist: Option<StrategistConfig>,
}

impl PlayerConfig {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Human,
            strategist: None,
        }
    }

    pub fn agent(name: impl Into<String>, strategist: StrategistConfig) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Agent,
            strategist: Some(strategist),
        }
    }

    pub fn is_human(&self) -> bool {
        self.kind == PlayerKind::Human
    }
}

/// How the two sides are controlled, recorded as a tag on the game record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    HumanVsAgent,
    AgentVsAgent,
    HumanVsHuman,
}

impl GameMode {
    /// Mode implied by who controls each side
    pub fn from_kinds(white: PlayerKind, black: PlayerKind) -> Self {
        match (white, black) {
            (PlayerKind::Human, PlayerKind::Human) => GameMode::HumanVsHuman,
            (PlayerKind::Agent, PlayerKind::Agent) => GameMode::AgentVsAgent,
            _ => GameMode::HumanVsAgent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::HumanVsAgent => "human-vs-agent",
            GameMode::AgentVsAgent => "agent-vs-agent",
            GameMode::HumanVsHuman => "human-vs-human",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level game configuration (chessmind.yaml / chessmind.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// PGN event label
    #[serde(default = "default_event")]
    pub event: String,

    /// Seed for fallback moves and the heuristic strategist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Root for memory, saved games and diagnostics
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Optional FEN to start from instead of the initial position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_fen: Option<String>,

    pub white: PlayerConfig,
    pub black: PlayerConfig,
}

impl GameConfig {
    /// Two heuristic agents
    pub fn agent_vs_agent() -> Self {
        Self {
            event: default_event(),
            seed: None,
            data_dir: default_data_dir(),
            start_fen: None,
            white: PlayerConfig::agent("White Agent", StrategistConfig::heuristic()),
            black: PlayerConfig::agent("Black Agent", StrategistConfig::heuristic()),
        }
    }

    /// A human on `human_side` against a heuristic agent
    pub fn human_vs_agent(human_side: Side) -> Self {
        let mut config = Self::agent_vs_agent();
        *config.player_mut(human_side) = PlayerConfig::human("Human");
        config
    }

    /// Load configuration from a YAML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize as YAML (used by `chessmind init`)
    pub fn to_yaml(&self) -> crate::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject configurations that cannot produce a playable session
    pub fn validate(&self) -> std::result::Result<(), InvalidConfigError> {
        for side in Side::ALL {
            let player = self.player(side);

            if player.name.trim().is_empty() {
                return Err(InvalidConfigError {
                    field: format!("{side}.name"),
                    reason: "player name must not be empty".to_string(),
                });
            }

            if player.kind == PlayerKind::Agent {
                let strategist = player.strategist.as_ref().ok_or_else(|| InvalidConfigError {
                    field: format!("{side}.strategist"),
                    reason: "agent players need a strategist".to_string(),
                })?;

                if strategist.provider == StrategistProvider::OpenAi && strategist.model.is_none() {
                    return Err(InvalidConfigError {
                        field: format!("{side}.strategist.model"),
                        reason: "the openai provider needs a model name".to_string(),
                    });
                }
            }
        }

        // Memory is keyed by the id derived from the name
        if !self.white.is_human()
            && !self.black.is_human()
            && PlayerId::from_name(&self.white.name) == PlayerId::from_name(&self.black.name)
        {
            return Err(InvalidConfigError {
                field: "black.name".to_string(),
                reason: format!(
                    "both agents map to player id '{}', their memories would collide",
                    PlayerId::from_name(&self.black.name)
                ),
            });
        }

        Ok(())
    }

    pub fn player(&self, side: Side) -> &PlayerConfig {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerConfig {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    pub fn mode(&self) -> GameMode {
        GameMode::from_kinds(self.white.kind, self.black.kind)
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.data_dir.join("memory")
    }

    pub fn games_dir(&self) -> PathBuf {
        self.data_dir.join("games")
    }

    pub fn diagnostics_path(&self) -> PathBuf {
        self.data_dir.join("diagnostics.jsonl")
    }
}

fn default_event() -> String {
    DEFAULT_EVENT.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_yaml() {
        let yaml = r#"
event: Friday Blitz
seed: 42
white:
  name: Alice
  kind: human
black:
  name: Gpt Black
  strategist:
    provider: openai
    model: gpt-4o
    apiKeyEnv: OPENAI_API_KEY
"#;

        let config: GameConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.event, "Friday Blitz");
        assert_eq!(config.seed, Some(42));
        assert!(config.white.is_human());
        assert_eq!(config.mode(), GameMode::HumanVsAgent);

        let strategist = config.black.strategist.as_ref().unwrap();
        assert_eq!(strategist.provider, StrategistProvider::OpenAi);
        assert_eq!(strategist.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(strategist.identifier(), "gpt-4o");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_json() {
        let json = r#"{
            "white": { "name": "A", "strategist": { "provider": "heuristic" } },
            "black": { "name": "B", "strategist": { "provider": "heuristic" } }
        }"#;

        let config: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mode(), GameMode::AgentVsAgent);
        assert_eq!(config.data_dir, PathBuf::from(".chessmind"));
        assert_eq!(config.white.strategist.as_ref().unwrap().identifier(), "heuristic");
    }

    #[test]
    fn test_validate_agent_without_strategist() {
        let mut config = GameConfig::agent_vs_agent();
        config.black.strategist = None;

        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "black.strategist");
    }

    #[test]
    fn test_validate_openai_without_model() {
        let mut config = GameConfig::agent_vs_agent();
        config.white.strategist = Some(StrategistConfig {
            provider: StrategistProvider::OpenAi,
            ..StrategistConfig::heuristic()
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_validate_duplicate_agent_names() {
        let mut config = GameConfig::agent_vs_agent();
        config.black.name = config.white.name.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_agent_names_with_the_same_id() {
        let mut config = GameConfig::agent_vs_agent();
        config.white.name = "Deep Blue".to_string();
        config.black.name = "deep-blue".to_string();

        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "black.name");
        assert!(err.reason.contains("deep-blue"));
    }

    #[test]
    fn test_validate_human_may_share_agent_name() {
        let mut config = GameConfig::human_vs_agent(Side::Black);
        config.white.name = "Magnus".to_string();
        config.black.name = "Magnus".to_string();
        assert!(config.validate().is_ok());

        let mut config = GameConfig::human_vs_agent(Side::White);
        config.black.name = config.white.name.clone();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_human_vs_agent_mode() {
        let config = GameConfig::human_vs_agent(Side::Black);
        assert!(config.black.is_human());
        assert!(!config.white.is_human());
        assert_eq!(config.mode().to_string(), "human-vs-agent");
    }

    #[test]
    fn test_from_file_round_trips_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chessmind.yaml");

        let config = GameConfig::human_vs_agent(Side::White);
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = GameConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_data_paths() {
        let mut config = GameConfig::agent_vs_agent();
        config.data_dir = PathBuf::from("/tmp/cm");
        assert_eq!(config.memory_dir(), PathBuf::from("/tmp/cm/memory"));
        assert_eq!(config.games_dir(), PathBuf::from("/tmp/cm/games"));
        assert_eq!(config.diagnostics_path(), PathBuf::from("/tmp/cm/diagnostics.jsonl"));
    }
}
