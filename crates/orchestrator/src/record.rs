//! Game records - The persisted form of a finished game
//!
//! Records are written as PGN with a few extra headers (models, mode, game
//! id) so the file alone says who played and how.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{GameId, GameMode};
use thiserror::Error;
use tracing::info;

use crate::player::PlayerProfile;
use crate::session::{GameResult, GameSession};

const HUMAN_MODEL: &str = "human";
const MOVETEXT_WIDTH: usize = 80;

/// Errors raised by record sinks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Record I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid PGN: {reason}")]
    Parse { reason: String },

    #[error("Invalid file pattern: {0}")]
    Pattern(String),
}

fn io_error(path: &Path, err: std::io::Error) -> RecordError {
    RecordError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// A finished game, ready to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub event: String,
    pub site: String,
    /// PGN date, `YYYY.MM.DD`
    pub date: String,
    pub white: String,
    pub black: String,
    pub white_model: String,
    pub black_model: String,
    /// `1-0`, `0-1` or `1/2-1/2`
    pub result: String,
    pub movetext: String,
    pub mode: GameMode,
    pub game_id: GameId,
    pub termination: String,
    /// Start position when it is not the standard one
    pub start_fen: Option<String>,
}

impl GameRecord {
    /// Build the record for a finished session
    pub fn new(
        event: impl Into<String>,
        session: &GameSession,
        result: &GameResult,
        white: &PlayerProfile,
        black: &PlayerProfile,
    ) -> Self {
        let model = |p: &PlayerProfile| p.model.clone().unwrap_or_else(|| HUMAN_MODEL.to_string());

        Self {
            event: event.into(),
            site: "Chessmind".to_string(),
            date: chrono::Local::now().format("%Y.%m.%d").to_string(),
            white: white.name.clone(),
            black: black.name.clone(),
            white_model: model(white),
            black_model: model(black),
            result: result.result_string().to_string(),
            movetext: session.movetext(),
            mode: GameMode::from_kinds(white.kind, black.kind),
            game_id: session.id().clone(),
            termination: result.reason.description().to_string(),
            start_fen: session.custom_start().map(str::to_string),
        }
    }

    /// Header tag pairs in output order
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Event", self.event.clone()),
            ("Site", self.site.clone()),
            ("Date", self.date.clone()),
            ("Round", "-".to_string()),
            ("White", self.white.clone()),
            ("Black", self.black.clone()),
            ("Result", self.result.clone()),
            ("WhiteModel", self.white_model.clone()),
            ("BlackModel", self.black_model.clone()),
            ("Mode", self.mode.to_string()),
            ("GameId", self.game_id.to_string()),
            ("Termination", self.termination.clone()),
        ];
        if let Some(fen) = &self.start_fen {
            headers.push(("SetUp", "1".to_string()));
            headers.push(("FEN", fen.clone()));
        }
        headers
    }

    /// Render as PGN
    pub fn to_pgn(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.headers() {
            out.push_str(&format!("[{} \"{}\"]\n", name, escape(&value)));
        }
        out.push('\n');

        let mut line = String::new();
        for token in self.movetext.split_whitespace().chain([self.result.as_str()]) {
            if !line.is_empty() && line.len() + 1 + token.len() > MOVETEXT_WIDTH {
                out.push_str(&line);
                out.push('\n');
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(token);
        }
        out.push_str(&line);
        out.push('\n');
        out
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A PGN file read back from disk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PgnDocument {
    pub headers: Vec<(String, String)>,
    pub movetext: String,
}

impl PgnDocument {
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let mut doc = PgnDocument::default();
        let mut movetext = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(inner) = line.strip_prefix('[') {
                let inner = inner.strip_suffix(']').ok_or_else(|| RecordError::Parse {
                    reason: format!("unterminated header: {line}"),
                })?;
                let (name, value) = inner.split_once(' ').ok_or_else(|| RecordError::Parse {
                    reason: format!("header without value: {line}"),
                })?;
                let value = value.trim();
                let value = value.strip_prefix('"').unwrap_or(value);
                let value = value.strip_suffix('"').unwrap_or(value);
                doc.headers.push((
                    name.to_string(),
                    value.replace("\\\"", "\"").replace("\\\\", "\\"),
                ));
            } else {
                movetext.push(line);
            }
        }

        if doc.headers.is_empty() {
            return Err(RecordError::Parse {
                reason: "no headers".to_string(),
            });
        }
        doc.movetext = movetext.join(" ");
        Ok(doc)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Record Sink Trait
///
/// Receives each finished game exactly once.
pub trait RecordSink: Send {
    fn save(&mut self, record: &GameRecord) -> Result<(), RecordError>;
}

/// Writes one PGN file per game
#[derive(Debug, Clone)]
pub struct PgnFileSink {
    dir: PathBuf,
}

impl PgnFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<YYYY-MM-DD>_<game-id>.pgn`
    pub fn path_for(&self, record: &GameRecord) -> PathBuf {
        self.dir
            .join(format!("{}_{}.pgn", record.date.replace('.', "-"), record.game_id))
    }

    /// Stored games, oldest first
    pub fn list(&self) -> Result<Vec<PathBuf>, RecordError> {
        let pattern = self.dir.join("*.pgn");
        let pattern = pattern.to_string_lossy();
        let mut paths: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| RecordError::Pattern(e.to_string()))?
            .filter_map(|entry| entry.ok())
            .collect();
        paths.sort();
        Ok(paths)
    }

    pub fn load(path: &Path) -> Result<PgnDocument, RecordError> {
        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        PgnDocument::parse(&text)
    }
}

impl RecordSink for PgnFileSink {
    fn save(&mut self, record: &GameRecord) -> Result<(), RecordError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let path = self.path_for(record);
        let tmp_path = path.with_extension("pgn.tmp");
        {
            let mut file = fs::File::create(&tmp_path).map_err(|e| io_error(&tmp_path, e))?;
            file.write_all(record.to_pgn().as_bytes())
                .map_err(|e| io_error(&tmp_path, e))?;
            file.sync_all().map_err(|e| io_error(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, &path).map_err(|e| io_error(&path, e))?;

        info!(game_id = %record.game_id, path = %path.display(), "Game record saved");
        Ok(())
    }
}
