//! DiagnosticLog - Durable log of recovered failures
//!
//! Keeps the most recent entries in memory and, when a file is configured,
//! appends every entry to it as one JSON object per line.

use std::collections::{BTreeMap, VecDeque};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{GameId, PlayerId, Side};
use tracing::warn;

/// Diagnostic log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEntry {
    pub timestamp: String,
    pub event_type: DiagnosticEventType,
    pub game_id: String,
    pub side: Option<Side>,
    pub player_id: Option<String>,
    /// Position at the time of the event
    pub fen: Option<String>,
    pub detail: String,
    pub metadata: Option<serde_json::Value>,
}

impl DiagnosticEntry {
    pub fn new(event_type: DiagnosticEventType, game: &GameId, detail: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_type,
            game_id: game.to_string(),
            side: None,
            player_id: None,
            fen: None,
            detail: detail.into(),
            metadata: None,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_player(mut self, player: &PlayerId) -> Self {
        self.player_id = Some(player.to_string());
        self
    }

    pub fn with_fen(mut self, fen: impl Into<String>) -> Self {
        self.fen = Some(fen.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Types of diagnostic events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticEventType {
    StrategistFailure,
    IllegalMove,
    UnparseableOutput,
    MemoryReadFailure,
    MemoryWriteFailure,
    SessionCancelled,
}

impl DiagnosticEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrategistFailure => "strategist_failure",
            Self::IllegalMove => "illegal_move",
            Self::UnparseableOutput => "unparseable_output",
            Self::MemoryReadFailure => "memory_read_failure",
            Self::MemoryWriteFailure => "memory_write_failure",
            Self::SessionCancelled => "session_cancelled",
        }
    }
}

/// Diagnostic log
#[derive(Debug)]
pub struct DiagnosticLog {
    entries: VecDeque<DiagnosticEntry>,
    max_entries: usize,
    file: Option<PathBuf>,
}

impl DiagnosticLog {
    /// Create an in-memory log
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1024)),
            max_entries,
            file: None,
        }
    }

    /// Also append every entry to a JSON-lines file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Log a diagnostic entry
    ///
    /// A failing file append is reported through tracing and never
    /// propagated: diagnostics must not take the game down.
    pub fn log(&mut self, entry: DiagnosticEntry) {
        if let Some(path) = &self.file {
            if let Err(e) = append_line(path, &entry) {
                warn!(path = %path.display(), error = %e, "Failed to append diagnostic entry");
            }
        }

        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<&DiagnosticEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Get recent entries of one type, newest first
    pub fn get_recent_of(&self, event_type: DiagnosticEventType, limit: usize) -> Vec<&DiagnosticEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.event_type == event_type)
            .take(limit)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> DiagnosticStats {
        let mut by_type = BTreeMap::new();
        for entry in &self.entries {
            *by_type.entry(entry.event_type).or_insert(0) += 1;
        }

        DiagnosticStats {
            total_entries: self.entries.len(),
            by_type,
        }
    }

    /// Read back a JSON-lines diagnostics file
    ///
    /// Lines that fail to parse are skipped.
    pub fn read_file(path: &Path) -> io::Result<Vec<DiagnosticEntry>> {
        let file = fs::File::open(path)?;
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "Skipping malformed diagnostic line"),
            }
        }
        Ok(entries)
    }
}

fn append_line(path: &Path, entry: &DiagnosticEntry) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let line = serde_json::to_string(entry).map_err(io::Error::other)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

/// Diagnostic statistics
#[derive(Debug, Clone, Default)]
pub struct DiagnosticStats {
    pub total_entries: usize,
    pub by_type: BTreeMap<DiagnosticEventType, usize>,
}

impl DiagnosticStats {
    pub fn count(&self, event_type: DiagnosticEventType) -> usize {
        self.by_type.get(&event_type).copied().unwrap_or(0)
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(10000)
    }
}
