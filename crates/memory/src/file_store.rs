//! FileMemoryStore - Transparent Markdown-based memory on disk
//!
//! Layout: `<base>/<game-id>/<player-id>.memory.md`. Writes go through a
//! temporary file and a rename so a crash never leaves half a record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use shared::{GameId, PlayerId};
use tracing::debug;

use crate::record::MemoryRecord;
use crate::store::{MemoryStore, StoreError};

const FILE_SUFFIX: &str = ".memory.md";
const TURN_MARKER: &str = "> Last updated turn: ";

/// Durable memory store
#[derive(Debug, Clone)]
pub struct FileMemoryStore {
    base_dir: PathBuf,
}

impl FileMemoryStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the file path for a player's memory in a game
    pub fn memory_file_path(&self, game: &GameId, player: &PlayerId) -> PathBuf {
        self.base_dir
            .join(game.as_str())
            .join(format!("{}{}", player.as_str(), FILE_SUFFIX))
    }

    fn render(game: &GameId, player: &PlayerId, record: &MemoryRecord) -> String {
        format!(
            "# Memory: {}\n\n> Game: {}\n{}{}\n\n{}",
            player, game, TURN_MARKER, record.last_updated_turn, record.content
        )
    }

    fn parse(text: &str) -> Result<MemoryRecord, String> {
        let start = text
            .find(TURN_MARKER)
            .ok_or_else(|| "missing turn header".to_string())?;
        let rest = &text[start + TURN_MARKER.len()..];
        let (turn, body) = rest.split_once('\n').unwrap_or((rest, ""));

        let turn = turn
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad turn number '{}': {}", turn.trim(), e))?;
        let body = body.strip_prefix('\n').unwrap_or(body);

        Ok(MemoryRecord::new(body, turn))
    }
}

impl Default for FileMemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

impl MemoryStore for FileMemoryStore {
    fn get(&self, game: &GameId, player: &PlayerId) -> Result<Option<MemoryRecord>, StoreError> {
        let path = self.memory_file_path(game, player);

        if !path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let record = Self::parse(&text).map_err(|reason| StoreError::Corrupt {
            path: path.display().to_string(),
            reason,
        })?;
        Ok(Some(record))
    }

    fn put(
        &self,
        game: &GameId,
        player: &PlayerId,
        record: &MemoryRecord,
    ) -> Result<(), StoreError> {
        let path = self.memory_file_path(game, player);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let tmp_path = path.with_extension("md.tmp");
        {
            let mut file = fs::File::create(&tmp_path).map_err(|e| io_error(&tmp_path, e))?;
            file.write_all(Self::render(game, player, record).as_bytes())
                .map_err(|e| io_error(&tmp_path, e))?;
            file.sync_all().map_err(|e| io_error(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, &path).map_err(|e| io_error(&path, e))?;

        debug!(
            game_id = %game,
            player = %player,
            turn = record.last_updated_turn,
            "Memory persisted"
        );
        Ok(())
    }

    fn games_for(&self, player: &PlayerId) -> Result<Vec<GameId>, StoreError> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let file_name = format!("{}{}", player.as_str(), FILE_SUFFIX);
        let mut games = Vec::new();
        for entry in fs::read_dir(&self.base_dir).map_err(|e| io_error(&self.base_dir, e))? {
            let entry = entry.map_err(|e| io_error(&self.base_dir, e))?;
            let path = entry.path();
            if path.is_dir() && path.join(&file_name).exists() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    games.push(GameId::new(name));
                }
            }
        }
        games.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MEMORY_TEMPLATE;

    #[test]
    fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());

        let found = store
            .get(&GameId::new("g-1"), &PlayerId::new("alice"))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let game = GameId::new("g-1");
        let player = PlayerId::new("alice");

        let record = MemoryRecord::new(MEMORY_TEMPLATE, 7);
        store.put(&game, &player, &record).unwrap();

        let loaded = store.get(&game, &player).unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(store.memory_file_path(&game, &player).exists());
        assert!(!store
            .memory_file_path(&game, &player)
            .with_extension("md.tmp")
            .exists());
    }

    #[test]
    fn test_survives_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let game = GameId::new("g-1");
        let player = PlayerId::new("alice");

        FileMemoryStore::new(dir.path())
            .put(&game, &player, &MemoryRecord::new("## Plan\nminority attack", 12))
            .unwrap();

        // Simulates a process restart
        let reopened = FileMemoryStore::new(dir.path());
        let loaded = reopened.get(&game, &player).unwrap().unwrap();
        assert_eq!(loaded.section("Plan"), Some("minority attack"));
        assert_eq!(loaded.last_updated_turn, 12);
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let game = GameId::new("g-1");
        let player = PlayerId::new("alice");

        store.put(&game, &player, &MemoryRecord::new("first", 1)).unwrap();
        store.put(&game, &player, &MemoryRecord::new("second", 3)).unwrap();

        let loaded = store.get(&game, &player).unwrap().unwrap();
        assert_eq!(loaded.content, "second");
        assert_eq!(loaded.last_updated_turn, 3);
    }

    #[test]
    fn test_keyed_per_game() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let player = PlayerId::new("alice");

        store
            .put(&GameId::new("g-1"), &player, &MemoryRecord::new("old game", 40))
            .unwrap();

        assert!(store.get(&GameId::new("g-2"), &player).unwrap().is_none());
        assert_eq!(store.games_for(&player).unwrap(), vec![GameId::new("g-1")]);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let game = GameId::new("g-1");
        let player = PlayerId::new("alice");

        let path = store.memory_file_path(&game, &player);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "no header here").unwrap();

        let err = store.get(&game, &player).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_empty_content_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let game = GameId::new("g");
        let player = PlayerId::new("p");

        store.put(&game, &player, &MemoryRecord::new("", 2)).unwrap();
        let loaded = store.get(&game, &player).unwrap().unwrap();
        assert!(loaded.is_blank());
        assert_eq!(loaded.last_updated_turn, 2);
    }
}
