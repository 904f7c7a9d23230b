use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const NUM_GAMES: usize = 5;
pub const SCORES_PER_GAME: usize = 5;
pub const MAX_NAME_LEN: usize = 12;

pub const GAME_NAMES: [&str; NUM_GAMES] = ["Tetris", "Snake", "Doodle Jump", "Digger", "Xonix"];
pub const GAME_KEYS: [&str; NUM_GAMES] = ["tetris", "snake", "doodle", "digger", "xonix"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

fn default_volume() -> u8 {
    70
}

/// On-disk profile document. Unknown or corrupt content is replaced with
/// defaults rather than surfaced.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Profile {
    #[serde(default)]
    player: Option<String>,
    #[serde(default = "default_volume")]
    volume: u8,
    #[serde(default)]
    leaderboards: BTreeMap<String, Vec<ScoreEntry>>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            player: None,
            volume: default_volume(),
            leaderboards: BTreeMap::new(),
        }
    }
}

pub struct Storage {
    profile: Profile,
    path: PathBuf,
    /// Which games have had their score submitted this session, so a
    /// finished game is only recorded once.
    submitted: [bool; NUM_GAMES],
}

impl Storage {
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from an explicit path (tests point this at a scratch file).
    pub fn load_from(path: PathBuf) -> Self {
        let profile = fs::read(&path)
            .ok()
            .and_then(|data| serde_json::from_slice::<Profile>(&data).ok())
            .unwrap_or_default();
        Self {
            profile,
            path,
            submitted: [false; NUM_GAMES],
        }
    }

    fn default_path() -> PathBuf {
        // Store next to the executable
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join("retrocade.json");
            }
        }
        PathBuf::from("retrocade.json")
    }

    fn write_file(&self) {
        match serde_json::to_vec_pretty(&self.profile) {
            Ok(data) => {
                if let Err(err) = fs::write(&self.path, data) {
                    log::warn!("failed to write profile {}: {err}", self.path.display());
                }
            }
            Err(err) => log::warn!("failed to encode profile: {err}"),
        }
    }

    pub fn player(&self) -> Option<&str> {
        self.profile.player.as_deref()
    }

    pub fn set_player(&mut self, name: &str) {
        let name: String = name.chars().take(MAX_NAME_LEN).collect();
        self.profile.player = Some(name);
        self.write_file();
    }

    pub fn clear_player(&mut self) {
        self.profile.player = None;
        self.write_file();
    }

    pub fn volume(&self) -> u8 {
        self.profile.volume
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.profile.volume = volume.min(100);
        self.write_file();
    }

    /// Check if a score would make the top list (without inserting it)
    pub fn qualifies(&self, game_idx: usize, score: u32) -> bool {
        if game_idx >= NUM_GAMES || score == 0 {
            return false;
        }
        let board = self.profile.leaderboards.get(GAME_KEYS[game_idx]);
        match board {
            Some(entries) if entries.len() >= SCORES_PER_GAME => {
                entries.iter().any(|e| score > e.score)
            }
            _ => true,
        }
    }

    /// Submit a score. Returns true if it entered the top list. Ties keep
    /// the older entry ahead.
    pub fn submit(&mut self, game_idx: usize, name: &str, score: u32) -> bool {
        if game_idx >= NUM_GAMES || score == 0 {
            return false;
        }
        let name: String = name.chars().take(MAX_NAME_LEN).collect();
        let board = self
            .profile
            .leaderboards
            .entry(GAME_KEYS[game_idx].to_string())
            .or_default();

        let pos = board
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(board.len());
        if pos >= SCORES_PER_GAME {
            return false;
        }
        board.insert(pos, ScoreEntry { name, score });
        board.truncate(SCORES_PER_GAME);
        self.write_file();
        true
    }

    /// Top entries for a game, best first.
    pub fn top_scores(&self, game_idx: usize) -> Vec<ScoreEntry> {
        if game_idx >= NUM_GAMES {
            return Vec::new();
        }
        self.profile
            .leaderboards
            .get(GAME_KEYS[game_idx])
            .cloned()
            .unwrap_or_default()
    }

    pub fn was_submitted(&self, game_idx: usize) -> bool {
        game_idx < NUM_GAMES && self.submitted[game_idx]
    }

    pub fn mark_submitted(&mut self, game_idx: usize) {
        if game_idx < NUM_GAMES {
            self.submitted[game_idx] = true;
        }
    }

    pub fn clear_submitted(&mut self, game_idx: usize) {
        if game_idx < NUM_GAMES {
            self.submitted[game_idx] = false;
        }
    }
}
