//! Runtime settings and the stored player name
//!
//! Settings are a JSON file; any read or parse failure falls back to the
//! defaults. The player name is a one-line text file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Name used when none has been stored
pub const DEFAULT_PLAYER_NAME: &str = "Player";
/// Longest name kept
pub const MAX_PLAYER_NAME_LEN: usize = 13;

/// Game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub arena_width: i32,
    pub arena_height: i32,

    // === Run ===
    /// Fixed run seed; random when absent
    pub seed: Option<u64>,

    // === Storage ===
    pub highscore_path: PathBuf,
    pub player_name_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            seed: None,
            highscore_path: PathBuf::from("highscores.bin"),
            player_name_path: PathBuf::from("player_name.txt"),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings {}: {}", path.display(), e),
            },
            Err(e) => log::info!("No settings at {} ({}), using defaults", path.display(), e),
        }
        Self::default()
    }

    /// Save settings as JSON; failures are logged
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings: {}", e),
            },
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }

    /// Seed for the next run
    pub fn run_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Trim and cap a name; empty input becomes the default
pub fn sanitize_player_name(raw: &str) -> String {
    let name: String = raw.trim().chars().take(MAX_PLAYER_NAME_LEN).collect();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name
    }
}

/// Read the stored player name
pub fn load_player_name(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(raw) => sanitize_player_name(&raw),
        Err(_) => DEFAULT_PLAYER_NAME.to_string(),
    }
}

/// Store the player name; best effort
pub fn save_player_name(path: &Path, name: &str) {
    if let Err(e) = fs::write(path, sanitize_player_name(name)) {
        log::warn!("Could not save player name: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("space-rogues-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = temp_dir("settings");
        let path = dir.join("settings.json");
        let settings = Settings {
            seed: Some(42),
            arena_width: 800,
            ..Default::default()
        };
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
        assert_eq!(Settings::load(&path).run_seed(), 42);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_settings_fallback() {
        let dir = temp_dir("settings-bad");
        let path = dir.join("settings.json");
        assert_eq!(Settings::load(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());

        // Missing fields take defaults
        fs::write(&path, r#"{ "seed": 7 }"#).unwrap();
        let partial = Settings::load(&path);
        assert_eq!(partial.seed, Some(7));
        assert_eq!(partial.arena_width, ARENA_WIDTH);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_player_name() {
        assert_eq!(sanitize_player_name("  ada \n"), "ada");
        assert_eq!(sanitize_player_name(""), DEFAULT_PLAYER_NAME);
        assert_eq!(sanitize_player_name("abcdefghijklmnopq"), "abcdefghijklm");

        let dir = temp_dir("name");
        let path = dir.join("name.txt");
        assert_eq!(load_player_name(&path), DEFAULT_PLAYER_NAME);
        save_player_name(&path, "Grace Hopper");
        assert_eq!(load_player_name(&path), "Grace Hopper");
        fs::remove_dir_all(&dir).unwrap();
    }
}
