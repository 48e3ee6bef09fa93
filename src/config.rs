/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Gameplay constants (fall speed, scoring) are not configurable; only the
/// host side is: frame pacing, preview, audio, seeding and pad buttons.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub audio: AudioConfig,
    pub gamepad: GamepadConfig,
    /// Fixed seed for the kind generator; `None` seeds from the OS.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub frame_ms: u64,
    pub show_next: bool,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub muted: bool,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    /// Button name → action name, exactly as written in the file.
    /// Resolution (and skipping of unknown names) happens in `ui::gamepad`.
    pub buttons: BTreeMap<String, String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_show_next")]
    show_next: bool,
}

#[derive(Deserialize, Debug, Default)]
struct TomlAudio {
    #[serde(default)]
    muted: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_buttons")]
    buttons: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }   // ~60 fps
fn default_show_next() -> bool { true }

fn default_buttons() -> BTreeMap<String, String> {
    [
        ("A", "rotate"),
        ("B", "rotate"),
        ("X", "hard-drop"),
        ("Y", "hard-drop"),
        ("Start", "pause"),
        ("Select", "quit"),
    ]
    .into_iter()
    .map(|(b, a)| (b.to_string(), a.to_string()))
    .collect()
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            frame_ms: default_frame_ms(),
            show_next: default_show_next(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            buttons: default_buttons(),
        }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            display: DisplayConfig {
                frame_ms: t.display.frame_ms.max(1),
                show_next: t.display.show_next,
            },
            audio: AudioConfig {
                muted: t.audio.muted,
            },
            gamepad: GamepadConfig {
                buttons: t.gamepad.buttons,
            },
            seed: t.general.seed,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.config/blockfall`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        load_toml(&candidate_dirs())
    }

    /// Parse config text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Into::into)
    }
}

/// Candidate directories to search: exe dir + CWD + user config (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(&home).join(".config/blockfall");
        if user.is_dir() && !dirs.iter().any(|d| d == &user) {
            dirs.push(user);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> GameConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match GameConfig::from_toml_str(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default().into();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.display.frame_ms, 16);
        assert!(cfg.display.show_next);
        assert!(!cfg.audio.muted);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.gamepad.buttons.get("Start").map(String::as_str), Some("pause"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[display]\nshow_next = false\n\n[general]\nseed = 99\n",
        )
        .unwrap();
        assert!(!cfg.display.show_next);
        assert_eq!(cfg.display.frame_ms, 16);
        assert_eq!(cfg.seed, Some(99));
    }

    #[test]
    fn gamepad_table_replaces_defaults() {
        let cfg = GameConfig::from_toml_str("[gamepad.buttons]\nR1 = \"hard-drop\"\n").unwrap();
        assert_eq!(cfg.gamepad.buttons.len(), 1);
        assert_eq!(cfg.gamepad.buttons["R1"], "hard-drop");
    }

    #[test]
    fn zero_frame_period_is_clamped() {
        let cfg = GameConfig::from_toml_str("[display]\nframe_ms = 0\n").unwrap();
        assert_eq!(cfg.display.frame_ms, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(GameConfig::from_toml_str("[display\nframe_ms = ").is_err());
    }
}
