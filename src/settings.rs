//! Settings loaded from TOML
//!
//! Read from ~/.config/fevertris/settings.toml (or platform equivalent).
//! The file is optional and never written by the game.

use crate::mode::{Rules, Variant, BASE_DELAY, SOFT_DROP_DIVISOR};
use crate::randomizer::RandomizerKind;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Game settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub keys: KeyBindings,
    pub visual: VisualSettings,
    pub gameplay: GameplaySettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub hold: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Visual settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Show where the active piece would land
    pub show_landing: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Gameplay settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub variant: Variant,
    /// Gravity interval in milliseconds
    pub base_delay_ms: u64,
    pub soft_drop_divisor: u32,
    /// Overrides the variant's randomizer
    pub randomizer: Option<RandomizerKind>,
    /// Fixed seed for reproducible games
    pub seed: Option<u64>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            soft_drop: vec!["Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            rotate: vec!["Up".to_string(), "x".to_string()],
            hold: vec!["c".to_string()],
            restart: vec!["r".to_string(), "Enter".to_string()],
            quit: vec!["q".to_string(), "Esc".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_landing: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            base_delay_ms: BASE_DELAY.as_millis() as u64,
            soft_drop_divisor: SOFT_DROP_DIVISOR,
            randomizer: None,
            seed: None,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "fevertris", "fevertris")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Parse settings from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse settings")
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("Could not determine config directory, using default settings");
            return Self::default();
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => {
                tracing::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };

        match Self::from_toml(&contents).with_context(|| path.display().to_string()) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Session rules for the configured variant
    pub fn rules(&self) -> Rules {
        let mut rules = self.gameplay.variant.rules();
        rules.base_delay = Duration::from_millis(self.gameplay.base_delay_ms.max(1));
        rules.soft_drop_divisor = self.gameplay.soft_drop_divisor.max(1);
        if let Some(randomizer) = self.gameplay.randomizer {
            rules.randomizer = randomizer;
        }
        rules
    }
}

impl VisualSettings {
    /// Get the (block, landing) characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.gameplay.variant, Variant::Fever);
        assert_eq!(settings.rules(), Variant::Fever.rules());
        assert_eq!(settings.keys.rotate, vec!["Up", "x"]);
    }

    #[test]
    fn test_single_key_or_list() {
        let settings = Settings::from_toml(
            r#"
            [keys]
            hold = "Tab"
            rotate = ["w", "Up"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.keys.hold, vec!["Tab"]);
        assert_eq!(settings.keys.rotate, vec!["w", "Up"]);
        // Untouched bindings keep their defaults
        assert_eq!(settings.keys.hard_drop, vec!["Space"]);
    }

    #[test]
    fn test_gameplay_overrides() {
        let settings = Settings::from_toml(
            r#"
            [gameplay]
            variant = "classic"
            base_delay_ms = 500
            soft_drop_divisor = 10
            randomizer = "seven_bag"
            seed = 1234
            "#,
        )
        .unwrap();
        let rules = settings.rules();
        assert_eq!(rules.variant, Variant::Classic);
        assert!(!rules.fever);
        assert_eq!(rules.randomizer, RandomizerKind::SevenBag);
        assert_eq!(rules.base_delay, Duration::from_millis(500));
        assert_eq!(rules.soft_drop_delay(), Duration::from_millis(50));
        assert_eq!(settings.gameplay.seed, Some(1234));
    }

    #[test]
    fn test_bad_variant_is_an_error() {
        let err = Settings::from_toml("[gameplay]\nvariant = \"tetris99\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse settings"));
    }

    #[test]
    fn test_block_chars() {
        let mut visual = VisualSettings::default();
        assert_eq!(visual.block_chars().0, "██");
        visual.block_style = "bracket".to_string();
        assert_eq!(visual.block_chars(), ("[]", ".."));
    }
}
