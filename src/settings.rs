use crate::playback::{DEFAULT_SPEECH_RATE, SPEECH_RATES};
use crate::storage::{JsonFileStore, KeyValueStore};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SETTINGS_STORE_PATH: &str = "settings_store.json";
const SETTINGS_KEY: &str = "settings";

fn default_speech_rate() -> f32 {
    DEFAULT_SPEECH_RATE
}

fn default_auto_continue() -> bool {
    false
}

fn default_practice_store_path() -> String {
    "practice_store.json".to_string()
}

fn default_debug_mode() -> bool {
    false
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReaderSettings {
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,
    #[serde(default = "default_auto_continue")]
    pub auto_continue: bool,
    /// Where practice results are kept, relative to the working directory
    /// unless absolute.
    #[serde(default = "default_practice_store_path")]
    pub practice_store_path: String,
    #[serde(default = "default_debug_mode")]
    pub debug_mode: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        get_default_settings()
    }
}

impl ReaderSettings {
    /// Snaps the speech rate to the closest supported one.
    pub fn normalize(&mut self) {
        if SPEECH_RATES.contains(&self.speech_rate) {
            return;
        }
        let requested = if self.speech_rate.is_finite() {
            self.speech_rate
        } else {
            DEFAULT_SPEECH_RATE
        };
        let nearest = SPEECH_RATES
            .iter()
            .copied()
            .min_by(|a, b| (a - requested).abs().total_cmp(&(b - requested).abs()))
            .unwrap_or(DEFAULT_SPEECH_RATE);
        warn!(
            "Speech rate {} is not supported, using {}",
            self.speech_rate, nearest
        );
        self.speech_rate = nearest;
    }
}

pub fn get_default_settings() -> ReaderSettings {
    ReaderSettings {
        speech_rate: default_speech_rate(),
        auto_continue: default_auto_continue(),
        practice_store_path: default_practice_store_path(),
        debug_mode: default_debug_mode(),
    }
}

/// Reads the settings at `path`, writing defaults there when none are stored
/// or the stored ones cannot be parsed.
pub fn load_or_create_settings(path: &Path) -> Result<ReaderSettings> {
    let mut store = JsonFileStore::open(path)
        .with_context(|| format!("Failed to open settings store {}", path.display()))?;

    let mut settings = match store.get(SETTINGS_KEY)? {
        Some(value) => match serde_json::from_value::<ReaderSettings>(value) {
            Ok(settings) => {
                debug!("Found existing settings: {:?}", settings);
                settings
            }
            Err(e) => {
                warn!("Failed to parse settings: {}", e);
                // Fall back to default settings if parsing fails
                let default_settings = get_default_settings();
                store.set(SETTINGS_KEY, serde_json::to_value(&default_settings)?)?;
                default_settings
            }
        },
        None => {
            let default_settings = get_default_settings();
            store.set(SETTINGS_KEY, serde_json::to_value(&default_settings)?)?;
            default_settings
        }
    };

    settings.normalize();
    Ok(settings)
}

/// Reads the settings at `path` without touching the file. Anything missing
/// or unreadable comes back as defaults.
pub fn get_settings(path: &Path) -> ReaderSettings {
    let stored = JsonFileStore::open(path)
        .and_then(|store| store.get(SETTINGS_KEY))
        .unwrap_or_else(|e| {
            warn!("Failed to read settings: {:#}", e);
            None
        });

    let mut settings = stored
        .and_then(|value| serde_json::from_value::<ReaderSettings>(value).ok())
        .unwrap_or_else(get_default_settings);
    settings.normalize();
    settings
}

pub fn write_settings(path: &Path, settings: ReaderSettings) -> Result<()> {
    let mut store = JsonFileStore::open(path)?;

    let mut normalized = settings;
    normalized.normalize();

    store.set(SETTINGS_KEY, serde_json::to_value(&normalized)?)
}
