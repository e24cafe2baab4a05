// Loaded on startup; lives next to the log file so both are easy to find.
// Only knobs live here, never which files were loaded or where playback was.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DUOTRACK_DIR: &str = ".duotrack";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "duotrack.log";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_ms: u64,
    pub ui_tick_ms: u64,
    pub default_volume: f32, // 0.0 - 1.0, where both sliders start
    pub frames_per_buffer: Option<u32>, // None = whatever the device likes
    pub waveform_columns: usize,
    pub volume_step: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            ui_tick_ms: 16,
            default_volume: 0.7,
            frames_per_buffer: Some(1024),
            waveform_columns: 512,
            volume_step: 0.05,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn ui_tick(&self) -> Duration {
        Duration::from_millis(self.ui_tick_ms.max(1))
    }
}

// <dir>/.duotrack
pub fn settings_dir(dir: &Path) -> PathBuf {
    dir.join(DUOTRACK_DIR)
}

pub fn log_file_path(dir: &Path) -> PathBuf {
    settings_dir(dir).join(LOG_FILE)
}

fn settings_file_path(dir: &Path) -> PathBuf {
    settings_dir(dir).join(SETTINGS_FILE)
}

pub fn load_settings(dir: &Path) -> Option<Settings> {
    let path = settings_file_path(dir);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(e) => {
            log::warn!("ignoring unreadable {}: {e}", path.display());
            None
        }
    }
}

// Write the settings to disk, making the directory if it doesn't exist already
pub fn save_settings(dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let path = settings_file_path(dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// first run seeds the file so there's something to edit
pub fn load_or_seed(dir: &Path) -> Settings {
    if let Some(settings) = load_settings(dir) {
        return settings;
    }
    let settings = Settings::default();
    if let Err(e) = save_settings(dir, &settings) {
        log::warn!("could not write default settings: {e:#}");
    }
    settings
}
