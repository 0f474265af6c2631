/// Static configuration, provided once at construction
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// GM kit notes for tracks 0..6, top row down: cowbell, toms, hi-hat, snare, kick
pub const DEFAULT_NOTES: [u8; 7] = [56, 50, 47, 45, 42, 38, 35];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Track index -> MIDI note
    pub notes: Vec<u8>,
    /// Zero-based MIDI channel (9 is the GM percussion channel)
    pub channel: u8,
    pub velocity: u8,
    pub page_count: usize,
    pub step_period_ms: u64,
    pub step_increment_ms: u64,
    /// The step period never reaches or goes below this.
    pub min_step_period_ms: u64,
    /// Polling interval while stopped
    pub idle_interval_ms: u64,
    /// Defaults to the first column after the page selectors.
    pub clear_column: Option<usize>,
    /// Below `on_level` so the moving marker reads apart from lit steps
    pub marker_level: u8,
    pub on_level: u8,

    // Binary only
    pub midi_port: Option<String>,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes: DEFAULT_NOTES.to_vec(),
            channel: 9,
            velocity: 64,
            page_count: 4,
            step_period_ms: 200,
            step_increment_ms: 50,
            min_step_period_ms: 1,
            idle_interval_ms: 200,
            clear_column: None,
            marker_level: 8,
            on_level: 15,
            midi_port: None,
            grid_width: 8,
            grid_height: 8,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.channel > 15 {
            bail!("channel {} out of range 0-15", self.channel);
        }
        if self.velocity > 127 {
            bail!("velocity {} out of range 0-127", self.velocity);
        }
        if let Some(note) = self.notes.iter().find(|&&n| n > 127) {
            bail!("note {} out of range 0-127", note);
        }
        if self.page_count == 0 {
            bail!("page_count must be at least 1");
        }
        if self.step_increment_ms == 0 {
            bail!("step_increment_ms must be positive");
        }
        if self.step_period_ms <= self.min_step_period_ms {
            bail!(
                "step_period_ms ({}) must be above min_step_period_ms ({})",
                self.step_period_ms,
                self.min_step_period_ms
            );
        }
        if self.idle_interval_ms == 0 {
            bail!("idle_interval_ms must be positive");
        }
        Ok(())
    }

    pub fn step_period(&self) -> Duration {
        Duration::from_millis(self.step_period_ms)
    }

    pub fn step_increment(&self) -> Duration {
        Duration::from_millis(self.step_increment_ms)
    }

    pub fn min_step_period(&self) -> Duration {
        Duration::from_millis(self.min_step_period_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn clear_column(&self) -> usize {
        self.clear_column.unwrap_or(self.page_count)
    }

    /// Note for a track, if the table covers it
    pub fn note_for(&self, track: usize) -> Option<u8> {
        self.notes.get(track).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clear_column(), 4);
        assert_eq!(config.step_period(), Duration::from_millis(200));
        assert!(config.marker_level < config.on_level);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "page_count": 2 }"#).unwrap();
        assert_eq!(config.page_count, 2);
        assert_eq!(config.channel, 9);
        assert_eq!(config.clear_column(), 2);
    }

    #[test]
    fn test_validate_rejects_period_at_floor() {
        let config = Config {
            step_period_ms: 1,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_channel_and_note() {
        let config = Config {
            channel: 16,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            notes: vec![60, 200],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_note_for_beyond_table() {
        let config = Config::default();
        assert_eq!(config.note_for(3), Some(45));
        assert_eq!(config.note_for(7), None);
    }
}
