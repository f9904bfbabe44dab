use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::messages::MidiEvent;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },
  #[error("parse config: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("midi_channel must be 0..=15, got {0}")]
  Channel(u8),
  #[error("sample_rate {0} out of range")]
  SampleRate(u32),
  #[error("demo {field} must be positive")]
  Demo { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
  pub enabled: bool,
  pub seconds: f32,
  pub bpm: f32,
}

impl Default for DemoConfig {
  fn default() -> Self { Self { enabled: true, seconds: 16.0, bpm: 110.0 } }
}

/// Host settings. Every field has a default so an empty object is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub sample_rate: u32,
  /// Fixed device buffer size; `None` leaves it to the host.
  pub buffer_frames: Option<u32>,
  /// Zero-based wire channel the engine listens on.
  pub midi_channel: u8,
  pub log_filter: String,
  pub demo: DemoConfig,
  /// Events applied to the engine before the stream starts, e.g. a patch.
  pub startup: Vec<MidiEvent>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      sample_rate: 48_000,
      buffer_frames: None,
      midi_channel: 0,
      log_filter: "info".to_string(),
      demo: DemoConfig::default(),
      startup: Vec::new(),
    }
  }
}

impl EngineConfig {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    Self::from_json(&text)
  }

  pub fn from_json(text: &str) -> Result<Self, ConfigError> {
    let cfg: Self = serde_json::from_str(text)?;
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.midi_channel > 15 { return Err(ConfigError::Channel(self.midi_channel)); }
    if !(8_000..=192_000).contains(&self.sample_rate) { return Err(ConfigError::SampleRate(self.sample_rate)); }
    if !self.demo.seconds.is_finite() || self.demo.seconds <= 0.0 { return Err(ConfigError::Demo { field: "seconds" }); }
    if !self.demo.bpm.is_finite() || self.demo.bpm <= 0.0 { return Err(ConfigError::Demo { field: "bpm" }); }
    Ok(())
  }
}
