//! Control state written by the MIDI control surface and read by the audio path.
//!
//! Every field is a plain `Copy` scalar so a snapshot of the store is always
//! self-consistent per field. Only [`crate::engine::control`] writes here.

use serde::Deserialize;

pub const MIN_CUTOFF_HZ: f32 = 80.0;
pub const MAX_CUTOFF_HZ: f32 = 10_000.0;
pub const PITCH_BEND_RANGE_SEMI: f32 = 2.0;
/// Longest delay the CC can ask for; the delay line itself may clamp lower.
pub const MAX_DELAY_TIME_SEC: f32 = 1.0;
/// Upper bound of the delay feedback CC mapping.
pub const MAX_DELAY_FEEDBACK_CC: f32 = 0.9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum InstrumentMode {
  #[default]
  PolySynth,
  DrumKit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamStore {
  pub master_gain: f32,
  pub cutoff_hz: f32,
  pub resonance: f32,
  pub attack_sec: f32,
  pub decay_sec: f32,
  pub sustain_level: f32,
  pub release_sec: f32,
  pub vibrato_rate_hz: f32,
  pub vibrato_depth_semi: f32,
  pub mod_wheel: f32,
  pub pitch_bend_semi: f32,
  pub sustain_on: bool,
  pub delay_time_sec: f32,
  pub delay_feedback: f32,
  pub delay_mix: f32,
  pub reverb_mix: f32,
  pub reverb_time: f32,
  pub bass_boost: f32,
  pub drive: f32,
  pub looper_level: f32,
  pub mode: InstrumentMode,
}

impl ParamStore {
  pub fn new() -> Self {
    Self {
      master_gain: 0.4,
      cutoff_hz: 3000.0,
      resonance: 0.25,
      attack_sec: 0.01,
      decay_sec: 0.25,
      sustain_level: 0.8,
      release_sec: 0.4,
      vibrato_rate_hz: 5.0,
      vibrato_depth_semi: 0.25,
      mod_wheel: 0.0,
      pitch_bend_semi: 0.0,
      sustain_on: false,
      delay_time_sec: 0.3,
      delay_feedback: 0.35,
      delay_mix: 0.0,
      reverb_mix: 0.0,
      reverb_time: 0.5,
      bass_boost: 0.0,
      drive: 0.0,
      looper_level: 0.8,
      mode: InstrumentMode::PolySynth,
    }
  }

  /// Feedback handed to the reverb for the current `reverb_time`.
  #[inline]
  pub fn reverb_feedback(&self) -> f32 { curve::reverb_feedback(self.reverb_time) }
}

impl Default for ParamStore {
  fn default() -> Self { Self::new() }
}

/// Raw 0..127 controller value to parameter units. All pure.
pub mod curve {
  use super::*;

  #[inline]
  pub fn norm(v: u8) -> f32 { v.min(127) as f32 / 127.0 }

  pub fn volume(v: u8) -> f32 { norm(v).powf(1.5) }

  /// Exponential sweep over 80 Hz..10 kHz with a squared control for more
  /// resolution at the bottom.
  pub fn cutoff(v: u8) -> f32 {
    let n = norm(v);
    let t = n * n;
    MIN_CUTOFF_HZ * (MAX_CUTOFF_HZ / MIN_CUTOFF_HZ).powf(t)
  }

  pub fn resonance(v: u8) -> f32 { 0.1 + 0.9 * norm(v) }
  pub fn attack(v: u8) -> f32 { 0.001 + 2.0 * norm(v) }
  pub fn decay(v: u8) -> f32 { 0.01 + 3.0 * norm(v) }
  pub fn sustain(v: u8) -> f32 { norm(v) }
  pub fn release(v: u8) -> f32 { 0.02 + 4.0 * norm(v) }
  pub fn vibrato_rate(v: u8) -> f32 { 0.1 + 8.0 * norm(v) }
  pub fn delay_time(v: u8) -> f32 { 0.02 + (MAX_DELAY_TIME_SEC - 0.02) * norm(v) }
  pub fn delay_feedback(v: u8) -> f32 { (0.02 + (MAX_DELAY_FEEDBACK_CC - 0.02) * norm(v)).min(0.95) }
  pub fn unit(v: u8) -> f32 { norm(v) }
  pub fn reverb_feedback(time: f32) -> f32 { 0.2 + 0.75 * time.clamp(0.0, 1.0) }
  pub fn switch(v: u8) -> bool { v >= 64 }

  /// 14-bit bend to semitones with a ±256 dead zone around centre.
  pub fn pitch_bend(lsb: u8, msb: u8) -> f32 {
    let value14 = ((msb as u16 & 0x7f) << 7) | (lsb as u16 & 0x7f);
    let centered = value14 as i32 - 8192;
    const DEAD: i32 = 256;
    if centered > -DEAD && centered < DEAD { return 0.0; }
    let norm = (centered as f32 / 8192.0).clamp(-1.0, 1.0);
    norm * PITCH_BEND_RANGE_SEMI
  }
}
