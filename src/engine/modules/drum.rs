use std::f32::consts::TAU;

use dasp::signal::{self, Noise};
use dasp::Signal;

use crate::engine::dsp::envelope::PercEnv;
use crate::engine::dsp::filters::OnePoleLP;

pub const NUM_DRUM_VOICES: usize = 8;
const NOISE_SEED: u64 = 0x6b62_3230_3430;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrumType { Kick, Snare, ClosedHat, OpenHat, LowTom, HighTom, Clap, Perc }

/// General MIDI percussion map; anything unknown plays the snare.
pub fn drum_type_for_note(note: u8) -> DrumType {
  match note {
    35 | 36 => DrumType::Kick,
    38 | 40 => DrumType::Snare,
    39 => DrumType::Clap,
    42 | 44 => DrumType::ClosedHat,
    46 => DrumType::OpenHat,
    41 | 43 | 45 => DrumType::LowTom,
    47 | 48 | 50 => DrumType::HighTom,
    37 | 56 | 75 | 76 | 77 => DrumType::Perc,
    _ => DrumType::Snare,
  }
}

/// Synthesis constants for one hit, before velocity scaling.
#[derive(Clone, Copy, Debug)]
struct DrumPatch {
  base_freq: f32,
  /// Pitch starts at `base_freq * sweep` and relaxes toward 1x.
  sweep: f32,
  sweep_sec: f32,
  amp_sec: f32,
  noise_sec: f32,
  tone_mix: f32,
  noise_mix: f32,
  /// High-pass the noise (hats).
  bright: bool,
}

impl DrumType {
  fn patch(self) -> DrumPatch {
    match self {
      DrumType::Kick => DrumPatch { base_freq: 50.0, sweep: 3.0, sweep_sec: 0.03, amp_sec: 0.35, noise_sec: 0.02, tone_mix: 1.0, noise_mix: 0.15, bright: false },
      DrumType::Snare => DrumPatch { base_freq: 180.0, sweep: 1.5, sweep_sec: 0.02, amp_sec: 0.12, noise_sec: 0.18, tone_mix: 0.45, noise_mix: 0.8, bright: false },
      DrumType::ClosedHat => DrumPatch { base_freq: 0.0, sweep: 1.0, sweep_sec: 0.01, amp_sec: 0.01, noise_sec: 0.05, tone_mix: 0.0, noise_mix: 0.6, bright: true },
      DrumType::OpenHat => DrumPatch { base_freq: 0.0, sweep: 1.0, sweep_sec: 0.01, amp_sec: 0.01, noise_sec: 0.35, tone_mix: 0.0, noise_mix: 0.55, bright: true },
      DrumType::LowTom => DrumPatch { base_freq: 100.0, sweep: 1.6, sweep_sec: 0.05, amp_sec: 0.3, noise_sec: 0.03, tone_mix: 0.9, noise_mix: 0.1, bright: false },
      DrumType::HighTom => DrumPatch { base_freq: 160.0, sweep: 1.6, sweep_sec: 0.04, amp_sec: 0.22, noise_sec: 0.03, tone_mix: 0.9, noise_mix: 0.1, bright: false },
      DrumType::Clap => DrumPatch { base_freq: 0.0, sweep: 1.0, sweep_sec: 0.01, amp_sec: 0.01, noise_sec: 0.22, tone_mix: 0.0, noise_mix: 0.9, bright: false },
      DrumType::Perc => DrumPatch { base_freq: 400.0, sweep: 1.2, sweep_sec: 0.01, amp_sec: 0.12, noise_sec: 0.01, tone_mix: 0.7, noise_mix: 0.1, bright: false },
    }
  }

  #[inline]
  pub fn is_tonal(self) -> bool { !matches!(self, DrumType::ClosedHat | DrumType::OpenHat | DrumType::Clap) }
}

#[derive(Clone)]
pub struct DrumVoice {
  drum_type: DrumType,
  amp_env: PercEnv,
  noise_env: PercEnv,
  phase: f32,
  base_freq: f32,
  pitch_scale: f32,
  pitch_decay: f32,
  tone_mix: f32,
  noise_mix: f32,
  bright: bool,
  noise_lp: OnePoleLP,
  velocity: f32,
  active: bool,
}

impl DrumVoice {
  fn new(sr: f32) -> Self {
    let noise_lp = OnePoleLP::new(0.35);
    Self {
      drum_type: DrumType::Snare,
      amp_env: PercEnv::new(sr), noise_env: PercEnv::new(sr),
      phase: 0.0, base_freq: 0.0, pitch_scale: 1.0, pitch_decay: 0.0,
      tone_mix: 0.0, noise_mix: 0.0, bright: false, noise_lp,
      velocity: 0.0, active: false,
    }
  }
  #[inline] pub fn is_active(&self) -> bool { self.active }
  #[inline] pub fn drum_type(&self) -> DrumType { self.drum_type }
  /// Combined envelope level, a cheap proxy for how loud the hit still is.
  #[inline] pub fn level(&self) -> f32 { self.amp_env.value() + self.noise_env.value() }

  fn trigger(&mut self, drum_type: DrumType, velocity: f32, sr: f32) {
    let p = drum_type.patch();
    let vel = velocity.clamp(0.0, 1.0);
    let len = 0.5 + 0.5 * vel;
    self.drum_type = drum_type;
    self.phase = 0.0;
    self.base_freq = p.base_freq;
    self.pitch_scale = p.sweep;
    self.pitch_decay = (-1.0 / (p.sweep_sec * sr)).exp();
    self.tone_mix = p.tone_mix;
    self.noise_mix = p.noise_mix;
    self.bright = p.bright;
    self.noise_lp.reset();
    self.velocity = vel;
    if drum_type.is_tonal() { self.amp_env.trigger(1.0, p.amp_sec * len); } else { self.amp_env.clear(); }
    self.noise_env.trigger(1.0, p.noise_sec * len);
    self.active = true;
  }

  #[inline]
  fn render(&mut self, noise: f32, sr: f32) -> f32 {
    if !self.active { return 0.0; }
    let tone = if self.drum_type.is_tonal() {
      let freq = self.base_freq * self.pitch_scale;
      self.pitch_scale = 1.0 + (self.pitch_scale - 1.0) * self.pitch_decay;
      let s = (TAU * self.phase).sin();
      self.phase += freq / sr;
      if self.phase >= 1.0 { self.phase -= 1.0; }
      s * self.amp_env.process()
    } else { 0.0 };
    let n = if self.bright { noise - self.noise_lp.tick(noise) } else { noise };
    let n = n * self.noise_env.process();
    let out = (tone * self.tone_mix + n * self.noise_mix) * self.velocity;
    if !self.amp_env.is_active() && !self.noise_env.is_active() { self.active = false; }
    out
  }
}

/// Synthesized kit: eight voices sharing one white-noise source.
pub struct DrumKit {
  sr: f32,
  voices: [DrumVoice; NUM_DRUM_VOICES],
  noise: Noise,
}

impl DrumKit {
  pub fn new(sr: f32) -> Self {
    Self { sr, voices: std::array::from_fn(|_| DrumVoice::new(sr)), noise: signal::noise(NOISE_SEED) }
  }

  pub fn voices(&self) -> &[DrumVoice] { &self.voices }

  /// First idle voice, else voice 0. Returns the voice index used.
  pub fn trigger(&mut self, note: u8, velocity: u8) -> usize {
    let idx = self.voices.iter().position(|v| !v.active).unwrap_or(0);
    let vel = velocity.min(127) as f32 / 127.0;
    self.voices[idx].trigger(drum_type_for_note(note), vel, self.sr);
    idx
  }

  #[inline]
  pub fn render(&mut self) -> f32 {
    let noise = self.noise.next() as f32;
    let sr = self.sr;
    self.voices.iter_mut().map(|v| v.render(noise, sr)).sum()
  }

  pub fn any_active(&self) -> bool { self.voices.iter().any(|v| v.active) }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SR: f32 = 48_000.0;

  #[test]
  fn note_map_covers_kit_and_defaults_to_snare() {
    assert_eq!(drum_type_for_note(36), DrumType::Kick);
    assert_eq!(drum_type_for_note(38), DrumType::Snare);
    assert_eq!(drum_type_for_note(42), DrumType::ClosedHat);
    assert_eq!(drum_type_for_note(46), DrumType::OpenHat);
    assert_eq!(drum_type_for_note(45), DrumType::LowTom);
    assert_eq!(drum_type_for_note(50), DrumType::HighTom);
    assert_eq!(drum_type_for_note(39), DrumType::Clap);
    assert_eq!(drum_type_for_note(56), DrumType::Perc);
    assert_eq!(drum_type_for_note(0), DrumType::Snare);
    assert_eq!(drum_type_for_note(127), DrumType::Snare);
  }

  #[test]
  fn kick_energy_falls_and_voice_ends() {
    let mut kit = DrumKit::new(SR);
    kit.trigger(36, 127);
    let window = 4800;
    let mut energies = Vec::new();
    let mut samples = 0usize;
    let limit = (12.0 * 0.35 * SR) as usize;
    while kit.any_active() {
      let mut e = 0.0f32;
      for _ in 0..window { let s = kit.render(); e += s * s; }
      energies.push(e);
      samples += window;
      assert!(samples <= limit, "kick still active after {samples} samples");
    }
    let peak = energies.iter().cloned().enumerate().fold((0, 0.0f32), |a, (i, e)| if e > a.1 { (i, e) } else { a }).0;
    let tail: Vec<f32> = energies[peak..].iter().cloned().filter(|&e| e > 1e-12).collect();
    assert!(tail.len() > 3);
    for w in tail.windows(2) { assert!(w[1] < w[0], "energy rose: {} -> {}", w[0], w[1]); }
  }

  #[test]
  fn envelope_level_strictly_decreases_after_hit() {
    let mut kit = DrumKit::new(SR);
    let i = kit.trigger(36, 100);
    let mut prev = kit.voices()[i].level();
    kit.render();
    for _ in 0..10_000 {
      kit.render();
      let now = kit.voices()[i].level();
      if now == 0.0 { break; }
      assert!(now < prev);
      prev = now;
    }
  }

  #[test]
  fn hats_have_no_tone() {
    let mut kit = DrumKit::new(SR);
    let i = kit.trigger(42, 127);
    assert!(!kit.voices()[i].drum_type().is_tonal());
    assert_eq!(kit.voices()[i].amp_env.value(), 0.0);
    let e: f32 = (0..2000).map(|_| { let s = kit.render(); s * s }).sum();
    assert!(e > 0.0);
  }

  #[test]
  fn retrigger_prefers_idle_then_voice_zero() {
    let mut kit = DrumKit::new(SR);
    for n in 0..NUM_DRUM_VOICES { assert_eq!(kit.trigger(36, 100), n); }
    assert_eq!(kit.trigger(38, 100), 0);
    assert_eq!(kit.voices()[0].drum_type(), DrumType::Snare);
  }

  #[test]
  fn louder_hits_ring_longer() {
    let run = |vel: u8| {
      let mut kit = DrumKit::new(SR);
      kit.trigger(36, vel);
      let mut n = 0;
      while kit.any_active() { kit.render(); n += 1; }
      n
    };
    assert!(run(127) > run(20));
  }
}
