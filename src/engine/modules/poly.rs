use crate::engine::dsp::envelope::{Adsr, ENV_SILENCE};
use crate::engine::dsp::osc::{midi_to_freq, Osc, OscShape};
use crate::engine::params::ParamStore;

pub const NUM_VOICES: usize = 6;
/// Second oscillator sits slightly sharp for a chorused unison.
pub const DETUNE_SEMI: f32 = 0.08;
const OSC_AMP: f32 = 0.6;

#[derive(Clone)]
pub struct Voice {
  osc_a: Osc,
  osc_b: Osc,
  env: Adsr,
  note: u8,
  active: bool,
  gate: bool,
  key_down: bool,
  vel: f32,
}

impl Voice {
  pub fn new(sr: f32) -> Self {
    Self {
      osc_a: Osc::new(sr, OscShape::Saw, OSC_AMP),
      osc_b: Osc::new(sr, OscShape::Tri, OSC_AMP),
      env: Adsr::new(sr),
      note: 60, active: false, gate: false, key_down: false, vel: 0.0,
    }
  }
  #[inline] pub fn note(&self) -> u8 { self.note }
  #[inline] pub fn is_active(&self) -> bool { self.active }
  #[inline] pub fn gate(&self) -> bool { self.gate }
  #[inline] pub fn key_down(&self) -> bool { self.key_down }
  #[inline] pub fn velocity(&self) -> f32 { self.vel }
  #[inline] fn is_idle(&self) -> bool { !self.active && !self.key_down }

  fn tune(&mut self, pitch: f32) {
    self.osc_a.set_freq(midi_to_freq(pitch));
    self.osc_b.set_freq(midi_to_freq(pitch + DETUNE_SEMI));
  }

  fn steal(&mut self) {
    self.active = false; self.gate = false; self.key_down = false; self.vel = 0.0;
    self.env.rearm();
  }

  #[inline]
  fn render(&mut self, pitch_offset: f32) -> f32 {
    if !self.active && !self.key_down && !self.gate { return 0.0; }
    let env = self.env.process(self.gate);
    if !self.gate && !self.key_down && env < ENV_SILENCE {
      self.active = false;
      return 0.0;
    }
    self.tune(self.note as f32 + pitch_offset);
    let sig = (self.osc_a.next() + self.osc_b.next()) * 0.5;
    sig * env * self.vel
  }
}

/// Fixed six-voice pool with same-note reuse, idle search, then round-robin stealing.
pub struct VoicePool {
  voices: [Voice; NUM_VOICES],
  rotate: usize,
}

impl VoicePool {
  pub fn new(sr: f32) -> Self {
    Self { voices: std::array::from_fn(|_| Voice::new(sr)), rotate: 0 }
  }

  pub fn voices(&self) -> &[Voice] { &self.voices }

  /// Never fails: reuse the voice already on `note`, else an idle voice, else steal.
  pub fn allocate_voice_for_note(&mut self, note: u8) -> usize {
    if let Some(i) = self.voices.iter().position(|v| v.note == note && (v.active || v.key_down)) {
      return i;
    }
    if let Some(i) = self.voices.iter().position(Voice::is_idle) {
      return i;
    }
    let i = self.rotate;
    self.rotate = (self.rotate + 1) % NUM_VOICES;
    self.voices[i].steal();
    i
  }

  /// `velocity` is the raw 1..127 value; zero is routed to `note_off` by the caller.
  pub fn note_on(&mut self, note: u8, velocity: u8, pitch_bend_semi: f32) -> usize {
    let i = self.allocate_voice_for_note(note);
    let v = &mut self.voices[i];
    v.note = note;
    v.vel = velocity.min(127) as f32 / 127.0;
    v.key_down = true;
    v.gate = true;
    v.active = true;
    v.tune(note as f32 + pitch_bend_semi);
    i
  }

  /// Key released. With the pedal down the gate stays open until `release_sustained`.
  pub fn note_off(&mut self, note: u8, sustain_on: bool) {
    for v in self.voices.iter_mut().filter(|v| v.note == note && v.key_down) {
      v.key_down = false;
      if !sustain_on { v.gate = false; }
    }
  }

  /// Pedal lifted: every released-but-sustained voice goes into release together.
  pub fn release_sustained(&mut self) {
    for v in self.voices.iter_mut().filter(|v| !v.key_down && v.gate) { v.gate = false; }
  }

  pub fn update_envelopes(&mut self, p: &ParamStore) {
    for v in &mut self.voices { v.env.set(p.attack_sec, p.decay_sec, p.sustain_level, p.release_sec); }
  }

  /// Sum of all sounding voices for one sample. `vibrato` is the LFO output in -1..1.
  #[inline]
  pub fn render(&mut self, p: &ParamStore, vibrato: f32) -> f32 {
    let offset = p.pitch_bend_semi + vibrato * p.vibrato_depth_semi * p.mod_wheel;
    self.voices.iter_mut().map(|v| v.render(offset)).sum()
  }
}
