//! MIDI control surface: turns decoded events into parameter and voice changes.
//!
//! Runs between audio blocks only. Any handler that changes a value with
//! derived runtime state (filter coefficients, envelope times, LFO rate,
//! delay length, reverb feedback) refreshes that state before returning.

use crate::engine::graph::Engine;
use crate::engine::messages::MidiEvent;
use crate::engine::params::{curve, InstrumentMode};
use crate::engine::protocol::cc;

/// Looper CC zones.
const LOOPER_STOP_BELOW: u8 = 20;
const LOOPER_PLAY_FROM: u8 = 80;

impl Engine {
  /// Entry point for every decoded event. Events on other channels are dropped.
  pub fn handle_midi(&mut self, ev: MidiEvent) {
    if ev.channel() != self.channel { return; }
    match ev {
      MidiEvent::NoteOn { note, velocity: 0, .. } => self.handle_note_off(note),
      MidiEvent::NoteOn { note, velocity, .. } => self.handle_note_on(note, velocity),
      MidiEvent::NoteOff { note, .. } => self.handle_note_off(note),
      MidiEvent::ControlChange { controller, value, .. } => self.handle_cc(controller, value),
      MidiEvent::PitchBend { lsb, msb, .. } => self.handle_pitch_bend(lsb, msb),
    }
  }

  fn handle_note_on(&mut self, note: u8, velocity: u8) {
    match self.params.mode {
      InstrumentMode::PolySynth => { self.voices.note_on(note, velocity, self.params.pitch_bend_semi); }
      InstrumentMode::DrumKit => { self.drums.trigger(note, velocity); }
    }
  }

  // Always reaches the melodic pool so keys held across a mode switch still release.
  fn handle_note_off(&mut self, note: u8) {
    self.voices.note_off(note, self.params.sustain_on);
  }

  fn handle_pitch_bend(&mut self, lsb: u8, msb: u8) {
    self.params.pitch_bend_semi = curve::pitch_bend(lsb, msb);
  }

  fn handle_sustain(&mut self, value: u8) {
    let on = curve::switch(value);
    if on && !self.params.sustain_on {
      self.params.sustain_on = true;
    } else if !on && self.params.sustain_on {
      self.params.sustain_on = false;
      self.voices.release_sustained();
    }
  }

  fn handle_looper(&mut self, value: u8) {
    let looper = &mut self.fx.looper;
    if value < LOOPER_STOP_BELOW { looper.stop(); }
    else if value < LOOPER_PLAY_FROM { looper.toggle_record(); }
    else { looper.toggle_play(); }
  }

  fn handle_cc(&mut self, controller: u8, value: u8) {
    let p = &mut self.params;
    match controller {
      cc::MODWHEEL => p.mod_wheel = curve::unit(value),
      cc::VOLUME => p.master_gain = curve::volume(value),
      cc::SUSTAIN_PEDAL => self.handle_sustain(value),
      cc::CUTOFF => { p.cutoff_hz = curve::cutoff(value); self.fx.update_filter(&self.params); }
      cc::RESONANCE => { p.resonance = curve::resonance(value); self.fx.update_filter(&self.params); }
      cc::ATTACK => { p.attack_sec = curve::attack(value); self.voices.update_envelopes(&self.params); }
      cc::DECAY => { p.decay_sec = curve::decay(value); self.voices.update_envelopes(&self.params); }
      cc::SUSTAIN => { p.sustain_level = curve::sustain(value); self.voices.update_envelopes(&self.params); }
      cc::RELEASE => { p.release_sec = curve::release(value); self.voices.update_envelopes(&self.params); }
      cc::VIBRATO_RATE => { p.vibrato_rate_hz = curve::vibrato_rate(value); self.vibrato.set_freq(self.params.vibrato_rate_hz); }
      cc::DELAY_TIME => { p.delay_time_sec = curve::delay_time(value); self.fx.update_delay(&self.params); }
      cc::DELAY_FEEDBACK => p.delay_feedback = curve::delay_feedback(value),
      cc::DELAY_MIX => p.delay_mix = curve::unit(value),
      cc::REVERB_MIX => p.reverb_mix = curve::unit(value),
      cc::REVERB_TIME => { p.reverb_time = curve::unit(value); self.fx.update_reverb(&self.params); }
      cc::BASS_BOOST => p.bass_boost = curve::unit(value),
      cc::DRIVE => p.drive = curve::unit(value),
      cc::INSTRUMENT_MODE => {
        p.mode = if curve::switch(value) { InstrumentMode::DrumKit } else { InstrumentMode::PolySynth };
      }
      cc::LOOPER_CONTROL => self.handle_looper(value),
      cc::LOOPER_LEVEL => p.looper_level = curve::unit(value),
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::dsp::looper::LooperState;
  use crate::engine::params::ParamStore;

  const SR: f32 = 48_000.0;

  fn engine() -> Engine { Engine::with_looper_frames(SR, 0, 4800) }
  fn cc_ev(controller: u8, value: u8) -> MidiEvent { MidiEvent::cc(0, controller, value) }

  #[test]
  fn foreign_channel_is_ignored() {
    let mut e = engine();
    let before = *e.params();
    e.handle_midi(MidiEvent::cc(3, cc::VOLUME, 0));
    e.handle_midi(MidiEvent::note_on(3, 60, 100));
    assert_eq!(*e.params(), before);
    assert!(e.voices().voices().iter().all(|v| !v.key_down()));
  }

  #[test]
  fn velocity_zero_is_note_off() {
    let mut e = engine();
    e.handle_midi(MidiEvent::note_on(0, 60, 100));
    e.handle_midi(MidiEvent::note_on(0, 60, 0));
    let v = e.voices().voices().iter().find(|v| v.note() == 60).unwrap();
    assert!(!v.key_down() && !v.gate());
  }

  #[test]
  fn cutoff_cc_sets_endpoints() {
    let mut e = engine();
    e.handle_midi(cc_ev(cc::CUTOFF, 0));
    assert_eq!(e.params().cutoff_hz, 80.0);
    e.handle_midi(cc_ev(cc::CUTOFF, 127));
    assert!((e.params().cutoff_hz - 10_000.0).abs() < 0.5);
  }

  #[test]
  fn sustain_pedal_off_is_idempotent() {
    let mut e = engine();
    e.handle_midi(MidiEvent::note_on(0, 60, 100));
    let before_params = *e.params();
    let before_gates: Vec<bool> = e.voices().voices().iter().map(|v| v.gate()).collect();
    e.handle_midi(cc_ev(cc::SUSTAIN_PEDAL, 0));
    e.handle_midi(cc_ev(cc::SUSTAIN_PEDAL, 10));
    assert_eq!(*e.params(), before_params);
    let after: Vec<bool> = e.voices().voices().iter().map(|v| v.gate()).collect();
    assert_eq!(before_gates, after);
  }

  #[test]
  fn pedal_release_closes_sustained_gates() {
    let mut e = engine();
    e.handle_midi(cc_ev(cc::SUSTAIN_PEDAL, 127));
    e.handle_midi(MidiEvent::note_on(0, 60, 100));
    e.handle_midi(MidiEvent::note_on(0, 67, 100));
    e.handle_midi(MidiEvent::note_off(0, 60));
    e.handle_midi(MidiEvent::note_off(0, 67));
    assert_eq!(e.voices().voices().iter().filter(|v| v.gate()).count(), 2);
    e.handle_midi(cc_ev(cc::SUSTAIN_PEDAL, 0));
    assert!(e.voices().voices().iter().all(|v| !v.gate()));
  }

  #[test]
  fn envelope_ccs_reach_params() {
    let mut e = engine();
    e.handle_midi(cc_ev(cc::ATTACK, 127));
    e.handle_midi(cc_ev(cc::SUSTAIN, 0));
    e.handle_midi(cc_ev(cc::RELEASE, 0));
    let p = e.params();
    assert!((p.attack_sec - 2.001).abs() < 1e-5);
    assert_eq!(p.sustain_level, 0.0);
    assert!((p.release_sec - 0.02).abs() < 1e-6);
  }

  #[test]
  fn delay_time_recomputes_length() {
    let mut e = engine();
    e.handle_midi(cc_ev(cc::DELAY_TIME, 127));
    assert_eq!(e.fx().delay_samples(), SR as usize);
    e.handle_midi(cc_ev(cc::DELAY_TIME, 0));
    assert_eq!(e.fx().delay_samples(), (0.02 * SR).round() as usize);
  }

  #[test]
  fn reverb_time_maps_to_feedback() {
    let mut e = engine();
    e.handle_midi(cc_ev(cc::REVERB_TIME, 127));
    assert!((e.fx().reverb_feedback() - 0.95).abs() < 1e-6);
    e.handle_midi(cc_ev(cc::REVERB_TIME, 0));
    assert!((e.fx().reverb_feedback() - 0.2).abs() < 1e-6);
  }

  #[test]
  fn mode_switch_keeps_voices_and_routes_notes() {
    let mut e = engine();
    e.handle_midi(MidiEvent::note_on(0, 60, 100));
    e.handle_midi(cc_ev(cc::INSTRUMENT_MODE, 127));
    assert_eq!(e.params().mode, InstrumentMode::DrumKit);
    assert!(e.voices().voices().iter().any(|v| v.note() == 60 && v.key_down()));
    e.handle_midi(MidiEvent::note_on(0, 36, 100));
    assert!(e.drums().any_active());
    assert!(!e.voices().voices().iter().any(|v| v.note() == 36 && v.key_down()));
    e.handle_midi(MidiEvent::note_off(0, 60));
    assert!(!e.voices().voices().iter().any(|v| v.key_down()));
    e.handle_midi(cc_ev(cc::INSTRUMENT_MODE, 0));
    assert_eq!(e.params().mode, InstrumentMode::PolySynth);
  }

  #[test]
  fn looper_cc_zones() {
    let mut e = engine();
    e.handle_midi(cc_ev(cc::LOOPER_CONTROL, 40));
    assert_eq!(e.looper().state(), LooperState::Recording);
    let mut buf = [0.0f32; 200];
    e.render_interleaved(&mut buf);
    e.handle_midi(cc_ev(cc::LOOPER_CONTROL, 40));
    assert_eq!(e.looper().state(), LooperState::Playing);
    assert_eq!(e.looper().length(), 100);
    e.handle_midi(cc_ev(cc::LOOPER_CONTROL, 100));
    assert_eq!(e.looper().state(), LooperState::Paused);
    assert_eq!(e.looper().length(), 100);
    e.handle_midi(cc_ev(cc::LOOPER_CONTROL, 100));
    assert_eq!(e.looper().state(), LooperState::Playing);
    e.handle_midi(cc_ev(cc::LOOPER_CONTROL, 5));
    assert_eq!(e.looper().state(), LooperState::Empty);
  }

  #[test]
  fn unknown_cc_changes_nothing() {
    let mut e = engine();
    let before: ParamStore = *e.params();
    e.handle_midi(cc_ev(2, 99));
    e.handle_midi(cc_ev(127, 0));
    assert_eq!(*e.params(), before);
  }

  #[test]
  fn pitch_bend_updates_params() {
    let mut e = engine();
    e.handle_midi(MidiEvent::pitch_bend(0, 0));
    assert_eq!(e.params().pitch_bend_semi, -2.0);
    e.handle_midi(MidiEvent::pitch_bend(0, 8192 + 100));
    assert_eq!(e.params().pitch_bend_semi, 0.0);
  }
}
