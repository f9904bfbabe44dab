use std::f32::consts::TAU;

#[inline]
pub fn midi_to_freq(m: f32) -> f32 { 440.0 * (2.0_f32).powf((m - 69.0) / 12.0) }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OscShape { Sine, Saw, Tri }

/// Naive phase-accumulator oscillator with a fixed output amplitude.
#[derive(Clone, Debug)]
pub struct Osc {
  phase: f32,
  inc: f32,
  amp: f32,
  shape: OscShape,
  sr: f32,
}

impl Osc {
  pub fn new(sr: f32, shape: OscShape, amp: f32) -> Self { Self { phase: 0.0, inc: 0.0, amp, shape, sr } }

  #[inline] pub fn set_freq(&mut self, hz: f32) { self.inc = (hz / self.sr).clamp(0.0, 0.5); }

  #[inline]
  pub fn next(&mut self) -> f32 {
    let p = self.phase;
    self.phase += self.inc;
    if self.phase >= 1.0 { self.phase -= 1.0; }
    let v = match self.shape {
      OscShape::Sine => (TAU * p).sin(),
      OscShape::Saw => 2.0 * (p - 0.5),
      OscShape::Tri => 2.0 * (2.0 * ((p + 0.25) % 1.0) - 1.0).abs() - 1.0,
    };
    v * self.amp
  }
}
