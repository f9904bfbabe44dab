use std::f32::consts::PI;

/// Trapezoidal state-variable filter. `process` returns (lp, hp, bp).
#[derive(Clone, Debug)]
pub struct Svf {
  ic1eq: f32,
  ic2eq: f32,
  g: f32,
  k: f32,
  sr: f32,
}

impl Svf {
  pub fn new(sr: f32) -> Self { Self { ic1eq: 0.0, ic2eq: 0.0, g: 0.1, k: 0.5, sr } }

  pub fn set_params(&mut self, cutoff: f32, q: f32) {
    let fc = cutoff.clamp(10.0, self.sr * 0.49);
    self.g = (PI * (fc / self.sr)).tan();
    self.k = 1.0 / q.max(0.001);
  }

  /// Normalized 0..1 resonance, 1.0 is the sharpest peak short of self-oscillation.
  pub fn set_cutoff_res(&mut self, cutoff: f32, res: f32) {
    self.set_params(cutoff, res_to_q(res));
  }

  #[inline]
  pub fn process(&mut self, x: f32) -> (f32, f32, f32) {
    let g = self.g; let k = self.k;
    let v1 = (self.ic1eq + g * (x - self.ic2eq)) / (1.0 + g * (g + k));
    let v2 = self.ic2eq + g * v1;
    self.ic1eq = 2.0 * v1 - self.ic1eq;
    self.ic2eq = 2.0 * v2 - self.ic2eq;
    let hp = x - k * v1 - v2;
    (v2, hp, v1)
  }
}

#[inline]
pub fn res_to_q(res: f32) -> f32 { 0.5 + 9.5 * res.clamp(0.0, 1.0) * res.clamp(0.0, 1.0) }

#[cfg(test)]
mod tests {
  use super::*;

  fn settle_gain(f: &mut Svf, freq: f32, sr: f32) -> f32 {
    let mut peak = 0.0f32;
    for n in 0..(sr as usize) {
      let x = (2.0 * PI * freq * n as f32 / sr).sin();
      let (lp, _, _) = f.process(x);
      if n > (sr as usize) / 2 { peak = peak.max(lp.abs()); }
    }
    peak
  }

  #[test]
  fn lowpass_passes_lows_and_cuts_highs() {
    let sr = 48_000.0;
    let mut f = Svf::new(sr);
    f.set_cutoff_res(500.0, 0.0);
    let low = settle_gain(&mut f, 50.0, sr);
    let mut f = Svf::new(sr);
    f.set_cutoff_res(500.0, 0.0);
    let high = settle_gain(&mut f, 8000.0, sr);
    assert!(low > 0.9, "low band gain {low}");
    assert!(high < 0.05, "high band gain {high}");
  }

  #[test]
  fn bands_recombine_to_input() {
    let mut f = Svf::new(48_000.0);
    let q = 0.707;
    f.set_params(1000.0, q);
    for n in 0..500 {
      let x = (n as f32 * 0.37).sin();
      let (lp, hp, bp) = f.process(x);
      assert!((lp + hp + bp / q - x).abs() < 1e-5);
    }
  }
}
