/// One-pole low-pass, `y += a * (x - y)`. Subtract it from the input for a
/// matching one-pole high-pass.
#[derive(Clone, Copy, Debug)]
pub struct OnePoleLP { a: f32, y: f32 }

impl OnePoleLP {
  pub fn new(a: f32) -> Self { Self { a: a.clamp(0.0, 1.0), y: 0.0 } }
  /// 0..1 high-frequency damping mapped onto a 0.3..0.9 coefficient.
  #[inline] pub fn set_hf_damp(&mut self, amt: f32) { self.a = 0.3 + 0.6 * amt.clamp(0.0, 1.0); }
  #[inline] pub fn tick(&mut self, x: f32) -> f32 { self.y += self.a * (x - self.y); self.y }
  pub fn reset(&mut self) { self.y = 0.0; }
}
