pub mod delay;
pub mod envelope;
pub mod filters;
pub mod looper;
pub mod osc;
pub mod reverb;
pub mod svf;

/// Drive stage: `tanh` soft clip with a 1..7x input gain.
#[inline]
pub fn soft_clip(x: f32, drive: f32) -> f32 { (x * (1.0 + drive.clamp(0.0, 1.0) * 6.0)).tanh() }

#[cfg(test)]
mod tests {
  use super::soft_clip;

  #[test]
  fn soft_clip_is_bounded_and_odd() {
    for i in -100..=100 {
      let x = i as f32 * 0.1;
      let y = soft_clip(x, 1.0);
      assert!(y.abs() <= 1.0);
      assert!((y + soft_clip(-x, 1.0)).abs() < 1e-6);
    }
  }

  #[test]
  fn more_drive_is_hotter() {
    assert!(soft_clip(0.2, 1.0) > soft_clip(0.2, 0.0));
    assert!((soft_clip(0.2, 0.0) - 0.2f32.tanh()).abs() < 1e-7);
  }
}
