/// Mono circular delay line with an integer read tap. Capacity is fixed at
/// construction; the tap length can change at any time.
pub struct DelayLine {
  buf: Box<[f32]>,
  wr: usize,
  delay: usize,
}

impl DelayLine {
  pub fn new(max_sec: f32, sr: f32) -> Self {
    let len = ((max_sec * sr).ceil().max(64.0)) as usize;
    Self { buf: vec![0.0; len].into_boxed_slice(), wr: 0, delay: 1 }
  }

  #[inline] pub fn capacity(&self) -> usize { self.buf.len() }
  #[inline] pub fn delay_samples(&self) -> usize { self.delay }

  /// Longest usable tap is one sample short of the buffer so the read never
  /// lands on the slot about to be written.
  pub fn set_delay_samples(&mut self, n: usize) { self.delay = n.clamp(1, self.buf.len() - 1); }

  #[inline]
  pub fn read(&self) -> f32 {
    let len = self.buf.len();
    self.buf[(self.wr + len - self.delay) % len]
  }

  #[inline]
  pub fn write(&mut self, x: f32) {
    self.buf[self.wr] = x;
    self.wr += 1; if self.wr >= self.buf.len() { self.wr = 0; }
  }
}

/// Feedback echo built on [`DelayLine`]: read before write, no instantaneous feedback.
pub struct Echo {
  line: DelayLine,
  sr: f32,
}

impl Echo {
  pub const MAX_FEEDBACK: f32 = 0.95;

  pub fn new(max_sec: f32, sr: f32) -> Self { Self { line: DelayLine::new(max_sec, sr), sr } }

  pub fn set_time(&mut self, sec: f32) {
    let n = (sec.max(0.0) * self.sr).round() as usize;
    self.line.set_delay_samples(n);
  }

  #[inline] pub fn delay_samples(&self) -> usize { self.line.delay_samples() }
  #[inline] pub fn capacity(&self) -> usize { self.line.capacity() }

  #[inline]
  pub fn process(&mut self, x: f32, feedback: f32, mix: f32) -> f32 {
    let fb = feedback.clamp(0.0, Self::MAX_FEEDBACK);
    let wet = mix.clamp(0.0, 1.0);
    let d = self.line.read();
    self.line.write(x + d * fb);
    x * (1.0 - wet) + d * wet
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn impulse_comes_back_after_delay() {
    let mut line = DelayLine::new(1.0, 100.0);
    line.set_delay_samples(10);
    let mut out = Vec::new();
    for n in 0..30 {
      out.push(line.read());
      line.write(if n == 0 { 1.0 } else { 0.0 });
    }
    assert_eq!(out[10], 1.0);
    assert_eq!(out.iter().filter(|&&s| s != 0.0).count(), 1);
  }

  #[test]
  fn tap_clamps_to_capacity() {
    let mut line = DelayLine::new(1.0, 100.0);
    line.set_delay_samples(10_000);
    assert_eq!(line.delay_samples(), line.capacity() - 1);
    line.set_delay_samples(0);
    assert_eq!(line.delay_samples(), 1);
  }

  #[test]
  fn echo_feedback_repeats_decay() {
    let mut echo = Echo::new(1.0, 100.0);
    echo.set_time(0.05);
    let mut out = Vec::new();
    for n in 0..20 { out.push(echo.process(if n == 0 { 1.0 } else { 0.0 }, 0.5, 1.0)); }
    assert_eq!(out[0], 0.0);
    assert!((out[5] - 1.0).abs() < 1e-6);
    assert!((out[10] - 0.5).abs() < 1e-6);
    assert!((out[15] - 0.25).abs() < 1e-6);
  }

  #[test]
  fn echo_feedback_is_capped() {
    let mut echo = Echo::new(1.0, 100.0);
    echo.set_time(0.01);
    let mut out = Vec::new();
    for n in 0..4 { out.push(echo.process(if n == 0 { 1.0 } else { 0.0 }, 2.0, 1.0)); }
    assert!((out[2] - Echo::MAX_FEEDBACK).abs() < 1e-6);
  }
}
