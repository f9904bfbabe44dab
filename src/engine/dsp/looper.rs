/// Single-take stereo looper.
///
/// Recording writes from the start of the buffer; finishing a take fixes
/// `length` and starts playback. Playback mixes the loop back in at `level`
/// and wraps modulo `length`. Running out of buffer finishes the take.
pub struct Looper {
  buf_l: Box<[f32]>,
  buf_r: Box<[f32]>,
  write_index: usize,
  length: usize,
  play_index: usize,
  recording: bool,
  playing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LooperState { Empty, Recording, Playing, Paused }

impl Looper {
  pub fn new(max_sec: f32, sr: f32) -> Self {
    Self::with_capacity(((max_sec * sr).ceil() as usize).max(1))
  }

  pub fn with_capacity(frames: usize) -> Self {
    Self {
      buf_l: vec![0.0; frames].into_boxed_slice(),
      buf_r: vec![0.0; frames].into_boxed_slice(),
      write_index: 0, length: 0, play_index: 0, recording: false, playing: false,
    }
  }

  #[inline] pub fn capacity(&self) -> usize { self.buf_l.len() }
  #[inline] pub fn length(&self) -> usize { self.length }
  #[inline] pub fn is_recording(&self) -> bool { self.recording }
  #[inline] pub fn is_playing(&self) -> bool { self.playing }

  pub fn state(&self) -> LooperState {
    if self.recording { LooperState::Recording }
    else if self.length == 0 { LooperState::Empty }
    else if self.playing { LooperState::Playing }
    else { LooperState::Paused }
  }

  pub fn start_recording(&mut self) {
    self.recording = true;
    self.playing = false;
    self.write_index = 0;
  }

  /// Closes the take. An empty take keeps whatever was recorded before.
  pub fn finish_recording(&mut self) {
    self.recording = false;
    if self.write_index > 0 { self.length = self.write_index; }
    self.play_index = 0;
    self.playing = self.length > 0;
  }

  pub fn toggle_record(&mut self) {
    if self.recording { self.finish_recording(); } else { self.start_recording(); }
  }

  /// Play/pause; the recorded take is untouched.
  pub fn toggle_play(&mut self) {
    if self.length > 0 && !self.recording { self.playing = !self.playing; }
  }

  pub fn stop(&mut self) {
    self.recording = false;
    self.playing = false;
    self.length = 0;
    self.write_index = 0;
    self.play_index = 0;
  }

  #[inline]
  pub fn process(&mut self, l: f32, r: f32, level: f32) -> (f32, f32) {
    if self.recording {
      self.buf_l[self.write_index] = l;
      self.buf_r[self.write_index] = r;
      self.write_index += 1;
      if self.write_index >= self.buf_l.len() {
        self.finish_recording();
        return (l, r);
      }
    }
    if self.playing && self.length > 0 {
      let out = (l + self.buf_l[self.play_index] * level, r + self.buf_r[self.play_index] * level);
      self.play_index += 1; if self.play_index >= self.length { self.play_index = 0; }
      return out;
    }
    (l, r)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn take_plays_back_cyclically() {
    let mut lp = Looper::with_capacity(1000);
    lp.start_recording();
    let take: Vec<(f32, f32)> = (0..37).map(|n| (n as f32 * 0.01, -(n as f32) * 0.02)).collect();
    for &(l, r) in &take { lp.process(l, r, 1.0); }
    lp.finish_recording();
    assert_eq!(lp.length(), 37);
    assert_eq!(lp.state(), LooperState::Playing);
    for cycle in 0..3 {
      for (i, &(l, r)) in take.iter().enumerate() {
        let out = lp.process(0.0, 0.0, 1.0);
        assert_eq!(out, (l, r), "cycle {cycle} frame {i}");
      }
    }
  }

  #[test]
  fn overflow_finishes_take() {
    let mut lp = Looper::with_capacity(16);
    lp.start_recording();
    for _ in 0..20 { lp.process(0.5, 0.5, 1.0); }
    assert!(!lp.is_recording());
    assert_eq!(lp.length(), 16);
    assert!(lp.is_playing());
  }

  #[test]
  fn pause_keeps_take_and_stop_clears() {
    let mut lp = Looper::with_capacity(16);
    lp.toggle_record();
    for _ in 0..4 { lp.process(1.0, 1.0, 1.0); }
    lp.toggle_record();
    lp.toggle_play();
    assert_eq!(lp.state(), LooperState::Paused);
    assert_eq!(lp.process(0.0, 0.0, 1.0), (0.0, 0.0));
    lp.toggle_play();
    assert_eq!(lp.process(0.0, 0.0, 0.5), (0.5, 0.5));
    lp.stop();
    assert_eq!(lp.state(), LooperState::Empty);
    lp.toggle_play();
    assert!(!lp.is_playing());
  }

  #[test]
  fn empty_take_stays_empty() {
    let mut lp = Looper::with_capacity(16);
    lp.toggle_record();
    lp.toggle_record();
    assert_eq!(lp.state(), LooperState::Empty);
    assert!(!lp.is_playing());
  }

  #[test]
  fn play_toggle_ignored_while_recording_over_old_take() {
    let mut lp = Looper::with_capacity(16);
    lp.toggle_record();
    for _ in 0..4 { lp.process(1.0, 1.0, 1.0); }
    lp.toggle_record();
    lp.toggle_record();
    lp.toggle_play();
    assert_eq!(lp.state(), LooperState::Recording);
    assert_eq!(lp.process(0.25, 0.25, 1.0), (0.25, 0.25));
  }

  #[test]
  fn empty_retake_keeps_previous_take() {
    let mut lp = Looper::with_capacity(16);
    lp.toggle_record();
    for n in 0..4 { lp.process(n as f32, -(n as f32), 1.0); }
    lp.toggle_record();
    lp.toggle_record();
    lp.toggle_record();
    assert_eq!(lp.state(), LooperState::Playing);
    assert_eq!(lp.length(), 4);
    for n in 0..4 { assert_eq!(lp.process(0.0, 0.0, 1.0), (n as f32, -(n as f32))); }
  }
}
