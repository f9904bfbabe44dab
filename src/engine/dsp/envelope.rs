/// Level below which a released envelope counts as silent.
pub const ENV_SILENCE: f32 = 1e-4;

const PERC_SNAP: f32 = 1e-5;
const PERC_ACTIVE: f32 = 1e-4;
const MIN_SEG_SEC: f32 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdsrPhase { Idle, Attack, Decay, Sustain, Release }

/// Linear four-segment envelope driven by a gate.
///
/// A rising gate restarts the attack from whatever level the envelope is at,
/// so retriggering a sounding voice does not click. Release always reaches
/// zero in `release` seconds regardless of where it started.
#[derive(Clone, Debug)]
pub struct Adsr {
  a: f32, d: f32, s: f32, r: f32, sr: f32,
  env: f32,
  phase: AdsrPhase,
  last_gate: bool,
  release_step: f32,
}

impl Adsr {
  pub fn new(sr: f32) -> Self {
    Self { a: 0.01, d: 0.1, s: 0.8, r: 0.2, sr, env: 0.0, phase: AdsrPhase::Idle, last_gate: false, release_step: 0.0 }
  }
  pub fn set(&mut self, a: f32, d: f32, s: f32, r: f32) {
    self.a = a.max(MIN_SEG_SEC); self.d = d.max(MIN_SEG_SEC); self.s = s.clamp(0.0, 1.0); self.r = r.max(MIN_SEG_SEC);
  }
  #[inline] pub fn value(&self) -> f32 { self.env }
  #[inline] pub fn phase(&self) -> AdsrPhase { self.phase }

  /// Forget the last gate so the next open gate restarts the attack from
  /// the current level. Used when a sounding voice is stolen.
  pub fn rearm(&mut self) { self.last_gate = false; }

  pub fn process(&mut self, gate: bool) -> f32 {
    if gate && !self.last_gate {
      self.phase = AdsrPhase::Attack;
    } else if !gate && self.last_gate {
      self.begin_release();
    }
    self.last_gate = gate;

    match self.phase {
      AdsrPhase::Idle => { self.env = 0.0; }
      AdsrPhase::Attack => {
        self.env += 1.0 / (self.a * self.sr);
        if self.env >= 1.0 { self.env = 1.0; self.phase = AdsrPhase::Decay; }
      }
      AdsrPhase::Decay => {
        let dec = (1.0 - self.s).max(0.0001) / (self.d * self.sr);
        self.env -= dec;
        if self.env <= self.s { self.env = self.s; self.phase = AdsrPhase::Sustain; }
      }
      AdsrPhase::Sustain => {
        // follow the sustain level if it moves while held
        let step = 1.0 / (self.d * self.sr);
        if self.env > self.s { self.env = (self.env - step).max(self.s); }
        else if self.env < self.s { self.env = (self.env + step).min(self.s); }
      }
      AdsrPhase::Release => {
        self.env -= self.release_step;
        if self.env <= 0.0 { self.env = 0.0; self.phase = AdsrPhase::Idle; }
      }
    }
    self.env
  }

  fn begin_release(&mut self) {
    if self.env <= 0.0 { self.phase = AdsrPhase::Idle; return; }
    self.phase = AdsrPhase::Release;
    self.release_step = self.env / (self.r * self.sr);
  }
}

/// One-pole exponential decay used by the drum voices.
#[derive(Clone, Copy, Debug)]
pub struct PercEnv {
  value: f32,
  decay: f32,
  sr: f32,
}

impl PercEnv {
  pub fn new(sr: f32) -> Self { Self { value: 0.0, decay: 0.0, sr } }

  pub fn trigger(&mut self, amplitude: f32, duration_sec: f32) {
    self.value = amplitude;
    self.decay = (-1.0 / (duration_sec.max(MIN_SEG_SEC) * self.sr)).exp();
  }

  #[inline]
  pub fn process(&mut self) -> f32 {
    let out = self.value;
    self.value *= self.decay;
    if self.value < PERC_SNAP { self.value = 0.0; }
    out
  }

  #[inline] pub fn is_active(&self) -> bool { self.value > PERC_ACTIVE }
  #[inline] pub fn value(&self) -> f32 { self.value }
  pub fn clear(&mut self) { self.value = 0.0; }
}
