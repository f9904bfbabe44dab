use crate::engine::dsp::delay::Echo;
use crate::engine::dsp::looper::Looper;
use crate::engine::dsp::reverb::Reverb;
use crate::engine::dsp::soft_clip;
use crate::engine::dsp::svf::Svf;
use crate::engine::params::ParamStore;

pub const MAX_DELAY_SEC: f32 = 2.0;
pub const MAX_LOOP_SEC: f32 = 8.0;
pub const BASS_BOOST_HZ: f32 = 150.0;

/// Mono-in, stereo-out effects chain:
/// filter -> bass boost -> drive -> delay -> reverb -> looper -> master gain.
pub struct FxChain {
  filter: Svf,
  bass: Svf,
  echo: Echo,
  reverb: Reverb,
  pub looper: Looper,
}

impl FxChain {
  pub fn new(sr: f32) -> Self {
    Self::with_looper(sr, Looper::new(MAX_LOOP_SEC, sr))
  }

  /// Same chain with a caller-sized looper, mostly for short tests.
  pub fn with_looper(sr: f32, looper: Looper) -> Self {
    let mut bass = Svf::new(sr);
    bass.set_params(BASS_BOOST_HZ, 0.707);
    Self { filter: Svf::new(sr), bass, echo: Echo::new(MAX_DELAY_SEC, sr), reverb: Reverb::new(sr), looper }
  }

  pub fn update_filter(&mut self, p: &ParamStore) { self.filter.set_cutoff_res(p.cutoff_hz, p.resonance); }
  pub fn update_delay(&mut self, p: &ParamStore) { self.echo.set_time(p.delay_time_sec); }
  pub fn update_reverb(&mut self, p: &ParamStore) { self.reverb.set_feedback(p.reverb_feedback()); }

  pub fn sync_all(&mut self, p: &ParamStore) {
    self.update_filter(p);
    self.update_delay(p);
    self.update_reverb(p);
  }

  #[inline] pub fn delay_samples(&self) -> usize { self.echo.delay_samples() }
  #[inline] pub fn delay_capacity(&self) -> usize { self.echo.capacity() }
  #[inline] pub fn reverb_feedback(&self) -> f32 { self.reverb.feedback() }

  #[inline]
  pub fn process(&mut self, dry: f32, p: &ParamStore) -> (f32, f32) {
    let (lp, _, _) = self.filter.process(dry);
    let (bass_lp, _, _) = self.bass.process(lp);
    let x = lp + bass_lp * p.bass_boost;
    let x = soft_clip(x, p.drive);
    let x = self.echo.process(x, p.delay_feedback, p.delay_mix);
    let (l, r) = self.reverb.process(x, x, p.reverb_mix);
    let (l, r) = self.looper.process(l, r, p.looper_level);
    (l * p.master_gain, r * p.master_gain)
  }
}
