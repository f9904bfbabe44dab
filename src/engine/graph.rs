use crate::engine::dsp::looper::Looper;
use crate::engine::dsp::osc::{Osc, OscShape};
use crate::engine::fx::FxChain;
use crate::engine::modules::drum::DrumKit;
use crate::engine::modules::poly::VoicePool;
use crate::engine::params::{InstrumentMode, ParamStore};
use crate::engine::protocol;

/// Frames per audio block. Control messages are applied between blocks.
pub const BLOCK_SIZE: usize = 48;

/// The whole instrument: control state, both voice pools and the effects
/// chain. Built once before the first block; rendering never allocates.
pub struct Engine {
  pub sr: f32,
  pub(crate) params: ParamStore,
  pub(crate) voices: VoicePool,
  pub(crate) drums: DrumKit,
  pub(crate) vibrato: Osc,
  pub(crate) fx: FxChain,
  pub(crate) channel: u8,
}

impl Engine {
  pub fn new(sr: f32) -> Self { Self::with_channel(sr, protocol::channel::SYNTH) }

  pub fn with_channel(sr: f32, channel: u8) -> Self {
    Self::assemble(sr, channel, FxChain::new(sr))
  }

  /// Engine with a looper of `loop_frames` instead of the default eight seconds.
  pub fn with_looper_frames(sr: f32, channel: u8, loop_frames: usize) -> Self {
    Self::assemble(sr, channel, FxChain::with_looper(sr, Looper::with_capacity(loop_frames)))
  }

  fn assemble(sr: f32, channel: u8, fx: FxChain) -> Self {
    let params = ParamStore::new();
    let mut engine = Self {
      sr,
      params,
      voices: VoicePool::new(sr),
      drums: DrumKit::new(sr),
      vibrato: Osc::new(sr, OscShape::Sine, 1.0),
      fx,
      channel: channel & 0x0f,
    };
    engine.sync_derived();
    engine
  }

  /// Recompute every coefficient that depends on the parameter store.
  pub(crate) fn sync_derived(&mut self) {
    self.voices.update_envelopes(&self.params);
    self.vibrato.set_freq(self.params.vibrato_rate_hz);
    self.fx.sync_all(&self.params);
  }

  pub fn params(&self) -> &ParamStore { &self.params }
  pub fn voices(&self) -> &VoicePool { &self.voices }
  pub fn drums(&self) -> &DrumKit { &self.drums }
  pub fn fx(&self) -> &FxChain { &self.fx }
  pub fn looper(&self) -> &Looper { &self.fx.looper }
  pub fn channel(&self) -> u8 { self.channel }

  #[inline]
  pub fn render_frame(&mut self) -> (f32, f32) {
    let vib = self.vibrato.next();
    let mut dry = self.voices.render(&self.params, vib);
    // drums keep decaying in synth mode but are only heard in kit mode
    let drums = self.drums.render();
    if self.params.mode == InstrumentMode::DrumKit { dry += drums; }
    self.fx.process(dry, &self.params)
  }

  /// Interleaved stereo. A trailing odd sample is zeroed.
  pub fn render_interleaved(&mut self, out: &mut [f32]) {
    for frame in out.chunks_mut(2) {
      if frame.len() < 2 { frame[0] = 0.0; continue; }
      let (l, r) = self.render_frame();
      frame[0] = l;
      frame[1] = r;
    }
  }

  /// Planar stereo. Renders `min(left.len(), right.len())` frames.
  pub fn render_planar(&mut self, left: &mut [f32], right: &mut [f32]) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
      let (a, b) = self.render_frame();
      *l = a; *r = b;
    }
  }
}
