use freeverb::Freeverb;

use super::filters::OnePoleLP;

/// Stereo reverb: freeverb core running fully wet, a gentle low-pass on each
/// wet channel, and the dry/wet blend done here so `mix == 0` is bit-exact dry.
pub struct Reverb {
  core: Freeverb,
  wet_lp_l: OnePoleLP,
  wet_lp_r: OnePoleLP,
  feedback: f32,
}

impl Reverb {
  const DAMPING: f32 = 0.5;

  pub fn new(sr: f32) -> Self {
    let mut core = Freeverb::new(sr as usize);
    core.set_dampening(Self::DAMPING as f64); core.set_wet(1.0); core.set_dry(0.0); core.set_width(0.9);
    let mut rv = Self { core, wet_lp_l: OnePoleLP::new(0.5), wet_lp_r: OnePoleLP::new(0.5), feedback: 0.0 };
    let lp_amt = 0.5 + 0.5 * Self::DAMPING;
    rv.wet_lp_l.set_hf_damp(lp_amt); rv.wet_lp_r.set_hf_damp(lp_amt);
    rv.set_feedback(0.6);
    rv
  }

  /// Tail length as a 0.2..0.95 feedback amount, handed to the core as its room size.
  pub fn set_feedback(&mut self, fb: f32) {
    let fb = fb.clamp(0.2, 0.95);
    if (fb - self.feedback).abs() > 1e-6 {
      self.feedback = fb;
      self.core.set_room_size(fb as f64);
    }
  }

  #[inline] pub fn feedback(&self) -> f32 { self.feedback }

  #[inline]
  pub fn process(&mut self, l: f32, r: f32, mix: f32) -> (f32, f32) {
    let mix = mix.clamp(0.0, 1.0);
    let (wl, wr) = self.core.tick((l as f64, r as f64));
    let wet_l = self.wet_lp_l.tick(wl as f32);
    let wet_r = self.wet_lp_r.tick(wr as f32);
    (l * (1.0 - mix) + wet_l * mix, r * (1.0 - mix) + wet_r * mix)
  }
}
