use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use thiserror::Error;

use super::{graph::{Engine, BLOCK_SIZE}, messages::EngineMsg};
use crate::config::EngineConfig;

/// Upper bound on control messages applied before each block.
pub const MAX_MSGS_PER_BLOCK: usize = 24;
const FALLBACK_SR: u32 = 48_000;

#[derive(Debug, Error)]
pub enum AudioError {
  #[error("no output device")]
  NoDevice,
  #[error("default output config: {0}")]
  DefaultConfig(#[from] cpal::DefaultStreamConfigError),
  #[error("build output stream: {0}")]
  Build(#[from] cpal::BuildStreamError),
  #[error("start output stream: {0}")]
  Play(#[from] cpal::PlayStreamError),
  #[error("engine already moved into a stream")]
  EngineTaken,
}

/// Owns the engine between blocks: drains the queue, then renders.
/// This is everything the device callback does.
pub struct BlockRenderer {
  engine: Engine,
  rx: Receiver<EngineMsg>,
  channels: usize,
  playing: bool,
  quit: bool,
  scratch: [f32; BLOCK_SIZE * 2],
}

impl BlockRenderer {
  pub fn new(engine: Engine, rx: Receiver<EngineMsg>, channels: usize) -> Self {
    Self { engine, rx, channels: channels.max(1), playing: true, quit: false, scratch: [0.0; BLOCK_SIZE * 2] }
  }

  pub fn engine(&self) -> &Engine { &self.engine }
  pub fn is_playing(&self) -> bool { self.playing && !self.quit }

  fn drain(&mut self) {
    for _ in 0..MAX_MSGS_PER_BLOCK {
      match self.rx.try_recv() {
        Ok(msg) => self.apply(msg),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
      }
    }
  }

  fn apply(&mut self, msg: EngineMsg) {
    match msg {
      EngineMsg::Midi(ev) => self.engine.handle_midi(ev),
      EngineMsg::Transport { playing } => self.playing = playing,
      EngineMsg::Quit => self.quit = true,
    }
  }

  /// Fill a device buffer of `channels`-wide interleaved frames, one block at a time.
  pub fn fill(&mut self, data: &mut [f32]) {
    let ch = self.channels;
    for block in data.chunks_mut(BLOCK_SIZE * ch) {
      self.drain();
      if !self.is_playing() {
        block.fill(0.0);
        continue;
      }
      let frames = block.len() / ch;
      let stereo = &mut self.scratch[..frames * 2];
      self.engine.render_interleaved(stereo);
      for (i, frame) in block.chunks_mut(ch).enumerate() {
        if i >= frames { frame.fill(0.0); continue; }
        let (l, r) = (stereo[2 * i], stereo[2 * i + 1]);
        match frame.len() {
          1 => frame[0] = 0.5 * (l + r),
          _ => {
            frame[0] = l;
            frame[1] = r;
            frame[2..].fill(0.0);
          }
        }
      }
    }
  }
}

// Intentionally not Clone; the engine moves into the audio callback on start.
pub struct AudioEngine {
  tx: Sender<EngineMsg>,
  rx: Receiver<EngineMsg>,
  pub sr: f32,
  engine: Option<Engine>,
  device: cpal::Device,
  config: cpal::StreamConfig,
  stream: Option<cpal::Stream>,
}

impl AudioEngine {
  pub fn new(cfg: &EngineConfig) -> Result<Self, AudioError> {
    let (tx, rx) = unbounded();
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    if let Ok(name) = device.name() { log::info!("output device: {name}"); }
    let supported = choose_config(&device, cfg.sample_rate)?;
    let mut config: cpal::StreamConfig = supported.into();
    if let Some(frames) = cfg.buffer_frames { config.buffer_size = cpal::BufferSize::Fixed(frames); }
    let sr = config.sample_rate.0 as f32;
    log::info!("stream config: {} Hz, {} ch, buffer {:?}", config.sample_rate.0, config.channels, config.buffer_size);

    let mut engine = Engine::with_channel(sr, cfg.midi_channel);
    for ev in &cfg.startup { engine.handle_midi(*ev); }
    if !cfg.startup.is_empty() { log::debug!("applied {} startup events", cfg.startup.len()); }

    Ok(Self { tx, rx, sr, engine: Some(engine), device, config, stream: None })
  }

  pub fn start(&mut self) -> Result<(), AudioError> {
    if self.stream.is_some() { return Ok(()); }
    let engine = self.engine.take().ok_or(AudioError::EngineTaken)?;
    let mut renderer = BlockRenderer::new(engine, self.rx.clone(), self.config.channels as usize);
    let err_fn = |e: cpal::StreamError| log::error!("stream error: {e}");
    let stream = self.device.build_output_stream(
      &self.config,
      move |data: &mut [f32], _| renderer.fill(data),
      err_fn,
      None,
    )?;
    stream.play()?;
    log::info!("audio started");
    self.stream = Some(stream);
    Ok(())
  }

  pub fn stop(&mut self) {
    if self.stream.take().is_some() { log::info!("audio stopped"); }
  }

  pub fn sender(&self) -> Sender<EngineMsg> { self.tx.clone() }
}

/// Stereo f32 at the preferred rate, then 48 kHz, then the device maximum,
/// else whatever the device calls its default.
fn choose_config(device: &cpal::Device, preferred_sr: u32) -> Result<cpal::SupportedStreamConfig, AudioError> {
  let ranges: Vec<cpal::SupportedStreamConfigRange> = match device.supported_output_configs() {
    Ok(it) => it.filter(|r| r.channels() == 2 && r.sample_format() == cpal::SampleFormat::F32).collect(),
    Err(e) => {
      log::warn!("could not query output configs: {e}");
      Vec::new()
    }
  };
  for sr in [preferred_sr, FALLBACK_SR] {
    let hit = ranges.iter().find(|r| r.min_sample_rate().0 <= sr && r.max_sample_rate().0 >= sr);
    if let Some(r) = hit { return Ok(r.clone().with_sample_rate(cpal::SampleRate(sr))); }
  }
  if let Some(r) = ranges.into_iter().next() { return Ok(r.with_max_sample_rate()); }
  log::warn!("no stereo f32 config, using device default");
  Ok(device.default_output_config()?)
}
