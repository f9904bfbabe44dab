pub mod engine {
  pub mod messages;
  pub mod params;
  pub mod protocol;
  pub mod graph;
  pub mod control;
  pub mod fx;
  pub mod audio;
  pub mod dsp;
  pub mod modules;
}
pub mod config;
mod demo;

use std::io::{self, BufRead};
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::Sender;

use config::EngineConfig;
use engine::{audio::AudioEngine, messages::{EngineMsg, MidiEvent}, protocol};

/// Let release and reverb tails ring out before the stream is dropped.
const TAIL: Duration = Duration::from_millis(1500);

/// Binary entry: `groovebox [config.json]`. Plays the demo, or with the demo
/// disabled reads one JSON `MidiEvent` per stdin line until EOF.
pub fn run() -> anyhow::Result<()> {
  let path = std::env::args().nth(1);
  let cfg = match &path {
    Some(p) => EngineConfig::load(Path::new(p)).with_context(|| format!("loading config {p}"))?,
    None => EngineConfig::default(),
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cfg.log_filter.as_str()))
    .format_timestamp_millis()
    .init();
  match &path {
    Some(p) => log::info!("config loaded from {p}"),
    None => log::info!("no config given, using defaults"),
  }

  let mut audio = AudioEngine::new(&cfg).context("opening audio output")?;
  audio.start().context("starting audio stream")?;
  let tx = audio.sender();
  let v = protocol::MIDI_PROTOCOL_VERSION;
  log::info!("listening on MIDI channel {} at {} Hz (cc map {}.{})", cfg.midi_channel + 1, audio.sr, v >> 16, v & 0xffff);

  if cfg.demo.enabled {
    demo::play(&tx, &cfg.demo, cfg.midi_channel);
  } else {
    pump_stdin(&tx)?;
  }

  thread::sleep(TAIL);
  let _ = tx.send(EngineMsg::Quit);
  audio.stop();
  Ok(())
}

fn pump_stdin(tx: &Sender<EngineMsg>) -> anyhow::Result<()> {
  log::info!("reading MIDI events from stdin, one JSON object per line");
  for line in io::stdin().lock().lines() {
    let line = line.context("reading stdin")?;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') { continue; }
    match serde_json::from_str::<MidiEvent>(line) {
      Ok(ev) => {
        match ev {
          MidiEvent::ControlChange { controller, value, .. } => match protocol::find_cc(controller) {
            Some(def) => log::debug!("cc {} ({}) = {value}", def.name, def.description),
            None => log::debug!("cc {controller} = {value} (unmapped)"),
          },
          _ => log::debug!("event {ev:?}"),
        }
        if tx.send(ev.into()).is_err() { break; }
      }
      Err(e) => log::warn!("skipping bad event line: {e}"),
    }
  }
  Ok(())
}
