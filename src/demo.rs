//! Built-in sequencer so the engine can be heard without a controller.
//! The script is plain data; `play` only handles timing.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use crate::config::DemoConfig;
use crate::engine::messages::{EngineMsg, MidiEvent};
use crate::engine::protocol::cc;

const BEATS_PER_BAR: f32 = 4.0;
const CHORDS: [[u8; 3]; 4] = [[57, 60, 64], [53, 57, 60], [48, 52, 55], [55, 59, 62]];
const BASS_OFFSET: u8 = 12;
/// 16-step kit pattern: (note, steps).
const PATTERN: [(u8, u16); 4] = [
  (36, 0b1000_0000_1010_0000),
  (38, 0b0000_1000_0000_1000),
  (42, 0b1010_1010_1010_1010),
  (46, 0b0000_0000_0000_0010),
];

pub type Step = (f32, MidiEvent);

/// Timed events for the whole demo, sorted by time in seconds.
pub fn script(cfg: &DemoConfig, channel: u8) -> Vec<Step> {
  let beat = 60.0 / cfg.bpm;
  let bar = beat * BEATS_PER_BAR;
  let bars = ((cfg.seconds / bar).floor() as usize).max(2);
  let synth_bars = bars / 2;
  let mut out: Vec<Step> = Vec::new();
  let mut push = |t: f32, ev: MidiEvent| out.push((t, ev));

  for (ctrl, val) in [(cc::REVERB_MIX, 40), (cc::REVERB_TIME, 90), (cc::DELAY_TIME, 48), (cc::DELAY_FEEDBACK, 50),
    (cc::DELAY_MIX, 25), (cc::MODWHEEL, 30), (cc::INSTRUMENT_MODE, 0)] {
    push(0.0, MidiEvent::cc(channel, ctrl, val));
  }

  for b in 0..synth_bars {
    let t0 = b as f32 * bar;
    let chord = CHORDS[b % CHORDS.len()];
    let sweep = 30 + (70 * (b + 1) / synth_bars) as u8;
    push(t0, MidiEvent::cc(channel, cc::CUTOFF, sweep));
    push(t0, MidiEvent::cc(channel, cc::SUSTAIN_PEDAL, 127));
    for n in chord { push(t0, MidiEvent::note_on(channel, n, 90)); }
    push(t0, MidiEvent::note_on(channel, chord[0] - BASS_OFFSET, 110));
    // keys up early; the pedal carries the chord to the end of the bar
    let up = t0 + beat;
    for n in chord { push(up, MidiEvent::note_off(channel, n)); }
    push(up, MidiEvent::note_off(channel, chord[0] - BASS_OFFSET));
    push(t0 + bar - beat * 0.25, MidiEvent::cc(channel, cc::SUSTAIN_PEDAL, 0));
  }

  let drum_start = synth_bars as f32 * bar;
  push(drum_start, MidiEvent::cc(channel, cc::INSTRUMENT_MODE, 127));
  push(drum_start, MidiEvent::cc(channel, cc::LOOPER_CONTROL, 50));
  push(drum_start + bar, MidiEvent::cc(channel, cc::LOOPER_CONTROL, 50));
  let step = beat / 4.0;
  for b in synth_bars..bars {
    let t0 = b as f32 * bar;
    for (note, mask) in PATTERN {
      for s in 0..16 {
        if mask & (0x8000 >> s) != 0 {
          let accent = if s % 4 == 0 { 120 } else { 85 };
          push(t0 + s as f32 * step, MidiEvent::note_on(channel, note, accent));
        }
      }
    }
  }
  let end = bars as f32 * bar;
  push(end, MidiEvent::cc(channel, cc::LOOPER_CONTROL, 0));
  push(end, MidiEvent::cc(channel, cc::INSTRUMENT_MODE, 0));

  out.sort_by(|a, b| a.0.total_cmp(&b.0));
  out
}

/// Sends the script in real time. Returns early if the audio side hangs up.
pub fn play(tx: &Sender<EngineMsg>, cfg: &DemoConfig, channel: u8) {
  let steps = script(cfg, channel);
  let total = steps.last().map(|s| s.0).unwrap_or(0.0);
  log::info!("demo: {} events over {:.1}s at {} bpm", steps.len(), total, cfg.bpm);
  let start = Instant::now();
  for (t, ev) in steps {
    let due = start + Duration::from_secs_f32(t);
    let now = Instant::now();
    if due > now { thread::sleep(due - now); }
    if let MidiEvent::ControlChange { controller: cc::INSTRUMENT_MODE, value, .. } = ev {
      log::info!("demo: {} mode", if value >= 64 { "drum kit" } else { "poly synth" });
    }
    if tx.send(ev.into()).is_err() {
      log::warn!("demo: audio side closed, stopping");
      return;
    }
  }
  log::info!("demo finished");
}
