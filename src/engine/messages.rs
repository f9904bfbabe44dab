use serde::Deserialize;

/// Decoded MIDI channel-voice message as delivered by the transport.
/// Channels are zero-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum MidiEvent {
  NoteOn { channel: u8, note: u8, velocity: u8 },
  NoteOff { channel: u8, note: u8, velocity: u8 },
  ControlChange { channel: u8, controller: u8, value: u8 },
  /// Raw 7-bit halves of the 14-bit bend value.
  PitchBend { channel: u8, lsb: u8, msb: u8 },
}

impl MidiEvent {
  pub fn channel(&self) -> u8 {
    match *self {
      MidiEvent::NoteOn { channel, .. }
      | MidiEvent::NoteOff { channel, .. }
      | MidiEvent::ControlChange { channel, .. }
      | MidiEvent::PitchBend { channel, .. } => channel,
    }
  }

  #[inline]
  pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self { Self::NoteOn { channel, note, velocity } }
  #[inline]
  pub fn note_off(channel: u8, note: u8) -> Self { Self::NoteOff { channel, note, velocity: 0 } }
  #[inline]
  pub fn cc(channel: u8, controller: u8, value: u8) -> Self { Self::ControlChange { channel, controller, value } }

  /// Splits a 0..16383 bend value into its wire halves.
  #[inline]
  pub fn pitch_bend(channel: u8, value14: u16) -> Self {
    let v = value14.min(16383);
    Self::PitchBend { channel, lsb: (v & 0x7f) as u8, msb: (v >> 7) as u8 }
  }
}

/// Everything the control side can send into the audio callback.
#[derive(Clone, Debug)]
pub enum EngineMsg {
  Midi(MidiEvent),
  Transport { playing: bool },
  Quit,
}

impl From<MidiEvent> for EngineMsg {
  fn from(ev: MidiEvent) -> Self { EngineMsg::Midi(ev) }
}
