//! MIDI channel and controller assignments shared with the key controller
//! firmware. This table is the contract; change it on both ends together.

/// Bumped whenever the table below changes (major.minor in the two halves).
pub const MIDI_PROTOCOL_VERSION: u32 = 0x0001_0002;

/// Channels are zero-based as they appear on the wire.
pub mod channel {
  /// MIDI channel 1: synth notes and all CCs.
  pub const SYNTH: u8 = 0;
  /// Reserved: dedicated drum channel.
  pub const DRUM: u8 = 1;
  /// Reserved: transport/looper control.
  pub const CTRL: u8 = 9;
}

pub mod cc {
  pub const MODWHEEL: u8 = 1;
  pub const VOLUME: u8 = 7;
  pub const SUSTAIN_PEDAL: u8 = 64;
  pub const CUTOFF: u8 = 70;
  pub const RESONANCE: u8 = 71;
  pub const ATTACK: u8 = 72;
  pub const DECAY: u8 = 73;
  pub const SUSTAIN: u8 = 74;
  pub const RELEASE: u8 = 75;
  pub const VIBRATO_RATE: u8 = 76;
  pub const DELAY_TIME: u8 = 77;
  pub const DELAY_FEEDBACK: u8 = 78;
  pub const DELAY_MIX: u8 = 79;
  pub const REVERB_MIX: u8 = 80;
  pub const REVERB_TIME: u8 = 81;
  pub const BASS_BOOST: u8 = 84;
  pub const DRIVE: u8 = 85;
  /// 0 = poly synth, >= 64 = drum kit.
  pub const INSTRUMENT_MODE: u8 = 90;
  /// < 20 stop, 20..=79 record toggle, >= 80 play toggle.
  pub const LOOPER_CONTROL: u8 = 91;
  pub const LOOPER_LEVEL: u8 = 92;
}

#[derive(Clone, Copy, Debug)]
pub struct MidiCcDefinition {
  pub number: u8,
  pub name: &'static str,
  pub description: &'static str,
}

pub const MIDI_CC_TABLE: &[MidiCcDefinition] = &[
  MidiCcDefinition { number: cc::MODWHEEL, name: "Mod", description: "Mod wheel / joystick Y" },
  MidiCcDefinition { number: cc::VOLUME, name: "Vol", description: "Master volume" },
  MidiCcDefinition { number: cc::SUSTAIN_PEDAL, name: "Sus", description: "Sustain pedal" },
  MidiCcDefinition { number: cc::CUTOFF, name: "Cut", description: "Filter cutoff" },
  MidiCcDefinition { number: cc::RESONANCE, name: "Res", description: "Filter resonance" },
  MidiCcDefinition { number: cc::ATTACK, name: "Atk", description: "Envelope attack" },
  MidiCcDefinition { number: cc::DECAY, name: "Dec", description: "Envelope decay" },
  MidiCcDefinition { number: cc::SUSTAIN, name: "SusLvl", description: "Envelope sustain" },
  MidiCcDefinition { number: cc::RELEASE, name: "Rel", description: "Envelope release" },
  MidiCcDefinition { number: cc::VIBRATO_RATE, name: "Vib", description: "Vibrato rate" },
  MidiCcDefinition { number: cc::DELAY_TIME, name: "DlyT", description: "Delay time" },
  MidiCcDefinition { number: cc::DELAY_FEEDBACK, name: "DlyF", description: "Delay feedback" },
  MidiCcDefinition { number: cc::DELAY_MIX, name: "DlyM", description: "Delay mix" },
  MidiCcDefinition { number: cc::REVERB_MIX, name: "RevM", description: "Reverb mix" },
  MidiCcDefinition { number: cc::REVERB_TIME, name: "RevT", description: "Reverb time" },
  MidiCcDefinition { number: cc::BASS_BOOST, name: "Bass", description: "Bass boost" },
  MidiCcDefinition { number: cc::DRIVE, name: "Drv", description: "Drive" },
  MidiCcDefinition { number: cc::INSTRUMENT_MODE, name: "Mode", description: "Instrument mode" },
  MidiCcDefinition { number: cc::LOOPER_CONTROL, name: "LoopCtl", description: "Looper transport" },
  MidiCcDefinition { number: cc::LOOPER_LEVEL, name: "LoopLvl", description: "Looper playback level" },
];

pub fn find_cc(number: u8) -> Option<&'static MidiCcDefinition> {
  MIDI_CC_TABLE.iter().find(|d| d.number == number)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_numbers_are_unique() {
    for (i, a) in MIDI_CC_TABLE.iter().enumerate() {
      for b in &MIDI_CC_TABLE[i + 1..] { assert_ne!(a.number, b.number, "{} vs {}", a.name, b.name); }
    }
  }

  #[test]
  fn lookup_known_and_unknown() {
    assert_eq!(find_cc(cc::CUTOFF).map(|d| d.name), Some("Cut"));
    assert!(find_cc(2).is_none());
  }
}
