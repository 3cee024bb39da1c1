pub mod channel;
pub mod json;
pub mod reader;
pub mod track;
pub mod writer;

pub use channel::ChannelAllocator;
pub use json::MidiJson;
pub use reader::{MidiEvent, MidiEventKind, MidiFile, MidiReader};
pub use track::{Song, TrackBuffer};
pub use writer::MidiWriter;

/// MIDI status, meta-event and controller bytes
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_PRESSURE: u8 = 0xA0;
    pub const CONTROLLER: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;
    pub const SYSEX: u8 = 0xF0;
    pub const SYSEX_ESCAPE: u8 = 0xF7;
    pub const META: u8 = 0xFF;

    pub const META_TEMPO: u8 = 0x51;
    pub const META_END_OF_TRACK: u8 = 0x2F;

    pub const CC_VOLUME: u8 = 0x07;
    pub const CC_PAN: u8 = 0x0A;
}
