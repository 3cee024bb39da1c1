//! BMS opcode definitions
//!
//! Note-on opcodes occupy 0x00-0x7F (the opcode byte is the pitch) and
//! note-off opcodes 0x81-0x87 (the low three bits select the voice), so only
//! the remaining fixed bytes are named here. The unknown opcodes come from
//! reverse engineering: their payload lengths are known to keep the stream in
//! sync, their meanings are not.

pub const NOTE_ON_MAX: u8 = 0x7F;
pub const DELAY_U8: u8 = 0x80;
pub const NOTE_OFF_MIN: u8 = 0x81;
pub const NOTE_OFF_MAX: u8 = 0x87;
pub const DELAY_U16: u8 = 0x88;
/// Unknown, appears near the beginning of a track (2 payload bytes)
pub const UNKNOWN_98: u8 = 0x98;
pub const PAN: u8 = 0x9A;
pub const VOLUME: u8 = 0x9C;
/// Unknown, probably pitch bend (2 payload bytes)
pub const UNKNOWN_9E: u8 = 0x9E;
pub const INSTRUMENT: u8 = 0xA4;
/// Unknown (3 payload bytes); a zero third byte ends the track
pub const UNKNOWN_AC: u8 = 0xAC;
/// Unknown (3 payload bytes)
pub const UNKNOWN_AD: u8 = 0xAD;
pub const TRACK_START: u8 = 0xC1;
pub const CALL: u8 = 0xC4;
pub const RETURN: u8 = 0xC6;
/// Goto, used for looping; ignored because MIDI cannot loop
pub const GOTO: u8 = 0xC8;
/// Unknown (7 payload bytes)
pub const UNKNOWN_CB: u8 = 0xCB;
/// Unknown (2 payload bytes)
pub const UNKNOWN_CC: u8 = 0xCC;
/// Unknown (1 payload byte)
pub const UNKNOWN_D6: u8 = 0xD6;
/// Unknown, appears near the beginning of a track (2 payload bytes)
pub const UNKNOWN_E6: u8 = 0xE6;
/// Unknown, appears near the beginning of a track (2 payload bytes)
pub const UNKNOWN_E7: u8 = 0xE7;
/// Unknown (1 payload byte)
pub const UNKNOWN_F4: u8 = 0xF4;
pub const TEMPO: u8 = 0xFD;
pub const TICKS_PER_QNOTE: u8 = 0xFE;
pub const TRACK_END: u8 = 0xFF;

/// Instrument (0xA4) sub-opcodes
pub mod instrument {
    pub const SET_BANK: u8 = 0x20;
    pub const SET_INSTRUMENT: u8 = 0x21;
}

/// Pan (0x9A) sub-opcodes
pub mod pan {
    pub const SET_PAN: u8 = 0x03;
}

/// Volume (0x9C) sub-opcodes
pub mod volume {
    pub const SET_VOLUME: u8 = 0x00;
    /// Vibrato intensity, maybe
    pub const VIBRATO: u8 = 0x09;
}
