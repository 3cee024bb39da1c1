use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unhandled BMS event 0x{opcode:02X} at address 0x{addr:X}")]
    UnknownOpcode { opcode: u8, addr: usize },

    #[error("Unexpected end of BMS data at address 0x{0:X}")]
    UnexpectedEof(usize),

    #[error("Voice index {0} out of range")]
    VoiceOutOfRange(u8),

    #[error("Note off for voice {0} with no active note")]
    VoiceNotSounding(u8),

    #[error("Call stack limit reached")]
    CallStackOverflow,

    #[error("Attempted to return outside of subroutine")]
    ReturnOutsideSubroutine,

    #[error("Cannot use more than 16 MIDI channels")]
    ChannelsExhausted,

    #[error("Percussion channel already in use by another track")]
    PercussionChannelTaken,

    #[error("Channel event at address 0x{0:X} outside of any track")]
    EventOutsideTrack(usize),

    #[error("Tempo of 0 BPM at address 0x{0:X}")]
    ZeroTempo(usize),

    #[error("Unknown instrument '{0}'")]
    UnknownInstrument(String),

    #[error("Instrument program {0} out of range (0-128)")]
    ProgramOutOfRange(i64),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
