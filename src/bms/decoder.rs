//! BMS event stream decoder
//!
//! The BMS stream is bytecode for a small sequencer virtual machine: each
//! opcode either emits a musical event, accumulates delay, or redirects the
//! program counter (track start, subroutine call/return). Decoding starts in
//! meta mode at offset 0; a track-start opcode saves the position, seeks to
//! the track body and switches to track mode until that track's end opcode
//! restores the saved position. Subroutine calls nest up to
//! [`CALL_STACK_LIMIT`] deep, independently of the meta/track mode.
//!
//! Delay opcodes accumulate into a pending delta time which the next emitted
//! MIDI event consumes; opcodes that emit nothing leave it untouched.

use super::opcodes;
use super::stream::BmsStream;
use crate::error::{Error, Result};
use crate::instruments::{InstrumentMap, DRUM_KIT};
use crate::midi::channel::{ChannelAllocator, PERCUSSION_CHANNEL};
use crate::midi::status;
use crate::midi::track::{Song, TrackBuffer, DEFAULT_DIVISION};

/// Maximum nesting depth for BMS subroutine calls
pub const CALL_STACK_LIMIT: usize = 4;

/// Number of voice slots addressed by note on/off events
pub const VOICE_COUNT: usize = 8;

/// Index of the meta track, created before decoding starts
const META_TRACK: usize = 0;

/// BMS stream decoder state
pub struct Decoder<'a> {
    stream: BmsStream<'a>,
    instruments: &'a InstrumentMap,
    tracks: Vec<TrackBuffer>,
    channels: ChannelAllocator,
    /// Pitches currently sounding, by voice slot
    voices: [Option<u8>; VOICE_COUNT],
    /// Pending delta time in MIDI ticks
    delay: u32,
    /// Index of the track receiving events
    current: usize,
    /// True while the program counter is inside a track body
    in_track: bool,
    /// Position to restore when the current track ends
    saved_pos: usize,
    call_stack: Vec<usize>,
    ticks_per_qnote: Option<u16>,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8], instruments: &'a InstrumentMap) -> Self {
        Self {
            stream: BmsStream::new(data),
            instruments,
            tracks: vec![TrackBuffer::new(None)],
            channels: ChannelAllocator::new(),
            voices: [None; VOICE_COUNT],
            delay: 0,
            current: META_TRACK,
            in_track: false,
            saved_pos: 0,
            call_stack: Vec::new(),
            ticks_per_qnote: None,
        }
    }

    /// Run the stream to completion and return the finished song
    pub fn decode(mut self) -> Result<Song> {
        loop {
            let addr = self.stream.position();
            let op = self.stream.read_u8()?;
            match op {
                0x00..=opcodes::NOTE_ON_MAX => self.op_note_on(op)?,
                opcodes::DELAY_U8 => self.delay += self.stream.read_u8()? as u32,
                opcodes::NOTE_OFF_MIN..=opcodes::NOTE_OFF_MAX => self.op_note_off(op & 7)?,
                opcodes::DELAY_U16 => self.delay += self.stream.read_u16()? as u32,
                opcodes::UNKNOWN_98 | opcodes::UNKNOWN_E6 | opcodes::UNKNOWN_E7 => {
                    self.stream.skip(2)?
                }
                opcodes::PAN => self.op_pan()?,
                opcodes::VOLUME => self.op_volume()?,
                opcodes::UNKNOWN_9E => self.stream.skip(2)?,
                opcodes::INSTRUMENT => self.op_instrument()?,
                opcodes::UNKNOWN_AC => {
                    self.stream.skip(2)?;
                    // A zero third byte behaves like an explicit end of track
                    if self.stream.read_u8()? == 0 && self.op_track_end()? {
                        break;
                    }
                }
                opcodes::UNKNOWN_AD => self.stream.skip(3)?,
                opcodes::TRACK_START => self.op_track_start()?,
                opcodes::CALL => self.op_call()?,
                opcodes::RETURN => self.op_return()?,
                // Goto is only used for looping; MIDI cannot loop, so the
                // target is discarded and decoding continues linearly.
                opcodes::GOTO => self.stream.skip(4)?,
                opcodes::UNKNOWN_CB => self.stream.skip(7)?,
                opcodes::UNKNOWN_CC => self.stream.skip(2)?,
                opcodes::UNKNOWN_D6 | opcodes::UNKNOWN_F4 => self.stream.skip(1)?,
                opcodes::TEMPO => self.op_tempo(addr)?,
                opcodes::TICKS_PER_QNOTE => self.op_ticks_per_qnote()?,
                opcodes::TRACK_END => {
                    if self.op_track_end()? {
                        break;
                    }
                }
                _ => return Err(Error::UnknownOpcode { opcode: op, addr }),
            }
        }
        Ok(Song {
            division: self.ticks_per_qnote.unwrap_or(DEFAULT_DIVISION),
            tracks: self.tracks,
        })
    }

    /// Take the pending delay, leaving zero behind
    fn take_delay(&mut self) -> u32 {
        std::mem::take(&mut self.delay)
    }

    fn current_channel(&self) -> Result<u8> {
        self.tracks[self.current]
            .channel()
            .ok_or(Error::EventOutsideTrack(self.stream.position()))
    }

    // 0x00-0x7F: the opcode byte is the pitch
    fn op_note_on(&mut self, pitch: u8) -> Result<()> {
        let voice = self.stream.read_u8()?;
        let volume = self.stream.read_u8()?;
        if voice as usize >= VOICE_COUNT {
            return Err(Error::VoiceOutOfRange(voice));
        }
        let channel = self.current_channel()?;
        // Percussion note numbers are off by one from General MIDI drum
        // kits; shifting down gets them reasonably close.
        let pitch = if channel == PERCUSSION_CHANNEL {
            pitch.wrapping_sub(1)
        } else {
            pitch
        };
        let delta = self.take_delay();
        self.tracks[self.current].note_on(delta, channel, pitch, volume);
        self.voices[voice as usize] = Some(pitch);
        Ok(())
    }

    // 0x81-0x87: releases the pitch stored in the voice slot
    fn op_note_off(&mut self, voice: u8) -> Result<()> {
        let pitch = self.voices[voice as usize]
            .take()
            .ok_or(Error::VoiceNotSounding(voice))?;
        let channel = self.current_channel()?;
        let delta = self.take_delay();
        self.tracks[self.current].note_off(delta, channel, pitch);
        Ok(())
    }

    // 0x9A
    fn op_pan(&mut self) -> Result<()> {
        let sub = self.stream.read_u8()?;
        if sub == opcodes::pan::SET_PAN {
            let pan = self.stream.read_u8()?;
            let _duration = self.stream.read_u8()?;
            let channel = self.current_channel()?;
            let delta = self.take_delay();
            self.tracks[self.current].controller(delta, channel, status::CC_PAN, pan);
        } else {
            self.stream.skip(2)?;
        }
        Ok(())
    }

    // 0x9C
    fn op_volume(&mut self) -> Result<()> {
        let sub = self.stream.read_u8()?;
        match sub {
            opcodes::volume::SET_VOLUME => {
                let volume = self.stream.read_u8()?;
                let _duration = self.stream.read_u8()?;
                let channel = self.current_channel()?;
                let delta = self.take_delay();
                self.tracks[self.current].controller(delta, channel, status::CC_VOLUME, volume);
            }
            // Vibrato intensity and the remaining sub-opcodes carry two
            // bytes with no MIDI counterpart.
            _ => self.stream.skip(2)?,
        }
        Ok(())
    }

    // 0xA4
    fn op_instrument(&mut self) -> Result<()> {
        let sub = self.stream.read_u8()?;
        match sub {
            opcodes::instrument::SET_BANK => {
                self.stream.skip(1)?;
            }
            opcodes::instrument::SET_INSTRUMENT => {
                let instr = self.stream.read_u8()?;
                let mut program = self.instruments.convert(instr);
                let mut channel = self.current_channel()?;
                if program == DRUM_KIT {
                    channel = self.channels.force_percussion(channel)?;
                    self.tracks[self.current].set_channel(channel);
                    program = 0;
                }
                let delta = self.take_delay();
                self.tracks[self.current].program_change(delta, channel, program);
            }
            _ => {
                // TODO: sub-opcode 0x07 shows up in real data; meaning unknown
                self.stream.skip(1)?;
            }
        }
        Ok(())
    }

    // 0xC1: saves the current position, seeks to the track body and opens a
    // new track on a fresh channel
    fn op_track_start(&mut self) -> Result<()> {
        self.stream.read_u8()?; // track id, unused
        let offset = self.stream.read_u24()? as usize;
        self.saved_pos = self.stream.position();
        self.stream.seek(offset);
        let channel = self.channels.acquire()?;
        self.tracks.push(TrackBuffer::new(Some(channel)));
        self.current = self.tracks.len() - 1;
        self.in_track = true;
        Ok(())
    }

    // 0xC4
    fn op_call(&mut self) -> Result<()> {
        let dest = self.stream.read_u32()? as usize;
        if self.call_stack.len() >= CALL_STACK_LIMIT {
            return Err(Error::CallStackOverflow);
        }
        self.call_stack.push(self.stream.position());
        self.stream.seek(dest);
        Ok(())
    }

    // 0xC6
    fn op_return(&mut self) -> Result<()> {
        let dest = self
            .call_stack
            .pop()
            .ok_or(Error::ReturnOutsideSubroutine)?;
        self.stream.seek(dest);
        Ok(())
    }

    // 0xFD: only meaningful at the top level
    fn op_tempo(&mut self, addr: usize) -> Result<()> {
        let bpm = self.stream.read_u16()?;
        if self.in_track {
            eprintln!("Warning: setting tempo within a track is not supported");
            return Ok(());
        }
        if bpm == 0 {
            return Err(Error::ZeroTempo(addr));
        }
        let usec_per_qnote = 60_000_000 / bpm as u32;
        let delta = self.take_delay();
        self.tracks[META_TRACK].tempo(delta, usec_per_qnote);
        Ok(())
    }

    // 0xFE: first writer wins
    fn op_ticks_per_qnote(&mut self) -> Result<()> {
        let val = self.stream.read_u16()?;
        if self.ticks_per_qnote.is_some() {
            eprintln!("Warning: ticks per quarter note already set, ignoring");
        } else {
            self.ticks_per_qnote = Some(val);
        }
        Ok(())
    }

    /// 0xFF: close the current track, or in meta mode finish the run.
    /// Returns true when decoding is complete.
    fn op_track_end(&mut self) -> Result<bool> {
        let delta = self.take_delay();
        if self.in_track {
            self.tracks[self.current].end_of_track(delta);
            self.stream.seek(self.saved_pos);
            self.current = META_TRACK;
            self.in_track = false;
            Ok(false)
        } else {
            self.tracks[META_TRACK].end_of_track(delta);
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(data: &[u8]) -> Result<Song> {
        let map = InstrumentMap::new();
        Decoder::new(data, &map).decode()
    }

    #[test]
    fn test_empty_stream_is_meta_track_only() {
        let song = decode(&[0xFF]).unwrap();
        assert_eq!(song.division, 120);
        assert_eq!(song.tracks.len(), 1);
        assert_eq!(song.tracks[0].data(), &[0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_delay_accumulates_until_emitted_event() {
        // Track body: two delays separated by a consume-only opcode, then a
        // note that picks up the full sum as its delta.
        let song = decode(&[
            0xC1, 0x00, 0x00, 0x00, 0x06, // track start -> offset 6
            0xFF, // meta end
            0x80, 0x05, // delay 5
            0xCC, 0xAA, 0xBB, // unknown, no event
            0x88, 0x01, 0x2C, // delay 300
            0x3C, 0x00, 0x64, // note on
            0xFF, // track end
        ])
        .unwrap();
        let track = song.tracks[1].data();
        // 305 = 0x131 -> varlen [0x82, 0x31]
        assert_eq!(&track[..5], &[0x82, 0x31, 0x90, 0x3C, 0x64]);
    }

    #[test]
    fn test_end_of_track_consumes_pending_delay() {
        let song = decode(&[
            0xC1, 0x00, 0x00, 0x00, 0x06, // track start
            0xFF, // meta end
            0x80, 0x0A, // delay 10
            0xFF, // track end
        ])
        .unwrap();
        assert_eq!(song.tracks[1].data(), &[0x0A, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_ticks_per_qnote_first_writer_wins() {
        let song = decode(&[0xFE, 0x00, 0x60, 0xFE, 0x01, 0x00, 0xFF]).unwrap();
        assert_eq!(song.division, 96);
    }

    #[test]
    fn test_tempo_inside_track_is_ignored() {
        let song = decode(&[
            0xC1, 0x00, 0x00, 0x00, 0x06, // track start
            0xFF, // meta end
            0xFD, 0x00, 0x78, // tempo 120 inside the track
            0xFF, // track end
        ])
        .unwrap();
        // Meta track carries only its end marker
        assert_eq!(song.tracks[0].data(), &[0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_zero_tempo_is_fatal() {
        let err = decode(&[0xFD, 0x00, 0x00, 0xFF]).unwrap_err();
        assert!(matches!(err, Error::ZeroTempo(0)));
    }

    #[test]
    fn test_unknown_opcode_is_fatal() {
        let err = decode(&[0xE0, 0xFF]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownOpcode {
                opcode: 0xE0,
                addr: 0
            }
        ));
    }

    #[test]
    fn test_note_off_on_empty_voice_is_fatal() {
        let err = decode(&[0x85]).unwrap_err();
        assert!(matches!(err, Error::VoiceNotSounding(5)));
    }

    #[test]
    fn test_voice_index_out_of_range_is_fatal() {
        let err = decode(&[0x3C, 0x08, 0x64]).unwrap_err();
        assert!(matches!(err, Error::VoiceOutOfRange(8)));
    }

    #[test]
    fn test_note_outside_any_track_is_fatal() {
        let err = decode(&[0x3C, 0x00, 0x64]).unwrap_err();
        assert!(matches!(err, Error::EventOutsideTrack(_)));
    }

    #[test]
    fn test_call_stack_overflow_is_fatal() {
        // Five chained calls, each to the next instruction
        let mut data = Vec::new();
        for i in 1..=5u32 {
            data.push(0xC4);
            data.extend_from_slice(&(i * 5).to_be_bytes());
        }
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, Error::CallStackOverflow));
    }

    #[test]
    fn test_return_outside_subroutine_is_fatal() {
        let err = decode(&[0xC6]).unwrap_err();
        assert!(matches!(err, Error::ReturnOutsideSubroutine));
    }

    #[test]
    fn test_truncated_payload_is_fatal() {
        let err = decode(&[0x80]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof(_)));
    }
}
