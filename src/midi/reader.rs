//! Standard MIDI file reader
//!
//! Parses a MIDI file back into an event model. Used by the `mid2json`
//! inspection tool and by the integration tests to verify converter output.

use super::status;
use crate::error::{Error, Result};
use serde::Serialize;

/// A parsed MIDI file
#[derive(Debug, Clone, Serialize)]
pub struct MidiFile {
    pub format: u16,
    /// Ticks per quarter note
    pub division: u16,
    pub tracks: Vec<Vec<MidiEvent>>,
}

/// A single track event with its delta time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiEvent {
    pub delta: u32,
    #[serde(flatten)]
    pub kind: MidiEventKind,
}

/// A parsed MIDI event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MidiEventKind {
    NoteOn {
        channel: u8,
        pitch: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        pitch: u8,
        velocity: u8,
    },
    PolyPressure {
        channel: u8,
        pitch: u8,
        pressure: u8,
    },
    Controller {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: u8,
        program: u8,
    },
    ChannelPressure {
        channel: u8,
        pressure: u8,
    },
    PitchBend {
        channel: u8,
        value: u16,
    },
    /// Tempo in microseconds per quarter note
    Tempo {
        usec_per_qnote: u32,
    },
    EndOfTrack,
    /// Any other meta event, kept raw
    Meta {
        meta_type: u8,
        data: Vec<u8>,
    },
    SysEx {
        data: Vec<u8>,
    },
}

/// MIDI file reader
pub struct MidiReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MidiReader<'a> {
    /// Create a new reader from raw MIDI data
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Parse the header chunk and all track chunks
    pub fn parse(&mut self) -> Result<MidiFile> {
        if self.read_bytes(4)? != b"MThd" {
            return Err(Error::MidiParse("Invalid MThd magic".into()));
        }
        let header_len = self.read_u32()?;
        if header_len != 6 {
            return Err(Error::MidiParse(format!(
                "Unexpected header length {}",
                header_len
            )));
        }
        let format = self.read_u16()?;
        let num_tracks = self.read_u16()?;
        let division = self.read_u16()?;

        let mut tracks = Vec::with_capacity(num_tracks as usize);
        for _ in 0..num_tracks {
            tracks.push(self.parse_track()?);
        }

        Ok(MidiFile {
            format,
            division,
            tracks,
        })
    }

    fn parse_track(&mut self) -> Result<Vec<MidiEvent>> {
        if self.read_bytes(4)? != b"MTrk" {
            return Err(Error::MidiParse("Invalid MTrk magic".into()));
        }
        let length = self.read_u32()? as usize;
        let end = self.pos + length;
        if end > self.data.len() {
            return Err(Error::MidiParse("Track chunk extends past EOF".into()));
        }

        let mut events = Vec::new();
        let mut running_status: Option<u8> = None;
        while self.pos < end {
            let delta = self.read_varlen()?;
            let kind = self.parse_event(&mut running_status)?;
            let is_end = kind == MidiEventKind::EndOfTrack;
            events.push(MidiEvent { delta, kind });
            if is_end {
                break;
            }
        }
        // The chunk length is authoritative
        self.pos = end;
        Ok(events)
    }

    fn parse_event(&mut self, running_status: &mut Option<u8>) -> Result<MidiEventKind> {
        let first = self.read_u8()?;
        let stat = if first & 0x80 != 0 {
            first
        } else {
            // Data byte: running status reuses the previous status
            self.pos -= 1;
            running_status
                .ok_or_else(|| Error::MidiParse("Data byte with no running status".into()))?
        };

        if stat == status::META {
            let meta_type = self.read_u8()?;
            let length = self.read_varlen()? as usize;
            let data = self.read_bytes(length)?.to_vec();
            return Ok(match meta_type {
                status::META_TEMPO if data.len() == 3 => MidiEventKind::Tempo {
                    usec_per_qnote: ((data[0] as u32) << 16)
                        | ((data[1] as u32) << 8)
                        | data[2] as u32,
                },
                status::META_END_OF_TRACK => MidiEventKind::EndOfTrack,
                _ => MidiEventKind::Meta { meta_type, data },
            });
        }

        if stat == status::SYSEX || stat == status::SYSEX_ESCAPE {
            let length = self.read_varlen()? as usize;
            let data = self.read_bytes(length)?.to_vec();
            *running_status = None;
            return Ok(MidiEventKind::SysEx { data });
        }

        *running_status = Some(stat);
        let channel = stat & 0x0F;
        Ok(match stat & 0xF0 {
            status::NOTE_OFF => MidiEventKind::NoteOff {
                channel,
                pitch: self.read_u8()?,
                velocity: self.read_u8()?,
            },
            status::NOTE_ON => MidiEventKind::NoteOn {
                channel,
                pitch: self.read_u8()?,
                velocity: self.read_u8()?,
            },
            status::POLY_PRESSURE => MidiEventKind::PolyPressure {
                channel,
                pitch: self.read_u8()?,
                pressure: self.read_u8()?,
            },
            status::CONTROLLER => MidiEventKind::Controller {
                channel,
                controller: self.read_u8()?,
                value: self.read_u8()?,
            },
            status::PROGRAM_CHANGE => MidiEventKind::ProgramChange {
                channel,
                program: self.read_u8()?,
            },
            status::CHANNEL_PRESSURE => MidiEventKind::ChannelPressure {
                channel,
                pressure: self.read_u8()?,
            },
            status::PITCH_BEND => {
                let lsb = self.read_u8()? as u16;
                let msb = self.read_u8()? as u16;
                MidiEventKind::PitchBend {
                    channel,
                    value: (msb << 7) | lsb,
                }
            }
            _ => {
                return Err(Error::MidiParse(format!(
                    "Invalid status byte 0x{:02X}",
                    stat
                )))
            }
        })
    }

    /// Read a big-endian variable-length quantity
    fn read_varlen(&mut self) -> Result<u32> {
        let mut val = 0u32;
        loop {
            let b = self.read_u8()?;
            val = (val << 7) | (b & 0x7F) as u32;
            if b & 0x80 == 0 {
                return Ok(val);
            }
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(Error::MidiParse("Unexpected end of data".into()));
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let hi = self.read_u8()? as u16;
        let lo = self.read_u8()? as u16;
        Ok((hi << 8) | lo)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let hi = self.read_u16()? as u32;
        let lo = self.read_u16()? as u32;
        Ok((hi << 16) | lo)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(Error::MidiParse("Unexpected end of data".into()));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}
