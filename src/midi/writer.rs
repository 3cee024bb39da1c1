//! Standard MIDI file writer
//!
//! Wraps finished track buffers in the MThd/MTrk chunk layout. All chunk
//! fields are big-endian.

use super::track::Song;
use crate::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Format 1: multiple simultaneous tracks
const FORMAT_TYPE: u16 = 1;

/// MIDI file writer
pub struct MidiWriter {
    file: File,
}

impl MidiWriter {
    /// Create a new writer
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Write the header chunk followed by one track chunk per track
    pub fn write_song(&mut self, song: &Song) -> Result<()> {
        self.file.write_all(b"MThd")?;
        self.write_u32(6)?;
        self.write_u16(FORMAT_TYPE)?;
        self.write_u16(song.tracks.len() as u16)?;
        self.write_u16(song.division)?;

        for track in &song.tracks {
            self.file.write_all(b"MTrk")?;
            self.write_u32(track.len() as u32)?;
            self.file.write_all(track.data())?;
        }
        self.file.flush()?;
        Ok(())
    }

    fn write_u16(&mut self, val: u16) -> Result<()> {
        self.file.write_all(&val.to_be_bytes())?;
        Ok(())
    }

    fn write_u32(&mut self, val: u32) -> Result<()> {
        self.file.write_all(&val.to_be_bytes())?;
        Ok(())
    }
}
