//! MIDI track buffers and event encoding

use super::status;

/// Division used when the stream never sets ticks per quarter note
pub const DEFAULT_DIVISION: u16 = 120;

/// A finished conversion: the meta track plus one track per BMS track
#[derive(Debug, Clone)]
pub struct Song {
    /// Ticks per quarter note
    pub division: u16,
    pub tracks: Vec<TrackBuffer>,
}

/// An append-only MIDI track under construction
///
/// Every event is written as a variable-length delta time followed by the raw
/// event bytes, so the buffer can be dropped into an MTrk chunk unchanged.
#[derive(Debug, Clone)]
pub struct TrackBuffer {
    /// Assigned MIDI channel; the meta track has none
    channel: Option<u8>,
    data: Vec<u8>,
}

impl TrackBuffer {
    pub fn new(channel: Option<u8>) -> Self {
        Self {
            channel,
            data: Vec::new(),
        }
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Reassign the track's channel (drum kit selection moves a track to the
    /// percussion channel mid-stream).
    pub fn set_channel(&mut self, channel: u8) {
        self.channel = Some(channel);
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a variable-length quantity: 7-bit groups, most significant
    /// first, continuation bit set on all but the last. Zero encodes as a
    /// single 0x00 byte.
    pub fn write_varlen(&mut self, value: u32) {
        let mut started = false;
        for shift in [28, 21, 14, 7] {
            let group = ((value >> shift) & 0x7F) as u8;
            if started || group != 0 {
                self.data.push(group | 0x80);
                started = true;
            }
        }
        self.data.push((value & 0x7F) as u8);
    }

    pub fn note_on(&mut self, delta: u32, channel: u8, pitch: u8, velocity: u8) {
        self.write_varlen(delta);
        self.data.push(status::NOTE_ON + channel);
        self.data.push(pitch);
        self.data.push(velocity);
    }

    pub fn note_off(&mut self, delta: u32, channel: u8, pitch: u8) {
        self.write_varlen(delta);
        self.data.push(status::NOTE_OFF + channel);
        self.data.push(pitch);
        self.data.push(0);
    }

    pub fn controller(&mut self, delta: u32, channel: u8, controller: u8, value: u8) {
        self.write_varlen(delta);
        self.data.push(status::CONTROLLER + channel);
        self.data.push(controller);
        self.data.push(value);
    }

    pub fn program_change(&mut self, delta: u32, channel: u8, program: u8) {
        self.write_varlen(delta);
        self.data.push(status::PROGRAM_CHANGE + channel);
        self.data.push(program);
    }

    /// Tempo meta event: 24-bit big-endian microseconds per quarter note
    pub fn tempo(&mut self, delta: u32, usec_per_qnote: u32) {
        self.write_varlen(delta);
        self.data.push(status::META);
        self.data.push(status::META_TEMPO);
        self.data.push(3);
        self.data.push(((usec_per_qnote >> 16) & 0xFF) as u8);
        self.data.push(((usec_per_qnote >> 8) & 0xFF) as u8);
        self.data.push((usec_per_qnote & 0xFF) as u8);
    }

    pub fn end_of_track(&mut self, delta: u32) {
        self.write_varlen(delta);
        self.data.push(status::META);
        self.data.push(status::META_END_OF_TRACK);
        self.data.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varlen(value: u32) -> Vec<u8> {
        let mut track = TrackBuffer::new(None);
        track.write_varlen(value);
        track.data
    }

    #[test]
    fn test_varlen_single_byte() {
        assert_eq!(varlen(0), vec![0x00]);
        assert_eq!(varlen(0x40), vec![0x40]);
        assert_eq!(varlen(0x7F), vec![0x7F]);
    }

    #[test]
    fn test_varlen_two_bytes() {
        assert_eq!(varlen(0x80), vec![0x81, 0x00]);
        assert_eq!(varlen(0x2000), vec![0xC0, 0x00]);
        assert_eq!(varlen(0x3FFF), vec![0xFF, 0x7F]);
    }

    #[test]
    fn test_varlen_three_and_four_bytes() {
        assert_eq!(varlen(0x4000), vec![0x81, 0x80, 0x00]);
        assert_eq!(varlen(0x1F_FFFF), vec![0xFF, 0xFF, 0x7F]);
        assert_eq!(varlen(0x20_0000), vec![0x81, 0x80, 0x80, 0x00]);
        assert_eq!(varlen(0x0FFF_FFFF), vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_note_events() {
        let mut track = TrackBuffer::new(Some(2));
        track.note_on(0, 2, 60, 100);
        track.note_off(10, 2, 60);
        assert_eq!(
            track.data,
            vec![0x00, 0x92, 60, 100, 0x0A, 0x82, 60, 0]
        );
    }

    #[test]
    fn test_tempo_event_120_bpm() {
        let mut track = TrackBuffer::new(None);
        track.tempo(0, 60_000_000 / 120);
        assert_eq!(track.data, vec![0x00, 0xFF, 0x51, 0x03, 0x07, 0xA3, 0x20]);
    }

    #[test]
    fn test_end_of_track() {
        let mut track = TrackBuffer::new(None);
        track.end_of_track(0);
        assert_eq!(track.data, vec![0x00, 0xFF, 0x2F, 0x00]);
    }
}
