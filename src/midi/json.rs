//! JSON serialization types for MIDI data

use super::reader::{MidiEvent, MidiFile};
use serde::Serialize;

/// Top-level JSON structure for a MIDI file
#[derive(Debug, Clone, Serialize)]
pub struct MidiJson {
    pub format: u16,
    /// Ticks per quarter note
    pub division: u16,
    pub num_tracks: usize,
    pub tracks: Vec<TrackJson>,
}

/// JSON representation of one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackJson {
    pub num_events: usize,
    pub events: Vec<MidiEvent>,
}

impl MidiJson {
    /// Create a MidiJson from a parsed MIDI file
    pub fn new(midi: &MidiFile) -> Self {
        Self {
            format: midi.format,
            division: midi.division,
            num_tracks: midi.tracks.len(),
            tracks: midi
                .tracks
                .iter()
                .map(|events| TrackJson {
                    num_events: events.len(),
                    events: events.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::reader::MidiEventKind;

    #[test]
    fn test_events_serialize_tagged() {
        let event = MidiEvent {
            delta: 10,
            kind: MidiEventKind::NoteOn {
                channel: 9,
                pitch: 59,
                velocity: 100,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"delta":10,"event":"note_on","channel":9,"pitch":59,"velocity":100}"#
        );
    }

    #[test]
    fn test_end_of_track_serializes_without_fields() {
        let event = MidiEvent {
            delta: 0,
            kind: MidiEventKind::EndOfTrack,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"delta":0,"event":"end_of_track"}"#);
    }
}
