//! Instrument conversion table
//!
//! The optional instrument list file maps BMS instrument IDs (the line
//! number, starting at 0) to General MIDI program numbers. Each line is
//! either a decimal program number or the exact name of a General MIDI
//! instrument; the extra "Drum Kit" entry selects the percussion sentinel.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Program value meaning "move this track to the percussion channel"
pub const DRUM_KIT: u8 = 128;

/// General MIDI program names in program-number order, plus the drum kit
/// sentinel as the final entry.
pub const INSTRUMENT_NAMES: [&str; 129] = [
    // Piano
    "Acoustic Grand Piano",
    "Bright Piano",
    "Electric Grand Piano",
    "Honky-tonk Piano",
    "Electric Piano 1",
    "Electric Piano 2",
    "Harpsichord",
    "Clavinet",
    // Melodic Percussion
    "Celesta",
    "Glockenspiel",
    "Music Box",
    "Vibraphone",
    "Marimba",
    "Xylophone",
    "Tubular Bells",
    "Dulcimer",
    // Organ
    "Hammond Organ",
    "Percussive Organ",
    "Rock Organ",
    "Church Organ",
    "Reed Organ",
    "Accordian",
    "Harmonica",
    "Tango Accordian",
    // Guitar
    "Nylon String Guitar",
    "Steel String Guitar",
    "Jazz Guitar",
    "Clean Electric Guitar",
    "Muted Guitar",
    "Overdrive Guitar",
    "Distortion Guitar",
    "Guitar Harmonics",
    // Bass
    "Acoustic Bass",
    "Fingered Bass",
    "Picked Bass",
    "Fretless Bass",
    "Slap Bass 1",
    "Slap Bass 2",
    "Synth Bass 1",
    "Synth Bass 2",
    // String
    "Violin",
    "Viola",
    "Cello",
    "Contrabass",
    "Tremolo Strings",
    "Pizzicato Strings",
    "Orchestral Harp",
    "Timpani",
    // Ensemble
    "String Ensemble 1",
    "String Ensemble 2",
    "Synth Strings 1",
    "Synth Strings 2",
    "Choir Ahh",
    "Choir Oohh",
    "Synth Voice",
    "Orchestral Hit",
    // Brass
    "Trumpet",
    "Trombone",
    "Tuba",
    "Muted Trumpet",
    "French Horn",
    "Brass Section",
    "Synth Brass 1",
    "Synth Brass 2",
    // Reed
    "Soprano Sax",
    "Alto Sax",
    "Tenor Sax",
    "Baritone Sax",
    "Oboe",
    "English Horn",
    "Bassoon",
    "Clarinet",
    // Pipe
    "Piccolo",
    "Flute",
    "Recorder",
    "Pan Flute",
    "Blown Bottle",
    "Shakuhachi",
    "Whistle",
    "Ocarina",
    // Synth Lead
    "Square Lead",
    "Sawtooth Lead",
    "Calliope Lead",
    "Chiff Lead",
    "Charang Lead",
    "Voice Lead",
    "Fifth Lead",
    "Bass & Lead",
    // Synth Pad
    "New Age",
    "Warm",
    "Polysynth",
    "Choir",
    "Bowed",
    "Metallic",
    "Halo",
    "Sweep",
    // Synth FX
    "FX Rain",
    "FX Soundtrack",
    "FX Crystal",
    "FX Atmosphere",
    "FX Brightness",
    "FX Goblins",
    "FX Echo Drops",
    "FX Star Theme",
    // Ethnic
    "Sitar",
    "Banjo",
    "Shamisen",
    "Koto",
    "Kalimba",
    "Bagpipe",
    "Fiddle",
    "Shanai",
    // Percussive
    "Tinkle Bell",
    "Agogo",
    "Steel Drums",
    "Woodblock",
    "Taiko Drum",
    "Melodic Tom",
    "Synth Drum",
    "Reverse Cymbal",
    // Sound Effects
    "Guitar Fret Noise",
    "Breath Noise",
    "Seashore",
    "Bird Tweet",
    "Telephone Ring",
    "Helicopter",
    "Applause",
    "Gunshot",
    "Drum Kit",
];

/// Instrument ID to General MIDI program conversion table
#[derive(Debug, Clone, Default)]
pub struct InstrumentMap {
    programs: Vec<u8>,
}

impl InstrumentMap {
    /// Create an empty map (every instrument ID passes through unchanged)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an instrument list from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load an instrument list, one entry per line. Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut programs = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }
            programs.push(parse_entry(entry)?);
        }
        Ok(Self { programs })
    }

    /// Convert a BMS instrument ID to a General MIDI program number (or
    /// [`DRUM_KIT`]). IDs beyond the end of the list pass through unchanged.
    pub fn convert(&self, instr: u8) -> u8 {
        self.programs.get(instr as usize).copied().unwrap_or(instr)
    }

    /// Number of entries loaded from the list
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

fn parse_entry(entry: &str) -> Result<u8> {
    if let Ok(num) = entry.parse::<i64>() {
        if !(0..=DRUM_KIT as i64).contains(&num) {
            return Err(Error::ProgramOutOfRange(num));
        }
        return Ok(num as u8);
    }
    match INSTRUMENT_NAMES.iter().position(|&name| name == entry) {
        Some(program) => Ok(program as u8),
        None => Err(Error::UnknownInstrument(entry.to_string())),
    }
}
