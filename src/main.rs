use bms2mid::bms::Decoder;
use bms2mid::instruments::InstrumentMap;
use bms2mid::midi::MidiWriter;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bms2mid")]
#[command(version = "0.1.0")]
#[command(about = "BMS sequence to MIDI converter", long_about = None)]
struct Args {
    /// Input .bms file
    input: PathBuf,

    /// Output .mid file
    output: PathBuf,

    /// Text file listing a General MIDI number or instrument name for each
    /// instrument ID, one per line. Optional, but the instruments used in
    /// the MIDI will probably be wrong without it.
    instruments: Option<PathBuf>,
}

fn main() -> Result<(), bms2mid::Error> {
    let args = Args::parse();

    let instruments = match &args.instruments {
        Some(path) => InstrumentMap::from_file(path)?,
        None => InstrumentMap::new(),
    };

    let data = std::fs::read(&args.input)?;
    let song = Decoder::new(&data, &instruments).decode()?;
    MidiWriter::new(&args.output)?.write_song(&song)?;

    Ok(())
}
