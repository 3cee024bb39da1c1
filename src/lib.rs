pub mod bms;
pub mod error;
pub mod instruments;
pub mod midi;

pub use bms::Decoder;
pub use error::Error;
pub use instruments::InstrumentMap;
