pub mod decoder;
pub mod opcodes;
pub mod stream;

pub use decoder::Decoder;
pub use stream::BmsStream;
