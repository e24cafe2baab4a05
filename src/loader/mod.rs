pub mod decoder;
pub mod load_worker;

pub use decoder::{Decode, FileDecoder};
pub use load_worker::{LoadOutcome, Loader};
