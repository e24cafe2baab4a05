pub mod input;
pub mod mode;
pub mod view;
pub mod waveform;
