use crate::error::DeviceError;

// Everything we ask of the hardware. Samples are always f32, one channel;
// the backend is responsible for fanning mono out to whatever the device has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames_per_buffer: Option<u32>, // None = let the device decide
}

impl OutputConfig {
    pub fn mono(sample_rate: u32, frames_per_buffer: Option<u32>) -> Self {
        Self {
            sample_rate,
            channels: 1,
            frames_per_buffer,
        }
    }
}

/// What the pull callback tells the hardware layer after filling a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pull {
    Continue,
    Complete,
}

// Runs on the audio thread. Must not block, allocate or log.
pub type PullCallback = Box<dyn FnMut(&mut [f32]) -> Pull + Send + 'static>;

pub trait OutputBackend: Send + Sync {
    fn open_output_stream(
        &self,
        config: OutputConfig,
        callback: PullCallback,
    ) -> Result<Box<dyn OutputHandle>, DeviceError>;
}

/// A live hardware stream. Once `close` returns, the callback is never invoked again.
pub trait OutputHandle {
    fn close(self: Box<Self>) -> Result<(), DeviceError>;
}
