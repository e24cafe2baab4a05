use std::sync::Arc;

use crate::audio_api::{OutputBackend, OutputConfig, OutputHandle, Pull, PullCallback};
use crate::error::DeviceError;

use super::sample_buffer::TrackBuffer;
use super::stream_state::{SharedStreamState, StreamState};

/// Fill one hardware frame from `samples`, starting at the shared cursor.
///
/// This is the body of the pull callback. It reads `state` first, so a pause
/// or stop issued from the control thread silences the very next frame.
/// The frame that consumes the last real sample is zero-padded, clamps the
/// cursor to the end of the buffer and flips Playing -> Stopped.
pub fn render_frame(samples: &[f32], shared: &SharedStreamState, out: &mut [f32]) -> Pull {
    if shared.state() != StreamState::Playing {
        out.fill(0.0);
        return Pull::Complete;
    }

    let len = samples.len();
    let cursor = shared.cursor();
    if cursor >= len {
        shared.transition(StreamState::Playing, StreamState::Stopped);
        out.fill(0.0);
        return Pull::Complete;
    }

    let end = (cursor + out.len()).min(len);
    let real = end - cursor;
    let volume = shared.volume();
    for (o, s) in out[..real].iter_mut().zip(&samples[cursor..end]) {
        *o = s * volume;
    }
    out[real..].fill(0.0); // end of track inside this frame

    shared.set_cursor(end);
    if end == len {
        shared.transition(StreamState::Playing, StreamState::Stopped);
    }
    Pull::Continue
}

// One track's playback. Owns the hardware handle while live; the samples
// are shared with the waveform and never copied.
pub struct AudioStream {
    buffer: Arc<TrackBuffer>,
    shared: Arc<SharedStreamState>,
    backend: Arc<dyn OutputBackend>,
    frames_per_buffer: Option<u32>,
    handle: Option<Box<dyn OutputHandle>>,
}

impl AudioStream {
    pub fn new(
        buffer: Arc<TrackBuffer>,
        volume: f32,
        backend: Arc<dyn OutputBackend>,
        frames_per_buffer: Option<u32>,
    ) -> Self {
        Self {
            buffer,
            shared: Arc::new(SharedStreamState::new(volume)),
            backend,
            frames_per_buffer,
            handle: None,
        }
    }

    /// (Re)start from the top. Any hardware stream we still hold is closed first.
    /// On a device failure the stream is left Stopped with nothing open.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        if let Err(e) = self.stop() {
            log::warn!("closing previous output stream before restart failed: {e}");
        }

        self.shared.set_cursor(0);
        self.shared.set_state(StreamState::Playing);

        let buffer = Arc::clone(&self.buffer);
        let shared = Arc::clone(&self.shared);
        let callback: PullCallback =
            Box::new(move |out: &mut [f32]| render_frame(buffer.samples(), &shared, out));

        let config = OutputConfig::mono(self.buffer.sample_rate(), self.frames_per_buffer);
        match self.backend.open_output_stream(config, callback) {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.set_state(StreamState::Stopped);
                Err(e)
            }
        }
    }

    // keeps the hardware stream open, the callback just emits silence
    pub fn pause(&self) {
        self.shared.transition(StreamState::Playing, StreamState::Paused);
    }

    pub fn resume(&self) {
        self.shared.transition(StreamState::Paused, StreamState::Playing);
    }

    /// Stop and release the device. Safe to call any number of times.
    pub fn stop(&mut self) -> Result<(), DeviceError> {
        self.shared.set_state(StreamState::Stopped);
        match self.handle.take() {
            Some(handle) => handle.close(),
            None => Ok(()),
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.shared.set_volume(volume);
    }

    pub fn state(&self) -> StreamState {
        self.shared.state()
    }

    pub fn cursor(&self) -> usize {
        self.shared.cursor()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn position(&self) -> f64 {
        self.shared.cursor() as f64 / self.buffer.sample_rate() as f64
    }

    pub fn duration(&self) -> f64 {
        self.buffer.duration_secs()
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("failed to release output stream on drop: {e}");
        }
    }
}
