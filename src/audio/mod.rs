use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{OutputBackend, OutputConfig, OutputHandle, PullCallback};
use crate::error::DeviceError;

mod sample_buffer;
mod stream;
mod stream_state;

#[cfg(test)]
pub mod test_backend;

pub use sample_buffer::TrackBuffer;
pub use stream::AudioStream;
pub use stream_state::{StreamState, clamp_volume};

// The real hardware: one cpal output stream per open request, on whatever
// the default output device is at that moment.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalBackend;

impl OutputBackend for CpalBackend {
    fn open_output_stream(
        &self,
        config: OutputConfig,
        callback: PullCallback,
    ) -> Result<Box<dyn OutputHandle>, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| DeviceError::Config(e.to_string()))?;

        if supported.sample_format() != cpal::SampleFormat::F32 {
            // only f32 for now, same as the pull callback
            return Err(DeviceError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        // we hand the device mono and fan it out, so keep its native channel count
        let mut stream_config: cpal::StreamConfig = supported.into();
        stream_config.sample_rate = config.sample_rate;
        if let Some(frames) = config.frames_per_buffer {
            stream_config.buffer_size = cpal::BufferSize::Fixed(frames);
        }

        let stream = build_output_stream_f32(&device, &stream_config, callback)?;
        stream.play().map_err(|e| DeviceError::Play(e.to_string()))?;

        log::debug!(
            "opened output stream: {} Hz, {} ch, buffer {:?}",
            config.sample_rate,
            stream_config.channels,
            stream_config.buffer_size
        );
        Ok(Box::new(CpalHandle { stream }))
    }
}

struct CpalHandle {
    stream: cpal::Stream,
}

impl OutputHandle for CpalHandle {
    fn close(self: Box<Self>) -> Result<(), DeviceError> {
        let CpalHandle { stream } = *self;
        let paused = stream.pause();
        drop(stream); // no callbacks after this returns
        paused.map_err(|e| DeviceError::Close(e.to_string()))
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut callback: PullCallback,
) -> Result<cpal::Stream, DeviceError> {
    let channels = config.channels as usize;
    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let n_frames = data.len() / channels;
                // "complete" is only a hint here: we keep emitting silence until closed
                let _ = callback(&mut data[..n_frames]);
                fan_out_mono(data, n_frames, channels);
            },
            err_fn,
            None,
        )
        .map_err(|e| DeviceError::Build(e.to_string()))?;

    Ok(stream)
}

// The mono frame sits in data[..n_frames]; spread it across every channel in place.
// Walking backwards means we never overwrite a sample we still need to read.
fn fan_out_mono(data: &mut [f32], n_frames: usize, channels: usize) {
    if channels <= 1 {
        return;
    }
    for i in (0..n_frames).rev() {
        let s = data[i];
        for c in 0..channels {
            data[i * channels + c] = s;
        }
    }
}
