use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::TrackBuffer;
use crate::error::DecodeError;

/// Turns a file into a mono buffer at its native sample rate.
/// Runs on a load worker, never on the audio thread.
pub trait Decode: Send + Sync {
    fn decode(&self, path: &Path) -> Result<TrackBuffer, DecodeError>;
}

// wavs go through hound, everything else through symphonia
#[derive(Clone, Copy, Debug, Default)]
pub struct FileDecoder;

impl Decode for FileDecoder {
    fn decode(&self, path: &Path) -> Result<TrackBuffer, DecodeError> {
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if is_wav {
            load_wav(path)
        } else {
            load_with_symphonia(path)
        }
    }
}

// Load a WAV file from disk into a mono buffer
pub fn load_wav(path: &Path) -> Result<TrackBuffer, DecodeError> {
    let file = File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = hound::WavReader::new(std::io::BufReader::new(file))
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader // float, just pass it through
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?,
        hound::SampleFormat::Int => {
            // int, scale by the largest value the bit depth can hold
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| DecodeError::Corrupt(e.to_string()))?
        }
    };

    TrackBuffer::new(downmix(&samples, spec.channels as usize), spec.sample_rate)
}

pub fn load_with_symphonia(path: &Path) -> Result<TrackBuffer, DecodeError> {
    let file = File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut mono = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("skipping undecodable packet in {}: {e}", path.display());
                continue;
            }
            Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
        };

        let spec = *decoded.spec();
        let rate = *sample_rate.get_or_insert(spec.rate);
        if rate != spec.rate {
            return Err(DecodeError::Corrupt(format!(
                "sample rate changed mid-stream ({rate} -> {})",
                spec.rate
            )));
        }
        let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        interleaved.copy_interleaved_ref(decoded);
        mono.extend(downmix(interleaved.samples(), spec.channels.count()));
    }

    TrackBuffer::new(mono, sample_rate.unwrap_or(0))
}

// average interleaved channels down to one
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}
