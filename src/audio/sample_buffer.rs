use crate::error::DecodeError;

// A decoded track: mono samples in [-1, 1] at their native rate.
// Never mutated after construction, so the audio thread and the waveform
// can read it at the same time through an Arc.
#[derive(Clone, Debug)]
pub struct TrackBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl TrackBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, DecodeError> {
        if sample_rate == 0 {
            return Err(DecodeError::ZeroSampleRate);
        }
        if samples.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(Self { samples, sample_rate })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Waveform overview: at most `columns` buckets, each holding the peak
    /// magnitude of its samples, scaled so the loudest bucket is 1.0.
    pub fn peaks(&self, columns: usize) -> Vec<f32> {
        if columns == 0 {
            return Vec::new();
        }
        let bucket = self.samples.len().div_ceil(columns).max(1);
        let mut peaks: Vec<f32> = self
            .samples
            .chunks(bucket)
            .map(|c| c.iter().fold(0.0f32, |m, s| m.max(s.abs())))
            .collect();

        let max = peaks.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 {
            for p in peaks.iter_mut() {
                *p /= max;
            }
        }
        peaks
    }
}
