// `duotrack --demo <dir>` writes two short melodies to play with.
use std::path::{Path, PathBuf};

use anyhow::Context;

const DEMO_RATE: u32 = 44100;
const AMPLITUDE: f32 = 0.3;
const FADE_SECS: f32 = 0.1;

pub struct DemoTrack {
    pub file_name: &'static str,
    pub seconds: u32,
    pub notes: [f32; 8], // Hz, equal length each
}

pub const DEMO_TRACKS: [DemoTrack; 2] = [
    DemoTrack {
        file_name: "demo_track1.wav",
        seconds: 10,
        notes: [440.0, 494.0, 523.0, 587.0, 659.0, 587.0, 523.0, 494.0],
    },
    DemoTrack {
        file_name: "demo_track2.wav",
        seconds: 12,
        notes: [330.0, 349.0, 392.0, 440.0, 392.0, 349.0, 330.0, 294.0],
    },
];

impl DemoTrack {
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let total = (self.seconds * sample_rate) as usize;
        let per_note = total / self.notes.len();
        let mut out = Vec::with_capacity(total);
        for freq in self.notes {
            let step = std::f32::consts::TAU * freq / sample_rate as f32;
            out.extend((0..per_note).map(|i| AMPLITUDE * (step * i as f32).sin()));
        }

        // fade in / fade out so it doesn't click
        let fade = ((FADE_SECS * sample_rate as f32) as usize).min(out.len() / 2);
        let len = out.len();
        for i in 0..fade {
            let gain = i as f32 / fade as f32;
            out[i] *= gain;
            out[len - 1 - i] *= gain;
        }
        out
    }
}

pub fn write_demo_tracks(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: DEMO_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut written = Vec::new();
    for track in &DEMO_TRACKS {
        let path = dir.join(track.file_name);
        let mut writer = hound::WavWriter::create(&path, spec)
            .with_context(|| format!("creating {}", path.display()))?;
        for s in track.render(DEMO_RATE) {
            writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
