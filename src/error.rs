use std::path::PathBuf;

use thiserror::Error;

use crate::shared::TrackId;

/// A file could not be turned into a playable buffer. The slot stays as it was.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported audio file: {0}")]
    Unsupported(String),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("corrupt audio data: {0}")]
    Corrupt(String),
    #[error("file contains no samples")]
    Empty,
    #[error("sample rate is zero")]
    ZeroSampleRate,
}

/// The output device refused us. Nothing is retried automatically.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default output device")]
    NoOutputDevice,
    #[error("output device config unavailable: {0}")]
    Config(String),
    #[error("unsupported output sample format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to build output stream: {0}")]
    Build(String),
    #[error("failed to start output stream: {0}")]
    Play(String),
    #[error("failed to close output stream: {0}")]
    Close(String),
    #[error("output device unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}: nothing loaded")]
    NotLoaded(TrackId),
    #[error("{track}: {source}")]
    Device {
        track: TrackId,
        #[source]
        source: DeviceError,
    },
}
