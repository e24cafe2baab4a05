use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::{AudioStream, StreamState, TrackBuffer};
use crate::shared::{TrackId, TrackState};

// One of the two tracks. The buffer outlives any number of streams;
// the stream only exists between a play and the next stop / end of track.
pub struct TrackSlot {
    pub id: TrackId,
    pub(super) path: Option<PathBuf>,
    pub(super) buffer: Option<Arc<TrackBuffer>>,
    pub(super) stream: Option<AudioStream>,
    pub(super) volume: f32, // the slider value, handed to every new stream
    pub(super) generation: u64, // bumped on every load request
    pub(super) loading: bool,
    pub(super) stopped: bool, // stopped (or ran out) since the last load
}

impl TrackSlot {
    pub fn new(id: TrackId, volume: f32) -> Self {
        Self {
            id,
            path: None,
            buffer: None,
            stream: None,
            volume,
            generation: 0,
            loading: false,
            stopped: false,
        }
    }

    pub fn state(&self) -> TrackState {
        if self.buffer.is_none() {
            return TrackState::Empty;
        }
        match &self.stream {
            Some(stream) => match stream.state() {
                StreamState::Playing => TrackState::Playing,
                StreamState::Paused => TrackState::Paused,
                StreamState::Stopped => TrackState::Stopped,
            },
            None if self.stopped => TrackState::Stopped,
            None => TrackState::Ready,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn buffer(&self) -> Option<&Arc<TrackBuffer>> {
        self.buffer.as_ref()
    }

    pub fn stream(&self) -> Option<&AudioStream> {
        self.stream.as_ref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
