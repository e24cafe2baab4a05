// Types shared between the control thread layers (middle, pipeline) and the tui.
//
// The flow, roughly:
//   - The tui turns keys into `InputEvent`s and hands them to `Middle`.
//   - `Middle` drives the transport controller, which owns one `AudioStream`
//     per track while that track is live.
//   - Every poll tick, the position poller reads the live streams and pushes
//     `PositionUpdate`s into whatever implements `TrackObserver` (the
//     `DisplayState` here), and the tui just draws that.

use std::path::PathBuf;

use crate::audio::TrackBuffer;

pub const NUM_TRACKS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(pub u8);

impl TrackId {
    pub const ALL: [TrackId; NUM_TRACKS] = [TrackId(0), TrackId(1)];

    pub fn index(self) -> usize {
        self.0 as usize
    }

    // the other one, for tab focus
    pub fn other(self) -> Self {
        TrackId((self.0 + 1) % NUM_TRACKS as u8)
    }

    pub fn label(self) -> String {
        format!("Track {}", self.0 + 1)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Track {}", self.0 + 1)
    }
}

// user intents, already resolved by the tui
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Load(TrackId, PathBuf),
    Play(TrackId),
    Pause(TrackId),
    Stop(TrackId),
    Volume(TrackId, f32), // 0.0 - 1.0
    PlayAll,
    StopAll,
    Quit,
}

/// Transport state of one track slot, as the controller sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    Empty,
    Ready,
    Playing,
    Paused,
    Stopped,
}

impl TrackState {
    pub fn label(self) -> &'static str {
        match self {
            TrackState::Empty => "EMPTY",
            TrackState::Ready => "READY",
            TrackState::Playing => "PLAYING",
            TrackState::Paused => "PAUSED",
            TrackState::Stopped => "STOPPED",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PositionUpdate {
    pub track: TrackId,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub progress_percent: u8,
    pub time_label: String, // "MM:SS / MM:SS"
}

/// What the core pushes out to the visual layer.
pub trait TrackObserver {
    fn on_track_loaded(&mut self, track: TrackId, buffer: &TrackBuffer, peaks: Vec<f32>);
    fn on_position_update(&mut self, update: &PositionUpdate);
}

#[derive(Clone, Debug)]
pub struct TrackView {
    pub label: String,
    pub file_name: Option<String>,
    pub state: TrackState,
    pub loading: bool,
    pub volume: f32,
    pub peaks: Vec<f32>, // waveform overview, 0.0 - 1.0 per column
    pub sample_rate: u32,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub progress_percent: u8,
    pub time_label: String,
}

impl TrackView {
    pub fn new(track: TrackId, volume: f32) -> Self {
        Self {
            label: track.label(),
            file_name: None,
            state: TrackState::Empty,
            loading: false,
            volume,
            peaks: Vec::new(),
            sample_rate: 0,
            position_secs: 0.0,
            duration_secs: 0.0,
            progress_percent: 0,
            time_label: String::from("00:00 / 00:00"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub tracks: [TrackView; NUM_TRACKS],
    pub status: String, // last user-visible message (load errors, device errors...)
}

impl DisplayState {
    pub fn new(default_volume: f32) -> Self {
        Self {
            tracks: TrackId::ALL.map(|t| TrackView::new(t, default_volume)),
            status: String::from("o: open file  space: play  k: pause  s: stop  tab: switch track"),
        }
    }

    pub fn track(&self, track: TrackId) -> &TrackView {
        &self.tracks[track.index()]
    }

    pub fn track_mut(&mut self, track: TrackId) -> &mut TrackView {
        &mut self.tracks[track.index()]
    }
}

impl TrackObserver for DisplayState {
    fn on_track_loaded(&mut self, track: TrackId, buffer: &TrackBuffer, peaks: Vec<f32>) {
        let view = self.track_mut(track);
        view.peaks = peaks;
        view.sample_rate = buffer.sample_rate();
        view.duration_secs = buffer.duration_secs();
        view.position_secs = 0.0;
        view.progress_percent = 0;
        view.time_label = crate::pipeline::poller::time_label(0.0, view.duration_secs);
    }

    fn on_position_update(&mut self, update: &PositionUpdate) {
        let view = self.track_mut(update.track);
        view.position_secs = update.position_secs;
        view.duration_secs = update.duration_secs;
        view.progress_percent = update.progress_percent;
        view.time_label = update.time_label.clone();
    }
}
