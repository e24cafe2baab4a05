use crate::shared::{DisplayState, NUM_TRACKS, TrackId};

// state local to the tui: which track the keys act on, and the path prompt
// volumes are synced from DisplayState per loop so nudges start from the real value
#[derive(Clone, Debug)]
pub struct TuiState {
    pub focused: TrackId,
    pub prompt: Option<String>, // Some while typing a path to open
    pub volumes: [f32; NUM_TRACKS],
    pub volume_step: f32,
}

impl TuiState {
    pub fn new(volume_step: f32) -> Self {
        Self {
            focused: TrackId(0),
            prompt: None,
            volumes: [0.0; NUM_TRACKS],
            volume_step,
        }
    }

    pub fn sync(&mut self, ds: &DisplayState) {
        for track in TrackId::ALL {
            self.volumes[track.index()] = ds.track(track).volume;
        }
    }

    pub fn focused_volume(&self) -> f32 {
        self.volumes[self.focused.index()]
    }
}
