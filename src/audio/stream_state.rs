use std::sync::atomic::{AtomicU8, AtomicU32, AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StreamState {
    Playing = 0,
    Paused = 1,
    Stopped = 2,
}

impl StreamState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => StreamState::Playing,
            1 => StreamState::Paused,
            _ => StreamState::Stopped,
        }
    }
}

// The only fields the control thread and the audio thread both touch.
// Each one is its own atomic; nothing needs multi-field consistency.
//   cursor: written by the callback, read by the poller
//   state:  written by both (callback only ever does Playing -> Stopped)
//   volume: written by the control thread, read by the callback (f32 bits)
#[derive(Debug)]
pub struct SharedStreamState {
    cursor: AtomicUsize,
    state: AtomicU8,
    volume: AtomicU32,
}

impl SharedStreamState {
    pub fn new(volume: f32) -> Self {
        Self {
            cursor: AtomicUsize::new(0),
            state: AtomicU8::new(StreamState::Stopped as u8),
            volume: AtomicU32::new(clamp_volume(volume).to_bits()),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn set_cursor(&self, cursor: usize) {
        self.cursor.store(cursor, Ordering::Release);
    }

    pub fn state(&self) -> StreamState {
        StreamState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: StreamState) {
        self.state.store(state as u8, Ordering::Release);
    }

    // swaps only if we're still in `from`, so a concurrent user action wins
    pub fn transition(&self, from: StreamState, to: StreamState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume
            .store(clamp_volume(volume).to_bits(), Ordering::Relaxed);
    }
}

// NaN counts as silence
pub fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped_at_zero() {
        let s = SharedStreamState::new(0.7);
        assert_eq!(s.state(), StreamState::Stopped);
        assert_eq!(s.cursor(), 0);
        assert!((s.volume() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn volume_is_clamped() {
        let s = SharedStreamState::new(3.0);
        assert_eq!(s.volume(), 1.0);
        s.set_volume(-1.0);
        assert_eq!(s.volume(), 0.0);
        s.set_volume(f32::NAN);
        assert_eq!(s.volume(), 0.0);
    }

    #[test]
    fn transition_does_not_clobber_user_state() {
        let s = SharedStreamState::new(1.0);
        s.set_state(StreamState::Paused);
        assert!(!s.transition(StreamState::Playing, StreamState::Stopped));
        assert_eq!(s.state(), StreamState::Paused);
        s.set_state(StreamState::Playing);
        assert!(s.transition(StreamState::Playing, StreamState::Stopped));
        assert_eq!(s.state(), StreamState::Stopped);
    }
}
