use std::path::Path;
use std::sync::Arc;

use crate::audio::{AudioStream, StreamState, TrackBuffer, clamp_volume};
use crate::audio_api::OutputBackend;
use crate::error::{DecodeError, TransportError};
use crate::loader::LoadOutcome;
use crate::shared::{NUM_TRACKS, TrackId, TrackState};

use super::track_slot::TrackSlot;

/// What happened to a finished load.
#[derive(Debug)]
pub enum LoadApplied {
    Installed(Arc<TrackBuffer>),
    Failed(DecodeError),
    Stale, // the slot has been asked to load something newer since
}

// The per-track state machine. Lives on the control thread; the only things
// it shares with the audio threads are inside each AudioStream.
pub struct TransportController {
    slots: [TrackSlot; NUM_TRACKS],
    backend: Arc<dyn OutputBackend>,
    frames_per_buffer: Option<u32>,
}

impl TransportController {
    pub fn new(
        backend: Arc<dyn OutputBackend>,
        default_volume: f32,
        frames_per_buffer: Option<u32>,
    ) -> Self {
        let volume = clamp_volume(default_volume);
        Self {
            slots: TrackId::ALL.map(|t| TrackSlot::new(t, volume)),
            backend,
            frames_per_buffer,
        }
    }

    pub fn slot(&self, track: TrackId) -> &TrackSlot {
        &self.slots[track.index()]
    }

    pub fn state(&self, track: TrackId) -> TrackState {
        self.slot(track).state()
    }

    /// The stream the poller should look at, if the track has one.
    pub fn live_stream(&self, track: TrackId) -> Option<&AudioStream> {
        self.slot(track).stream()
    }

    // Marks the slot as loading and hands out the token the outcome must carry.
    pub fn begin_load(&mut self, track: TrackId, path: &Path) -> u64 {
        let slot = &mut self.slots[track.index()];
        slot.generation += 1;
        slot.loading = true;
        log::info!("{track}: loading {} (generation {})", path.display(), slot.generation);
        slot.generation
    }

    // the worker never got going, so no outcome will ever arrive for this token
    pub fn abandon_load(&mut self, track: TrackId, generation: u64) {
        let slot = &mut self.slots[track.index()];
        if slot.generation == generation {
            slot.loading = false;
        }
    }

    pub fn finish_load(&mut self, outcome: LoadOutcome) -> LoadApplied {
        let track = outcome.track;
        let slot = &mut self.slots[track.index()];
        if outcome.generation != slot.generation {
            log::debug!(
                "{track}: dropping stale load of {} (generation {} != {})",
                outcome.path.display(),
                outcome.generation,
                slot.generation
            );
            return LoadApplied::Stale;
        }
        slot.loading = false;

        let buffer = match outcome.result {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("{track}: failed to decode {}: {e}", outcome.path.display());
                return LoadApplied::Failed(e);
            }
        };

        // the old stream plays the old buffer, so it has to go
        if let Some(mut old) = slot.stream.take() {
            if let Err(e) = old.stop() {
                log::warn!("{track}: releasing previous stream failed: {e}");
            }
        }
        log::info!(
            "{track}: loaded {} ({} samples @ {} Hz)",
            outcome.path.display(),
            buffer.len(),
            buffer.sample_rate()
        );
        slot.buffer = Some(Arc::clone(&buffer));
        slot.path = Some(outcome.path);
        slot.stopped = false;
        LoadApplied::Installed(buffer)
    }

    /// Ready/Stopped -> Playing from the top, Paused -> Playing where it left off.
    pub fn play(&mut self, track: TrackId) -> Result<(), TransportError> {
        let backend = Arc::clone(&self.backend);
        let frames_per_buffer = self.frames_per_buffer;
        let slot = &mut self.slots[track.index()];
        let Some(buffer) = slot.buffer.clone() else {
            return Err(TransportError::NotLoaded(track));
        };

        let started = match slot.stream.as_mut() {
            Some(stream) if stream.state() == StreamState::Paused => {
                stream.resume();
                log::info!("{track}: resumed at {:.2}s", stream.position());
                return Ok(());
            }
            Some(stream) => stream.start(),
            None => {
                let mut stream = AudioStream::new(buffer, slot.volume, backend, frames_per_buffer);
                let started = stream.start();
                slot.stream = Some(stream);
                started
            }
        };

        match started {
            Ok(()) => {
                slot.stopped = false;
                log::info!("{track}: playing");
                Ok(())
            }
            Err(source) => {
                log::warn!("{track}: could not open output: {source}");
                slot.stream = None;
                Err(TransportError::Device { track, source })
            }
        }
    }

    pub fn pause(&mut self, track: TrackId) {
        if let Some(stream) = self.slots[track.index()].stream.as_ref() {
            stream.pause();
            log::info!("{track}: paused at {:.2}s", stream.position());
        }
    }

    /// Any -> Stopped. The stream is destroyed; the next play starts at zero.
    pub fn stop(&mut self, track: TrackId) -> Result<(), TransportError> {
        let slot = &mut self.slots[track.index()];
        if slot.buffer.is_some() {
            slot.stopped = true;
        }
        let Some(mut stream) = slot.stream.take() else {
            return Ok(());
        };
        log::info!("{track}: stopped");
        stream
            .stop()
            .map_err(|source| TransportError::Device { track, source })
    }

    pub fn set_volume(&mut self, track: TrackId, volume: f32) {
        let slot = &mut self.slots[track.index()];
        slot.volume = clamp_volume(volume);
        if let Some(stream) = slot.stream.as_ref() {
            stream.set_volume(slot.volume);
        }
    }

    // Each track on its own; one failing never holds up the other.
    // Tracks with nothing loaded are skipped.
    pub fn play_all(&mut self) -> Vec<TransportError> {
        let loaded: Vec<TrackId> = TrackId::ALL
            .into_iter()
            .filter(|t| self.slot(*t).buffer.is_some())
            .collect();
        loaded
            .into_iter()
            .filter_map(|t| self.play(t).err())
            .collect()
    }

    pub fn stop_all(&mut self) -> Vec<TransportError> {
        TrackId::ALL
            .into_iter()
            .filter_map(|t| self.stop(t).err())
            .collect()
    }

    /// Release the device of every stream that ran off the end of its buffer.
    pub fn reap_finished(&mut self) -> Vec<TrackId> {
        let mut reaped = Vec::new();
        for slot in self.slots.iter_mut() {
            let finished = slot
                .stream
                .as_ref()
                .is_some_and(|s| s.state() == StreamState::Stopped);
            if !finished {
                continue;
            }
            if let Some(mut stream) = slot.stream.take() {
                if let Err(e) = stream.stop() {
                    log::warn!("{}: releasing finished stream failed: {e}", slot.id);
                }
            }
            slot.stopped = true;
            log::info!("{}: reached end of track", slot.id);
            reaped.push(slot.id);
        }
        reaped
    }

    pub fn shutdown(&mut self) {
        for e in self.stop_all() {
            log::error!("shutdown: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::test_backend::ManualBackend;
    use std::path::PathBuf;

    fn controller() -> (TransportController, ManualBackend) {
        let hw = ManualBackend::default();
        let tc = TransportController::new(Arc::new(hw.clone()), 0.7, Some(1024));
        (tc, hw)
    }

    fn load(tc: &mut TransportController, track: TrackId, samples: usize, rate: u32) {
        let path = PathBuf::from(format!("{track}.wav"));
        let generation = tc.begin_load(track, &path);
        let buffer = TrackBuffer::new(vec![0.5; samples], rate).unwrap();
        let applied = tc.finish_load(LoadOutcome {
            track,
            path,
            generation,
            result: Ok(Arc::new(buffer)),
        });
        assert!(matches!(applied, LoadApplied::Installed(_)));
    }

    #[test]
    fn slots_walk_through_the_state_machine() {
        let (mut tc, hw) = controller();
        let t = TrackId(0);
        assert_eq!(tc.state(t), TrackState::Empty);

        load(&mut tc, t, 10_000, 1000);
        assert_eq!(tc.state(t), TrackState::Ready);

        tc.play(t).unwrap();
        assert_eq!(tc.state(t), TrackState::Playing);

        tc.pause(t);
        assert_eq!(tc.state(t), TrackState::Paused);

        tc.play(t).unwrap();
        assert_eq!(tc.state(t), TrackState::Playing);
        assert_eq!(hw.opened(), 1); // resume reuses the stream

        tc.stop(t).unwrap();
        assert_eq!(tc.state(t), TrackState::Stopped);
        assert!(tc.live_stream(t).is_none());
        assert_eq!(hw.live_streams(), 0);
    }

    #[test]
    fn play_without_a_buffer_is_refused() {
        let (mut tc, hw) = controller();
        assert!(matches!(
            tc.play(TrackId(1)),
            Err(TransportError::NotLoaded(TrackId(1)))
        ));
        assert_eq!(hw.opened(), 0);
    }

    #[test]
    fn play_after_stop_starts_from_zero() {
        let (mut tc, hw) = controller();
        let t = TrackId(0);
        load(&mut tc, t, 10_000, 1000);
        tc.play(t).unwrap();
        hw.pull(0, 4096);
        assert_eq!(tc.live_stream(t).unwrap().cursor(), 4096);

        tc.stop(t).unwrap();
        tc.play(t).unwrap();
        assert_eq!(tc.live_stream(t).unwrap().cursor(), 0);
        assert_eq!(hw.opened(), 2);
    }

    #[test]
    fn new_streams_pick_up_the_slider_volume() {
        let (mut tc, hw) = controller();
        let t = TrackId(0);
        load(&mut tc, t, 4096, 1000);

        tc.set_volume(t, 0.25);
        tc.play(t).unwrap();
        let (frame, _) = hw.pull(0, 16);
        assert!(frame.iter().all(|s| (*s - 0.125).abs() < 1e-6));

        // live change goes straight through
        tc.set_volume(t, 0.0);
        let (frame, _) = hw.pull(0, 16);
        assert!(frame.iter().all(|s| *s == 0.0));
        assert_eq!(tc.slot(t).volume(), 0.0);
    }

    #[test]
    fn shorter_track_ends_without_touching_the_longer_one() {
        let (mut tc, hw) = controller();
        let short = TrackId(0);
        let long = TrackId(1);
        load(&mut tc, short, 2048, 1000);
        load(&mut tc, long, 8192, 1000);

        assert!(tc.play_all().is_empty());
        for _ in 0..2 {
            hw.pull(0, 1024);
            hw.pull(1, 1024);
        }
        assert_eq!(tc.state(short), TrackState::Stopped);
        assert_eq!(tc.state(long), TrackState::Playing);

        assert_eq!(tc.reap_finished(), vec![short]);
        assert!(!hw.is_live(0));
        assert!(hw.is_live(1));

        hw.pull(1, 1024);
        assert_eq!(tc.live_stream(long).unwrap().cursor(), 3072);
        assert_eq!(tc.state(short), TrackState::Stopped);
        assert!(tc.reap_finished().is_empty());
    }

    #[test]
    fn device_failure_on_one_track_does_not_stop_the_other() {
        let (mut tc, hw) = controller();
        load(&mut tc, TrackId(0), 1000, 1000);
        load(&mut tc, TrackId(1), 1000, 1000);

        hw.fail_next_open();
        let errors = tc.play_all();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            TransportError::Device { track: TrackId(0), .. }
        ));
        assert_eq!(tc.state(TrackId(0)), TrackState::Ready);
        assert_eq!(tc.state(TrackId(1)), TrackState::Playing);

        // the user tries again
        tc.play(TrackId(0)).unwrap();
        assert_eq!(tc.state(TrackId(0)), TrackState::Playing);
    }

    #[test]
    fn play_all_skips_empty_slots() {
        let (mut tc, hw) = controller();
        load(&mut tc, TrackId(1), 1000, 1000);
        assert!(tc.play_all().is_empty());
        assert_eq!(hw.opened(), 1);
        assert_eq!(tc.state(TrackId(0)), TrackState::Empty);
    }

    #[test]
    fn stale_loads_never_clobber_a_newer_one() {
        let (mut tc, _hw) = controller();
        let t = TrackId(0);
        let first = tc.begin_load(t, Path::new("old.wav"));
        let second = tc.begin_load(t, Path::new("new.wav"));
        assert!(second > first);

        let fresh = tc.finish_load(LoadOutcome {
            track: t,
            path: PathBuf::from("new.wav"),
            generation: second,
            result: Ok(Arc::new(TrackBuffer::new(vec![0.1; 10], 10).unwrap())),
        });
        assert!(matches!(fresh, LoadApplied::Installed(_)));

        let stale = tc.finish_load(LoadOutcome {
            track: t,
            path: PathBuf::from("old.wav"),
            generation: first,
            result: Ok(Arc::new(TrackBuffer::new(vec![0.1; 99], 10).unwrap())),
        });
        assert!(matches!(stale, LoadApplied::Stale));
        assert_eq!(tc.slot(t).path(), Some(Path::new("new.wav")));
        assert_eq!(tc.slot(t).buffer().unwrap().len(), 10);
    }

    #[test]
    fn failed_load_leaves_slot_empty() {
        let (mut tc, _hw) = controller();
        let t = TrackId(1);
        let generation = tc.begin_load(t, Path::new("broken.mp3"));
        assert!(tc.slot(t).is_loading());
        let applied = tc.finish_load(LoadOutcome {
            track: t,
            path: PathBuf::from("broken.mp3"),
            generation,
            result: Err(DecodeError::NoAudioTrack),
        });
        assert!(matches!(applied, LoadApplied::Failed(DecodeError::NoAudioTrack)));
        assert!(!tc.slot(t).is_loading());
        assert_eq!(tc.state(t), TrackState::Empty);
    }

    #[test]
    fn loading_over_a_playing_track_releases_its_stream() {
        let (mut tc, hw) = controller();
        let t = TrackId(0);
        load(&mut tc, t, 1000, 1000);
        tc.play(t).unwrap();
        load(&mut tc, t, 2000, 1000);
        assert_eq!(hw.live_streams(), 0);
        assert_eq!(tc.state(t), TrackState::Ready);
    }

    #[test]
    fn shutdown_releases_everything_even_if_a_close_fails() {
        let (mut tc, hw) = controller();
        load(&mut tc, TrackId(0), 1000, 1000);
        load(&mut tc, TrackId(1), 1000, 1000);
        tc.play_all();
        hw.fail_every_close();

        let errors = tc.stop_all();
        assert_eq!(errors.len(), 2);
        assert_eq!(hw.closed(), 2);
        assert_eq!(hw.live_streams(), 0);
        assert!(TrackId::ALL.iter().all(|t| tc.live_stream(*t).is_none()));

        tc.shutdown(); // nothing left, nothing to fail
    }
}
