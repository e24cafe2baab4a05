// The control thread's glue: intents in, transport + loader + poller driven,
// display state out. Everything here runs on the tui thread.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::audio_api::OutputBackend;
use crate::error::TransportError;
use crate::loader::{Decode, Loader};
use crate::pipeline::{LoadApplied, PositionPoller, Settings, TransportController};
use crate::shared::{DisplayState, InputEvent, TrackId, TrackObserver};

pub struct Middle {
    transport: TransportController,
    loader: Loader,
    poller: PositionPoller,
    display: DisplayState,
    waveform_columns: usize,
}

impl Middle {
    pub fn new(
        backend: Arc<dyn OutputBackend>,
        decoder: Arc<dyn Decode>,
        settings: &Settings,
    ) -> Self {
        let mut middle = Self {
            transport: TransportController::new(
                backend,
                settings.default_volume,
                settings.frames_per_buffer,
            ),
            loader: Loader::new(decoder),
            poller: PositionPoller::new(settings.poll_interval()),
            display: DisplayState::new(settings.default_volume),
            waveform_columns: settings.waveform_columns,
        };
        middle.sync_views();
        middle
    }

    pub fn display_state(&self) -> &DisplayState {
        &self.display
    }

    pub fn transport(&self) -> &TransportController {
        &self.transport
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Load(track, path) => self.request_load(track, &path),
            InputEvent::Play(track) => {
                let result = self.transport.play(track);
                self.report(result);
            }
            InputEvent::Pause(track) => self.transport.pause(track),
            InputEvent::Stop(track) => {
                let result = self.transport.stop(track);
                self.report(result);
            }
            InputEvent::Volume(track, volume) => self.transport.set_volume(track, volume),
            InputEvent::PlayAll => {
                let errors = self.transport.play_all();
                self.report_all(errors);
            }
            InputEvent::StopAll => {
                let errors = self.transport.stop_all();
                self.report_all(errors);
            }
            InputEvent::Quit => {} // main owns the loop
        }
        self.sync_views();
    }

    fn request_load(&mut self, track: TrackId, path: &Path) {
        let generation = self.transport.begin_load(track, path);
        if let Err(e) = self.loader.request(track, path, generation) {
            log::error!("{track}: could not start decode worker: {e:#}");
            self.transport.abandon_load(track, generation);
            self.display.status = format!("{track}: could not start loading ({e})");
            return;
        }
        self.display.status = format!("{track}: loading {}", display_name(path));
    }

    /// Drain finished loads, run the poller when it's due, and free the
    /// device of any track that played to the end.
    pub fn tick(&mut self, now: Instant) {
        while let Some(outcome) = self.loader.poll_completed() {
            let track = outcome.track;
            let name = display_name(&outcome.path);
            match self.transport.finish_load(outcome) {
                LoadApplied::Installed(buffer) => {
                    let peaks = buffer.peaks(self.waveform_columns);
                    self.display.on_track_loaded(track, &buffer, peaks);
                    self.display.status = format!("{track}: loaded {name}");
                }
                LoadApplied::Failed(e) => {
                    self.display.status = format!("{track}: could not load {name}: {e}");
                }
                LoadApplied::Stale => {}
            }
        }

        if self.poller.is_due(now) {
            self.poller.publish(&self.transport, &mut self.display);
            for track in self.transport.reap_finished() {
                self.display.status = format!("{track}: finished");
            }
        }
        self.sync_views();
    }

    pub fn shutdown(&mut self) {
        log::info!("shutting down, releasing output streams");
        self.transport.shutdown();
        self.sync_views();
    }

    // transport state -> the bits of the view the poller doesn't own
    fn sync_views(&mut self) {
        for track in TrackId::ALL {
            let slot = self.transport.slot(track);
            let view = self.display.track_mut(track);
            view.state = slot.state();
            view.loading = slot.is_loading();
            view.volume = slot.volume();
            view.file_name = slot.path().map(display_name);
        }
    }

    fn report(&mut self, result: Result<(), TransportError>) {
        match result {
            Ok(()) => {}
            Err(TransportError::NotLoaded(track)) => {
                self.display.status = format!("{track}: load a file first (o)");
            }
            Err(e) => self.display.status = e.to_string(),
        }
    }

    fn report_all(&mut self, errors: Vec<TransportError>) {
        if !errors.is_empty() {
            self.display.status = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
