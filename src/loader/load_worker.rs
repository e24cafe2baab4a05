use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::audio::TrackBuffer;
use crate::error::DecodeError;
use crate::shared::TrackId;

use super::decoder::Decode;

// What a worker sends back, exactly once per request.
#[derive(Debug)]
pub struct LoadOutcome {
    pub track: TrackId,
    pub path: PathBuf,
    pub generation: u64, // the slot's token at request time
    pub result: Result<Arc<TrackBuffer>, DecodeError>,
}

/// Decodes files off the control thread. Every request gets its own worker,
/// so back-to-back loads never wait on each other.
pub struct Loader {
    decoder: Arc<dyn Decode>,
    done_tx: Sender<LoadOutcome>,
    done_rx: Receiver<LoadOutcome>,
}

impl Loader {
    pub fn new(decoder: Arc<dyn Decode>) -> Self {
        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        Self {
            decoder,
            done_tx,
            done_rx,
        }
    }

    pub fn request(&self, track: TrackId, path: &Path, generation: u64) -> anyhow::Result<()> {
        let decoder = Arc::clone(&self.decoder);
        let tx = self.done_tx.clone();
        let path = path.to_path_buf();

        std::thread::Builder::new()
            .name(format!("decode-{}", track.index() + 1))
            .spawn(move || {
                let result = decoder.decode(&path).map(Arc::new);
                // the receiver only goes away on shutdown, nothing to do then
                let _ = tx.send(LoadOutcome {
                    track,
                    path,
                    generation,
                    result,
                });
            })?;
        Ok(())
    }

    pub fn poll_completed(&self) -> Option<LoadOutcome> {
        self.done_rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn wait_completed(&self, timeout: std::time::Duration) -> Option<LoadOutcome> {
        self.done_rx.recv_timeout(timeout).ok()
    }
}
