// Purely for testing: an output "device" that never runs on its own.
// Tests pull frames from opened streams by index (in open order).

use std::sync::{Arc, Mutex};

use crate::audio_api::{OutputBackend, OutputConfig, OutputHandle, Pull, PullCallback};
use crate::error::DeviceError;

#[derive(Default)]
struct Inner {
    streams: Vec<Option<PullCallback>>,
    configs: Vec<OutputConfig>,
    fail_next_open: bool,
    fail_close: bool,
    closed: usize,
}

#[derive(Clone, Default)]
pub struct ManualBackend {
    inner: Arc<Mutex<Inner>>,
}

impl ManualBackend {
    /// Run the callback of the `index`th opened stream once, like the audio thread would.
    pub fn pull(&self, index: usize, frames: usize) -> (Vec<f32>, Pull) {
        let mut out = vec![f32::NAN; frames];
        let mut inner = self.inner.lock().unwrap();
        let callback = inner.streams[index]
            .as_mut()
            .expect("pulling from a closed stream");
        let pull = callback(&mut out);
        (out, pull)
    }

    pub fn is_live(&self, index: usize) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.streams.get(index).is_some_and(|s| s.is_some())
    }

    pub fn fail_next_open(&self) {
        self.inner.lock().unwrap().fail_next_open = true;
    }

    pub fn fail_every_close(&self) {
        self.inner.lock().unwrap().fail_close = true;
    }

    pub fn opened(&self) -> usize {
        self.inner.lock().unwrap().streams.len()
    }

    pub fn closed(&self) -> usize {
        self.inner.lock().unwrap().closed
    }

    pub fn live_streams(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.streams.iter().filter(|s| s.is_some()).count()
    }

    pub fn last_config(&self) -> Option<OutputConfig> {
        self.inner.lock().unwrap().configs.last().copied()
    }
}

impl OutputBackend for ManualBackend {
    fn open_output_stream(
        &self,
        config: OutputConfig,
        callback: PullCallback,
    ) -> Result<Box<dyn OutputHandle>, DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_next_open {
            inner.fail_next_open = false;
            return Err(DeviceError::Unavailable("device busy".into()));
        }
        inner.streams.push(Some(callback));
        inner.configs.push(config);
        Ok(Box::new(ManualHandle {
            inner: Arc::clone(&self.inner),
            index: inner.streams.len() - 1,
        }))
    }
}

struct ManualHandle {
    inner: Arc<Mutex<Inner>>,
    index: usize,
}

impl OutputHandle for ManualHandle {
    fn close(self: Box<Self>) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.streams[self.index] = None;
        inner.closed += 1;
        if inner.fail_close {
            return Err(DeviceError::Close("device vanished".into()));
        }
        Ok(())
    }
}
