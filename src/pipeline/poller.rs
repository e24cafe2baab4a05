use std::time::{Duration, Instant};

use crate::audio::StreamState;
use crate::shared::{PositionUpdate, TrackId, TrackObserver};

use super::transport::TransportController;

/// Integer minutes and seconds, truncated: 125.7 -> "02:05", 59.999 -> "00:59".
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn time_label(position_secs: f64, duration_secs: f64) -> String {
    format!("{} / {}", format_time(position_secs), format_time(duration_secs))
}

pub fn progress_percent(position_secs: f64, duration_secs: f64) -> u8 {
    if duration_secs <= 0.0 || !duration_secs.is_finite() {
        return 0;
    }
    (position_secs / duration_secs * 100.0).floor().clamp(0.0, 100.0) as u8
}

// Ticks at a fixed interval and reports where each playing track is.
// Strictly a reader: it never changes a stream.
pub struct PositionPoller {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PositionPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// True once per interval; the first call is always due.
    pub fn is_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            _ => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }

    // paused, stopped and streamless tracks are skipped so the ui keeps what it drew last
    pub fn poll(&self, transport: &TransportController) -> Vec<PositionUpdate> {
        TrackId::ALL
            .into_iter()
            .filter_map(|track| {
                let stream = transport.live_stream(track)?;
                if stream.state() != StreamState::Playing {
                    return None;
                }
                let position_secs = stream.position();
                let duration_secs = stream.duration();
                Some(PositionUpdate {
                    track,
                    position_secs,
                    duration_secs,
                    progress_percent: progress_percent(position_secs, duration_secs),
                    time_label: time_label(position_secs, duration_secs),
                })
            })
            .collect()
    }

    pub fn publish(&self, transport: &TransportController, observer: &mut dyn TrackObserver) -> usize {
        let updates = self.poll(transport);
        for update in &updates {
            observer.on_position_update(update);
        }
        updates.len()
    }
}
