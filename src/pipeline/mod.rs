pub mod poller;
pub mod settings;
pub mod track_slot;
pub mod transport;

pub use poller::PositionPoller;
pub use settings::Settings;
pub use transport::{LoadApplied, TransportController};
