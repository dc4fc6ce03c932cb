//! # gazetrack - typed session layer for screen based eye trackers
//!
//! Wraps a vendor eye tracker SDK behind the [`DeviceBackend`] trait and
//! provides:
//! - Device discovery and index resolution ([`DeviceRegistry`])
//! - Gaze, time sync, user position and notification streams with at most
//!   one handler per stream kind per device ([`Subscriptions`])
//! - Screen based calibration as a state machine ([`CalibrationSession`])
//! - Saving and restoring calibration blobs ([`CalibrationStore`])
//! - An in-process simulated tracker for demos and tests ([`SimBackend`])
//!
//! ## Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use gazetrack::{CalibrationPoint, CalibrationSession, Config, DeviceRegistry, SimBackend};
//!
//! let config = Config::from_env();
//! let backend = Arc::new(SimBackend::from_config(&config));
//! let registry = DeviceRegistry::find_all(backend).unwrap();
//! let device = registry.resolve(0).unwrap();
//! println!("Serial: {}", device.serial_number());
//!
//! let mut session = CalibrationSession::begin(device).unwrap();
//! session.collect(CalibrationPoint::new(0.5, 0.5).unwrap()).unwrap();
//! let outcome = session.compute_and_apply().unwrap();
//! println!("Calibrated with {} points", outcome.point_count);
//! session.leave().unwrap();
//! ```

pub mod backend;
pub mod calibration;
pub mod config;
pub mod device;
pub mod error;
pub mod sim;
pub mod store;
pub mod stream;
pub mod types;

#[cfg(test)]
mod testing;

pub use backend::{DeviceBackend, DeviceRecord, SampleSink};
pub use calibration::{
    with_calibration, CalibrationOutcome, CalibrationSession, PointRecord, PointStatus,
    SessionState,
};
pub use config::Config;
pub use device::{DeviceHandle, DeviceRegistry};
pub use error::{ErrorKind, GazeError, Status};
pub use sim::SimBackend;
pub use store::CalibrationStore;
pub use stream::{
    GazeStream, NotificationStream, Observed, SampleStream, Stream, SubscriptionGuard,
    SubscriptionId, Subscriptions, TimeSyncStream, UserPositionStream, WaitPolicy,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use types::*;

/// Result type alias for gazetrack operations.
pub type Result<T> = std::result::Result<T, GazeError>;
