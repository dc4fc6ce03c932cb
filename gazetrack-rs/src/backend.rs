//! The vendor boundary.
//!
//! Everything that actually talks to an eye tracker sits behind
//! [`DeviceBackend`]. Implementations wrap a vendor SDK binding (or, for
//! demos and tests, [`crate::sim::SimBackend`]). All methods are blocking
//! round-trips; sample delivery after a successful `subscribe` happens on a
//! thread owned by the backend.

use std::sync::Arc;

use crate::types::{
    CalibrationBlob, CalibrationPoint, CalibrationResult, DeviceId, DeviceInfo, DisplayArea,
    StreamKind, StreamSample,
};
use crate::Result;

/// Callback the backend invokes for every sample of a subscribed stream.
///
/// Invoked from the backend's delivery thread, in the order the device
/// produced the samples.
pub type SampleSink = Arc<dyn Fn(StreamSample) + Send + Sync>;

/// A device as reported by one discovery pass.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub info: DeviceInfo,
}

pub trait DeviceBackend: Send + Sync {
    /// Enumerate the devices visible right now.
    fn discover(&self) -> Result<Vec<DeviceRecord>>;

    fn display_area(&self, device: DeviceId) -> Result<DisplayArea>;
    fn set_display_area(&self, device: DeviceId, area: &DisplayArea) -> Result<()>;

    fn gaze_output_frequency(&self, device: DeviceId) -> Result<f32>;
    fn set_gaze_output_frequency(&self, device: DeviceId, hz: f32) -> Result<()>;
    fn all_gaze_output_frequencies(&self, device: DeviceId) -> Result<Vec<f32>>;

    fn enter_calibration_mode(&self, device: DeviceId) -> Result<()>;
    fn leave_calibration_mode(&self, device: DeviceId) -> Result<()>;
    fn collect_data(&self, device: DeviceId, point: CalibrationPoint) -> Result<()>;
    fn discard_data(&self, device: DeviceId, point: CalibrationPoint) -> Result<()>;
    fn compute_and_apply(&self, device: DeviceId) -> Result<CalibrationResult>;

    fn retrieve_calibration_data(&self, device: DeviceId) -> Result<CalibrationBlob>;
    fn apply_calibration_data(&self, device: DeviceId, blob: &CalibrationBlob) -> Result<()>;

    fn subscribe(&self, device: DeviceId, kind: StreamKind, sink: SampleSink) -> Result<()>;
    fn unsubscribe(&self, device: DeviceId, kind: StreamKind) -> Result<()>;
}
