//! Backend wrapper for tests that need to observe library state from
//! inside a backend call.

use std::sync::{Arc, Mutex};

use crate::backend::{DeviceBackend, DeviceRecord, SampleSink};
use crate::sim::{Op, SimBackend};
use crate::types::{
    CalibrationBlob, CalibrationPoint, CalibrationResult, DeviceId, DisplayArea, StreamKind,
};
use crate::Result;

pub(crate) type Hook = Arc<dyn Fn(Op) + Send + Sync>;

/// Delegates to a [`SimBackend`], running a hook before every call.
pub(crate) struct HookedBackend {
    pub(crate) sim: Arc<SimBackend>,
    hook: Mutex<Option<Hook>>,
}

impl HookedBackend {
    pub(crate) fn new(sim: Arc<SimBackend>) -> Self {
        Self {
            sim,
            hook: Mutex::new(None),
        }
    }

    pub(crate) fn set_hook(&self, hook: Option<Hook>) {
        *self.hook.lock().unwrap() = hook;
    }

    fn before(&self, op: Op) {
        // Clone out so the hook runs without this lock held.
        let hook = self.hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(op);
        }
    }
}

impl DeviceBackend for HookedBackend {
    fn discover(&self) -> Result<Vec<DeviceRecord>> {
        self.before(Op::Discover);
        self.sim.discover()
    }

    fn display_area(&self, device: DeviceId) -> Result<DisplayArea> {
        self.before(Op::DisplayArea);
        self.sim.display_area(device)
    }

    fn set_display_area(&self, device: DeviceId, area: &DisplayArea) -> Result<()> {
        self.before(Op::SetDisplayArea);
        self.sim.set_display_area(device, area)
    }

    fn gaze_output_frequency(&self, device: DeviceId) -> Result<f32> {
        self.before(Op::Frequency);
        self.sim.gaze_output_frequency(device)
    }

    fn set_gaze_output_frequency(&self, device: DeviceId, hz: f32) -> Result<()> {
        self.before(Op::SetFrequency);
        self.sim.set_gaze_output_frequency(device, hz)
    }

    fn all_gaze_output_frequencies(&self, device: DeviceId) -> Result<Vec<f32>> {
        self.before(Op::AllFrequencies);
        self.sim.all_gaze_output_frequencies(device)
    }

    fn enter_calibration_mode(&self, device: DeviceId) -> Result<()> {
        self.before(Op::EnterCalibration);
        self.sim.enter_calibration_mode(device)
    }

    fn leave_calibration_mode(&self, device: DeviceId) -> Result<()> {
        self.before(Op::LeaveCalibration);
        self.sim.leave_calibration_mode(device)
    }

    fn collect_data(&self, device: DeviceId, point: CalibrationPoint) -> Result<()> {
        self.before(Op::Collect);
        self.sim.collect_data(device, point)
    }

    fn discard_data(&self, device: DeviceId, point: CalibrationPoint) -> Result<()> {
        self.before(Op::Discard);
        self.sim.discard_data(device, point)
    }

    fn compute_and_apply(&self, device: DeviceId) -> Result<CalibrationResult> {
        self.before(Op::Compute);
        self.sim.compute_and_apply(device)
    }

    fn retrieve_calibration_data(&self, device: DeviceId) -> Result<CalibrationBlob> {
        self.before(Op::Retrieve);
        self.sim.retrieve_calibration_data(device)
    }

    fn apply_calibration_data(&self, device: DeviceId, blob: &CalibrationBlob) -> Result<()> {
        self.before(Op::Apply);
        self.sim.apply_calibration_data(device, blob)
    }

    fn subscribe(&self, device: DeviceId, kind: StreamKind, sink: SampleSink) -> Result<()> {
        self.before(Op::Subscribe);
        self.sim.subscribe(device, kind, sink)
    }

    fn unsubscribe(&self, device: DeviceId, kind: StreamKind) -> Result<()> {
        self.before(Op::Unsubscribe);
        self.sim.unsubscribe(device, kind)
    }
}
