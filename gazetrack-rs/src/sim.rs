//! In-process simulated eye tracker.
//!
//! [`SimBackend`] implements [`DeviceBackend`] without hardware. Each active
//! subscription gets its own delivery thread, so handlers run off the
//! caller's thread exactly as they would with a vendor SDK. Samples can be
//! injected with [`SimBackend::emit`], generated synthetically at the
//! configured gaze output frequency, or both. Faults can be scheduled per
//! operation to exercise error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::backend::{DeviceBackend, DeviceRecord, SampleSink};
use crate::config::Config;
use crate::types::{
    CalibrationBlob, CalibrationPoint, CalibrationResult, CalibrationStatus, Capabilities,
    DeviceId, DeviceInfo, DisplayArea, EyeData, GazeData, GazeOrigin, GazePoint,
    NormalizedPoint2D, Notification, NotificationKind, Point3D, PupilData, StreamKind,
    StreamSample, TimeSyncData, UserPosition, UserPositionGuide, Validity,
};
use crate::{GazeError, Result};

const BLOB_MAGIC: &[u8; 6] = b"SIMCAL";

/// Backend operations, used for call accounting and fault scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Discover,
    DisplayArea,
    SetDisplayArea,
    Frequency,
    SetFrequency,
    AllFrequencies,
    EnterCalibration,
    LeaveCalibration,
    Collect,
    Discard,
    Compute,
    Retrieve,
    Apply,
    Subscribe,
    Unsubscribe,
}

/// Static description of one simulated device.
#[derive(Debug, Clone)]
pub struct SimDeviceConfig {
    pub serial_number: String,
    pub address: String,
    pub device_name: String,
    pub model: String,
    pub firmware_version: String,
    pub capabilities: Capabilities,
    pub display_area: DisplayArea,
    pub frequencies: Vec<f32>,
    pub initial_frequency: f32,
    /// Device clock minus system clock, in microseconds.
    pub clock_offset_us: i64,
}

impl SimDeviceConfig {
    pub fn numbered(n: usize) -> Self {
        Self {
            serial_number: format!("SIM{:04}", n),
            address: format!("sim://tracker/{}", n),
            device_name: format!("Simulated Tracker {}", n),
            model: "SIM-60".into(),
            firmware_version: "1.0.0".into(),
            capabilities: Capabilities::CAN_SET_DISPLAY_AREA
                | Capabilities::HAS_GAZE_DATA
                | Capabilities::CAN_DO_SCREEN_BASED_CALIBRATION
                | Capabilities::HAS_USER_POSITION_GUIDE,
            display_area: DisplayArea::from_corners(
                Point3D::new(-254.0, 301.5, 47.0),
                Point3D::new(254.0, 301.5, 47.0),
                Point3D::new(-254.0, 15.8, -6.0),
            ),
            frequencies: vec![30.0, 60.0, 120.0],
            initial_frequency: 60.0,
            clock_offset_us: 1_000_000 * (n as i64 + 1),
        }
    }
}

struct Delivery {
    sender: Sender<StreamSample>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Delivery {
    fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        drop(self.sender);
        if let Some(thread) = self.thread.take() {
            // A handler unsubscribing from inside its own callback must not join itself.
            if thread.thread().id() != std::thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}

struct SimDevice {
    id: DeviceId,
    config: SimDeviceConfig,
    display_area: DisplayArea,
    frequency: f32,
    calibration_mode: bool,
    collected: Vec<CalibrationPoint>,
    applied: Vec<u8>,
    streams: HashMap<StreamKind, Delivery>,
}

impl SimDevice {
    fn new(id: DeviceId, config: SimDeviceConfig) -> Self {
        Self {
            id,
            display_area: config.display_area,
            frequency: config.initial_frequency,
            config,
            calibration_mode: false,
            collected: Vec::new(),
            applied: Vec::new(),
            streams: HashMap::new(),
        }
    }

    fn require(&self, capability: Capabilities, what: &str) -> Result<()> {
        if self.config.capabilities.contains(capability) {
            Ok(())
        } else {
            Err(GazeError::Device(format!(
                "{} does not support {}",
                self.config.serial_number, what
            )))
        }
    }

    fn require_calibration_mode(&self) -> Result<()> {
        if self.calibration_mode {
            Ok(())
        } else {
            Err(GazeError::Device(format!(
                "{} is not in calibration mode",
                self.config.serial_number
            )))
        }
    }

    fn notify(&self, system_time_stamp: i64, kind: NotificationKind) {
        if let Some(delivery) = self.streams.get(&StreamKind::Notifications) {
            let _ = delivery.sender.send(StreamSample::Notification(Notification {
                system_time_stamp,
                kind,
            }));
        }
    }
}

struct SimState {
    devices: Vec<SimDevice>,
    next_id: u64,
    faults: HashMap<Op, usize>,
}

/// Simulated eye tracker backend.
pub struct SimBackend {
    state: Mutex<SimState>,
    reachable: AtomicBool,
    synthetic: AtomicBool,
    calls: Mutex<HashMap<Op, usize>>,
    total_calls: AtomicUsize,
    epoch: Instant,
}

impl SimBackend {
    /// A backend with the given devices. Synthetic streaming is off; samples
    /// arrive only through [`SimBackend::emit`].
    pub fn new(devices: Vec<SimDeviceConfig>) -> Self {
        let backend = Self {
            state: Mutex::new(SimState {
                devices: Vec::new(),
                next_id: 1,
                faults: HashMap::new(),
            }),
            reachable: AtomicBool::new(true),
            synthetic: AtomicBool::new(false),
            calls: Mutex::new(HashMap::new()),
            total_calls: AtomicUsize::new(0),
            epoch: Instant::now(),
        };
        for config in devices {
            backend.add_device(config);
        }
        backend
    }

    pub fn with_devices(count: usize) -> Self {
        Self::new((0..count).map(SimDeviceConfig::numbered).collect())
    }

    /// A backend shaped by the environment, with synthetic streaming enabled.
    pub fn from_config(config: &Config) -> Self {
        let configs = (0..config.sim_devices)
            .map(|n| {
                let mut device = SimDeviceConfig::numbered(n);
                if !device.frequencies.contains(&config.sim_frequency_hz) {
                    device.frequencies.push(config.sim_frequency_hz);
                    device.frequencies.sort_by(f32::total_cmp);
                }
                device.initial_frequency = config.sim_frequency_hz;
                device
            })
            .collect();
        let backend = Self::new(configs);
        backend.set_synthetic(true);
        backend
    }

    pub fn add_device(&self, config: SimDeviceConfig) -> DeviceId {
        let mut state = self.lock();
        let id = DeviceId(state.next_id);
        state.next_id += 1;
        state.devices.push(SimDevice::new(id, config));
        id
    }

    /// Simulate the transport going away (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Relaxed);
    }

    /// Generate samples on subscribed streams without explicit injection.
    /// Applies to subscriptions made after the call.
    pub fn set_synthetic(&self, enabled: bool) {
        self.synthetic.store(enabled, Ordering::Relaxed);
    }

    /// Make the next `count` calls of `op` fail with a device error.
    pub fn fail_next(&self, op: Op, count: usize) {
        *self.lock().faults.entry(op).or_insert(0) += count;
    }

    /// Number of backend calls of any kind so far.
    pub fn call_count(&self) -> usize {
        self.total_calls.load(Ordering::Relaxed)
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Microseconds since the backend was created.
    pub fn system_time_stamp(&self) -> i64 {
        self.epoch.elapsed().as_micros() as i64
    }

    /// Queue a sample for delivery on the device's matching stream.
    /// Returns false when no such stream is subscribed.
    pub fn emit(&self, device: DeviceId, sample: StreamSample) -> bool {
        let state = self.lock();
        state
            .devices
            .iter()
            .find(|d| d.id == device)
            .and_then(|d| d.streams.get(&sample.kind()))
            .map(|delivery| delivery.sender.send(sample).is_ok())
            .unwrap_or(false)
    }

    /// Whether the device side considers `kind` subscribed.
    pub fn is_streaming(&self, device: DeviceId, kind: StreamKind) -> bool {
        self.lock()
            .devices
            .iter()
            .find(|d| d.id == device)
            .map(|d| d.streams.contains_key(&kind))
            .unwrap_or(false)
    }

    pub fn is_in_calibration_mode(&self, device: DeviceId) -> bool {
        self.lock()
            .devices
            .iter()
            .find(|d| d.id == device)
            .map(|d| d.calibration_mode)
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // A panicking handler must not wedge the simulator.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Account for a call and apply any scheduled fault.
    fn enter_op(&self, state: &mut SimState, op: Op) -> Result<()> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(op).or_insert(0) += 1;
        }
        if !self.reachable.load(Ordering::Relaxed) {
            return Err(GazeError::Connection("simulated transport unreachable".into()));
        }
        if let Some(remaining) = state.faults.get_mut(&op) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(GazeError::Device(format!("injected {:?} failure", op)));
            }
        }
        Ok(())
    }

    fn with_device<T>(
        &self,
        device: DeviceId,
        op: Op,
        f: impl FnOnce(&mut SimDevice, i64) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.lock();
        self.enter_op(&mut state, op)?;
        let now = self.system_time_stamp();
        let dev = state
            .devices
            .iter_mut()
            .find(|d| d.id == device)
            .ok_or_else(|| GazeError::Device(format!("unknown device {}", device)))?;
        f(dev, now)
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::with_devices(1)
    }
}

impl Drop for SimBackend {
    fn drop(&mut self) {
        let mut state = self.lock();
        let deliveries: Vec<Delivery> = state
            .devices
            .iter_mut()
            .flat_map(|d| d.streams.drain().map(|(_, delivery)| delivery))
            .collect();
        drop(state);
        for delivery in deliveries {
            delivery.shutdown();
        }
    }
}

impl DeviceBackend for SimBackend {
    fn discover(&self) -> Result<Vec<DeviceRecord>> {
        let mut state = self.lock();
        self.enter_op(&mut state, Op::Discover)?;
        Ok(state
            .devices
            .iter()
            .map(|d| DeviceRecord {
                id: d.id,
                info: DeviceInfo {
                    serial_number: d.config.serial_number.clone(),
                    address: d.config.address.clone(),
                    device_name: d.config.device_name.clone(),
                    model: d.config.model.clone(),
                    firmware_version: d.config.firmware_version.clone(),
                    capabilities: d.config.capabilities,
                },
            })
            .collect())
    }

    fn display_area(&self, device: DeviceId) -> Result<DisplayArea> {
        self.with_device(device, Op::DisplayArea, |d, _| Ok(d.display_area))
    }

    fn set_display_area(&self, device: DeviceId, area: &DisplayArea) -> Result<()> {
        self.with_device(device, Op::SetDisplayArea, |d, now| {
            d.require(Capabilities::CAN_SET_DISPLAY_AREA, "setting the display area")?;
            d.display_area = *area;
            d.notify(now, NotificationKind::DisplayAreaChanged(*area));
            Ok(())
        })
    }

    fn gaze_output_frequency(&self, device: DeviceId) -> Result<f32> {
        self.with_device(device, Op::Frequency, |d, _| Ok(d.frequency))
    }

    fn set_gaze_output_frequency(&self, device: DeviceId, hz: f32) -> Result<()> {
        self.with_device(device, Op::SetFrequency, |d, now| {
            if !d.config.frequencies.contains(&hz) {
                return Err(GazeError::Device(format!(
                    "{} Hz is not supported by {}",
                    hz, d.config.serial_number
                )));
            }
            d.frequency = hz;
            d.notify(now, NotificationKind::GazeOutputFrequencyChanged(hz));
            Ok(())
        })
    }

    fn all_gaze_output_frequencies(&self, device: DeviceId) -> Result<Vec<f32>> {
        self.with_device(device, Op::AllFrequencies, |d, _| {
            Ok(d.config.frequencies.clone())
        })
    }

    fn enter_calibration_mode(&self, device: DeviceId) -> Result<()> {
        self.with_device(device, Op::EnterCalibration, |d, now| {
            d.require(
                Capabilities::CAN_DO_SCREEN_BASED_CALIBRATION,
                "screen based calibration",
            )?;
            if d.calibration_mode {
                return Err(GazeError::DeviceBusy(d.config.serial_number.clone()));
            }
            d.calibration_mode = true;
            d.collected.clear();
            d.notify(now, NotificationKind::CalibrationModeEntered);
            Ok(())
        })
    }

    fn leave_calibration_mode(&self, device: DeviceId) -> Result<()> {
        self.with_device(device, Op::LeaveCalibration, |d, now| {
            d.require_calibration_mode()?;
            d.calibration_mode = false;
            d.collected.clear();
            d.notify(now, NotificationKind::CalibrationModeLeft);
            Ok(())
        })
    }

    fn collect_data(&self, device: DeviceId, point: CalibrationPoint) -> Result<()> {
        self.with_device(device, Op::Collect, |d, _| {
            d.require_calibration_mode()?;
            d.collected.push(point);
            Ok(())
        })
    }

    fn discard_data(&self, device: DeviceId, point: CalibrationPoint) -> Result<()> {
        self.with_device(device, Op::Discard, |d, _| {
            d.require_calibration_mode()?;
            d.collected.retain(|p| !p.matches(&point));
            Ok(())
        })
    }

    fn compute_and_apply(&self, device: DeviceId) -> Result<CalibrationResult> {
        self.with_device(device, Op::Compute, |d, now| {
            d.require_calibration_mode()?;
            let mut distinct: Vec<CalibrationPoint> = Vec::new();
            for point in &d.collected {
                if !distinct.iter().any(|p| p.matches(point)) {
                    distinct.push(*point);
                }
            }
            if distinct.is_empty() {
                return Ok(CalibrationResult {
                    status: CalibrationStatus::Failure,
                    point_count: 0,
                });
            }
            d.applied = encode_blob(&distinct);
            d.notify(now, NotificationKind::CalibrationChanged);
            Ok(CalibrationResult {
                status: CalibrationStatus::Success,
                point_count: distinct.len(),
            })
        })
    }

    fn retrieve_calibration_data(&self, device: DeviceId) -> Result<CalibrationBlob> {
        self.with_device(device, Op::Retrieve, |d, _| {
            Ok(CalibrationBlob::new(d.applied.clone()))
        })
    }

    fn apply_calibration_data(&self, device: DeviceId, blob: &CalibrationBlob) -> Result<()> {
        self.with_device(device, Op::Apply, |d, now| {
            if !blob.as_bytes().starts_with(BLOB_MAGIC) {
                return Err(GazeError::Device(format!(
                    "{} rejected calibration data of {} bytes",
                    d.config.serial_number,
                    blob.len()
                )));
            }
            d.applied = blob.as_bytes().to_vec();
            d.notify(now, NotificationKind::CalibrationChanged);
            Ok(())
        })
    }

    fn subscribe(&self, device: DeviceId, kind: StreamKind, sink: SampleSink) -> Result<()> {
        let synthetic = self.synthetic.load(Ordering::Relaxed);
        let epoch = self.epoch;
        self.with_device(device, Op::Subscribe, |d, _| {
            match kind {
                StreamKind::Gaze => d.require(Capabilities::HAS_GAZE_DATA, "gaze data")?,
                StreamKind::UserPositionGuide => d.require(
                    Capabilities::HAS_USER_POSITION_GUIDE,
                    "the user position guide",
                )?,
                StreamKind::TimeSync | StreamKind::Notifications => {}
            }
            if d.streams.contains_key(&kind) {
                return Err(GazeError::Device(format!(
                    "{} stream already active on {}",
                    kind, d.config.serial_number
                )));
            }

            let generator = synthetic
                .then(|| Generator::new(kind, d.frequency, d.config.clock_offset_us, epoch))
                .flatten();
            let (sender, receiver) = crossbeam_channel::unbounded();
            let stop = Arc::new(AtomicBool::new(false));
            let stop_clone = stop.clone();
            let thread = std::thread::Builder::new()
                .name(format!("sim-{}-{}", d.config.serial_number, kind))
                .spawn(move || delivery_loop(kind, receiver, sink, stop_clone, generator))
                .map_err(|e| GazeError::Device(format!("failed to spawn delivery thread: {}", e)))?;

            d.streams.insert(
                kind,
                Delivery {
                    sender,
                    stop,
                    thread: Some(thread),
                },
            );
            Ok(())
        })
    }

    fn unsubscribe(&self, device: DeviceId, kind: StreamKind) -> Result<()> {
        // Join outside the lock: the handler may be calling back into us.
        let delivery = self.with_device(device, Op::Unsubscribe, |d, _| {
            Ok(d.streams.remove(&kind))
        })?;
        if let Some(delivery) = delivery {
            delivery.shutdown();
        }
        Ok(())
    }
}

fn encode_blob(points: &[CalibrationPoint]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(BLOB_MAGIC.len() + 4 + points.len() * 8);
    blob.extend_from_slice(BLOB_MAGIC);
    blob.extend_from_slice(&(points.len() as u32).to_le_bytes());
    for point in points {
        blob.extend_from_slice(&point.x().to_le_bytes());
        blob.extend_from_slice(&point.y().to_le_bytes());
    }
    blob
}

/// Produces synthetic samples for one stream.
struct Generator {
    kind: StreamKind,
    period: Duration,
    clock_offset_us: i64,
    epoch: Instant,
    started: Instant,
}

impl Generator {
    /// Notifications are event driven, so there is nothing to generate for them.
    fn new(kind: StreamKind, frequency: f32, clock_offset_us: i64, epoch: Instant) -> Option<Self> {
        let period = match kind {
            StreamKind::Gaze | StreamKind::UserPositionGuide => {
                Duration::from_secs_f32(1.0 / frequency.max(1.0))
            }
            StreamKind::TimeSync => Duration::from_millis(250),
            StreamKind::Notifications => return None,
        };
        Some(Self {
            kind,
            period,
            clock_offset_us,
            epoch,
            started: Instant::now(),
        })
    }

    fn sample(&self) -> StreamSample {
        let system = self.epoch.elapsed().as_micros() as i64;
        let t = self.started.elapsed().as_secs_f32();
        match self.kind {
            StreamKind::Gaze => StreamSample::Gaze(synthetic_gaze(t, system, self.clock_offset_us)),
            StreamKind::UserPositionGuide => {
                let eye = |dx: f32| UserPosition {
                    user_position: Point3D::new(0.5 + dx, 0.5 + 0.02 * t.sin(), 0.5),
                    validity: Validity::Valid,
                };
                StreamSample::UserPositionGuide(UserPositionGuide {
                    left_eye: eye(0.06),
                    right_eye: eye(-0.06),
                })
            }
            StreamKind::TimeSync => StreamSample::TimeSync(TimeSyncData {
                system_request_time_stamp: system,
                device_time_stamp: system + 150 + self.clock_offset_us,
                system_response_time_stamp: system + 300,
            }),
            // Never constructed for notifications.
            StreamKind::Notifications => StreamSample::Notification(Notification {
                system_time_stamp: system,
                kind: NotificationKind::ConnectionRestored,
            }),
        }
    }
}

/// The simulated user looks away for the first 300 ms, then follows a slow
/// ellipse around the screen center.
fn synthetic_gaze(t: f32, system_time_stamp: i64, clock_offset_us: i64) -> GazeData {
    let looking = t >= 0.3;
    let eye = |dx: f32| {
        let (position, validity) = if looking {
            (
                NormalizedPoint2D {
                    x: 0.5 + 0.25 * t.cos() + dx * 0.01,
                    y: 0.5 + 0.2 * (0.7 * t).sin(),
                },
                Validity::Valid,
            )
        } else {
            (
                NormalizedPoint2D {
                    x: f32::NAN,
                    y: f32::NAN,
                },
                Validity::Invalid,
            )
        };
        EyeData {
            gaze_point: GazePoint {
                position_on_display_area: position,
                position_in_user_coordinates: Point3D::new(
                    (position.x - 0.5) * 508.0,
                    (0.5 - position.y) * 286.0 + 158.0,
                    20.0,
                ),
                validity,
            },
            pupil_data: PupilData {
                diameter: 3.2 + 0.1 * t.sin(),
                validity,
            },
            gaze_origin: GazeOrigin {
                position_in_user_coordinates: Point3D::new(dx * 30.0, 10.0, 620.0),
                position_in_track_box_coordinates: Point3D::new(0.5 + dx * 0.05, 0.5, 0.5),
                validity,
            },
        }
    };
    GazeData {
        left_eye: eye(-1.0),
        right_eye: eye(1.0),
        device_time_stamp: system_time_stamp + clock_offset_us,
        system_time_stamp,
    }
}

/// Runs on a dedicated thread per subscription, like a vendor delivery thread.
fn delivery_loop(
    kind: StreamKind,
    receiver: Receiver<StreamSample>,
    sink: SampleSink,
    stop: Arc<AtomicBool>,
    generator: Option<Generator>,
) {
    let tick = generator
        .as_ref()
        .map(|g| g.period)
        .unwrap_or(Duration::from_millis(100));
    let mut next_tick = Instant::now() + tick;

    log::debug!("{} delivery started", kind);

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let wait = next_tick.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(wait) {
            Ok(sample) => sink(sample),
            Err(RecvTimeoutError::Timeout) => {
                next_tick += tick;
                if let Some(generator) = &generator {
                    sink(generator.sample());
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::debug!("{} delivery stopped", kind);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_injection_is_consumed() {
        let sim = SimBackend::with_devices(1);
        let id = sim.discover().unwrap()[0].id;
        sim.enter_calibration_mode(id).unwrap();
        sim.fail_next(Op::Collect, 1);
        let point = CalibrationPoint::new(0.5, 0.5).unwrap();
        assert!(sim.collect_data(id, point).is_err());
        assert!(sim.collect_data(id, point).is_ok());
        assert_eq!(sim.calls(Op::Collect), 2);
    }

    #[test]
    fn test_compute_counts_distinct_points() {
        let sim = SimBackend::with_devices(1);
        let id = sim.discover().unwrap()[0].id;
        sim.enter_calibration_mode(id).unwrap();
        let a = CalibrationPoint::new(0.1, 0.1).unwrap();
        let b = CalibrationPoint::new(0.9, 0.9).unwrap();
        sim.collect_data(id, a).unwrap();
        sim.collect_data(id, a).unwrap();
        sim.collect_data(id, b).unwrap();
        let result = sim.compute_and_apply(id).unwrap();
        assert_eq!(result.status, CalibrationStatus::Success);
        assert_eq!(result.point_count, 2);

        let blob = sim.retrieve_calibration_data(id).unwrap();
        assert!(blob.as_bytes().starts_with(BLOB_MAGIC));
    }

    #[test]
    fn test_synthetic_gaze_starts_off_screen() {
        let early = synthetic_gaze(0.0, 0, 0);
        assert!(!early.both_eyes_on_display());
        let later = synthetic_gaze(1.0, 1_000_000, 5);
        assert!(later.both_eyes_on_display());
        assert_eq!(later.device_time_stamp, 1_000_005);
    }

    #[test]
    fn test_unknown_device_is_device_error() {
        let sim = SimBackend::with_devices(0);
        let err = sim.display_area(DeviceId(42)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DeviceError);
    }
}
