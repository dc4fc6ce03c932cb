use std::fmt;

use crate::{GazeError, Result};

/// Opaque token identifying a device within one discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity and capabilities reported by a device at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub serial_number: String,
    pub address: String,
    pub device_name: String,
    pub model: String,
    pub firmware_version: String,
    pub capabilities: Capabilities,
}

bitflags::bitflags! {
    /// Feature bitmap reported by an eye tracker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const CAN_SET_DISPLAY_AREA          = 1 << 0;
        const HAS_EXTERNAL_SIGNAL           = 1 << 1;
        const HAS_EYE_IMAGES                = 1 << 2;
        const HAS_GAZE_DATA                 = 1 << 3;
        const CAN_DO_SCREEN_BASED_CALIBRATION = 1 << 5;
        const CAN_DO_MONOCULAR_CALIBRATION  = 1 << 8;
        const HAS_USER_POSITION_GUIDE       = 1 << 10;
    }
}

/// Whether a measured value can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Invalid,
    Valid,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self == Validity::Valid
    }
}

/// Point in the normalized display coordinate system: (0, 0) is the upper
/// left corner and (1, 1) the lower right. Gaze may fall outside that range
/// (or be NaN) when the user looks away.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint2D {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint2D {
    pub fn is_on_display(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Point in millimeters, or normalized 3D coordinates for position guides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn sub(self, other: Point3D) -> Point3D {
        Point3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    fn add(self, other: Point3D) -> Point3D {
        Point3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    fn norm(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Screen position for calibration, validated to lie in `[0, 1]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    x: f32,
    y: f32,
}

impl CalibrationPoint {
    /// Tolerance used when matching a discard request against collected points.
    const MATCH_EPSILON: f32 = 1e-6;

    pub fn new(x: f32, y: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            return Err(GazeError::InvalidArgument(format!(
                "calibration point ({}, {}) is outside [0, 1]",
                x, y
            )));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub(crate) fn matches(&self, other: &CalibrationPoint) -> bool {
        (self.x - other.x).abs() <= Self::MATCH_EPSILON
            && (self.y - other.y).abs() <= Self::MATCH_EPSILON
    }
}

impl fmt::Display for CalibrationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6},{:.6})", self.x, self.y)
    }
}

/// Physical geometry of the screen the tracker is calibrated against,
/// in millimeters in the tracker's user coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayArea {
    pub top_left: Point3D,
    pub top_right: Point3D,
    pub bottom_left: Point3D,
    pub bottom_right: Point3D,
    pub width: f32,
    pub height: f32,
}

impl DisplayArea {
    /// Build a display area from three corners. The display is assumed to be
    /// a parallelogram, so the bottom right corner and the size follow.
    pub fn from_corners(top_left: Point3D, top_right: Point3D, bottom_left: Point3D) -> Self {
        let horizontal = top_right.sub(top_left);
        let vertical = bottom_left.sub(top_left);
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right: bottom_left.add(horizontal),
            width: horizontal.norm(),
            height: vertical.norm(),
        }
    }
}

/// Gaze point for one eye.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GazePoint {
    pub position_on_display_area: NormalizedPoint2D,
    pub position_in_user_coordinates: Point3D,
    pub validity: Validity,
}

/// Pupil diameter in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PupilData {
    pub diameter: f32,
    pub validity: Validity,
}

/// Position of the eye in space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GazeOrigin {
    pub position_in_user_coordinates: Point3D,
    pub position_in_track_box_coordinates: Point3D,
    pub validity: Validity,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EyeData {
    pub gaze_point: GazePoint,
    pub pupil_data: PupilData,
    pub gaze_origin: GazeOrigin,
}

impl EyeData {
    pub fn is_on_display(&self) -> bool {
        self.gaze_point.validity.is_valid()
            && self.gaze_point.position_on_display_area.is_on_display()
    }
}

/// One gaze sample. Time stamps are in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GazeData {
    pub left_eye: EyeData,
    pub right_eye: EyeData,
    pub device_time_stamp: i64,
    pub system_time_stamp: i64,
}

impl GazeData {
    /// True when both eyes report a valid gaze point inside the display area.
    pub fn both_eyes_on_display(&self) -> bool {
        self.left_eye.is_on_display() && self.right_eye.is_on_display()
    }
}

/// Clock synchronization sample, all time stamps in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSyncData {
    pub system_request_time_stamp: i64,
    pub device_time_stamp: i64,
    pub system_response_time_stamp: i64,
}

impl TimeSyncData {
    pub fn round_trip(&self) -> i64 {
        self.system_response_time_stamp - self.system_request_time_stamp
    }

    /// Device clock minus system clock, assuming the device stamped the
    /// request halfway through the round trip.
    pub fn estimated_offset(&self) -> i64 {
        let midpoint = self.system_request_time_stamp + self.round_trip() / 2;
        self.device_time_stamp - midpoint
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UserPosition {
    /// Normalized position in the track box, (0.5, 0.5, 0.5) is the center.
    pub user_position: Point3D,
    pub validity: Validity,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UserPositionGuide {
    pub left_eye: UserPosition,
    pub right_eye: UserPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    CalibrationModeEntered,
    CalibrationModeLeft,
    CalibrationChanged,
    DisplayAreaChanged(DisplayArea),
    GazeOutputFrequencyChanged(f32),
    DeviceFaults(String),
    DeviceWarnings(String),
    ConnectionLost,
    ConnectionRestored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub system_time_stamp: i64,
    pub kind: NotificationKind,
}

/// Data streams a device can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Gaze,
    TimeSync,
    UserPositionGuide,
    Notifications,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamKind::Gaze => "gaze",
            StreamKind::TimeSync => "time synchronization",
            StreamKind::UserPositionGuide => "user position guide",
            StreamKind::Notifications => "notification",
        };
        f.write_str(name)
    }
}

/// Untyped sample as it crosses the backend boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamSample {
    Gaze(GazeData),
    TimeSync(TimeSyncData),
    UserPositionGuide(UserPositionGuide),
    Notification(Notification),
}

impl StreamSample {
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamSample::Gaze(_) => StreamKind::Gaze,
            StreamSample::TimeSync(_) => StreamKind::TimeSync,
            StreamSample::UserPositionGuide(_) => StreamKind::UserPositionGuide,
            StreamSample::Notification(_) => StreamKind::Notifications,
        }
    }
}

/// Calibration status reported by the device after compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    Success,
    Failure,
}

/// Raw compute result as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationResult {
    pub status: CalibrationStatus,
    pub point_count: usize,
}

/// Opaque, device-specific calibration state. Zero length means "no
/// calibration", which is a valid value rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalibrationBlob(Vec<u8>);

impl CalibrationBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for CalibrationBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_point_range() {
        assert!(CalibrationPoint::new(0.0, 1.0).is_ok());
        assert!(CalibrationPoint::new(0.5, 0.5).is_ok());
        assert!(CalibrationPoint::new(-0.1, 0.5).is_err());
        assert!(CalibrationPoint::new(0.5, 1.01).is_err());
        assert!(CalibrationPoint::new(f32::NAN, 0.5).is_err());
    }

    #[test]
    fn test_display_area_from_corners() {
        let area = DisplayArea::from_corners(
            Point3D::new(-250.0, 300.0, 0.0),
            Point3D::new(250.0, 300.0, 0.0),
            Point3D::new(-250.0, 0.0, 0.0),
        );
        assert_eq!(area.bottom_right, Point3D::new(250.0, 0.0, 0.0));
        assert!((area.width - 500.0).abs() < 1e-3);
        assert!((area.height - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_both_eyes_on_display() {
        let on = EyeData {
            gaze_point: GazePoint {
                position_on_display_area: NormalizedPoint2D { x: 0.4, y: 0.6 },
                validity: Validity::Valid,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut gaze = GazeData {
            left_eye: on,
            right_eye: on,
            ..Default::default()
        };
        assert!(gaze.both_eyes_on_display());

        gaze.right_eye.gaze_point.position_on_display_area.x = f32::NAN;
        assert!(!gaze.both_eyes_on_display());

        gaze.right_eye = on;
        gaze.left_eye.gaze_point.validity = Validity::Invalid;
        assert!(!gaze.both_eyes_on_display());
    }

    #[test]
    fn test_time_sync_offset() {
        let sync = TimeSyncData {
            system_request_time_stamp: 1_000,
            device_time_stamp: 6_050,
            system_response_time_stamp: 1_100,
        };
        assert_eq!(sync.round_trip(), 100);
        assert_eq!(sync.estimated_offset(), 5_000);
    }
}
