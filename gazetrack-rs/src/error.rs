use std::fmt;

use crate::types::StreamKind;

/// Errors that can occur when driving an eye tracker.
#[derive(Debug, thiserror::Error)]
pub enum GazeError {
    #[error("Cannot reach eye tracker transport: {0}")]
    Connection(String),

    #[error("Device index {index} is out of range ({count} device(s) available)")]
    OutOfRange { index: usize, count: usize },

    #[error("Device {0} is busy with another calibration session")]
    DeviceBusy(String),

    #[error("{kind} stream is already subscribed on device {serial}")]
    AlreadySubscribed { kind: StreamKind, serial: String },

    #[error("Device call failed: {0}")]
    Device(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Calibration data is empty")]
    EmptyData,

    #[error("Operation '{operation}' is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Timeout waiting for data")]
    Timeout,

    #[error("Sample stream closed")]
    StreamClosed,
}

impl GazeError {
    /// Classify the error into its status code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GazeError::Connection(_) => ErrorKind::ConnectionError,
            GazeError::OutOfRange { .. } => ErrorKind::OutOfRange,
            GazeError::DeviceBusy(_) => ErrorKind::DeviceBusy,
            GazeError::AlreadySubscribed { .. } => ErrorKind::AlreadySubscribed,
            GazeError::Device(_) => ErrorKind::DeviceError,
            GazeError::Io(_) => ErrorKind::IoError,
            GazeError::EmptyData => ErrorKind::EmptyData,
            GazeError::InvalidState { .. } => ErrorKind::InvalidState,
            GazeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GazeError::Timeout => ErrorKind::Timeout,
            GazeError::StreamClosed => ErrorKind::InvalidState,
        }
    }
}

/// Status code carried by every [`Status`].
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Ok = 0,
    ConnectionError = 2,
    OutOfRange = 3,
    DeviceBusy = 4,
    AlreadySubscribed = 5,
    DeviceError = 6,
    IoError = 7,
    EmptyData = 8,
    InvalidState = 9,
    InvalidArgument = 10,
    Timeout = 11,
}

impl ErrorKind {
    /// Stable numeric code, also used as the process exit code by the demos.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Ok => "Ok",
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::OutOfRange => "OutOfRange",
            ErrorKind::DeviceBusy => "DeviceBusy",
            ErrorKind::AlreadySubscribed => "AlreadySubscribed",
            ErrorKind::DeviceError => "DeviceError",
            ErrorKind::IoError => "IoError",
            ErrorKind::EmptyData => "EmptyData",
            ErrorKind::InvalidState => "InvalidState",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::Timeout => "Timeout",
        };
        f.write_str(name)
    }
}

/// Uniform, reportable outcome of a device operation.
///
/// Built from any `Result` so that callers can print one status line per
/// operation without matching on the error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub ok: bool,
    pub code: ErrorKind,
    pub message: String,
}

impl Status {
    pub fn ok() -> Self {
        Self {
            ok: true,
            code: ErrorKind::Ok,
            message: String::new(),
        }
    }

    pub fn from_error(err: &GazeError) -> Self {
        Self {
            ok: false,
            code: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn of<T>(result: &crate::Result<T>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::from_error(e),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ok {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} ({})", self.code, self.message)
        }
    }
}

impl<T> From<&crate::Result<T>> for Status {
    fn from(result: &crate::Result<T>) -> Self {
        Status::of(result)
    }
}
