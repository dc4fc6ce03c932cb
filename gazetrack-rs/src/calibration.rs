//! Screen based calibration sessions.
//!
//! A [`CalibrationSession`] borrows a [`DeviceHandle`] and moves between
//! `Idle` and `Entered`. Only one session per handle can be entered at a
//! time. Point operations are only accepted while entered, and leaving
//! always returns the session to `Idle` even when the device objects.

use crate::device::DeviceHandle;
use crate::types::{CalibrationPoint, CalibrationStatus};
use crate::{GazeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Entered,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Entered => "Entered",
        }
    }
}

/// What happened to a point the session attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    Collected,
    Discarded,
    /// Collection failed twice.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub point: CalibrationPoint,
    pub status: PointStatus,
}

/// Result of one compute-and-apply pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationOutcome {
    pub success: bool,
    pub point_count: usize,
}

/// Calibration state machine for one device.
///
/// Dropping an entered session leaves calibration mode.
pub struct CalibrationSession<'d> {
    device: &'d DeviceHandle,
    state: SessionState,
    points: Vec<PointRecord>,
}

impl<'d> CalibrationSession<'d> {
    pub fn new(device: &'d DeviceHandle) -> Self {
        Self {
            device,
            state: SessionState::Idle,
            points: Vec::new(),
        }
    }

    /// Create a session and enter calibration mode.
    pub fn begin(device: &'d DeviceHandle) -> Result<Self> {
        let mut session = Self::new(device);
        session.enter()?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn device(&self) -> &'d DeviceHandle {
        self.device
    }

    /// Every point attempted since the session was entered.
    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }

    /// Points currently contributing to the calibration.
    pub fn active_point_count(&self) -> usize {
        let mut count = 0;
        for (i, record) in self.points.iter().enumerate() {
            if record.status != PointStatus::Collected {
                continue;
            }
            let seen = self.points[..i].iter().any(|earlier| {
                earlier.status == PointStatus::Collected && earlier.point.matches(&record.point)
            });
            if !seen {
                count += 1;
            }
        }
        count
    }

    pub fn enter(&mut self) -> Result<()> {
        self.require_state(SessionState::Idle, "enter")?;

        if !self.device.try_claim_calibration() {
            return Err(GazeError::DeviceBusy(self.device.serial_number().to_string()));
        }
        if let Err(e) = self.device.backend().enter_calibration_mode(self.device.id()) {
            self.device.release_calibration();
            return Err(e);
        }

        self.state = SessionState::Entered;
        self.points.clear();
        log::info!(
            "Entered calibration mode for eye tracker with serial number {}",
            self.device.serial_number()
        );
        Ok(())
    }

    /// Collect data at `point`, retrying once if the device reports a failure.
    ///
    /// A second failure is not an error: the point is recorded and returned
    /// as [`PointStatus::Failed`] and the session stays entered. Only
    /// calling this outside `Entered` fails.
    pub fn collect(&mut self, point: CalibrationPoint) -> Result<PointStatus> {
        self.require_state(SessionState::Entered, "collect")?;

        let backend = self.device.backend();
        let id = self.device.id();
        log::debug!("Collecting data at {}", point);

        let result = backend.collect_data(id, point).or_else(|e| {
            log::warn!("Collecting at {} failed ({}), trying again", point, e);
            backend.collect_data(id, point)
        });

        let status = match result {
            Ok(()) => PointStatus::Collected,
            Err(e) => {
                log::warn!("Giving up on calibration point {}: {}", point, e);
                PointStatus::Failed
            }
        };
        self.points.push(PointRecord { point, status });
        Ok(status)
    }

    /// Remove data collected at `point` from the device.
    pub fn discard(&mut self, point: CalibrationPoint) -> Result<()> {
        self.require_state(SessionState::Entered, "discard")?;

        // Forwarded even without a local record; the device may hold data
        // from before this session.
        self.device.backend().discard_data(self.device.id(), point)?;

        for record in self
            .points
            .iter_mut()
            .filter(|r| r.status == PointStatus::Collected && r.point.matches(&point))
        {
            record.status = PointStatus::Discarded;
        }
        log::info!("Removed calibration point at {}", point);
        Ok(())
    }

    /// Compute a calibration from the collected data and apply it. May be
    /// called any number of times while entered.
    pub fn compute_and_apply(&mut self) -> Result<CalibrationOutcome> {
        self.require_state(SessionState::Entered, "compute_and_apply")?;

        let result = self.device.backend().compute_and_apply(self.device.id())?;
        let outcome = CalibrationOutcome {
            success: result.status == CalibrationStatus::Success,
            point_count: result.point_count,
        };

        let expected = self.active_point_count();
        if outcome.success && outcome.point_count != expected {
            log::warn!(
                "Device calibrated with {} points, session recorded {}",
                outcome.point_count,
                expected
            );
        }
        if outcome.success {
            log::info!(
                "Compute and apply succeeded with {} points",
                outcome.point_count
            );
        } else {
            log::info!("Calibration failed ({} points)", outcome.point_count);
        }
        Ok(outcome)
    }

    /// Leave calibration mode.
    ///
    /// The session is `Idle` afterwards no matter what the device reports;
    /// a device failure is still returned to the caller.
    pub fn leave(&mut self) -> Result<()> {
        self.require_state(SessionState::Entered, "leave")?;

        self.state = SessionState::Idle;
        let result = self.device.backend().leave_calibration_mode(self.device.id());
        // Held until the device is out of calibration mode, so another
        // session cannot enter while this one is still leaving.
        self.device.release_calibration();
        match result {
            Ok(()) => {
                log::info!("Left calibration mode");
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed leaving calibration mode: {}", e);
                Err(e)
            }
        }
    }

    fn require_state(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GazeError::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }
}

impl Drop for CalibrationSession<'_> {
    fn drop(&mut self) {
        if self.state == SessionState::Entered {
            log::debug!(
                "Calibration session on {} dropped while entered, leaving",
                self.device.serial_number()
            );
            let _ = self.leave();
        }
    }
}

impl std::fmt::Debug for CalibrationSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationSession")
            .field("device", &self.device.serial_number())
            .field("state", &self.state)
            .field("points", &self.points)
            .finish()
    }
}

/// Run `f` with the device in calibration mode.
///
/// Calibration mode is left afterwards whatever `f` returns. An error from
/// `f` takes precedence over an error leaving.
pub fn with_calibration<T>(
    device: &DeviceHandle,
    f: impl FnOnce(&mut CalibrationSession<'_>) -> Result<T>,
) -> Result<T> {
    let mut session = CalibrationSession::begin(device)?;
    let result = f(&mut session);
    let left = if session.state() == SessionState::Entered {
        session.leave()
    } else {
        Ok(())
    };
    let value = result?;
    left?;
    Ok(value)
}
