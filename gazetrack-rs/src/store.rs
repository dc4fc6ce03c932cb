use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::device::DeviceHandle;
use crate::types::CalibrationBlob;
use crate::{GazeError, Result};

/// Saves calibration blobs to a file and restores them onto devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.calibration_file.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the calibration currently applied on `device`. An empty blob
    /// means the device has no calibration.
    pub fn retrieve(&self, device: &DeviceHandle) -> Result<CalibrationBlob> {
        let blob = device.backend().retrieve_calibration_data(device.id())?;
        log::info!(
            "Retrieved {} bytes of calibration data from {}",
            blob.len(),
            device.serial_number()
        );
        Ok(blob)
    }

    /// Write `blob` to the store's file, replacing it atomically.
    ///
    /// An empty blob produces an empty file.
    pub fn save(&self, blob: &CalibrationBlob) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(blob.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| GazeError::Io(e.error))?;

        log::info!(
            "Saved {} bytes of calibration data to {}",
            blob.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read a blob back. A zero length file is `EmptyData`, distinct from
    /// an unreadable one.
    pub fn load(&self) -> Result<CalibrationBlob> {
        let bytes = std::fs::read(&self.path)?;
        if bytes.is_empty() {
            return Err(GazeError::EmptyData);
        }
        log::debug!(
            "Loaded {} bytes of calibration data from {}",
            bytes.len(),
            self.path.display()
        );
        Ok(CalibrationBlob::new(bytes))
    }

    /// Apply `blob` to `device`. Empty blobs are rejected without
    /// contacting the device.
    pub fn apply(&self, device: &DeviceHandle, blob: &CalibrationBlob) -> Result<()> {
        if blob.is_empty() {
            return Err(GazeError::EmptyData);
        }
        device
            .backend()
            .apply_calibration_data(device.id(), blob)?;
        log::info!(
            "Applied {} bytes of calibration data to {}",
            blob.len(),
            device.serial_number()
        );
        Ok(())
    }

    /// Load from the store's file and apply to `device`.
    pub fn restore(&self, device: &DeviceHandle) -> Result<()> {
        let blob = self.load()?;
        self.apply(device, &blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationSession;
    use crate::device::DeviceRegistry;
    use crate::sim::{Op, SimBackend};
    use crate::types::CalibrationPoint;
    use crate::ErrorKind;
    use std::sync::Arc;

    fn calibrated() -> (Arc<SimBackend>, DeviceRegistry) {
        let sim = Arc::new(SimBackend::with_devices(1));
        let registry = DeviceRegistry::find_all(sim.clone()).unwrap();
        {
            let device = registry.resolve(0).unwrap();
            let mut session = CalibrationSession::begin(device).unwrap();
            for (x, y) in [(0.1, 0.1), (0.9, 0.9)] {
                session.collect(CalibrationPoint::new(x, y).unwrap()).unwrap();
            }
            session.compute_and_apply().unwrap();
            session.leave().unwrap();
        }
        (sim, registry)
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CalibrationStore::new(dir.path().join("cal.bin"));
        let blob = CalibrationBlob::new(vec![1, 2, 3, 0, 255]);

        store.save(&blob).unwrap();
        assert_eq!(store.load().unwrap(), blob);

        // Overwrite in place.
        let other = CalibrationBlob::new(vec![9; 64]);
        store.save(&other).unwrap();
        assert_eq!(store.load().unwrap(), other);
    }

    #[test]
    fn test_empty_blob_loads_as_empty_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = CalibrationStore::new(dir.path().join("empty.bin"));
        store.save(&CalibrationBlob::default()).unwrap();
        assert_eq!(std::fs::metadata(store.path()).unwrap().len(), 0);

        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyData);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CalibrationStore::new(dir.path().join("nope.bin"));
        assert_eq!(store.load().unwrap_err().kind(), ErrorKind::IoError);

        let unwritable = CalibrationStore::new(dir.path().join("no/such/dir/cal.bin"));
        let err = unwritable.save(&CalibrationBlob::new(vec![1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoError);
    }

    #[test]
    fn test_apply_empty_never_reaches_device() {
        let (sim, registry) = calibrated();
        let device = registry.resolve(0).unwrap();
        let store = CalibrationStore::new("unused.bin");

        let err = store.apply(device, &CalibrationBlob::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyData);
        assert_eq!(sim.calls(Op::Apply), 0);
    }

    #[test]
    fn test_retrieve_save_restore() {
        let (sim, registry) = calibrated();
        let device = registry.resolve(0).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let store = CalibrationStore::new(dir.path().join("saved_calibration.bin"));

        let blob = store.retrieve(device).unwrap();
        assert!(!blob.is_empty());
        store.save(&blob).unwrap();
        store.restore(device).unwrap();
        assert_eq!(sim.calls(Op::Apply), 1);
        assert_eq!(store.retrieve(device).unwrap(), blob);
    }

    #[test]
    fn test_device_rejects_foreign_blob() {
        let (_sim, registry) = calibrated();
        let device = registry.resolve(0).unwrap();
        let store = CalibrationStore::new("unused.bin");
        let err = store
            .apply(device, &CalibrationBlob::new(b"garbage".to_vec()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceError);
    }

    #[test]
    fn test_uncalibrated_device_has_empty_blob() {
        let sim = Arc::new(SimBackend::with_devices(1));
        let registry = DeviceRegistry::find_all(sim).unwrap();
        let store = CalibrationStore::new("unused.bin");
        assert!(store.retrieve(registry.resolve(0).unwrap()).unwrap().is_empty());
    }
}
