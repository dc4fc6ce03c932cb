use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{DeviceBackend, DeviceRecord};
use crate::types::{Capabilities, DeviceId, DeviceInfo, DisplayArea, StreamKind};
use crate::{GazeError, Result};

/// A discovered eye tracker.
///
/// Handles are owned by the [`DeviceRegistry`] that discovered them and are
/// lent out by reference, so a registry cannot be refreshed while anything
/// still holds one.
pub struct DeviceHandle {
    id: DeviceId,
    info: DeviceInfo,
    backend: Arc<dyn DeviceBackend>,
    /// Set while a calibration session has this device in calibration mode.
    calibrating: AtomicBool,
    streams: Arc<StreamClaims>,
}

/// Stream kinds with a live handler on one device, shared by every
/// `Subscriptions` that subscribes through the handle.
#[derive(Debug, Default)]
pub(crate) struct StreamClaims {
    kinds: Mutex<HashSet<StreamKind>>,
}

impl StreamClaims {
    /// Returns false if `kind` is already claimed.
    pub(crate) fn try_claim(&self, kind: StreamKind) -> bool {
        self.lock().insert(kind)
    }

    pub(crate) fn release(&self, kind: StreamKind) {
        self.lock().remove(&kind);
    }

    pub(crate) fn is_claimed(&self, kind: StreamKind) -> bool {
        self.lock().contains(&kind)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<StreamKind>> {
        self.kinds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceHandle {
    fn new(record: DeviceRecord, backend: Arc<dyn DeviceBackend>) -> Self {
        Self {
            id: record.id,
            info: record.info,
            backend,
            calibrating: AtomicBool::new(false),
            streams: Arc::new(StreamClaims::default()),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn serial_number(&self) -> &str {
        &self.info.serial_number
    }

    pub fn address(&self) -> &str {
        &self.info.address
    }

    pub fn device_name(&self) -> &str {
        &self.info.device_name
    }

    pub fn model(&self) -> &str {
        &self.info.model
    }

    pub fn firmware_version(&self) -> &str {
        &self.info.firmware_version
    }

    pub fn capabilities(&self) -> Capabilities {
        self.info.capabilities
    }

    /// Read the display area the device is currently configured for.
    pub fn display_area(&self) -> Result<DisplayArea> {
        self.backend.display_area(self.id)
    }

    pub fn set_display_area(&self, area: &DisplayArea) -> Result<()> {
        self.backend.set_display_area(self.id, area)?;
        log::info!(
            "Display area set on {}: {:.1}x{:.1} mm",
            self.serial_number(),
            area.width,
            area.height
        );
        Ok(())
    }

    /// Current gaze output frequency in Hz.
    pub fn gaze_output_frequency(&self) -> Result<f32> {
        self.backend.gaze_output_frequency(self.id)
    }

    pub fn set_gaze_output_frequency(&self, hz: f32) -> Result<()> {
        self.backend.set_gaze_output_frequency(self.id, hz)?;
        log::info!("Gaze output frequency on {} set to {} Hz", self.serial_number(), hz);
        Ok(())
    }

    /// All gaze output frequencies the device supports.
    pub fn all_gaze_output_frequencies(&self) -> Result<Vec<f32>> {
        self.backend.all_gaze_output_frequencies(self.id)
    }

    pub(crate) fn backend(&self) -> &dyn DeviceBackend {
        self.backend.as_ref()
    }

    pub(crate) fn shared_backend(&self) -> Arc<dyn DeviceBackend> {
        Arc::clone(&self.backend)
    }

    pub(crate) fn stream_claims(&self) -> Arc<StreamClaims> {
        Arc::clone(&self.streams)
    }

    /// Whether some subscription currently holds `kind` on this device.
    pub fn is_streaming(&self, kind: StreamKind) -> bool {
        self.streams.is_claimed(kind)
    }

    /// Claim calibration mode for this handle. Returns false if already claimed.
    pub(crate) fn try_claim_calibration(&self) -> bool {
        self.calibrating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release_calibration(&self) {
        self.calibrating.store(false, Ordering::Release);
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("id", &self.id)
            .field("info", &self.info)
            .finish()
    }
}

/// Enumerates eye trackers and owns the resulting handles.
pub struct DeviceRegistry {
    backend: Arc<dyn DeviceBackend>,
    devices: Vec<DeviceHandle>,
}

impl DeviceRegistry {
    /// Create an empty registry. Call [`DeviceRegistry::discover`] to populate it.
    pub fn new(backend: Arc<dyn DeviceBackend>) -> Self {
        Self {
            backend,
            devices: Vec::new(),
        }
    }

    /// Create a registry and run one discovery pass.
    pub fn find_all(backend: Arc<dyn DeviceBackend>) -> Result<Self> {
        let mut registry = Self::new(backend);
        registry.discover()?;
        Ok(registry)
    }

    /// Enumerate the devices visible right now, replacing any previous list.
    ///
    /// Records without a serial number are skipped; every other component
    /// identifies devices by it.
    pub fn discover(&mut self) -> Result<&[DeviceHandle]> {
        let records = self.backend.discover()?;
        let mut devices = Vec::with_capacity(records.len());

        for record in records {
            if record.info.serial_number.is_empty() {
                log::warn!(
                    "Skipping device {} at {:?}: empty serial number",
                    record.id,
                    record.info.address
                );
                continue;
            }
            log::info!(
                "Found eye tracker: {} serial={} model={} firmware={} address={}",
                record.info.device_name,
                record.info.serial_number,
                record.info.model,
                record.info.firmware_version,
                record.info.address
            );
            devices.push(DeviceHandle::new(record, Arc::clone(&self.backend)));
        }

        self.devices = devices;
        Ok(&self.devices)
    }

    /// Handle for the device at `index` in discovery order.
    pub fn resolve(&self, index: usize) -> Result<&DeviceHandle> {
        self.devices.get(index).ok_or(GazeError::OutOfRange {
            index,
            count: self.devices.len(),
        })
    }

    pub fn devices(&self) -> &[DeviceHandle] {
        &self.devices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceHandle> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<'a> IntoIterator for &'a DeviceRegistry {
    type Item = &'a DeviceHandle;
    type IntoIter = std::slice::Iter<'a, DeviceHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBackend, SimDeviceConfig};
    use crate::ErrorKind;

    fn registry_with(count: usize) -> (Arc<SimBackend>, DeviceRegistry) {
        let sim = Arc::new(SimBackend::with_devices(count));
        let registry = DeviceRegistry::find_all(sim.clone()).unwrap();
        (sim, registry)
    }

    #[test]
    fn test_resolve_valid_indices() {
        let (_sim, registry) = registry_with(3);
        assert_eq!(registry.len(), 3);
        for i in 0..registry.len() {
            let device = registry.resolve(i).unwrap();
            assert!(!device.serial_number().is_empty());
        }
    }

    #[test]
    fn test_resolve_out_of_range_does_not_touch_device() {
        let (sim, registry) = registry_with(2);
        let calls_before = sim.call_count();
        let err = registry.resolve(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert!(registry.resolve(usize::MAX).is_err());
        assert_eq!(sim.call_count(), calls_before);
    }

    #[test]
    fn test_discover_unreachable_transport() {
        let sim = Arc::new(SimBackend::with_devices(1));
        sim.set_reachable(false);
        let mut registry = DeviceRegistry::new(sim);
        let err = registry.discover().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionError);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_discover_skips_devices_without_serial() {
        let sim = Arc::new(SimBackend::new(vec![
            SimDeviceConfig::numbered(0),
            SimDeviceConfig {
                serial_number: String::new(),
                ..SimDeviceConfig::numbered(1)
            },
        ]));
        let registry = DeviceRegistry::find_all(sim).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rediscover_replaces_list() {
        let (sim, mut registry) = registry_with(1);
        sim.add_device(SimDeviceConfig::numbered(7));
        let devices = registry.discover().unwrap();
        assert_eq!(devices.len(), 2);
    }

    #[test]
    fn test_display_area_and_frequency_round_trip() {
        let (_sim, registry) = registry_with(1);
        let device = registry.resolve(0).unwrap();

        let area = device.display_area().unwrap();
        let moved = DisplayArea::from_corners(area.top_left, area.top_right, area.bottom_left);
        device.set_display_area(&moved).unwrap();
        assert_eq!(device.display_area().unwrap(), moved);

        let all = device.all_gaze_output_frequencies().unwrap();
        assert!(!all.is_empty());
        let initial = device.gaze_output_frequency().unwrap();
        for hz in &all {
            device.set_gaze_output_frequency(*hz).unwrap();
            assert_eq!(device.gaze_output_frequency().unwrap(), *hz);
        }
        device.set_gaze_output_frequency(initial).unwrap();
        assert!(device.set_gaze_output_frequency(1234.0).is_err());
    }
}
