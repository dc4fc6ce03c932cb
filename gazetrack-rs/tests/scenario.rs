//! End-to-end session against the simulated tracker: discovery, calibration,
//! calibration persistence and a gaze subscription.

use std::sync::Arc;
use std::time::Duration;

use gazetrack::sim::Op;
use gazetrack::{
    CalibrationBlob, CalibrationPoint, CalibrationSession, CalibrationStore, DeviceRegistry,
    ErrorKind, GazeData, GazeStream, PointStatus, SessionState, SimBackend, Status, StreamKind,
    StreamSample, Subscriptions,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_two_device_session() {
    init_logging();
    let sim = Arc::new(SimBackend::with_devices(2));

    // Discovery and index resolution.
    let registry = DeviceRegistry::find_all(sim.clone()).unwrap();
    assert_eq!(registry.len(), 2);
    let device = registry.resolve(0).unwrap();
    let status = Status::of(&registry.resolve(2));
    assert!(!status.ok);
    assert_eq!(status.code, ErrorKind::OutOfRange);

    // Calibration that ends with nothing collected.
    let point = CalibrationPoint::new(0.5, 0.5).unwrap();
    let mut session = CalibrationSession::new(device);
    session.enter().unwrap();
    assert_eq!(session.collect(point).unwrap(), PointStatus::Collected);
    session.discard(point).unwrap();
    let outcome = session.compute_and_apply().unwrap();
    assert_eq!(outcome.point_count, 0);
    session.leave().unwrap();
    assert_eq!(session.state(), SessionState::Idle);

    // An empty blob survives the file round trip only as EmptyData.
    let dir = tempfile::tempdir().unwrap();
    let store = CalibrationStore::new(dir.path().join("saved_calibration.bin"));
    store.save(&CalibrationBlob::default()).unwrap();
    assert_eq!(store.load().unwrap_err().kind(), ErrorKind::EmptyData);

    // One gaze sample, then unsubscribe twice.
    let subscriptions = Subscriptions::new();
    let (id, stream) = subscriptions
        .subscribe_channel::<GazeStream>(device, 8)
        .unwrap();
    assert!(sim.emit(
        device.id(),
        StreamSample::Gaze(GazeData {
            system_time_stamp: 42,
            ..Default::default()
        })
    ));
    let sample = stream.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(sample.system_time_stamp, 42);

    subscriptions.unsubscribe(id).unwrap();
    let unsubscribes = sim.calls(Op::Unsubscribe);
    assert!(subscriptions.unsubscribe(id).is_ok());
    assert_eq!(sim.calls(Op::Unsubscribe), unsubscribes);
    assert!(!sim.is_streaming(device.id(), StreamKind::Gaze));
}

#[test]
fn test_calibrate_persist_and_restore_on_other_device() {
    init_logging();
    let sim = Arc::new(SimBackend::with_devices(2));
    let registry = DeviceRegistry::find_all(sim.clone()).unwrap();
    let source = registry.resolve(0).unwrap();
    let target = registry.resolve(1).unwrap();

    let outcome = gazetrack::with_calibration(source, |session| {
        for (x, y) in [(0.5, 0.5), (0.1, 0.1), (0.9, 0.9)] {
            session.collect(CalibrationPoint::new(x, y)?)?;
        }
        session.compute_and_apply()
    })
    .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.point_count, 3);

    let dir = tempfile::tempdir().unwrap();
    let store = CalibrationStore::new(dir.path().join("cal.bin"));
    let blob = store.retrieve(source).unwrap();
    store.save(&blob).unwrap();

    assert!(store.retrieve(target).unwrap().is_empty());
    store.restore(target).unwrap();
    assert_eq!(store.retrieve(target).unwrap(), blob);
}

#[test]
fn test_synthetic_gaze_reaches_screen() {
    init_logging();
    let sim = Arc::new(SimBackend::with_devices(1));
    sim.set_synthetic(true);
    let registry = DeviceRegistry::find_all(sim.clone()).unwrap();
    let device = registry.resolve(0).unwrap();

    let subscriptions = Subscriptions::new();
    let (id, gaze) = subscriptions.subscribe_observed::<GazeStream>(device).unwrap();
    let on_screen = gaze
        .wait_until(
            GazeData::both_eyes_on_display,
            gazetrack::WaitPolicy::with_timeout(Duration::from_secs(10)),
        )
        .unwrap();
    assert!(on_screen.left_eye.is_on_display());
    assert!(gaze.count() > 1);
    subscriptions.unsubscribe(id).unwrap();
}
