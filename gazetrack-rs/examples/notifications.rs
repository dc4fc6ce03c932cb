//! Subscribe to notifications and trigger a few by entering and leaving
//! calibration mode.
//!
//! Usage: cargo run --example notifications -- <eye_tracker_index>

mod common;

use std::time::Duration;

use gazetrack::{CalibrationSession, NotificationKind, NotificationStream, Subscriptions};

fn main() {
    common::run(|_config, device| {
        let subscriptions = Subscriptions::new();
        let guard = subscriptions.subscribe_scoped::<NotificationStream, _>(device, |note| {
            match note.kind {
                NotificationKind::CalibrationModeEntered => println!(
                    "Enter calibration mode notification received at time stamp {}.",
                    note.system_time_stamp
                ),
                NotificationKind::CalibrationModeLeft => println!(
                    "Left calibration mode notification received at time stamp {}.",
                    note.system_time_stamp
                ),
                other => println!(
                    "Notification {:?} received at time stamp {}.",
                    other, note.system_time_stamp
                ),
            }
        });
        let guard = match guard {
            Ok(guard) => guard,
            Err(e) => {
                println!("Subscribing to notifications failed: {}", e);
                return;
            }
        };

        let mut session = CalibrationSession::new(device);
        common::report("Enter calibration mode", &session.enter());
        common::report("Leave calibration mode", &session.leave());

        // Notifications arrive on the delivery thread.
        std::thread::sleep(Duration::from_millis(200));
        common::report("Unsubscribe from notifications", &guard.unsubscribe());
    });
}
