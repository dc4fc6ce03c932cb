//! Print gaze samples for a few seconds.
//!
//! Usage: cargo run --example gaze_data -- <eye_tracker_index>

mod common;

use std::time::Duration;

use gazetrack::{GazeData, GazeStream, Subscriptions};

fn print_sample(gaze: &GazeData) {
    println!(
        "{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}",
        gaze.left_eye.pupil_data.diameter,
        gaze.right_eye.pupil_data.diameter,
        gaze.left_eye.gaze_point.position_on_display_area.x,
        gaze.left_eye.gaze_point.position_on_display_area.y,
        gaze.right_eye.gaze_point.position_on_display_area.x,
        gaze.right_eye.gaze_point.position_on_display_area.y,
    );
}

fn main() {
    common::run(|_config, device| {
        println!(
            "Subscribing to gaze data for eye tracker with serial number {}.",
            device.serial_number()
        );
        let subscriptions = Subscriptions::new();
        let (id, last) = match subscriptions.subscribe_observed::<GazeStream>(device) {
            Ok(pair) => pair,
            Err(e) => {
                println!("Subscribing failed: {}", e);
                return;
            }
        };

        // Print from this thread; the handler only stores the latest sample.
        let mut printed = 0;
        for _ in 0..40 {
            std::thread::sleep(Duration::from_millis(100));
            if let Some(gaze) = last.latest() {
                print_sample(&gaze);
                printed += 1;
            }
        }

        common::report("Unsubscribe from gaze data", &subscriptions.unsubscribe(id));
        println!("Printed {} of {} received samples.", printed, last.count());

        if let Some(gaze) = last.latest() {
            println!("Last received gaze package:");
            println!("System time stamp: {}", gaze.system_time_stamp);
            println!("Device time stamp: {}", gaze.device_time_stamp);
            let left = gaze.left_eye.gaze_point.position_on_display_area;
            println!("Left eye 2D gaze point on display area: ({}, {})", left.x, left.y);
            let origin = gaze.right_eye.gaze_origin.position_in_user_coordinates;
            println!(
                "Right eye 3D gaze origin in user coordinates ({}, {}, {})",
                origin.x, origin.y, origin.z
            );
        }
    });
}
