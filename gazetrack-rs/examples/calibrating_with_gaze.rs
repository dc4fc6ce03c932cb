//! Calibrate once the user is looking at the screen.
//!
//! Gaze is subscribed before calibration starts and unsubscribed after it
//! ends; collection waits until both eyes are on the display.
//!
//! Usage: cargo run --example calibrating_with_gaze -- <eye_tracker_index>

mod common;

use gazetrack::{
    CalibrationPoint, CalibrationSession, GazeData, GazeStream, SubscriptionId, Subscriptions,
};

fn unsubscribe_gaze(subscriptions: &Subscriptions, id: SubscriptionId) {
    match subscriptions.unsubscribe(id) {
        Ok(()) => println!("Unsubscribed from gaze."),
        Err(e) => println!("Failed unsubscribing from gaze: {}.", e),
    }
}

fn main() {
    common::run(|config, device| {
        let subscriptions = Subscriptions::new();
        let (gaze_id, gaze) = match subscriptions.subscribe_observed::<GazeStream>(device) {
            Ok(pair) => pair,
            Err(e) => {
                println!("Failed while subscribing to gaze: {}", e);
                return;
            }
        };

        let mut session = CalibrationSession::new(device);
        let entered = session.enter();
        common::report("Enter calibration mode", &entered);
        if entered.is_err() {
            // No points are attempted without calibration mode.
            unsubscribe_gaze(&subscriptions, gaze_id);
            return;
        }
        println!(
            "Entered calibration mode for eye tracker with serial number {}.",
            device.serial_number()
        );

        let point = match CalibrationPoint::new(0.5, 0.5) {
            Ok(p) => p,
            Err(e) => {
                println!("{}", e);
                return;
            }
        };
        println!("Show a point on screen at {}.", point);
        println!("Wait for user to look at the screen until we gather calibration data.");

        match gaze.wait_until(GazeData::both_eyes_on_display, config.wait_policy()) {
            Ok(sample) => {
                let left = sample.left_eye.gaze_point.position_on_display_area;
                let right = sample.right_eye.gaze_point.position_on_display_area;
                println!(
                    "Left eye gaze point: ({}, {})\nRight eye gaze point: ({}, {})",
                    left.x, left.y, right.x, right.y
                );

                println!("Collecting data at {}.", point);
                common::report_collect(&point, &session.collect(point));

                println!("Computing and applying calibration.");
                match session.compute_and_apply() {
                    Ok(outcome) if outcome.success => println!(
                        "Compute and apply succeeded and collected at {} points.",
                        outcome.point_count
                    ),
                    Ok(_) | Err(_) => println!("Calibration failed!"),
                }
            }
            Err(e) => println!("User never looked at the screen: {}", e),
        }

        match session.leave() {
            Ok(()) => println!("Left calibration mode."),
            Err(e) => println!("Failed leaving calibration mode: {}.", e),
        }

        unsubscribe_gaze(&subscriptions, gaze_id);
        println!("Received {} gaze samples.", gaze.count());
    });
}
