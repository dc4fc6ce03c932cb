//! Screen based calibration at five points, then redo one of them.
//!
//! Usage: cargo run --example calibration -- <eye_tracker_index>

mod common;

use std::time::Duration;

use gazetrack::{CalibrationOutcome, CalibrationPoint, CalibrationSession, Result};

fn print_outcome(result: &Result<CalibrationOutcome>) {
    match result {
        Ok(outcome) if outcome.success => {
            println!(
                "Compute and apply succeeded and collected at {} points.",
                outcome.point_count
            );
        }
        Ok(_) => println!("Calibration failed!"),
        Err(e) => println!("Calibration failed! ({})", e),
    }
}

fn main() {
    common::run(|_config, device| {
        let mut session = CalibrationSession::new(device);
        let entered = session.enter();
        common::report("Enter calibration mode", &entered);
        if entered.is_err() {
            return;
        }
        println!(
            "Entered calibration mode for eye tracker with serial number {}.",
            device.serial_number()
        );

        let coords = [(0.5, 0.5), (0.1, 0.1), (0.1, 0.9), (0.9, 0.1), (0.9, 0.9)];
        let mut points = Vec::with_capacity(coords.len());
        for (x, y) in coords {
            match CalibrationPoint::new(x, y) {
                Ok(p) => points.push(p),
                Err(e) => println!("Skipping point ({}, {}): {}", x, y, e),
            }
        }

        for point in &points {
            println!("Show a point on screen at {}.", point);
            // Give the user a moment to focus.
            std::thread::sleep(Duration::from_millis(700));
            println!("Collecting data at {}.", point);
            common::report_collect(point, &session.collect(*point));
        }

        println!("Computing and applying calibration.");
        print_outcome(&session.compute_and_apply());

        if let Some(redo) = points.get(1).copied() {
            println!("Removing calibration point at {}.", redo);
            common::report("Discard", &session.discard(redo));
            println!("Show a point on screen at {}.", redo);
            common::report_collect(&redo, &session.collect(redo));

            println!("Computing and applying calibration.");
            print_outcome(&session.compute_and_apply());
        }

        common::report("Leave calibration mode", &session.leave());
        println!("Left calibration mode.");
    });
}
