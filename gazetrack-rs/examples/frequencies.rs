//! Step through every supported gaze output frequency, then restore the
//! initial one.
//!
//! Usage: cargo run --example frequencies -- <eye_tracker_index>

mod common;

use gazetrack::Status;

fn main() {
    common::run(|_config, device| {
        let initial = device.gaze_output_frequency();
        let initial = match initial {
            Ok(hz) => {
                println!("The eye tracker's initial gaze output frequency is {} Hz.", hz);
                hz
            }
            Err(e) => {
                println!("Reading the gaze output frequency failed: {}", e);
                return;
            }
        };

        match device.all_gaze_output_frequencies() {
            Ok(all) => {
                for hz in all {
                    let set = device.set_gaze_output_frequency(hz);
                    println!(
                        "Gaze output frequency set to {} Hz with status {}.",
                        hz,
                        Status::of(&set)
                    );
                }
                common::report(
                    "Restore gaze output frequency",
                    &device.set_gaze_output_frequency(initial),
                );
                println!("Gaze output frequency reset to {} Hz.", initial);
            }
            Err(e) => println!("Listing gaze output frequencies failed: {}", e),
        }
    });
}
