//! Save the device's calibration to a file and apply it back.
//!
//! The file is `GAZETRACK_CALIBRATION_FILE`, `saved_calibration.bin` by default.
//!
//! Usage: cargo run --example calibration_data -- <eye_tracker_index>

mod common;

use gazetrack::{CalibrationStore, ErrorKind};

fn main() {
    common::run(|config, device| {
        let store = CalibrationStore::from_config(config);

        let blob = match store.retrieve(device) {
            Ok(blob) => blob,
            Err(e) => {
                println!("Retrieving calibration failed: {}", e);
                return;
            }
        };

        if blob.is_empty() {
            println!(
                "No calibration available for eye tracker with serial number {}.",
                device.serial_number()
            );
        } else {
            println!(
                "Saving calibration to file for eye tracker with serial number {}.",
                device.serial_number()
            );
        }
        let saved = store.save(&blob);
        common::report("Save", &saved);
        if saved.is_err() {
            return;
        }

        match store.load() {
            Ok(loaded) => {
                println!(
                    "Applying calibration on eye tracker with serial number {}.",
                    device.serial_number()
                );
                common::report("Apply", &store.apply(device, &loaded));
            }
            Err(e) if e.kind() == ErrorKind::EmptyData => {
                println!("Calibration file is empty!");
            }
            Err(e) => println!("Calibration file not readable: {}", e),
        }
    });
}
