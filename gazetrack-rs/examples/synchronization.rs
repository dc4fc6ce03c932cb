//! Print time synchronization data for two seconds.
//!
//! Usage: cargo run --example synchronization -- <eye_tracker_index>

mod common;

use std::time::{Duration, Instant};

use gazetrack::{Subscriptions, TimeSyncStream, DEFAULT_CHANNEL_CAPACITY};

fn main() {
    common::run(|_config, device| {
        println!(
            "Subscribing to time synchronization data for eye tracker with serial number {}.",
            device.serial_number()
        );
        let subscriptions = Subscriptions::new();
        let (id, stream) =
            match subscriptions.subscribe_channel::<TimeSyncStream>(device, DEFAULT_CHANNEL_CAPACITY) {
                Ok(pair) => pair,
                Err(e) => {
                    println!("Subscribing failed: {}", e);
                    return;
                }
            };

        let deadline = Instant::now() + Duration::from_secs(2);
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            match stream.recv_timeout(left) {
                Ok(sync) => {
                    println!("Device time stamp: {}", sync.device_time_stamp);
                    println!("System request time stamp: {}", sync.system_request_time_stamp);
                    println!("System response time stamp: {}", sync.system_response_time_stamp);
                    println!(
                        "Round trip: {} us, estimated clock offset: {} us",
                        sync.round_trip(),
                        sync.estimated_offset()
                    );
                }
                Err(_) => break,
            }
        }

        common::report(
            "Unsubscribe from time synchronization data",
            &subscriptions.unsubscribe(id),
        );
    });
}
