//! Collect the user position guide for two seconds and print the last one.
//!
//! Usage: cargo run --example user_position_guide -- <eye_tracker_index>

mod common;

use std::time::Duration;

use gazetrack::{Subscriptions, UserPositionStream};

fn main() {
    common::run(|_config, device| {
        println!(
            "Subscribing to user position guide for eye tracker with serial number {}.",
            device.serial_number()
        );
        let subscriptions = Subscriptions::new();
        let (id, guide) = match subscriptions.subscribe_observed::<UserPositionStream>(device) {
            Ok(pair) => pair,
            Err(e) => {
                println!("Subscribing failed: {}", e);
                return;
            }
        };

        std::thread::sleep(Duration::from_secs(2));
        common::report("Unsubscribe from user position guide", &subscriptions.unsubscribe(id));

        match guide.latest() {
            Some(last) => {
                let l = last.left_eye.user_position;
                let r = last.right_eye.user_position;
                println!("Last received user position guide:");
                println!("Left eye user position: ({}, {}, {})", l.x, l.y, l.z);
                println!("Right eye user position: ({}, {}, {})", r.x, r.y, r.z);
            }
            None => println!("No user position guide received."),
        }
    });
}
