//! List every eye tracker the backend can see.
//!
//! Usage: cargo run --example find_all_eyetrackers

mod common;

use gazetrack::Config;

fn main() {
    env_logger::init();

    let config = Config::from_env();
    let registry = common::discover(&config);

    println!("Found {} eye tracker(s):", registry.len());
    for (i, device) in registry.iter().enumerate() {
        println!(
            "  [{}] Address: {}  Model: {}  Name: {}  Serial: {}  Firmware: {}",
            i,
            device.address(),
            device.model(),
            device.device_name(),
            device.serial_number(),
            device.firmware_version()
        );
        println!("      Capabilities: {:?}", device.capabilities());
    }
}
