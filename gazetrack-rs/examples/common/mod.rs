//! Shared command line handling for the demo programs.
//!
//! Every demo except `find_all_eyetrackers` takes one zero-based device index.
//! The backend is the simulated tracker, shaped by `GAZETRACK_*` variables.

#![allow(dead_code)]

use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use gazetrack::{
    CalibrationPoint, Config, DeviceHandle, DeviceRegistry, PointStatus, SimBackend, Status,
};

#[derive(Parser, Debug)]
#[command(about = "gazetrack demo")]
pub struct Args {
    /// Zero-based index of the eye tracker to use
    pub index: Option<String>,
}

/// Discover devices or exit with the failure's status code.
pub fn discover(config: &Config) -> DeviceRegistry {
    let backend = Arc::new(SimBackend::from_config(config));
    match DeviceRegistry::find_all(backend) {
        Ok(registry) => registry,
        Err(e) => {
            println!("Finding trackers failed. Error: {}", e);
            exit(e.kind().code());
        }
    }
}

/// Parse the device index, discover, resolve, and run `demo` on the device.
///
/// Exits with 1 on a missing, unparsable or out of range index.
pub fn run(demo: impl FnOnce(&Config, &DeviceHandle)) {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "demo".to_string());
    let Some(raw_index) = args.index else {
        println!("Usage: {} <eye_tracker_index>", program);
        exit(1);
    };
    let index: usize = match raw_index.trim().parse() {
        Ok(i) => i,
        Err(_) => {
            println!("Eye tracker index '{}' is not a valid index.", raw_index);
            exit(1);
        }
    };

    let config = Config::from_env();
    let registry = discover(&config);
    let device = match registry.resolve(index) {
        Ok(device) => device,
        Err(_) => {
            println!(
                "Eye tracker index {} is out of range. There are {} trackers available.",
                index,
                registry.len()
            );
            exit(1);
        }
    };

    demo(&config, device);
}

/// Print one status line for an operation.
pub fn report<T>(what: &str, result: &gazetrack::Result<T>) {
    println!("{} returned status {}.", what, Status::of(result));
}

/// Print the outcome of one calibration point collection.
pub fn report_collect(point: &CalibrationPoint, result: &gazetrack::Result<PointStatus>) {
    match result {
        Ok(PointStatus::Failed) => println!("Collecting at {} failed twice, moving on.", point),
        Ok(_) => println!("Collected data at {}.", point),
        Err(e) => println!(
            "Collecting at {} returned status {}.",
            point,
            Status::from_error(e)
        ),
    }
}
