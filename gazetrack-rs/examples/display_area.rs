//! Read the display area and write the same geometry back.
//!
//! Usage: cargo run --example display_area -- <eye_tracker_index>

mod common;

use gazetrack::{DisplayArea, Point3D};

fn corner(name: &str, p: &Point3D) {
    println!("{}: ({}, {}, {})", name, p.x, p.y, p.z);
}

fn main() {
    common::run(|_config, device| {
        let area = device.display_area();
        println!(
            "Got display area from tracker with serial number {} with status {}:",
            device.serial_number(),
            gazetrack::Status::of(&area)
        );
        let area = match area {
            Ok(area) => area,
            Err(_) => return,
        };

        println!("Height: {}", area.height);
        println!("Width: {}", area.width);
        corner("Bottom Left", &area.bottom_left);
        corner("Bottom Right", &area.bottom_right);
        corner("Top Left", &area.top_left);
        corner("Top Right", &area.top_right);

        // Same corners as already configured.
        let new_area = DisplayArea::from_corners(area.top_left, area.top_right, area.bottom_left);
        common::report("Set display area", &device.set_display_area(&new_area));
    });
}
