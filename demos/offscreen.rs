//! Renders a scene without a window and writes a screenshot to disk.
//!
//! Run with `cargo run --example offscreen`.

use std::path::Path;

use vantage::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::default()
        .with_window_size(640, 480)
        .with_floor(true);
    let mut viewer = Viewer::new(WindowType::Offscreen, "", config)?;

    viewer.append_group("root")?;
    viewer.append_cylinder("root", "column", 0.3, 1.2)?;
    viewer.set_material("root", "column", [0.8, 0.7, 0.2, 1.0], None)?;
    viewer.move_nodes(
        "root",
        &[(
            "column",
            Pose::new(Vector3::new(0.0, 0.0, 0.6), Quaternion::new(1.0, 0.0, 0.0, 0.0)),
        )],
    )?;

    let shot = viewer.get_screenshot("RGB")?;
    println!(
        "captured {}x{} with {} channels",
        shot.width, shot.height, shot.channels
    );

    let path = viewer.save_screenshot(Some(Path::new("offscreen.png")))?;
    println!("written to {}", path.display());

    viewer.stop();
    viewer.join();
    Ok(())
}
