//! Opens a window, fills a small scene and hands control to the user.
//!
//! Run with `cargo run --example quickstart`.

use vantage::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::default()
        .with_window_size(1024, 768)
        .with_window_fixed(false)
        .with_multisamples(4)
        .with_shadow(true)
        .with_floor(true);
    let viewer = Viewer::new(WindowType::Onscreen, "vantage quickstart", config)?;

    viewer.append_group("root")?;
    viewer.append_box("root", "crate", [0.6, 0.6, 0.6])?;
    viewer.append_sphere("root", "ball", 0.4)?;
    viewer.append_capsule("root", "pill", 0.2, 0.8)?;

    viewer.set_material("root", "crate", [0.9, 0.4, 0.1, 1.0], None)?;
    viewer.set_material("root", "ball", [0.2, 0.6, 0.9, 1.0], None)?;
    viewer.set_material("root", "pill", [0.3, 0.8, 0.3, 0.7], None)?;

    viewer.move_nodes(
        "root",
        &[
            ("crate", Pose::new(Vector3::new(-1.0, 0.0, 0.3), Quaternion::new(1.0, 0.0, 0.0, 0.0))),
            ("ball", Pose::new(Vector3::new(0.0, 1.0, 0.4), Quaternion::new(1.0, 0.0, 0.0, 0.0))),
            ("pill", Pose::new(Vector3::new(1.0, -0.5, 0.6), Quaternion::new(1.0, 0.0, 0.0, 0.0))),
        ],
    )?;

    println!("press F1 for help, Escape to quit");
    let mut viewer = viewer;
    viewer.join();
    Ok(())
}
