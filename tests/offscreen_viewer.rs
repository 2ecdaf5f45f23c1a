//! End-to-end tests against a headless viewer.
//!
//! These need a working GPU adapter, so they are gated behind the
//! `integration-tests` feature:
//!
//! ```text
//! cargo test --features integration-tests
//! ```

#![cfg(feature = "integration-tests")]

use vantage::prelude::*;

fn offscreen_viewer() -> Viewer {
    let config = ViewerConfig::default().with_window_size(320, 240);
    Viewer::new(WindowType::Offscreen, "", config).expect("failed to open offscreen viewer")
}

#[test]
fn group_and_node_lifecycle() {
    let viewer = offscreen_viewer();

    // appends require the group
    assert!(matches!(
        viewer.append_box("root", "b1", [1.0, 1.0, 1.0]),
        Err(ViewerError::NotFound(_))
    ));

    viewer.append_group("root").unwrap();
    viewer.append_box("root", "b1", [1.0, 1.0, 1.0]).unwrap();

    // duplicate names within a group are rejected
    assert!(matches!(
        viewer.append_box("root", "b1", [1.0, 1.0, 1.0]),
        Err(ViewerError::AlreadyExists(_))
    ));

    // removing the group removes its nodes
    viewer.remove_group("root").unwrap();
    assert!(matches!(
        viewer.node_pose("root", "b1"),
        Err(ViewerError::NotFound(_))
    ));
    assert!(matches!(
        viewer.remove_group("root"),
        Err(ViewerError::NotFound(_))
    ));
}

#[test]
fn pose_roundtrip() {
    let viewer = offscreen_viewer();
    viewer.append_group("root").unwrap();
    viewer.append_sphere("root", "ball", 0.5).unwrap();

    let pose = Pose::new(
        Vector3::new(1.5, -2.0, 0.25),
        Quaternion::new(0.5, 0.5, 0.5, 0.5),
    );
    viewer.move_nodes("root", &[("ball", pose)]).unwrap();
    assert_eq!(viewer.node_pose("root", "ball").unwrap(), pose);

    // a missing node fails the batch but keeps earlier updates
    let other = Pose::identity();
    assert!(matches!(
        viewer.move_nodes("root", &[("ball", other), ("ghost", other)]),
        Err(ViewerError::NotFound(_))
    ));
    assert_eq!(viewer.node_pose("root", "ball").unwrap(), other);
}

#[test]
fn screenshot_formats_and_content() {
    let viewer = offscreen_viewer();
    viewer.append_group("root").unwrap();
    viewer.append_box("root", "b1", [1.0, 1.0, 1.0]).unwrap();
    viewer
        .move_nodes("root", &[("b1", Pose::identity())])
        .unwrap();

    let shot = viewer.get_screenshot("RGB").unwrap();
    assert_eq!(shot.width, 320);
    assert_eq!(shot.height, 240);
    assert_eq!(shot.channels, 3);
    assert_eq!(shot.data.len(), 320 * 240 * 3);

    // the box must be visible: not every pixel equals the first one
    let first = &shot.data[0..3];
    assert!(
        shot.data.chunks_exact(3).any(|pixel| pixel != first),
        "rendered frame is uniform; geometry missing"
    );

    let bgra = viewer.get_screenshot("BGRA").unwrap();
    assert_eq!(bgra.channels, 4);
    // alpha channel is opaque everywhere
    assert!(bgra.data.chunks_exact(4).all(|pixel| pixel[3] == 255));

    assert!(matches!(
        viewer.get_screenshot("XYZ"),
        Err(ViewerError::InvalidArgument(_))
    ));
}

#[test]
fn save_screenshot_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("frame.png");

    let viewer = offscreen_viewer();
    viewer.append_group("root").unwrap();
    viewer.append_capsule("root", "pill", 0.3, 0.8).unwrap();

    let written = viewer.save_screenshot(Some(&target)).unwrap();
    assert_eq!(written, target);

    let image = image::open(&target).unwrap();
    assert_eq!(image.width(), 320);
    assert_eq!(image.height(), 240);
}

#[test]
fn stop_closes_the_viewer() {
    let mut viewer = offscreen_viewer();
    viewer.append_group("root").unwrap();

    viewer.stop();
    assert!(matches!(
        viewer.append_group("late"),
        Err(ViewerError::ViewerClosed)
    ));
    assert!(matches!(
        viewer.get_screenshot("RGB"),
        Err(ViewerError::ViewerClosed)
    ));

    // must return promptly now that the worker has exited
    viewer.join();
}

#[test]
fn render_toggles_accepted() {
    let viewer = offscreen_viewer();
    viewer.append_group("root").unwrap();
    viewer.append_plane("root", "ground", [4.0, 4.0]).unwrap();

    viewer.enable_lights(false).unwrap();
    viewer.enable_lights(true).unwrap();
    viewer.enable_light(3, true).unwrap();
    assert!(matches!(
        viewer.enable_light(9, true),
        Err(ViewerError::InvalidArgument(_))
    ));
    viewer.enable_shadow(true).unwrap();
    viewer.enable_hdr(true).unwrap();
    viewer.enable_fog(true).unwrap();
    viewer.show_axes(false).unwrap();
    viewer.show_grid(false).unwrap();
    viewer.show_floor(true).unwrap();
    viewer.set_background_color([0.1, 0.1, 0.2]).unwrap();
    viewer.reset_camera([3.0, 3.0, 2.0], [0.0, 0.0, 0.0]).unwrap();

    // still renders after every toggle
    let shot = viewer.get_screenshot("RGBA").unwrap();
    assert_eq!(shot.channels, 4);
}
