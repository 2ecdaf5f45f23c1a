//! Viewer command protocol
//!
//! Every facade call becomes one [`Command`] carrying its arguments and a
//! reply sender; the render thread executes commands in arrival order and
//! answers through the embedded channel, which is what makes the facade
//! synchronous.

use std::path::PathBuf;
use std::sync::mpsc;

use cgmath::Vector3;

use crate::error::Result;
use crate::gfx::geometry::Shape;
use crate::gfx::rendering::screenshot::ChannelFormat;
use crate::gfx::rendering::Screenshot;
use crate::gfx::scene::Pose;

/// One viewer operation with its arguments.
pub(crate) enum Request {
    AppendGroup {
        name: String,
    },
    RemoveGroup {
        name: String,
    },
    ShowGroup {
        name: String,
        visible: bool,
    },
    AppendShape {
        group: String,
        name: String,
        shape: Shape,
    },
    SetMaterial {
        group: String,
        name: String,
        color_rgba: [f32; 4],
        texture_path: Option<PathBuf>,
    },
    MoveNodes {
        group: String,
        poses: Vec<(String, Pose)>,
    },
    NodePose {
        group: String,
        name: String,
    },
    ResetCamera {
        eye: Vector3<f32>,
        target: Vector3<f32>,
    },
    EnableLights(bool),
    EnableLight {
        index: usize,
        enable: bool,
    },
    EnableShadow(bool),
    EnableHdr(bool),
    EnableFog(bool),
    ShowAxes(bool),
    ShowGrid(bool),
    ShowFloor(bool),
    SetBackgroundColor([f32; 3]),
    SaveScreenshot {
        path: Option<PathBuf>,
    },
    GetScreenshot {
        format: ChannelFormat,
    },
    Stop,
}

/// Successful command results.
pub(crate) enum Reply {
    Done,
    Pose(Pose),
    Screenshot(Screenshot),
    SavedTo(PathBuf),
}

/// A request paired with the channel its result goes back through.
pub(crate) struct Command {
    pub request: Request,
    pub reply: mpsc::Sender<Result<Reply>>,
}
