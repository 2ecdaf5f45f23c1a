//! Orbit camera
//!
//! A Z-up orbit camera described by distance, pitch and yaw around a target
//! point. Mouse control adjusts the spherical coordinates; `look_from`
//! derives them from an explicit eye/target pair, which is how camera resets
//! are expressed.

use cgmath::{perspective, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, Zero};

use super::camera_utils::{convert_matrix4_to_array, CameraUniform};

/// Maps OpenGL clip space (z in -1..1) to wgpu clip space (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    /// Elevation above the XY plane, radians.
    pub pitch: f32,
    /// Rotation around +Z, radians; yaw 0 looks down the -X axis.
    pub yaw: f32,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    eye: Vector3<f32>,
}

impl OrbitCamera {
    /// Creates a camera placed at `eye` looking at `target`.
    pub fn new(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance: 1.0,
            pitch: 0.0,
            yaw: 0.0,
            target,
            up: Vector3::unit_z(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
            eye: Vector3::zero(),
        };
        camera.look_from(eye, target);
        camera
    }

    /// Repositions the camera, deriving distance/pitch/yaw from the
    /// eye-target pair so mouse control continues from the new pose.
    pub fn look_from(&mut self, eye: Vector3<f32>, target: Vector3<f32>) {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);

        self.target = target;
        self.distance = distance;
        self.pitch = (offset.z / distance).clamp(-1.0, 1.0).asin();
        self.yaw = offset.y.atan2(offset.x);
        self.update();
    }

    pub fn eye(&self) -> Vector3<f32> {
        self.eye
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        // Scale zoom steps with distance so the feel stays uniform.
        self.set_distance(self.distance * (1.0 + delta));
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans eye and target together in the view plane.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale by distance for a consistent feel at any zoom level.
        let pan_scale = self.distance * 0.1;
        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        self.target += movement;
        self.update();
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        );
        let proj = OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }

    /// Recomputes the eye position after a spherical-coordinate change.
    fn update(&mut self) {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.eye = self.target
            + self.distance * Vector3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.1),
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + f32::EPSILON,
            max_pitch: std::f32::consts::FRAC_PI_2 - f32::EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_look_from_roundtrip() {
        let mut camera = OrbitCamera::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zero(), 1.0);
        let eye = Vector3::new(4.0, -4.0, 1.5);
        let target = Vector3::new(0.0, 0.0, 0.5);
        camera.look_from(eye, target);
        assert!(close(camera.eye(), eye));
        assert!(close(camera.target, target));
    }

    #[test]
    fn test_orbit_preserves_distance() {
        let mut camera = OrbitCamera::new(Vector3::new(5.0, 0.0, 2.0), Vector3::zero(), 1.0);
        let distance = camera.distance;
        camera.add_yaw(1.2);
        camera.add_pitch(-0.3);
        assert!(((camera.eye() - camera.target).magnitude() - distance).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_clamped_at_poles() {
        let mut camera = OrbitCamera::new(Vector3::new(5.0, 0.0, 0.0), Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.add_pitch(-20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut camera = OrbitCamera::new(Vector3::new(5.0, 0.0, 0.0), Vector3::zero(), 1.0);
        camera.pan((1.0, 0.0));
        assert!(camera.target.magnitude() > 0.0);
        // view direction preserved
        let dir = (camera.target - camera.eye()).normalize();
        assert!(close(dir, -Vector3::unit_x()));
    }
}
