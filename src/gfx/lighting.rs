//! Scene lighting
//!
//! The default light rig: one ambient term plus four directional lights
//! placed above the scene corners. Lights keep an individual enable mask on
//! top of the global lighting switch, and the first directional light is the
//! shadow caster.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};

use crate::error::{Result, ViewerError};
use crate::gfx::resources::global_bindings::GpuLight;

/// Number of individually switchable lights (ambient + directionals).
pub const LIGHT_COUNT: usize = 5;

/// A directional light aimed from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub enabled: bool,
}

impl DirectionalLight {
    fn direction(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }
}

/// The viewer's light rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient_color: [f32; 3],
    pub ambient_enabled: bool,
    pub directional: [DirectionalLight; 4],
    /// Global lighting switch; the per-light masks are kept when toggled.
    pub enabled: bool,
}

impl LightRig {
    /// The default rig: soft ambient plus four tinted directional lights at
    /// the upper corners of the scene, the last two initially off.
    pub fn new(enabled: bool) -> Self {
        let light = |color: [f32; 3], x: f32, y: f32, on: bool| DirectionalLight {
            color,
            position: Vector3::new(x, y, 10.0),
            target: Vector3::new(0.0, 0.0, 0.0),
            enabled: on,
        };

        Self {
            ambient_color: [0.2, 0.2, 0.2],
            ambient_enabled: true,
            directional: [
                light([0.6, 0.8, 0.8], 8.0, 8.0, true),
                light([0.8, 0.6, 0.8], 8.0, -8.0, true),
                light([0.8, 0.8, 0.6], -8.0, 8.0, false),
                light([0.6, 0.6, 0.8], -8.0, -8.0, false),
            ],
            enabled,
        }
    }

    /// Toggles one light: index 0 is the ambient term, 1 through 4 the
    /// directional lights.
    pub fn set_light(&mut self, index: usize, enable: bool) -> Result<()> {
        match index {
            0 => self.ambient_enabled = enable,
            1..=4 => self.directional[index - 1].enabled = enable,
            _ => {
                return Err(ViewerError::InvalidArgument(format!(
                    "light index {} out of range 0..{}",
                    index, LIGHT_COUNT
                )))
            }
        }
        Ok(())
    }

    /// Ambient contribution respecting both switches.
    pub(crate) fn gpu_ambient(&self) -> [f32; 4] {
        if self.enabled && self.ambient_enabled {
            [
                self.ambient_color[0],
                self.ambient_color[1],
                self.ambient_color[2],
                1.0,
            ]
        } else {
            [0.0, 0.0, 0.0, 1.0]
        }
    }

    /// Directional lights in the uniform layout; `direction.w` carries the
    /// effective enable flag.
    pub(crate) fn gpu_lights(&self) -> [GpuLight; 4] {
        let mut lights = [GpuLight::default(); 4];
        for (gpu, light) in lights.iter_mut().zip(self.directional.iter()) {
            let dir = light.direction();
            let on = self.enabled && light.enabled;
            *gpu = GpuLight {
                direction: [dir.x, dir.y, dir.z, if on { 1.0 } else { 0.0 }],
                color: [light.color[0], light.color[1], light.color[2], 1.0],
            };
        }
        lights
    }

    /// View-projection matrix of the shadow caster (the first directional
    /// light), an orthographic frustum covering the helper-grid area.
    pub(crate) fn light_view_proj(&self) -> Matrix4<f32> {
        let caster = &self.directional[0];
        let view = Matrix4::look_at_rh(
            Point3::from_vec(caster.position),
            Point3::from_vec(caster.target),
            Vector3::unit_z(),
        );
        let proj = cgmath::ortho(-12.0, 12.0, -12.0, 12.0, 1.0, 40.0);
        crate::gfx::camera::OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rig_masks() {
        let rig = LightRig::new(true);
        assert!(rig.ambient_enabled);
        assert_eq!(
            rig.directional.map(|l| l.enabled),
            [true, true, false, false]
        );
    }

    #[test]
    fn test_global_switch_overrides_masks() {
        let rig = LightRig::new(false);
        assert_eq!(rig.gpu_ambient(), [0.0, 0.0, 0.0, 1.0]);
        assert!(rig.gpu_lights().iter().all(|l| l.direction[3] == 0.0));
    }

    #[test]
    fn test_set_light_indexing() {
        let mut rig = LightRig::new(true);
        rig.set_light(0, false).unwrap();
        assert!(!rig.ambient_enabled);
        rig.set_light(4, true).unwrap();
        assert!(rig.directional[3].enabled);
        assert!(rig.set_light(5, true).is_err());
    }

    #[test]
    fn test_directions_point_down() {
        let rig = LightRig::new(true);
        for light in rig.gpu_lights() {
            assert!(light.direction[2] < 0.0);
        }
    }
}
