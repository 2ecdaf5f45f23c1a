//! Viewer configuration
//!
//! [`ViewerConfig`] collects the rendering toggles and numeric parameters a
//! viewer consumes exactly once at startup. Values are recorded by the
//! builder-style setters and validated when the viewer is constructed;
//! a running viewer never re-reads its configuration.

use crate::error::{Result, ViewerError};

/// Multisample counts accepted by [`ViewerConfig::with_multisamples`]
/// (1 disables antialiasing).
pub const SUPPORTED_MULTISAMPLES: [u32; 5] = [1, 2, 4, 8, 16];

/// Startup configuration for a viewer.
///
/// All setters consume and return the config so calls chain:
///
/// ```
/// use vantage::ViewerConfig;
///
/// let config = ViewerConfig::default()
///     .with_window_size(1280, 720)
///     .with_multisamples(4)
///     .with_shadow(true)
///     .with_floor(true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Backbuffer / window resolution in pixels.
    pub window_size: (u32, u32),
    /// Disables interactive resizing of onscreen windows.
    pub window_fixed: bool,
    /// MSAA sample count, one of {1, 2, 4, 8, 16}; 1 means off.
    pub multisamples: u32,
    /// Default light rig on startup.
    pub lights_enabled: bool,
    /// Shadow-map rendering on startup.
    pub shadow_enabled: bool,
    /// Shadow map resolution (square, in texels).
    pub shadow_map_size: u32,
    /// Tone-mapping ramp on startup.
    pub hdr_enabled: bool,
    /// Distance fog on startup.
    pub fog_enabled: bool,
    /// Axes tripod visibility on startup.
    pub show_axes: bool,
    /// Ground grid visibility on startup.
    pub show_grid: bool,
    /// Floor plane visibility on startup.
    pub show_floor: bool,
    /// Frame-rate meter in the onscreen overlay.
    pub show_fps: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_size: (800, 600),
            window_fixed: true,
            multisamples: 1,
            lights_enabled: true,
            shadow_enabled: false,
            shadow_map_size: 1024,
            hdr_enabled: false,
            fog_enabled: false,
            show_axes: true,
            show_grid: true,
            show_floor: false,
            show_fps: false,
        }
    }
}

impl ViewerConfig {
    /// Creates a configuration with the defaults listed in the field docs.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    pub fn with_window_fixed(mut self, fixed: bool) -> Self {
        self.window_fixed = fixed;
        self
    }

    /// Sets the MSAA sample count; 1 disables multisampling. Counts outside
    /// {1, 2, 4, 8, 16} are rejected when the viewer starts.
    pub fn with_multisamples(mut self, samples: u32) -> Self {
        self.multisamples = samples;
        self
    }

    pub fn with_lights(mut self, enable: bool) -> Self {
        self.lights_enabled = enable;
        self
    }

    pub fn with_shadow(mut self, enable: bool) -> Self {
        self.shadow_enabled = enable;
        self
    }

    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadow_map_size = size;
        self
    }

    pub fn with_hdr(mut self, enable: bool) -> Self {
        self.hdr_enabled = enable;
        self
    }

    pub fn with_fog(mut self, enable: bool) -> Self {
        self.fog_enabled = enable;
        self
    }

    pub fn with_axes(mut self, show: bool) -> Self {
        self.show_axes = show;
        self
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    pub fn with_floor(mut self, show: bool) -> Self {
        self.show_floor = show;
        self
    }

    pub fn with_fps_meter(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Checks the recorded values once, at viewer startup.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.window_size.0 == 0 || self.window_size.1 == 0 {
            return Err(ViewerError::InvalidArgument(format!(
                "window size must be non-zero, got {}x{}",
                self.window_size.0, self.window_size.1
            )));
        }
        if !SUPPORTED_MULTISAMPLES.contains(&self.multisamples) {
            return Err(ViewerError::InvalidArgument(format!(
                "unsupported multisample count {}, expected one of {:?}",
                self.multisamples, SUPPORTED_MULTISAMPLES
            )));
        }
        if self.shadow_map_size == 0 {
            return Err(ViewerError::InvalidArgument(
                "shadow map size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.window_size, (800, 600));
        assert!(config.window_fixed);
        assert_eq!(config.multisamples, 1);
        assert!(config.lights_enabled);
        assert!(!config.shadow_enabled);
        assert!(!config.hdr_enabled);
        assert!(!config.fog_enabled);
        assert!(config.show_axes);
        assert!(config.show_grid);
        assert!(!config.show_floor);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = ViewerConfig::new()
            .with_window_size(320, 240)
            .with_multisamples(4)
            .with_lights(false)
            .with_floor(true);
        assert_eq!(config.window_size, (320, 240));
        assert_eq!(config.multisamples, 4);
        assert!(!config.lights_enabled);
        assert!(config.show_floor);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_multisamples() {
        for samples in [0, 3, 6, 32] {
            let config = ViewerConfig::new().with_multisamples(samples);
            assert!(matches!(
                config.validate(),
                Err(ViewerError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_rejects_zero_window() {
        let config = ViewerConfig::new().with_window_size(0, 600);
        assert!(matches!(
            config.validate(),
            Err(ViewerError::InvalidArgument(_))
        ));
    }
}
