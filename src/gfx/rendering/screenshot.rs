//! Screenshot capture helpers
//!
//! CPU-side pieces of frame capture: the pixel buffer returned to callers,
//! channel-format parsing and swizzling, row-padding removal for wgpu
//! texture readback, timestamped file names and image encoding.

use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};

/// A captured frame: dense `height x width x channels` bytes, row-major,
/// top row first, channel order as requested at capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub data: Vec<u8>,
}

/// A parsed channel-order string: a non-empty, non-repeating combination of
/// the characters R, G, B, A (e.g. "RGB", "BGRA").
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChannelFormat {
    /// Source channel index in RGBA order, one per output channel.
    indices: Vec<usize>,
}

impl ChannelFormat {
    pub fn parse(format: &str) -> Result<Self> {
        if format.is_empty() || format.len() > 4 {
            return Err(ViewerError::InvalidArgument(format!(
                "channel format '{}' must name 1 to 4 channels",
                format
            )));
        }

        let mut indices = Vec::with_capacity(format.len());
        for c in format.chars() {
            let index = match c {
                'R' => 0,
                'G' => 1,
                'B' => 2,
                'A' => 3,
                _ => {
                    return Err(ViewerError::InvalidArgument(format!(
                        "channel format '{}' contains '{}', expected only R, G, B, A",
                        format, c
                    )))
                }
            };
            if indices.contains(&index) {
                return Err(ViewerError::InvalidArgument(format!(
                    "channel format '{}' repeats '{}'",
                    format, c
                )));
            }
            indices.push(index);
        }
        Ok(Self { indices })
    }

    pub fn channels(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Reorders a tight RGBA buffer into this channel order.
    pub fn swizzle(&self, rgba: &[u8]) -> Vec<u8> {
        debug_assert_eq!(rgba.len() % 4, 0);
        let mut out = Vec::with_capacity(rgba.len() / 4 * self.indices.len());
        for pixel in rgba.chunks_exact(4) {
            for &index in &self.indices {
                out.push(pixel[index]);
            }
        }
        out
    }
}

/// Row stride wgpu requires for texture-to-buffer copies (256-byte aligned).
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = 4 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row alignment padding from mapped readback data.
pub(crate) fn strip_row_padding(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let unpadded = (4 * width) as usize;
    let padded = padded_bytes_per_row(width) as usize;

    let mut out = Vec::with_capacity(unpadded * height as usize);
    for row in 0..height as usize {
        let start = row * padded;
        out.extend_from_slice(&data[start..start + unpadded]);
    }
    out
}

/// Default screenshot file name, e.g. `screenshot-2026-08-07-14-03-59.png`.
pub(crate) fn timestamped_filename() -> PathBuf {
    PathBuf::from(
        chrono::Local::now()
            .format("screenshot-%Y-%m-%d-%H-%M-%S.png")
            .to_string(),
    )
}

/// Encodes a tight RGBA buffer to disk; the format follows the extension.
/// PNG output drops the alpha channel.
pub(crate) fn write_image(path: &Path, width: u32, height: u32, rgba: Vec<u8>) -> Result<()> {
    let image = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        ViewerError::InvalidArgument(format!(
            "pixel buffer does not match {}x{} RGBA",
            width, height
        ))
    })?;

    let is_png = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);

    let result = if is_png {
        image::DynamicImage::ImageRgba8(image).to_rgb8().save(path)
    } else {
        image.save(path)
    };
    result.map_err(|source| ViewerError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_rgba_combinations() {
        for format in ["RGB", "BGR", "RGBA", "BGRA", "R", "A", "GR"] {
            assert!(ChannelFormat::parse(format).is_ok(), "{}", format);
        }
        assert_eq!(ChannelFormat::parse("BGRA").unwrap().channels(), 4);
        assert_eq!(ChannelFormat::parse("RGB").unwrap().channels(), 3);
    }

    #[test]
    fn test_parse_rejects_malformed_formats() {
        for format in ["", "RGBAX", "RGX", "rgb", "RR", "RGBB"] {
            assert!(
                matches!(
                    ChannelFormat::parse(format),
                    Err(ViewerError::InvalidArgument(_))
                ),
                "{}",
                format
            );
        }
    }

    #[test]
    fn test_swizzle_reorders_channels() {
        let rgba = [10u8, 20, 30, 40, 50, 60, 70, 80];
        let bgr = ChannelFormat::parse("BGR").unwrap().swizzle(&rgba);
        assert_eq!(bgr, vec![30, 20, 10, 70, 60, 50]);

        let alpha = ChannelFormat::parse("A").unwrap().swizzle(&rgba);
        assert_eq!(alpha, vec![40, 80]);
    }

    #[test]
    fn test_padded_bytes_per_row_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(320), 1280); // already aligned
    }

    #[test]
    fn test_strip_row_padding() {
        let width = 2u32;
        let height = 2u32;
        let padded = padded_bytes_per_row(width) as usize;
        let mut data = vec![0u8; padded * height as usize];
        for row in 0..height as usize {
            for i in 0..8 {
                data[row * padded + i] = (row * 8 + i) as u8;
            }
        }
        let tight = strip_row_padding(&data, width, height);
        assert_eq!(tight, (0..16).collect::<Vec<u8>>());
    }
}
