use egui::{Color32, Pos2};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

use super::geometry;
use crate::source::{self, SourceImage, SourceImageError};

/// Errors that can occur while serializing or restoring the mask raster
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("Failed to encode mask: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to decode mask snapshot: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Mask snapshot is {found:?}, raster is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Lossless PNG serialization of the mask raster at one point in time
#[derive(Clone, PartialEq, Eq)]
pub struct MaskSnapshot {
    png: Arc<[u8]>,
    size: (u32, u32),
}

impl std::fmt::Debug for MaskSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskSnapshot")
            .field("png_len", &self.png.len())
            .field("size", &self.size)
            .finish()
    }
}

impl MaskSnapshot {
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn to_data_uri(&self) -> String {
        source::to_data_uri("image/png", &self.png)
    }

    /// The snapshot as an image part for the generation request
    pub fn to_source_image(&self) -> Result<SourceImage, SourceImageError> {
        SourceImage::from_bytes(self.png.clone(), "image/png")
    }
}

/// Pixel buffer aligned 1:1 with the natural pixel grid of the displayed image.
///
/// Untouched pixels are fully transparent, painted pixels carry the brush
/// colour at full opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskRaster {
    pixels: RgbaImage,
}

impl MaskRaster {
    /// Create a transparent raster. Returns `None` for zero dimensions, there
    /// is nothing to paint on yet.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// True when no pixel has been painted
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    /// Paint a round-capped segment of the given width. A zero-length segment
    /// paints a round dab.
    pub fn paint_segment(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        let radius = (width / 2.0).max(0.5);
        let bounds = geometry::segment_bounds(from, to, radius);
        let (w, h) = self.size();

        let min_x = bounds.min.x.floor().max(0.0) as u32;
        let min_y = bounds.min.y.floor().max(0.0) as u32;
        let max_x = bounds.max.x.ceil().min(w as f32) as u32;
        let max_y = bounds.max.y.ceil().min(h as f32) as u32;

        let paint = Rgba([color.r(), color.g(), color.b(), 255]);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if geometry::distance_to_line_segment(center, from, to) <= radius {
                    self.pixels.put_pixel(x, y, paint);
                }
            }
        }
    }

    /// Serialize the raster as PNG
    pub fn snapshot(&self) -> Result<MaskSnapshot, MaskError> {
        let mut png = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(MaskError::Encode)?;
        Ok(MaskSnapshot {
            png: png.into(),
            size: self.size(),
        })
    }

    /// Replace every pixel with the content of a snapshot
    pub fn restore(&mut self, snapshot: &MaskSnapshot) -> Result<(), MaskError> {
        let decoded = image::load_from_memory_with_format(snapshot.png_bytes(), ImageFormat::Png)
            .map_err(MaskError::Decode)?
            .to_rgba8();
        if decoded.dimensions() != self.size() {
            return Err(MaskError::DimensionMismatch {
                expected: self.size(),
                found: decoded.dimensions(),
            });
        }
        self.pixels = decoded;
        Ok(())
    }
}
