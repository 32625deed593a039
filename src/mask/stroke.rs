use egui::{Color32, Pos2};

/// Brush settings in display units. The raster width is derived from the
/// display scale at paint time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub size: f32,
    pub color: Color32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            size: 20.0,
            color: Color32::from_rgb(0xef, 0x44, 0x44),
        }
    }
}

/// Stroke being painted, in raster coordinates.
///
/// Only the sampled points are kept; pixels are written to the raster as each
/// segment arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStroke {
    points: Vec<Pos2>,
    width: f32,
    color: Color32,
}

impl ActiveStroke {
    pub fn new(start: Pos2, width: f32, color: Color32) -> Self {
        Self {
            points: vec![start],
            width,
            color,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn last_point(&self) -> Option<Pos2> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Stroke width in raster pixels
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn color(&self) -> Color32 {
        self.color
    }
}
