use egui::{Pos2, Rect, Vec2};

/// Maps display-space pointer positions onto the raster pixel grid.
///
/// The surface is shown at `display` (CSS/viewport units) while the raster
/// keeps the image's natural size, so each axis gets its own scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    display: Rect,
    raster_size: (u32, u32),
}

impl DisplayMapping {
    /// Returns `None` when either side has no area.
    pub fn new(display: Rect, raster_size: (u32, u32)) -> Option<Self> {
        let usable = display.is_finite()
            && display.width() > 0.0
            && display.height() > 0.0
            && raster_size.0 > 0
            && raster_size.1 > 0;
        usable.then_some(Self { display, raster_size })
    }

    pub fn display_rect(&self) -> Rect {
        self.display
    }

    /// Raster pixels per display unit on each axis
    pub fn scale(&self) -> Vec2 {
        Vec2::new(
            self.raster_size.0 as f32 / self.display.width(),
            self.raster_size.1 as f32 / self.display.height(),
        )
    }

    pub fn to_raster(&self, pos: Pos2) -> Pos2 {
        let scale = self.scale();
        let local = pos - self.display.min;
        Pos2::new(local.x * scale.x, local.y * scale.y)
    }

    /// Brush width in raster pixels, scaled by the horizontal factor
    pub fn brush_width(&self, display_size: f32) -> f32 {
        display_size * self.scale().x
    }
}
