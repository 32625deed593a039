use egui::{Color32, Pos2, Rect};

use super::history::MaskHistory;
use super::mapping::DisplayMapping;
use super::raster::{MaskError, MaskRaster, MaskSnapshot};
use super::stroke::{ActiveStroke, Brush};

/// Authoring mode of the mask surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MaskMode {
    /// Raster exists but is not editable and not submitted
    #[default]
    Idle,
    /// Pointer input paints on the raster
    Authoring { stroke: Option<ActiveStroke> },
}

impl MaskMode {
    pub fn is_authoring(&self) -> bool {
        matches!(self, MaskMode::Authoring { .. })
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self, MaskMode::Authoring { stroke: Some(_) })
    }
}

/// What the mask consumer should now hold
#[derive(Debug, Clone, PartialEq)]
pub enum MaskUpdate {
    Updated(MaskSnapshot),
    Cleared,
}

impl MaskUpdate {
    pub fn mask(&self) -> Option<&MaskSnapshot> {
        match self {
            MaskUpdate::Updated(snapshot) => Some(snapshot),
            MaskUpdate::Cleared => None,
        }
    }

    pub fn into_mask(self) -> Option<MaskSnapshot> {
        match self {
            MaskUpdate::Updated(snapshot) => Some(snapshot),
            MaskUpdate::Cleared => None,
        }
    }
}

/// Freehand paint surface producing an in-painting mask.
///
/// Pointer positions arrive in display coordinates and are mapped onto a
/// raster sized to the image's natural dimensions. The mask is only published
/// when a stroke ends or a stroke is undone, never while painting. Every
/// operation silently does nothing while there is no raster to paint on.
#[derive(Debug, Clone, Default)]
pub struct MaskSurface {
    mode: MaskMode,
    raster: Option<MaskRaster>,
    display: Option<Rect>,
    history: MaskHistory,
    brush: Brush,
}

impl MaskSurface {
    pub fn new(brush: Brush) -> Self {
        Self {
            brush,
            ..Self::default()
        }
    }

    /// Size the raster for a newly displayed image and drop any previous mask.
    /// Unknown or zero dimensions leave the surface without a raster.
    pub fn attach(&mut self, natural_size: Option<(u32, u32)>) {
        self.reset();
        self.raster = natural_size.and_then(|(w, h)| MaskRaster::new(w, h));
        if self.raster.is_none() {
            log::debug!("Mask surface detached: no usable image size ({:?})", natural_size);
        }
    }

    /// Where the surface is currently shown, in display coordinates
    pub fn set_display_rect(&mut self, rect: Rect) {
        self.display = Some(rect);
    }

    /// Enter or leave authoring mode. Leaving clears the raster and history;
    /// the returned update tells the consumer to drop its mask.
    pub fn set_authoring(&mut self, authoring: bool) -> Option<MaskUpdate> {
        match (self.mode.is_authoring(), authoring) {
            (false, true) => {
                self.mode = MaskMode::Authoring { stroke: None };
                None
            }
            (true, false) => {
                self.reset();
                Some(MaskUpdate::Cleared)
            }
            _ => None,
        }
    }

    /// Clear raster, history and in-progress stroke and return to idle
    pub fn reset(&mut self) {
        if let Some(raster) = &mut self.raster {
            raster.clear();
        }
        self.history.clear();
        self.mode = MaskMode::Idle;
    }

    pub fn mapping(&self) -> Option<DisplayMapping> {
        let raster = self.raster.as_ref()?;
        DisplayMapping::new(self.display?, raster.size())
    }

    /// Begin a stroke and paint a dab under the pointer
    pub fn pointer_down(&mut self, pos: Pos2) {
        if self.mode.is_stroking() {
            self.pointer_move(pos);
            return;
        }
        let MaskMode::Authoring { .. } = self.mode else {
            return;
        };
        let Some(mapping) = self.mapping() else {
            return;
        };
        let Some(raster) = self.raster.as_mut() else {
            return;
        };

        let point = mapping.to_raster(pos);
        let width = mapping.brush_width(self.brush.size);
        let stroke = ActiveStroke::new(point, width, self.brush.color);
        raster.paint_segment(point, point, stroke.width(), stroke.color());
        self.mode = MaskMode::Authoring { stroke: Some(stroke) };
    }

    /// Extend the active stroke with a segment from the last sample
    pub fn pointer_move(&mut self, pos: Pos2) {
        let Some(mapping) = self.mapping() else {
            return;
        };
        let MaskMode::Authoring { stroke: Some(stroke) } = &mut self.mode else {
            return;
        };
        let Some(raster) = self.raster.as_mut() else {
            return;
        };

        let point = mapping.to_raster(pos);
        if let Some(last) = stroke.last_point() {
            raster.paint_segment(last, point, stroke.width(), stroke.color());
        }
        stroke.add_point(point);
    }

    /// Finish the active stroke, commit a snapshot and publish it
    pub fn pointer_up(&mut self) -> Result<Option<MaskUpdate>, MaskError> {
        let MaskMode::Authoring { stroke } = &mut self.mode else {
            return Ok(None);
        };
        let Some(finished) = stroke.take() else {
            return Ok(None);
        };
        let Some(raster) = self.raster.as_ref() else {
            return Ok(None);
        };

        let snapshot = raster.snapshot()?;
        log::debug!(
            "Mask stroke committed: {} samples, snapshot {} bytes",
            finished.points().len(),
            snapshot.png_bytes().len()
        );
        self.history.push(snapshot.clone());
        Ok(Some(MaskUpdate::Updated(snapshot)))
    }

    /// The pointer left the surface; ends the stroke like a release
    pub fn pointer_leave(&mut self) -> Result<Option<MaskUpdate>, MaskError> {
        self.pointer_up()
    }

    /// Drop the latest stroke and repaint from the snapshot before it.
    ///
    /// A stroke still being painted is the one undone: its pixels are wiped
    /// and the published mask stays as it was, so nothing is returned.
    pub fn undo(&mut self) -> Result<Option<MaskUpdate>, MaskError> {
        if let MaskMode::Authoring { stroke } = &mut self.mode {
            if stroke.take().is_some() {
                self.repaint_latest()?;
                return Ok(None);
            }
        }
        if !self.history.pop_latest() {
            return Ok(None);
        }
        let Some(raster) = self.raster.as_mut() else {
            return Ok(None);
        };

        match self.history.latest() {
            Some(previous) => {
                raster.restore(previous)?;
                Ok(Some(MaskUpdate::Updated(previous.clone())))
            }
            None => {
                raster.clear();
                Ok(Some(MaskUpdate::Cleared))
            }
        }
    }

    // Raster back to the last committed stroke
    fn repaint_latest(&mut self) -> Result<(), MaskError> {
        let Some(raster) = self.raster.as_mut() else {
            return Ok(());
        };
        match self.history.latest() {
            Some(latest) => raster.restore(latest),
            None => {
                raster.clear();
                Ok(())
            }
        }
    }

    pub fn mode(&self) -> &MaskMode {
        &self.mode
    }

    pub fn is_authoring(&self) -> bool {
        self.mode.is_authoring()
    }

    pub fn raster(&self) -> Option<&MaskRaster> {
        self.raster.as_ref()
    }

    pub fn history(&self) -> &MaskHistory {
        &self.history
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.size = size.max(1.0);
    }

    pub fn set_brush_color(&mut self, color: Color32) {
        self.brush.color = color;
    }
}
