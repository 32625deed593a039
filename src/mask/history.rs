use super::raster::MaskSnapshot;

/// Snapshots of the mask raster, one per completed stroke.
///
/// The latest snapshot always matches the raster right after the last stroke
/// ended.
#[derive(Debug, Default, Clone)]
pub struct MaskHistory {
    snapshots: Vec<MaskSnapshot>,
}

impl MaskHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: MaskSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Drop the latest snapshot. Returns false when there was none.
    pub fn pop_latest(&mut self) -> bool {
        self.snapshots.pop().is_some()
    }

    pub fn latest(&self) -> Option<&MaskSnapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
