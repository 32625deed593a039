use crate::result::ResultRef;

/// Linear undo/redo over successive generation results.
///
/// The displayed `current` result is owned by the caller and passed in on
/// every operation; the history only keeps what lies behind and ahead of it.
#[derive(Debug, Default, Clone)]
pub struct ResultHistory {
    /// Older results, most recent last
    past: Vec<ResultRef>,
    /// Undone results, soonest-to-redo last
    future: Vec<ResultRef>,
}

impl ResultHistory {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh generation. The previous `current` (if any) moves onto
    /// the undo stack and the redo branch is discarded.
    pub fn record_and_replace(&mut self, current: &mut Option<ResultRef>, new_result: ResultRef) {
        if let Some(previous) = current.take() {
            self.past.push(previous);
        }
        // Branching off: nothing left to redo
        self.future.clear();
        *current = Some(new_result);
    }

    /// Step back to the previous result. Returns `None` and leaves everything
    /// untouched when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Option<ResultRef>) -> Option<ResultRef> {
        let previous = self.past.pop()?;
        if let Some(shown) = current.take() {
            self.future.push(shown);
        }
        *current = Some(previous.clone());
        Some(previous)
    }

    /// Step forward to the result most recently undone.
    pub fn redo(&mut self, current: &mut Option<ResultRef>) -> Option<ResultRef> {
        let next = self.future.pop()?;
        if let Some(shown) = current.take() {
            self.past.push(shown);
        }
        *current = Some(next.clone());
        Some(next)
    }

    /// Returns true if there are results that can be undone
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Returns true if there are results that can be redone
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Older results, most recent last
    pub fn past(&self) -> &[ResultRef] {
        &self.past
    }

    /// Undone results in redo order (the next `redo` yields the first item)
    pub fn future(&self) -> impl Iterator<Item = &ResultRef> {
        self.future.iter().rev()
    }

    /// Number of results `redo` can still bring back
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
