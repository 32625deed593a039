use crate::event::{EventHandler, StudioEvent};

/// Mirrors every studio event to the log at debug level
#[derive(Debug, Default)]
pub struct LoggingEventHandler;

impl LoggingEventHandler {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler for LoggingEventHandler {
    fn handle_event(&mut self, event: &StudioEvent) {
        match event {
            StudioEvent::GenerationFailed(err) => log::warn!("Generation failed: {}", err),
            StudioEvent::MaskChanged(update) => log::debug!(
                "Mask changed: {}",
                update
                    .mask()
                    .map(|m| format!("{} bytes", m.png_bytes().len()))
                    .unwrap_or_else(|| "cleared".to_owned())
            ),
            other => log::debug!("Studio event: {:?}", other),
        }
    }
}
