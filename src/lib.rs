#![warn(clippy::all, rust_2018_idioms)]

pub mod compose;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod mask;
pub mod result;
pub mod service;
pub mod source;
pub mod state;

pub use compose::{ArtStyle, ModelTier, PresetLibrary, PromptInputs, Tab};
pub use config::Settings;
pub use error::GenerationError;
pub use event::{EventBus, EventHandler, StudioEvent};
pub use history::ResultHistory;
pub use mask::{MaskSurface, MaskUpdate};
pub use result::{GenerationResult, ResultRef};
pub use service::{GeminiClient, GenerationBackend};
pub use source::SourceImage;
pub use state::{AppStatus, Studio};
