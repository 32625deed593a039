use crate::error::GenerationError;
use crate::mask::MaskUpdate;
use crate::result::ResultRef;
use crate::state::AppStatus;

#[derive(Debug, Clone)]
pub enum StudioEvent {
    StatusChanged {
        old: AppStatus,
        new: AppStatus,
    },
    /// The displayed result changed (new generation, undo, redo or reset)
    ResultChanged {
        result: Option<ResultRef>,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    MaskModeChanged {
        authoring: bool,
    },
    /// A new mask (or none) is available for the next request
    MaskChanged(MaskUpdate),
    GenerationFailed(GenerationError),
    PromptEnhanced {
        prompt: String,
    },
    CredentialChanged {
        present: bool,
    },
    SourceChanged {
        dimensions: Option<(u32, u32)>,
    },
    ProjectReset,
}
