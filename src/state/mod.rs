mod persistence;
mod status;
mod studio;

pub use persistence::{
    CREDENTIAL_KEY,
    CredentialStore,
    FileCredentialStore,
    MemoryCredentialStore,
    PersistenceError,
    PersistenceResult,
};
pub use status::AppStatus;
pub use studio::Studio;
