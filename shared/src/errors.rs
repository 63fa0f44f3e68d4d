use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    // Message text is load-bearing: surfaced verbatim in the UI.
    #[error("このユーザー名は既に使われています")]
    NameTaken,

    #[error("Not authorized to modify profile: {0}")]
    Authorization(String),

    #[error("Could not allocate a unique guest name after {0} attempts")]
    BootstrapExhausted(u32),

    #[error("User manager is not initialized")]
    NotInitialized,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
