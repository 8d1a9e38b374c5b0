/// Crate-wide error type for construction- and transport-level failures.
///
/// Per-message failures (the ones a caller sees from a `Mailbox::send`) are a
/// plain `String` carried by [`crate::outcome::Outcome::Error`] instead — they
/// are data that crosses a wire, not a typed `std::error::Error`.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to decode value: {0}")]
    DecodeError(String),

    #[error("failed to encode value: {0}")]
    EncodeError(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("module not found at {0}")]
    ModuleNotFound(String),

    #[error("module {0} has no entry point")]
    MissingEntryPoint(String),

    #[error("module factory failed: {0}")]
    FactoryFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no format registered with name \"{0}\"")]
    UnknownFormat(String),

    #[error("invalid address \"{0}\": {1}")]
    InvalidAddress(String, String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::TransportError(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::DecodeError(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfiguration(e.to_string())
    }
}

/// Helper that mirrors how the dispatch boundary folds a caught panic
/// into a handler error message instead of letting it unwind a worker thread.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
