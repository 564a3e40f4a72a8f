// shared/src/lib.rs

/// Error taxonomy for the gateway. Caller-input faults map to 400s, the
/// caller-credential fault to 401, configuration and internal faults to 500,
/// and upstream failures carry the provider's status and raw body through.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown action: {0}")]
    InvalidAction(String),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("too many placeIds in one batch (max {0})")]
    BatchTooLarge(usize),
    #[error("gateway key missing or mismatched")]
    Unauthorized,
    #[error("provider API key is not configured")]
    MissingProviderKey,
    #[error("upstream returned status {status}")]
    Upstream { status: u16, body: String },
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
