use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown scope: {0}")]
    UnknownScope(String),

    #[error("invalid locator: {0}")]
    InvalidLocator(String),
}
