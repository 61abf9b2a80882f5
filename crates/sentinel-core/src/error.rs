use thiserror::Error;

/// Failures from external signal providers.
///
/// "No data for ticker" is not an error anywhere in this taxonomy; providers
/// represent that as an empty series or a neutral summary.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

pub type SignalResult<T> = Result<T, SignalError>;
