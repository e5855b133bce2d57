use thiserror::Error;

/// The engine itself cannot fail: invalid numeric input is clamped at the
/// boundary and division guards resolve to sentinels. Errors only arise
/// around it, when ingesting a request or writing results out.
#[derive(Debug, Error)]
pub enum SolarRoiError {
    #[error("Request was not a valid calculation input document: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error("Error while writing calculation results: {0}")]
    FailureWritingResults(#[from] anyhow::Error),
}
