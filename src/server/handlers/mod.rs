pub mod chat;
pub mod embed;
pub mod graph;
pub mod health;
pub mod reflective;
pub mod transcripts;

use crate::core::errors::ApiError;

/// Replace an unimplemented-service error with the endpoint's public
/// detail message, logging the original at `info` so exercise progress is
/// visible in the server log.
pub(crate) fn remap_unimplemented(err: ApiError, detail: &str) -> ApiError {
    match err {
        ApiError::NotImplemented(msg) => {
            tracing::info!("{}", msg);
            ApiError::NotImplemented(detail.to_string())
        }
        other => other,
    }
}
