use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The endpoint could not be reached or did not answer before the deadline.
    #[error("Endpoint {endpoint} unavailable: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// The endpoint answered with a non-success status.
    #[error("Endpoint {endpoint} rejected the request with HTTP {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Success status, but the body was not a listing array.
    #[error("Endpoint {endpoint} returned an unexpected payload: {reason}")]
    Malformed { endpoint: String, reason: String },

    #[error("Upstream client setup failed: {0}")]
    Client(String),
}
