//! Error types for the resource.

use thiserror::Error;

/// Errors that can occur while running a resource operation.
///
/// Every variant is recovered at the binary boundary into the uniform
/// `{"version": {}, "metadata": [{"name": "status", "value": "Failed"}]}`
/// output; nothing here escapes as a panic.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The `source` configuration has no usable `webhook_url`
    #[error("webhook URL missing from source configuration")]
    MissingWebhookUrl,

    /// The input document on stdin is not valid resource JSON
    #[error("invalid input document: {0}")]
    Input(#[source] serde_json::Error),

    /// The webhook URL could not be parsed for the threadKey mutation
    #[error("invalid webhook URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The outbound payload could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with a non-success status
    #[error("webhook returned {status}: {body}")]
    Delivery { status: u16, body: String },

    /// The webhook reply body is not valid JSON
    #[error("unparsable webhook reply: {0}")]
    ResponseParse(#[source] serde_json::Error),

    /// Filesystem error other than a missing message file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
