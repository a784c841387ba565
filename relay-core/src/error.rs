use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can stop a single refresh from reaching the device.
///
/// None of these are fatal to the host: each one ends the invocation that
/// produced it and nothing else.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Transport-level failure talking to the provider.
    #[error("Weather request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Weather provider returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body was not JSON, or lacked `currentobservation.Temp` / `.Weather`.
    #[error("Malformed weather response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The device channel rejected the message.
    #[error("Failed to send weather info to device: {0}")]
    Send(String),

    /// Invalid location or endpoint.
    #[error("Invalid relay configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Failed before a complete reading existed, so nothing was sent.
    pub fn is_before_send(&self) -> bool {
        !matches!(self, RelayError::Send(_))
    }
}
