use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaystackApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the gateway: {0}")]
    TransportError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Gateway rejected the call. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Gateway returned an unsuccessful envelope: {0}")]
    RequestDeclined(String),
}

impl PaystackApiError {
    /// True when the failure is a network-level problem (unreachable host, timeout) rather than a rejection by the
    /// gateway itself. Callers use this to decide whether to fall back to locally held state.
    pub fn is_transport(&self) -> bool {
        matches!(self, PaystackApiError::TransportError(_))
    }
}
