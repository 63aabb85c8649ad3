use serde::{Deserialize, Serialize};

/// Body of a verification response, matching the gateway client's expectations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub status: String,
    pub reference: String,
}

/// Body of a webhook acknowledgement. The gateway only checks the HTTP status, but the body records what
/// the server did with the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    pub fn processed() -> Self {
        Self { status: "success".to_string() }
    }

    pub fn ignored() -> Self {
        Self { status: "failed".to_string() }
    }
}

/// Body of an exam population response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulateResult {
    pub exam_id: String,
    pub created: usize,
}
