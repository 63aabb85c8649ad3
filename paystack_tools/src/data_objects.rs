use serde::{Deserialize, Serialize};
use serde_json::Value;
use sfp_common::Kobo;

/// Body for `POST /transaction/initialize`. Amounts are always in kobo.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub email: String,
    pub amount: Kobo,
    pub metadata: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_code: Option<String>,
}

/// The payload of a successful `POST /transaction/initialize` call. The `reference` is the globally unique
/// transaction identifier used for all subsequent verification and webhook traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub status: bool,
    pub message: String,
    pub data: VerifyData,
}

/// The transaction state as reported by `GET /transaction/verify/{reference}`. `status` is one of the gateway's
/// status strings ("success", "pending", "failed", "abandoned", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyData {
    pub status: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// One line of a split configuration: a destination subaccount and its fixed share of the transaction, in kobo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubaccountShare {
    pub subaccount: String,
    pub share: Kobo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitResponse {
    pub split_code: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn initialize_request_omits_unset_fields() {
        let req = InitializeRequest {
            email: "grace@example.com".to_string(),
            amount: Kobo::from(35_000_000),
            metadata: serde_json::json!({"payment_type": "school_fees"}),
            callback_url: None,
            split_code: Some("SPL_1".to_string()),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["amount"], 35_000_000);
        assert_eq!(value["split_code"], "SPL_1");
        assert!(value.get("callback_url").is_none());
    }

    #[test]
    fn verify_data_tolerates_missing_metadata() {
        let data: VerifyData = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert_eq!(data.status, "success");
        assert!(data.metadata.is_none());
    }
}
