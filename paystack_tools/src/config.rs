use log::*;
use sfp_common::Secret;

pub const DEFAULT_PAYSTACK_API_URL: &str = "https://api.paystack.co";

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// Bound on every outbound gateway call, in seconds.
    pub timeout_secs: u64,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_PAYSTACK_API_URL.to_string(), secret_key: Secret::default(), timeout_secs: 30 }
    }
}

impl PaystackConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("PAYSTACK_API_URL").unwrap_or_else(|_| DEFAULT_PAYSTACK_API_URL.to_string());
        let secret_key = Secret::new(std::env::var("PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            warn!("PAYSTACK_SECRET_KEY not set. Gateway calls will be rejected until it is configured.");
            String::default()
        }));
        let timeout_secs = std::env::var("PAYSTACK_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(30);
        Self { api_url, secret_key, timeout_secs }
    }
}
