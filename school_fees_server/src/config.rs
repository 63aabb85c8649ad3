use std::env;

use log::*;
use paystack_tools::PaystackConfig;
use school_fees_engine::helpers::FlowConfig;
use sfp_common::helpers::parse_boolean_flag;

const DEFAULT_SFS_HOST: &str = "127.0.0.1";
const DEFAULT_SFS_PORT: u16 = 8370;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Credentials and endpoint for the payment gateway.
    pub paystack: PaystackConfig,
    /// Subaccount routing and checkout callback URLs.
    pub flow: FlowConfig,
    /// When false, webhook signatures are not checked. Only ever set this in a test environment.
    pub webhook_signature_checks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SFS_HOST.to_string(),
            port: DEFAULT_SFS_PORT,
            database_url: String::default(),
            paystack: PaystackConfig::default(),
            flow: FlowConfig::default(),
            webhook_signature_checks: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SFS_HOST").ok().unwrap_or_else(|| DEFAULT_SFS_HOST.into());
        let port = env::var("SFS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SFS_PORT. {e} Using the default, {DEFAULT_SFS_PORT}, instead."
                    );
                    DEFAULT_SFS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SFS_PORT);
        let database_url = env::var("SFS_DATABASE_URL").unwrap_or_else(|e| {
            error!("🪛️ SFS_DATABASE_URL is not set. {e} Using the default, which is unlikely to be what you want.");
            String::default()
        });
        let webhook_signature_checks =
            parse_boolean_flag(env::var("SFS_WEBHOOK_SIGNATURE_CHECKS").ok(), true);
        if !webhook_signature_checks {
            warn!("🪛️ Webhook signature checks are DISABLED. Anyone can post to the webhook endpoint.");
        }
        Self {
            host,
            port,
            database_url,
            paystack: PaystackConfig::new_from_env_or_default(),
            flow: FlowConfig::from_env_or_default(),
            webhook_signature_checks,
        }
    }
}
