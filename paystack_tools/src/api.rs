use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::PaystackConfig,
    data_objects::{InitializeRequest, InitializeResponse, SplitResponse, SubaccountShare, VerifyResponse},
    PaystackApiError,
    VerifyData,
};

/// The envelope every Paystack endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("Sending gateway query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaystackApiError::TransportError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaystackApiError::TransportError(e.to_string()))?;
            return Err(PaystackApiError::QueryError { status, message });
        }
        trace!("Gateway query successful. {}", response.status());
        let envelope = response.json::<Envelope<T>>().await.map_err(|e| PaystackApiError::JsonError(e.to_string()))?;
        if !envelope.status {
            return Err(PaystackApiError::RequestDeclined(envelope.message));
        }
        envelope.data.ok_or_else(|| PaystackApiError::JsonError("Gateway envelope carried no data".to_string()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Initializes a transaction with the gateway. On success, the caller receives an authorization URL to redirect
    /// the payer to, together with the gateway-issued reference.
    pub async fn initialize_transaction(
        &self,
        request: &InitializeRequest,
    ) -> Result<InitializeResponse, PaystackApiError> {
        debug!("Initializing gateway transaction for {} ({})", request.email, request.amount);
        let result =
            self.rest_query::<InitializeResponse, _>(Method::POST, "/transaction/initialize", Some(request)).await?;
        info!("Gateway transaction initialized with reference {}", result.reference);
        Ok(result)
    }

    /// Queries the gateway for the current status of the transaction with the given reference.
    pub async fn verify_transaction(&self, reference: &str) -> Result<VerifyResponse, PaystackApiError> {
        let path = format!("/transaction/verify/{reference}");
        debug!("Verifying gateway transaction {reference}");
        let data = self.rest_query::<VerifyData, ()>(Method::GET, &path, None).await?;
        trace!("Gateway reports status '{}' for {reference}", data.status);
        Ok(VerifyResponse { status: true, message: String::default(), data })
    }

    /// Registers a flat split with the gateway. The returned split code is attached to a subsequent
    /// `initialize_transaction` call so that the proceeds are divided across the given subaccounts.
    pub async fn create_split(&self, shares: &[SubaccountShare]) -> Result<SplitResponse, PaystackApiError> {
        debug!("Creating gateway split across {} subaccounts", shares.len());
        let body = serde_json::json!({
            "name": format!("Payment Split - {} accounts", shares.len()),
            "type": "flat",
            "currency": sfp_common::NAIRA_CURRENCY_CODE,
            "bearer_type": "all",
            "subaccounts": shares,
        });
        let result = self.rest_query::<SplitResponse, _>(Method::POST, "/split", Some(body)).await?;
        info!("Gateway split created with code {}", result.split_code);
        Ok(result)
    }
}
