use paystack_tools::{
    InitializeRequest,
    InitializeResponse,
    PaystackApi,
    PaystackApiError,
    SplitResponse,
    SubaccountShare,
    VerifyResponse,
};

/// The upstream payment provider seam.
///
/// The production implementation is [`PaystackApi`]; orchestration tests substitute a mock so that no
/// network traffic is needed.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Initialize a transaction and obtain the checkout URL and reference.
    async fn initialize_transaction(&self, req: &InitializeRequest) -> Result<InitializeResponse, PaystackApiError>;

    /// Ask the gateway for the authoritative status of a transaction.
    async fn verify_transaction(&self, reference: &str) -> Result<VerifyResponse, PaystackApiError>;

    /// Create a split routing the transaction amount across subaccounts.
    async fn create_split(&self, shares: &[SubaccountShare]) -> Result<SplitResponse, PaystackApiError>;
}

impl PaymentGateway for PaystackApi {
    async fn initialize_transaction(&self, req: &InitializeRequest) -> Result<InitializeResponse, PaystackApiError> {
        PaystackApi::initialize_transaction(self, req).await
    }

    async fn verify_transaction(&self, reference: &str) -> Result<VerifyResponse, PaystackApiError> {
        PaystackApi::verify_transaction(self, reference).await
    }

    async fn create_split(&self, shares: &[SubaccountShare]) -> Result<SplitResponse, PaystackApiError> {
        PaystackApi::create_split(self, shares).await
    }
}
