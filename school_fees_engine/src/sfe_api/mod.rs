//! The high-level entry points into the engine.
//!
//! [`PaymentFlowApi`] drives the payment lifecycle (initialize, verify, reconcile). [`FeeApi`] answers
//! fee-schedule questions without touching the ledger. [`ExamApi`] manages exam fee enrollment.

mod errors;
mod exam_api;
mod fee_api;
mod payment_flow_api;
pub mod payment_objects;

pub use errors::PaymentFlowError;
pub use exam_api::ExamApi;
pub use fee_api::FeeApi;
pub use payment_flow_api::PaymentFlowApi;
pub use payment_objects::{
    ExamFeesMetadata,
    ExamFeesPaymentRequest,
    ExamPaymentDetail,
    ExamShare,
    PaymentMetadata,
    SchoolFeesMetadata,
    SchoolFeesPaymentRequest,
    VerifyStatus,
    WebhookData,
    WebhookEvent,
};
