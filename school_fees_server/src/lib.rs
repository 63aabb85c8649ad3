//! # School fees server
//! This module hosts the REST surface for the school fees gateway. It is responsible for:
//! Accepting checkout initiation requests from the school portal.
//! Verifying payment references against the payment gateway on demand.
//! Listening for signed webhook notifications from the gateway and reconciling them against the ledger.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payments/initialize`: Start a school-fees checkout.
//! * `/payments/exams/initialize`: Start an exam-fees checkout.
//! * `/payments/verify/{reference}`: Verify a payment against the gateway.
//! * `/paystack/webhook`: The webhook route for receiving charge events from the gateway.
//! * `/exams/{exam_id}/populate`: Enrol eligible students for an exam.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
