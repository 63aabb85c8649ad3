//! School Fees Payment Engine
//!
//! The engine holds the core logic for administering school fee payments processed through an external payment
//! gateway. It is server-framework agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types used in the database, which are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@sfe_api`]). This provides the public-facing functionality: initiating gateway
//!    transactions, reconciling verification responses and webhook notifications against the ledger, calculating
//!    fees, and populating exam enrolments. Backends need to implement the traits in the [`mod@traits`] module in
//!    order to act as a ledger store for the server.

pub mod db_types;
pub mod helpers;
pub mod sfe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use sfe_api::{payment_objects, ExamApi, FeeApi, PaymentFlowApi, PaymentFlowError};
pub use traits::{FeeApiError, FeeManagement, LedgerError, LedgerStore, PaymentGateway};
