//! The traits that define the interfaces between the school fees engine and its backends.
//!
//! [`FeeManagement`] covers the read-only queries (fee schedules, students, exam fee status) that the
//! pure calculators and the orchestration layer both need. [`LedgerStore`] extends it with the mutating
//! operations of the payment lifecycle: inserting pending records, confirming them, and marking failures.
//! [`PaymentGateway`] abstracts the upstream payment provider so that orchestration logic can be tested
//! against mocks.

mod data_objects;
mod fee_management;
mod ledger_store;
mod payment_gateway;

pub use data_objects::{ConfirmationOutcome, ConfirmationSummary};
pub use fee_management::{FeeApiError, FeeManagement};
pub use ledger_store::{LedgerError, LedgerStore};
pub use payment_gateway::PaymentGateway;
