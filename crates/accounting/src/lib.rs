//! Accounting documents produced from bookings.
//!
//! Pure domain logic only: no IO, no persistence concerns. Storage of these
//! documents and the posting workflow live in `rihla-infra`.

pub mod document;
pub mod expense;
pub mod posting;
pub mod summary;

pub use document::{AccountingDocument, Artifact, DocumentStatus, PaymentSummary};
pub use expense::Expense;
pub use posting::{PostingOutcome, PostingResult, VoidOutcome, VoidResult};
pub use summary::LedgerSummary;
