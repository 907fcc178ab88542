//! Approval-gated execution
//!
//! Every mutating intent must be confirmed by a human before it runs:
//!
//! - **Read**: executed immediately by `ApprovalEngine::submit`
//! - **Create / Update / Delete**: stored as a `PendingApproval` and executed
//!   only when `ApprovalEngine::resolve` is called with `approved = true`
//!
//! ## Lifecycle
//!
//! `Pending` → approve → `Approved` (record removed, mutation replayed from
//! the snapshot) or `Pending` → reject → `Rejected` (record removed, nothing
//! runs). A second resolution of the same id reports not-found.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gatekeeper_bot::approval::{ApprovalEngine, ApprovalRegistry};
//! use gatekeeper_bot::store::CollectionSet;
//!
//! let engine = ApprovalEngine::new(
//!     Arc::new(ApprovalRegistry::new()),
//!     Arc::new(CollectionSet::with_seed_data()),
//! );
//! let outcome = engine.submit(classifier.classify("Delete user 2"), "alice")?;
//! let id = outcome.approval_id.unwrap();
//! engine.resolve(&id, false)?; // rejected, user 2 untouched
//! ```

mod engine;
mod registry;

pub use engine::{ApprovalEngine, ResolutionOutcome, ResolutionStatus, SubmitOutcome};
pub use registry::{ApprovalRegistry, PendingApproval, PendingSummary};
