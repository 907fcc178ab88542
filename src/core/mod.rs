//! Core types shared by the classifier and the approval engine
//!
//! - `ClassifiedIntent` / `Operation` / `TargetCollection` - Classification output
//! - `ApprovalState` - Lifecycle of a pending approval
//! - `GatekeeperError` - Error types

pub mod error;
pub mod intent;
pub mod state;

pub use error::{GatekeeperError, GatekeeperResult};
pub use intent::{ClassifiedIntent, Operation, Parameters, TargetCollection, HELP_TEXT};
pub use state::ApprovalState;
