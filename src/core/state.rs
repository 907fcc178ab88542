//! Approval lifecycle state

use serde::{Deserialize, Serialize};

/// State of a pending approval record
///
/// `Pending` is the only initial state. `Approved` and `Rejected` are terminal
/// and a record carrying either of them is never found in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    /// Waiting for a human decision
    #[default]
    Pending,

    /// Approved; the mutation has been (or is being) executed
    Approved,

    /// Rejected; nothing was executed
    Rejected,
}

impl ApprovalState {
    /// Check if this is a terminal state (Approved or Rejected)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApprovalState::Approved | ApprovalState::Rejected)
    }

    /// Terminal state for a decision
    pub fn from_decision(approved: bool) -> Self {
        if approved {
            ApprovalState::Approved
        } else {
            ApprovalState::Rejected
        }
    }
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalState::Pending => write!(f, "Pending"),
            ApprovalState::Approved => write!(f, "Approved"),
            ApprovalState::Rejected => write!(f, "Rejected"),
        }
    }
}
