//! Pending approval registry
//!
//! The registry is the single owner of `PendingApproval` records. Insertion
//! and removal go through one mutex, so a record can be taken out at most
//! once no matter how many resolutions race for it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{ApprovalState, ClassifiedIntent, Operation, Parameters, TargetCollection};

/// A mutating intent waiting for a human decision
///
/// Fields are a snapshot of the originating intent taken at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct PendingApproval {
    pub id: String,
    pub operation: Operation,
    pub target_collection: TargetCollection,
    pub parameters: Parameters,
    pub summary: String,
    /// Raw command text, when the intent came from the classifier
    pub command: Option<String>,
    /// Requesting actor. Recorded for audit, not checked against the approver.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub state: ApprovalState,
}

impl PendingApproval {
    /// Snapshot an intent into a new record with a fresh id
    pub fn from_intent(intent: &ClassifiedIntent, actor: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            operation: intent.operation,
            target_collection: intent.target_collection,
            parameters: intent.parameters.clone(),
            summary: intent.summary.clone(),
            command: intent.command.clone(),
            created_by: actor.into(),
            created_at: Utc::now(),
            state: ApprovalState::Pending,
        }
    }

    /// Move a taken record into its terminal state
    pub fn resolve(mut self, approved: bool) -> Self {
        self.state = ApprovalState::from_decision(approved);
        self
    }

    pub fn summary_view(&self) -> PendingSummary {
        PendingSummary {
            id: self.id.clone(),
            operation: self.operation,
            target_collection: self.target_collection,
            summary: self.summary.clone(),
            command: self.command.clone(),
            created_by: self.created_by.clone(),
            created_at: self.created_at,
        }
    }
}

/// Read-only view of a pending record, as listed to approvers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingSummary {
    pub id: String,
    pub operation: Operation,
    pub target_collection: TargetCollection,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Registry of pending approvals keyed by id
///
/// Records leave the registry only through `take`; nothing in here is ever
/// in a terminal state.
#[derive(Debug, Default)]
pub struct ApprovalRegistry {
    pending: Mutex<HashMap<String, PendingApproval>>,
}

impl ApprovalRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingApproval>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a pending record and return its id
    ///
    /// On the (practically impossible) event of an id collision a fresh id
    /// is drawn, so an existing record is never overwritten.
    pub fn insert(&self, mut record: PendingApproval) -> String {
        debug_assert_eq!(record.state, ApprovalState::Pending);

        let mut pending = self.lock();
        while pending.contains_key(&record.id) {
            tracing::warn!(approval_id = %record.id, "Approval id collision, drawing a new id");
            record.id = Uuid::new_v4().to_string();
        }

        let id = record.id.clone();
        pending.insert(id.clone(), record);
        id
    }

    /// Remove and return a record
    ///
    /// Exactly one caller gets `Some` for a given id.
    pub fn take(&self, id: &str) -> Option<PendingApproval> {
        self.lock().remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Cloned record, if still pending
    pub fn get(&self, id: &str) -> Option<PendingApproval> {
        self.lock().get(id).cloned()
    }

    /// Snapshot of all pending records, oldest first
    pub fn list(&self) -> Vec<PendingSummary> {
        let mut items: Vec<PendingSummary> =
            self.lock().values().map(PendingApproval::summary_view).collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        items
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn delete_intent() -> ClassifiedIntent {
        let mut parameters = Parameters::new();
        parameters.insert("id".into(), 2.into());
        ClassifiedIntent::new(
            Operation::Delete,
            TargetCollection::Users,
            parameters,
            "Delete user #2",
        )
        .with_command("Delete user 2")
    }

    #[test]
    fn test_record_snapshots_intent() {
        let mut intent = delete_intent();
        let record = PendingApproval::from_intent(&intent, "alice");

        intent.parameters.insert("id".into(), 9.into());
        intent.summary = "changed".into();

        assert_eq!(record.parameters["id"], 2);
        assert_eq!(record.summary, "Delete user #2");
        assert_eq!(record.command.as_deref(), Some("Delete user 2"));
        assert_eq!(record.created_by, "alice");
        assert_eq!(record.state, ApprovalState::Pending);
    }

    #[test]
    fn test_insert_take_once() {
        let registry = ApprovalRegistry::new();
        let id = registry.insert(PendingApproval::from_intent(&delete_intent(), "alice"));

        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);

        let taken = registry.take(&id).unwrap();
        assert_eq!(taken.id, id);
        assert!(registry.take(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_sets_terminal_state() {
        let record = PendingApproval::from_intent(&delete_intent(), "alice");
        assert_eq!(record.clone().resolve(true).state, ApprovalState::Approved);
        assert_eq!(record.resolve(false).state, ApprovalState::Rejected);
    }

    #[test]
    fn test_colliding_id_is_replaced() {
        let registry = ApprovalRegistry::new();
        let first = PendingApproval::from_intent(&delete_intent(), "alice");
        let mut second = PendingApproval::from_intent(&delete_intent(), "bob");
        second.id = first.id.clone();

        let first_id = registry.insert(first);
        let second_id = registry.insert(second);

        assert_ne!(first_id, second_id);
        assert_eq!(registry.get(&first_id).unwrap().created_by, "alice");
        assert_eq!(registry.get(&second_id).unwrap().created_by, "bob");
    }

    #[test]
    fn test_list_is_oldest_first() {
        let registry = ApprovalRegistry::new();
        let mut older = PendingApproval::from_intent(&delete_intent(), "alice");
        older.created_at = Utc::now() - chrono::Duration::seconds(60);
        let newer = PendingApproval::from_intent(&delete_intent(), "bob");

        let newer_id = registry.insert(newer);
        let older_id = registry.insert(older);

        let ids: Vec<_> = registry.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![older_id, newer_id]);
    }

    #[test]
    fn test_concurrent_inserts_get_unique_ids() {
        let registry = Arc::new(ApprovalRegistry::new());
        let intent = delete_intent();

        let ids: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let registry = registry.clone();
                    let intent = intent.clone();
                    scope.spawn(move || {
                        (0..50)
                            .map(|_| registry.insert(PendingApproval::from_intent(&intent, "load")))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 400);
        assert_eq!(registry.len(), 400);
    }
}
