//! Approval workflow engine
//!
//! `submit` runs reads immediately and parks mutations in the registry.
//! `resolve` takes a parked record out of the registry first and only then
//! executes (approve) or drops (reject) it, so a record is consumed exactly
//! once even when the execution that follows fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::registry::{ApprovalRegistry, PendingApproval, PendingSummary};
use crate::core::{
    ApprovalState, ClassifiedIntent, GatekeeperError, GatekeeperResult, Operation, Parameters,
    TargetCollection,
};
use crate::store::{values_match, CollectionSet, Entity, ResourceCollection};

/// Result of submitting an intent
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    /// A read was run against a collection
    pub executed: bool,
    pub requires_approval: bool,
    pub approval_id: Option<String>,
    pub operation: Operation,
    pub target_collection: TargetCollection,
    pub summary: String,
    pub response_text: String,
    pub results: Option<Vec<Entity>>,
    /// Snapshot parameters awaiting approval
    pub proposed_changes: Option<Parameters>,
}

/// Terminal status reported for a resolution call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Approved,
    Rejected,
    NotFound,
    ExecutionFailed,
    MalformedIntent,
}

impl ResolutionStatus {
    pub fn is_success(self) -> bool {
        matches!(self, ResolutionStatus::Approved | ResolutionStatus::Rejected)
    }
}

/// Result of resolving a pending approval
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    pub approval_id: String,
    pub status: ResolutionStatus,
    pub message: String,
    /// Entity created, updated or deleted by an approved mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,
}

impl ResolutionOutcome {
    /// Fold an engine result into a single outcome value
    pub fn from_result(approval_id: &str, result: GatekeeperResult<ResolutionOutcome>) -> Self {
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                let status = match &err {
                    GatekeeperError::ApprovalNotFound(_) => ResolutionStatus::NotFound,
                    GatekeeperError::MalformedIntent(_) => ResolutionStatus::MalformedIntent,
                    _ => ResolutionStatus::ExecutionFailed,
                };
                Self {
                    approval_id: approval_id.to_string(),
                    status,
                    message: err.to_string(),
                    entity: None,
                }
            }
        }
    }
}

/// Owns the approval workflow over an injected registry and collection set
#[derive(Clone)]
pub struct ApprovalEngine {
    registry: Arc<ApprovalRegistry>,
    collections: Arc<CollectionSet>,
}

impl ApprovalEngine {
    pub fn new(registry: Arc<ApprovalRegistry>, collections: Arc<CollectionSet>) -> Self {
        Self {
            registry,
            collections,
        }
    }

    pub fn registry(&self) -> &Arc<ApprovalRegistry> {
        &self.registry
    }

    pub fn collections(&self) -> &Arc<CollectionSet> {
        &self.collections
    }

    /// Submit a classified intent on behalf of `actor`
    ///
    /// Reads execute now. Every other operation becomes a pending record and
    /// nothing is mutated until it is approved.
    pub fn submit(&self, intent: ClassifiedIntent, actor: &str) -> GatekeeperResult<SubmitOutcome> {
        if !intent.requires_approval() {
            return self.execute_read(intent);
        }

        let record = PendingApproval::from_intent(&intent, actor);
        let approval_id = self.registry.insert(record);

        tracing::info!(
            approval_id = %approval_id,
            operation = %intent.operation,
            target = %intent.target_collection,
            actor,
            "Approval required"
        );

        Ok(SubmitOutcome {
            executed: false,
            requires_approval: true,
            approval_id: Some(approval_id.clone()),
            operation: intent.operation,
            target_collection: intent.target_collection,
            response_text: format!(
                "Approval required to {}. Request ID: {}",
                intent.summary, approval_id
            ),
            summary: intent.summary,
            results: None,
            proposed_changes: Some(intent.parameters),
        })
    }

    /// Approve or reject a pending record
    ///
    /// Returns `ApprovalNotFound` for unknown and already-resolved ids alike.
    /// Once the record is found it is consumed, whatever happens next.
    pub fn resolve(&self, approval_id: &str, approved: bool) -> GatekeeperResult<ResolutionOutcome> {
        let record = self
            .registry
            .take(approval_id)
            .ok_or_else(|| GatekeeperError::ApprovalNotFound(approval_id.to_string()))?
            .resolve(approved);

        match record.state {
            ApprovalState::Approved => {
                tracing::info!(approval_id, operation = %record.operation, "Approval granted");
                let entity = self.execute_mutation(&record).map_err(|err| {
                    tracing::warn!(approval_id, error = %err, "Approved operation failed");
                    err
                })?;
                Ok(ResolutionOutcome {
                    approval_id: record.id,
                    status: ResolutionStatus::Approved,
                    message: format!("{} completed: {}", record.summary, Value::Object(entity.clone())),
                    entity: Some(entity),
                })
            }
            _ => {
                tracing::info!(approval_id, operation = %record.operation, "Approval rejected");
                Ok(ResolutionOutcome {
                    approval_id: record.id,
                    status: ResolutionStatus::Rejected,
                    message: "Operation was rejected by user".to_string(),
                    entity: None,
                })
            }
        }
    }

    /// Snapshot of the pending registry
    pub fn list_pending(&self) -> Vec<PendingSummary> {
        self.registry.list()
    }

    fn collection(&self, target: TargetCollection) -> GatekeeperResult<Arc<dyn ResourceCollection>> {
        self.collections
            .get(target)
            .ok_or_else(|| GatekeeperError::malformed(format!("target collection '{}' is not available", target)))
    }

    fn execute_read(&self, intent: ClassifiedIntent) -> GatekeeperResult<SubmitOutcome> {
        let outcome = |executed: bool, response_text: String, results: Option<Vec<Entity>>| SubmitOutcome {
            executed,
            requires_approval: false,
            approval_id: None,
            operation: Operation::Read,
            target_collection: intent.target_collection,
            summary: intent.summary.clone(),
            response_text,
            results,
            proposed_changes: None,
        };

        if intent.is_help() {
            return Ok(outcome(false, intent.summary.clone(), None));
        }

        let collection = self.collection(intent.target_collection)?;
        let results = query(collection.as_ref(), &intent.parameters)?;

        tracing::info!(
            target = %intent.target_collection,
            count = results.len(),
            "Read executed"
        );

        let response_text = format!(
            "Found {} {}: {}",
            results.len(),
            intent.target_collection,
            serde_json::to_string(&results)?
        );
        Ok(outcome(true, response_text, Some(results)))
    }

    fn execute_mutation(&self, record: &PendingApproval) -> GatekeeperResult<Entity> {
        let target = record.target_collection;
        let noun = target.singular();

        match record.operation {
            Operation::Create => {
                let collection = self.collection(target)?;
                let has_name = record
                    .parameters
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| !name.trim().is_empty());
                if !has_name {
                    return Err(GatekeeperError::malformed(format!("creating a {} requires a name", noun)));
                }
                Ok(collection.create(&record.parameters)?)
            }
            Operation::Update => {
                let collection = self.collection(target)?;
                let id = require_id(&record.parameters, "update")?;
                let changes: Parameters = record
                    .parameters
                    .iter()
                    .filter(|(key, _)| key.as_str() != "id")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                if changes.is_empty() {
                    return Err(GatekeeperError::malformed("update requires at least one field to change"));
                }
                collection
                    .update(id, &changes)?
                    .ok_or_else(|| GatekeeperError::execution_failed(format!("{} {} not found", noun, id)))
            }
            Operation::Delete => {
                let collection = self.collection(target)?;
                let id = require_id(&record.parameters, "delete")?;
                let entity = collection
                    .get_by_id(id)
                    .ok_or_else(|| GatekeeperError::execution_failed(format!("{} {} not found", noun, id)))?;
                if !collection.delete(id) {
                    return Err(GatekeeperError::execution_failed(format!("{} {} not found", noun, id)));
                }
                Ok(entity)
            }
            Operation::Read => Err(GatekeeperError::malformed("read operations are never pending")),
        }
    }
}

impl std::fmt::Debug for ApprovalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalEngine")
            .field("pending", &self.registry.len())
            .field("collections", &self.collections)
            .finish()
    }
}

/// Integer id from parameters; numeric strings are accepted
fn require_id(parameters: &Parameters, action: &str) -> GatekeeperResult<u64> {
    let id = match parameters.get("id") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    id.ok_or_else(|| GatekeeperError::malformed(format!("{} requires an integer id", action)))
}

/// Run a read: by id, by one or more field filters, or the whole collection
fn query(collection: &dyn ResourceCollection, parameters: &Parameters) -> GatekeeperResult<Vec<Entity>> {
    if parameters.contains_key("id") {
        let id = require_id(parameters, "lookup")?;
        return Ok(collection.get_by_id(id).into_iter().collect());
    }

    let mut filters = parameters.iter();
    let Some((field, value)) = filters.next() else {
        return Ok(collection.get_all());
    };

    let mut results = collection.get_by_filter(field, value);
    for (field, value) in filters {
        results.retain(|entity| entity.get(field).is_some_and(|stored| values_match(stored, value)));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> ApprovalEngine {
        ApprovalEngine::new(
            Arc::new(ApprovalRegistry::new()),
            Arc::new(CollectionSet::with_seed_data()),
        )
    }

    fn intent(operation: Operation, target: TargetCollection, parameters: Value) -> ClassifiedIntent {
        let parameters = match parameters {
            Value::Object(map) => map,
            _ => Parameters::new(),
        };
        ClassifiedIntent::new(operation, target, parameters, format!("{} {}", operation, target))
    }

    fn count(engine: &ApprovalEngine, target: TargetCollection) -> usize {
        engine.collections().count(target)
    }

    #[test]
    fn test_read_executes_without_registry() {
        let engine = engine();
        let outcome = engine
            .submit(intent(Operation::Read, TargetCollection::Users, json!({})), "alice")
            .unwrap();

        assert!(outcome.executed);
        assert!(!outcome.requires_approval);
        assert!(outcome.approval_id.is_none());
        assert_eq!(outcome.results.unwrap().len(), 3);
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn test_read_filters() {
        let engine = engine();
        let outcome = engine
            .submit(
                intent(Operation::Read, TargetCollection::Users, json!({"department": "engineering"})),
                "alice",
            )
            .unwrap();
        let results = outcome.results.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], json!("John Doe"));

        let outcome = engine
            .submit(intent(Operation::Read, TargetCollection::Projects, json!({"id": 2})), "alice")
            .unwrap();
        assert_eq!(outcome.results.unwrap()[0]["name"], json!("Mobile App"));

        let outcome = engine
            .submit(intent(Operation::Read, TargetCollection::Projects, json!({"id": 42})), "alice")
            .unwrap();
        assert!(outcome.results.unwrap().is_empty());
    }

    #[test]
    fn test_read_with_bad_id_is_malformed() {
        let engine = engine();
        let err = engine
            .submit(intent(Operation::Read, TargetCollection::Users, json!({"id": "two"})), "alice")
            .unwrap_err();
        assert!(matches!(err, GatekeeperError::MalformedIntent(_)));
    }

    #[test]
    fn test_help_is_not_executed() {
        let engine = engine();
        let outcome = engine.submit(ClassifiedIntent::help(), "alice").unwrap();
        assert!(!outcome.executed);
        assert!(!outcome.requires_approval);
        assert!(outcome.results.is_none());
        assert_eq!(outcome.response_text, crate::core::HELP_TEXT);
    }

    #[test]
    fn test_mutation_is_parked_not_executed() {
        let engine = engine();
        let outcome = engine
            .submit(intent(Operation::Delete, TargetCollection::Users, json!({"id": 2})), "alice")
            .unwrap();

        assert!(outcome.requires_approval);
        assert!(!outcome.executed);
        let id = outcome.approval_id.unwrap();
        assert!(engine.registry().contains(&id));
        assert_eq!(count(&engine, TargetCollection::Users), 3);

        let pending = engine.list_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].operation, Operation::Delete);
        assert_eq!(pending[0].created_by, "alice");
    }

    #[test]
    fn test_approve_create_replays_parameters() {
        let engine = engine();
        let outcome = engine
            .submit(
                intent(Operation::Create, TargetCollection::Projects, json!({"name": "Atlas", "budget": 1200})),
                "alice",
            )
            .unwrap();
        let id = outcome.approval_id.unwrap();

        let resolution = engine.resolve(&id, true).unwrap();
        assert_eq!(resolution.status, ResolutionStatus::Approved);
        let entity = resolution.entity.unwrap();
        assert_eq!(entity["name"], json!("Atlas"));
        assert_eq!(entity["budget"], json!(1200));
        assert_eq!(entity["id"], json!(4));
        assert_eq!(count(&engine, TargetCollection::Projects), 4);
    }

    #[test]
    fn test_second_resolution_is_not_found() {
        let engine = engine();
        let id = engine
            .submit(intent(Operation::Delete, TargetCollection::Users, json!({"id": 3})), "alice")
            .unwrap()
            .approval_id
            .unwrap();

        assert!(engine.resolve(&id, true).is_ok());
        let err = engine.resolve(&id, true).unwrap_err();
        assert!(matches!(err, GatekeeperError::ApprovalNotFound(_)));

        let err = engine.resolve("no-such-id", false).unwrap_err();
        assert!(matches!(err, GatekeeperError::ApprovalNotFound(_)));
    }

    #[test]
    fn test_reject_leaves_collections_untouched() {
        let engine = engine();
        let before = engine.collections().get(TargetCollection::Users).unwrap().get_all();
        let id = engine
            .submit(intent(Operation::Delete, TargetCollection::Users, json!({"id": 2})), "alice")
            .unwrap()
            .approval_id
            .unwrap();

        let resolution = engine.resolve(&id, false).unwrap();
        assert_eq!(resolution.status, ResolutionStatus::Rejected);
        assert!(resolution.entity.is_none());

        let after = engine.collections().get(TargetCollection::Users).unwrap().get_all();
        assert_eq!(before, after);
        assert!(engine.list_pending().is_empty());
    }

    #[test]
    fn test_update_without_id_is_malformed_and_consumed() {
        let engine = engine();
        let id = engine
            .submit(intent(Operation::Update, TargetCollection::Users, json!({"name": "Zed"})), "alice")
            .unwrap()
            .approval_id
            .unwrap();

        let err = engine.resolve(&id, true).unwrap_err();
        assert!(matches!(err, GatekeeperError::MalformedIntent(_)));
        assert!(!engine.registry().contains(&id));
    }

    #[test]
    fn test_update_without_changes_is_malformed() {
        let engine = engine();
        let id = engine
            .submit(intent(Operation::Update, TargetCollection::Users, json!({"id": 1})), "alice")
            .unwrap()
            .approval_id
            .unwrap();
        let err = engine.resolve(&id, true).unwrap_err();
        assert!(matches!(err, GatekeeperError::MalformedIntent(_)));
    }

    #[test]
    fn test_unknown_target_is_malformed() {
        let engine = engine();
        let id = engine
            .submit(intent(Operation::Delete, TargetCollection::Unknown, json!({"id": 1})), "alice")
            .unwrap()
            .approval_id
            .unwrap();
        let err = engine.resolve(&id, true).unwrap_err();
        assert!(matches!(err, GatekeeperError::MalformedIntent(_)));
    }

    #[test]
    fn test_create_without_name_is_malformed() {
        let engine = engine();
        let id = engine
            .submit(intent(Operation::Create, TargetCollection::Users, json!({})), "alice")
            .unwrap()
            .approval_id
            .unwrap();
        let err = engine.resolve(&id, true).unwrap_err();
        assert!(matches!(err, GatekeeperError::MalformedIntent(_)));
        assert_eq!(count(&engine, TargetCollection::Users), 3);
    }

    #[test]
    fn test_missing_entity_is_execution_failure() {
        let engine = engine();
        let id = engine
            .submit(intent(Operation::Delete, TargetCollection::Users, json!({"id": 99})), "alice")
            .unwrap()
            .approval_id
            .unwrap();

        let err = engine.resolve(&id, true).unwrap_err();
        assert!(matches!(err, GatekeeperError::ExecutionFailed(_)));
        assert!(!engine.registry().contains(&id));
    }

    #[test]
    fn test_rejected_field_is_execution_failure() {
        let engine = engine();
        let id = engine
            .submit(
                intent(Operation::Update, TargetCollection::Projects, json!({"id": 1, "salary": 5})),
                "alice",
            )
            .unwrap()
            .approval_id
            .unwrap();
        let err = engine.resolve(&id, true).unwrap_err();
        assert!(matches!(err, GatekeeperError::ExecutionFailed(_)));
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome = ResolutionOutcome::from_result(
            "abc",
            Err(GatekeeperError::ApprovalNotFound("abc".into())),
        );
        assert_eq!(outcome.status, ResolutionStatus::NotFound);
        assert!(!outcome.status.is_success());

        let outcome = ResolutionOutcome::from_result("abc", Err(GatekeeperError::malformed("no id")));
        assert_eq!(outcome.status, ResolutionStatus::MalformedIntent);
    }
}
