//! Gatekeeper service
//!
//! Wires the classifier, the approval engine and the collections together.
//! The HTTP server and the console both drive the same `Gatekeeper`, and it
//! is cheap to clone (everything inside is shared).

use std::sync::Arc;

use crate::approval::{
    ApprovalEngine, ApprovalRegistry, PendingSummary, ResolutionOutcome, SubmitOutcome,
};
use crate::classifier::IntentClassifier;
use crate::config::GatekeeperConfig;
use crate::core::{ClassifiedIntent, GatekeeperResult, TargetCollection};
use crate::store::{CollectionSet, Entity};

/// Actor recorded when a caller does not identify itself
pub const DEFAULT_ACTOR: &str = "default_user";

#[derive(Clone, Debug)]
pub struct Gatekeeper {
    classifier: Arc<IntentClassifier>,
    engine: ApprovalEngine,
}

impl Gatekeeper {
    /// Build from explicit parts
    pub fn new(classifier: IntentClassifier, engine: ApprovalEngine) -> Self {
        Self {
            classifier: Arc::new(classifier),
            engine,
        }
    }

    /// Build with a fresh registry and the collections the config asks for
    pub fn from_config(config: &GatekeeperConfig) -> GatekeeperResult<Self> {
        let collections = if config.seed_data {
            CollectionSet::with_seed_data()
        } else {
            CollectionSet::empty()
        };
        Self::with_collections(collections)
    }

    pub fn with_collections(collections: CollectionSet) -> GatekeeperResult<Self> {
        let engine = ApprovalEngine::new(Arc::new(ApprovalRegistry::new()), Arc::new(collections));
        Ok(Self::new(IntentClassifier::new()?, engine))
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn engine(&self) -> &ApprovalEngine {
        &self.engine
    }

    pub fn classify(&self, command: &str) -> ClassifiedIntent {
        self.classifier.classify(command)
    }

    /// Classify a raw command and submit it for `actor`
    pub fn handle_command(&self, command: &str, actor: &str) -> GatekeeperResult<SubmitOutcome> {
        let intent = self.classify(command);
        self.engine.submit(intent, actor)
    }

    pub fn resolve(&self, approval_id: &str, approved: bool) -> GatekeeperResult<ResolutionOutcome> {
        self.engine.resolve(approval_id, approved)
    }

    pub fn list_pending(&self) -> Vec<PendingSummary> {
        self.engine.list_pending()
    }

    /// Every entity in a collection (empty when the target is not registered)
    pub fn entities(&self, target: TargetCollection) -> Vec<Entity> {
        self.engine
            .collections()
            .get(target)
            .map(|c| c.get_all())
            .unwrap_or_default()
    }

    pub fn count(&self, target: TargetCollection) -> usize {
        self.engine.collections().count(target)
    }

    pub fn pending_count(&self) -> usize {
        self.engine.registry().len()
    }
}
