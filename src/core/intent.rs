//! Classified intent types
//!
//! A `ClassifiedIntent` is the classifier's reading of one raw command: the
//! operation kind, the addressed collection, the parameters to act with and a
//! summary that is shown to whoever approves the action.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name → value mapping carried by intents and pending approvals
pub type Parameters = Map<String, Value>;

/// Help text returned for commands the classifier does not understand
pub const HELP_TEXT: &str = "I can help you with:\n\
- Showing users/projects (READ)\n\
- Creating new users/projects (CREATE)\n\
- Updating existing data (UPDATE)\n\
- Removing data (DELETE)\n\n\
Try: 'Show all users' or 'Create a new project called Atlas'";

/// Kind of operation a command maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Every operation other than `Read` must be confirmed by a human
    pub fn requires_approval(self) -> bool {
        !matches!(self, Operation::Read)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource collection addressed by an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetCollection {
    Users,
    Projects,
    Unknown,
}

impl TargetCollection {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetCollection::Users => "users",
            TargetCollection::Projects => "projects",
            TargetCollection::Unknown => "unknown",
        }
    }

    /// Singular noun used in summaries ("user", "project")
    pub fn singular(self) -> &'static str {
        match self {
            TargetCollection::Users => "user",
            TargetCollection::Projects => "project",
            TargetCollection::Unknown => "entity",
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, TargetCollection::Unknown)
    }
}

impl std::fmt::Display for TargetCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified meaning of a raw command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    pub operation: Operation,
    pub target_collection: TargetCollection,
    #[serde(default)]
    pub parameters: Parameters,
    pub summary: String,
    /// Raw command text, kept for audit when the intent came from the classifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl ClassifiedIntent {
    pub fn new(
        operation: Operation,
        target_collection: TargetCollection,
        parameters: Parameters,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            target_collection,
            parameters,
            summary: summary.into(),
            command: None,
        }
    }

    /// Degenerate classification for commands that were not understood
    pub fn help() -> Self {
        Self::new(
            Operation::Read,
            TargetCollection::Unknown,
            Parameters::new(),
            HELP_TEXT,
        )
    }

    /// Attach the raw command text
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn requires_approval(&self) -> bool {
        self.operation.requires_approval()
    }

    /// A read over no collection means "command not understood"
    pub fn is_help(&self) -> bool {
        self.operation == Operation::Read && !self.target_collection.is_known()
    }
}
