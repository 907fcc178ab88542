//! Intent classification
//!
//! Maps a raw command to a `ClassifiedIntent`. Matching is lexical and
//! case-insensitive over whole words, driven by an ordered rule table:
//!
//! 1. **read** - show / list / get / find / display
//! 2. **create** - create / add / new / make
//! 3. **update** - update / modify / change / edit
//! 4. **delete** - delete / remove / destroy
//! 5. **help** - everything else
//!
//! A command matching several vocabularies only triggers the first group.
//! Classification never fails; the worst case is the help intent.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatekeeper_bot::classifier::IntentClassifier;
//! use gatekeeper_bot::core::Operation;
//!
//! let classifier = IntentClassifier::new()?;
//! let intent = classifier.classify("Delete user 2");
//! assert_eq!(intent.operation, Operation::Delete);
//! ```

mod extract;
mod rules;

pub use extract::{capitalize, CommandText, FieldExtractor};
pub use rules::{
    default_rules, IntentBuilder, Rule, CREATE_TRIGGERS, DELETE_TRIGGERS, READ_TRIGGERS,
    UPDATE_TRIGGERS,
};

use crate::core::{ClassifiedIntent, GatekeeperResult};

/// Rule-table classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<Rule>,
    extractor: FieldExtractor,
}

impl IntentClassifier {
    /// Create a classifier with the standard rule table
    pub fn new() -> GatekeeperResult<Self> {
        Self::with_rules(default_rules())
    }

    /// Create a classifier with a custom rule table
    ///
    /// The table should end with a trigger-less rule; without one, commands
    /// that match nothing get the help intent.
    pub fn with_rules(rules: Vec<Rule>) -> GatekeeperResult<Self> {
        Ok(Self {
            rules,
            extractor: FieldExtractor::new()?,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify a raw command
    pub fn classify(&self, command: &str) -> ClassifiedIntent {
        let text = CommandText::new(command);

        let intent = match self.rules.iter().find(|rule| rule.matches(&text)) {
            Some(rule) => {
                tracing::debug!(rule = rule.name, command, "Command classified");
                rule.apply(&text, &self.extractor)
            }
            None => ClassifiedIntent::help(),
        };

        intent.with_command(command)
    }
}
