//! Ordered classification rules
//!
//! Each rule pairs a trigger vocabulary with an operation and a builder.
//! Rules are evaluated in table order and the first match wins; the final
//! rule has no triggers and matches everything.

use serde_json::Value;

use super::extract::{
    capitalize, CommandText, FieldExtractor, ALL_TOKENS, DEPARTMENTS, PROJECT_TOKENS, STATUSES,
    USER_TOKENS,
};
use crate::core::{ClassifiedIntent, Operation, Parameters, TargetCollection};

pub const READ_TRIGGERS: &[&str] = &["show", "list", "get", "find", "display"];
pub const CREATE_TRIGGERS: &[&str] = &["create", "add", "new", "make"];
pub const UPDATE_TRIGGERS: &[&str] = &["update", "modify", "change", "edit"];
pub const DELETE_TRIGGERS: &[&str] = &["delete", "remove", "destroy"];

/// Builds an intent from a command that matched the rule's triggers
pub type IntentBuilder = fn(&CommandText<'_>, &FieldExtractor) -> ClassifiedIntent;

/// One entry of the classification table
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub operation: Operation,
    /// Empty means "always matches"
    pub triggers: &'static [&'static str],
    pub build: IntentBuilder,
}

impl Rule {
    pub fn matches(&self, command: &CommandText<'_>) -> bool {
        self.triggers.is_empty() || command.has_any_form(self.triggers)
    }

    pub fn apply(&self, command: &CommandText<'_>, extractor: &FieldExtractor) -> ClassifiedIntent {
        (self.build)(command, extractor)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("operation", &self.operation)
            .field("triggers", &self.triggers)
            .finish()
    }
}

/// The standard table: read, create, update, delete, then help
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "read",
            operation: Operation::Read,
            triggers: READ_TRIGGERS,
            build: build_read,
        },
        Rule {
            name: "create",
            operation: Operation::Create,
            triggers: CREATE_TRIGGERS,
            build: build_create,
        },
        Rule {
            name: "update",
            operation: Operation::Update,
            triggers: UPDATE_TRIGGERS,
            build: build_update,
        },
        Rule {
            name: "delete",
            operation: Operation::Delete,
            triggers: DELETE_TRIGGERS,
            build: build_delete,
        },
        Rule {
            name: "help",
            operation: Operation::Read,
            triggers: &[],
            build: build_help,
        },
    ]
}

fn collection_tokens(target: TargetCollection) -> &'static [&'static str] {
    match target {
        TargetCollection::Users => USER_TOKENS,
        TargetCollection::Projects => PROJECT_TOKENS,
        TargetCollection::Unknown => &[],
    }
}

/// Id addressed by a mutation
///
/// Taken from the number after a collection word ("user 3"); a bare number
/// is only trusted when no collection word is present.
fn target_id(command: &CommandText<'_>, target: TargetCollection) -> Option<u64> {
    if target.is_known() {
        command.integer_after(collection_tokens(target))
    } else {
        command.first_integer()
    }
}

fn describe(parameters: &Parameters) -> String {
    if parameters.is_empty() {
        return "(no attributes parsed)".to_string();
    }
    Value::Object(parameters.clone()).to_string()
}

fn build_read(command: &CommandText<'_>, _extractor: &FieldExtractor) -> ClassifiedIntent {
    // Reads without a collection word fall back to users.
    let target = match command.target() {
        TargetCollection::Unknown => TargetCollection::Users,
        target => target,
    };

    let mut parameters = Parameters::new();
    let qualifier = match target {
        TargetCollection::Users => command.find_any(DEPARTMENTS).map(|d| ("department", capitalize(d))),
        TargetCollection::Projects => command.find_any(STATUSES).map(|s| ("status", s.to_string())),
        TargetCollection::Unknown => None,
    };

    let summary = if let Some((field, value)) = qualifier {
        let summary = format!("Show {} where {} = {}", target, field, value);
        parameters.insert(field.to_string(), Value::from(value));
        summary
    } else if let Some(id) = command
        .integer_after(collection_tokens(target))
        .filter(|_| !command.has_any(ALL_TOKENS))
    {
        parameters.insert("id".to_string(), Value::from(id));
        format!("Show {} #{}", target.singular(), id)
    } else {
        format!("Show all {}", target)
    };

    ClassifiedIntent::new(Operation::Read, target, parameters, summary)
}

fn build_create(command: &CommandText<'_>, extractor: &FieldExtractor) -> ClassifiedIntent {
    let target = command.target();
    let raw = command.raw();
    let mut parameters = Parameters::new();

    if let Some(name) = extractor.name(raw) {
        parameters.insert("name".to_string(), Value::from(name));
    }

    match target {
        TargetCollection::Users => {
            if let Some(email) = command.email() {
                parameters.insert("email".to_string(), Value::from(email));
            }
            let department = command
                .find_any(DEPARTMENTS)
                .map(capitalize)
                .or_else(|| extractor.department(raw));
            if let Some(department) = department {
                parameters.insert("department".to_string(), Value::from(department));
            }
        }
        TargetCollection::Projects => {
            if let Some(budget) = extractor.budget(raw) {
                parameters.insert("budget".to_string(), budget);
            }
            if let Some(status) = command.find_any(STATUSES) {
                parameters.insert("status".to_string(), Value::from(status));
            }
            if let Some(manager) = extractor.manager(raw) {
                parameters.insert("manager".to_string(), Value::from(manager));
            }
        }
        TargetCollection::Unknown => {}
    }

    let summary = format!("Create {} {}", target.singular(), describe(&parameters));
    ClassifiedIntent::new(Operation::Create, target, parameters, summary)
}

fn build_update(command: &CommandText<'_>, extractor: &FieldExtractor) -> ClassifiedIntent {
    let target = command.target();
    let mut parameters = Parameters::new();

    let id = target_id(command, target);
    let changes: Parameters = extractor.assignments(command.raw()).into_iter().collect();

    let summary = match id {
        Some(id) => format!("Update {} #{} with {}", target.singular(), id, describe(&changes)),
        None => format!("Update {} (no id given) with {}", target.singular(), describe(&changes)),
    };

    if let Some(id) = id {
        parameters.insert("id".to_string(), Value::from(id));
    }
    parameters.extend(changes);

    ClassifiedIntent::new(Operation::Update, target, parameters, summary)
}

fn build_delete(command: &CommandText<'_>, _extractor: &FieldExtractor) -> ClassifiedIntent {
    let target = command.target();
    let mut parameters = Parameters::new();

    let summary = match target_id(command, target) {
        Some(id) => {
            parameters.insert("id".to_string(), Value::from(id));
            format!("Delete {} #{}", target.singular(), id)
        }
        None => format!("Delete {} (no id given)", target.singular()),
    };

    ClassifiedIntent::new(Operation::Delete, target, parameters, summary)
}

fn build_help(_command: &CommandText<'_>, _extractor: &FieldExtractor) -> ClassifiedIntent {
    ClassifiedIntent::help()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(rule_name: &str, command: &str) -> ClassifiedIntent {
        let extractor = FieldExtractor::new().unwrap();
        let rule = default_rules()
            .into_iter()
            .find(|r| r.name == rule_name)
            .unwrap();
        rule.apply(&CommandText::new(command), &extractor)
    }

    #[test]
    fn test_table_order() {
        let names: Vec<_> = default_rules().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["read", "create", "update", "delete", "help"]);
    }

    #[test]
    fn test_help_rule_matches_everything() {
        let rules = default_rules();
        let help = rules.last().unwrap();
        assert!(help.matches(&CommandText::new("")));
        assert!(help.matches(&CommandText::new("hello there")));
    }

    #[test]
    fn test_read_rule_filters() {
        let intent = run("read", "Show users in engineering department");
        assert_eq!(intent.target_collection, TargetCollection::Users);
        assert_eq!(intent.parameters["department"], json!("Engineering"));

        let intent = run("read", "Show me active projects");
        assert_eq!(intent.target_collection, TargetCollection::Projects);
        assert_eq!(intent.parameters["status"], json!("active"));

        let intent = run("read", "List all projects");
        assert!(intent.parameters.is_empty());
        assert_eq!(intent.summary, "Show all projects");
    }

    #[test]
    fn test_read_rule_by_id() {
        let intent = run("read", "get user 2");
        assert_eq!(intent.parameters["id"], json!(2));
        assert_eq!(intent.summary, "Show user #2");
    }

    #[test]
    fn test_read_rule_defaults_to_users() {
        let intent = run("read", "display everything");
        assert_eq!(intent.target_collection, TargetCollection::Users);
        assert!(intent.parameters.is_empty());
    }

    #[test]
    fn test_create_rule_user_attributes() {
        let intent = run("create", "Create a new user named Alice in Marketing with email alice@example.com");
        assert_eq!(intent.operation, Operation::Create);
        assert_eq!(intent.parameters["name"], json!("Alice"));
        assert_eq!(intent.parameters["department"], json!("Marketing"));
        assert_eq!(intent.parameters["email"], json!("alice@example.com"));
    }

    #[test]
    fn test_create_rule_project_attributes() {
        let intent = run("create", "Add a new project called AI Research with budget 50000");
        assert_eq!(intent.target_collection, TargetCollection::Projects);
        assert_eq!(intent.parameters["name"], json!("AI Research"));
        assert_eq!(intent.parameters["budget"], json!(50000));
        assert!(intent.summary.starts_with("Create project"));
    }

    #[test]
    fn test_create_rule_without_attributes() {
        let intent = run("create", "make something");
        assert_eq!(intent.target_collection, TargetCollection::Unknown);
        assert!(intent.parameters.is_empty());
        assert_eq!(intent.summary, "Create entity (no attributes parsed)");
    }

    #[test]
    fn test_update_rule() {
        let intent = run("update", "Change project 2 status to completed");
        assert_eq!(intent.target_collection, TargetCollection::Projects);
        assert_eq!(intent.parameters["id"], json!(2));
        assert_eq!(intent.parameters["status"], json!("completed"));

        let intent = run("update", "modify the record");
        assert_eq!(intent.target_collection, TargetCollection::Unknown);
        assert!(intent.parameters.is_empty());
    }

    #[test]
    fn test_delete_rule() {
        let intent = run("delete", "Delete user 2");
        assert_eq!(intent.target_collection, TargetCollection::Users);
        assert_eq!(intent.parameters["id"], json!(2));
        assert_eq!(intent.summary, "Delete user #2");

        let intent = run("delete", "remove it");
        assert!(intent.parameters.is_empty());
        assert_eq!(intent.summary, "Delete entity (no id given)");
    }

    #[test]
    fn test_mutation_id_follows_collection_word() {
        let intent = run("delete", "Delete the 2 inactive users, starting with user 3");
        assert_eq!(intent.parameters["id"], json!(3));
        assert_eq!(intent.summary, "Delete user #3");

        let intent = run("update", "Update budget to 2 on project 3");
        assert_eq!(intent.target_collection, TargetCollection::Projects);
        assert_eq!(intent.parameters["id"], json!(3));
        assert_eq!(intent.parameters["budget"], json!(2));

        let intent = run("update", "Change status to completed for project 3");
        assert_eq!(intent.parameters["id"], json!(3));
        assert_eq!(intent.parameters["status"], json!("completed"));
    }

    #[test]
    fn test_mutation_id_without_collection_word() {
        let intent = run("delete", "remove record 7");
        assert_eq!(intent.target_collection, TargetCollection::Unknown);
        assert_eq!(intent.parameters["id"], json!(7));

        // a number not attached to the collection word is not an id
        let intent = run("delete", "delete 2 users");
        assert!(intent.parameters.is_empty());
        assert_eq!(intent.summary, "Delete user (no id given)");
    }

    #[test]
    fn test_triggers_accept_verb_forms() {
        let rules = default_rules();
        let first_match = |command: &str| {
            let text = CommandText::new(command);
            rules.iter().find(|r| r.matches(&text)).map(|r| r.name)
        };

        assert_eq!(first_match("Listing all users"), Some("read"));
        assert_eq!(first_match("updating project 2 status to active"), Some("update"));
        assert_eq!(first_match("removed user 3"), Some("delete"));
        assert_eq!(first_match("what is the budget"), Some("help"));
        assert_eq!(first_match("any news"), Some("help"));
    }
}
