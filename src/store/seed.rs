//! Schemas and demo rows for the users and projects collections

use serde_json::Value;

use super::collection::Entity;
use super::memory::{FieldSpec, InMemoryCollection};

pub fn users_schema() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name", "New User"),
        FieldSpec::text("email", ""),
        FieldSpec::text("department", "General"),
    ]
}

pub fn projects_schema() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name", "New Project"),
        FieldSpec::text("status", "planning"),
        FieldSpec::number("budget", 0),
        FieldSpec::text("manager", "Unassigned"),
    ]
}

fn user(id: u64, name: &str, email: &str, department: &str) -> Entity {
    let mut entity = Entity::new();
    entity.insert("id".into(), Value::from(id));
    entity.insert("name".into(), Value::from(name));
    entity.insert("email".into(), Value::from(email));
    entity.insert("department".into(), Value::from(department));
    entity
}

fn project(id: u64, name: &str, status: &str, budget: i64, manager: &str) -> Entity {
    let mut entity = Entity::new();
    entity.insert("id".into(), Value::from(id));
    entity.insert("name".into(), Value::from(name));
    entity.insert("status".into(), Value::from(status));
    entity.insert("budget".into(), Value::from(budget));
    entity.insert("manager".into(), Value::from(manager));
    entity
}

/// Users collection with three demo rows (ids 1-3)
pub fn seeded_users() -> InMemoryCollection {
    InMemoryCollection::with_rows(
        "users",
        users_schema(),
        vec![
            user(1, "John Doe", "john@example.com", "Engineering"),
            user(2, "Jane Smith", "jane@example.com", "Marketing"),
            user(3, "Bob Johnson", "bob@example.com", "Sales"),
        ],
    )
}

/// Projects collection with three demo rows (ids 1-3)
pub fn seeded_projects() -> InMemoryCollection {
    InMemoryCollection::with_rows(
        "projects",
        projects_schema(),
        vec![
            project(1, "Website Redesign", "active", 50000, "John Doe"),
            project(2, "Mobile App", "completed", 75000, "Jane Smith"),
            project(3, "AI Integration", "planning", 100000, "Bob Johnson"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResourceCollection;
    use serde_json::json;

    #[test]
    fn test_seed_rows() {
        let users = seeded_users();
        let projects = seeded_projects();

        assert_eq!(users.len(), 3);
        assert_eq!(projects.len(), 3);
        assert_eq!(users.get_by_filter("department", &json!("engineering")).len(), 1);
        assert_eq!(projects.get_by_filter("status", &json!("active")).len(), 1);
    }

    #[test]
    fn test_seeded_ids_continue_at_four() {
        let projects = seeded_projects();
        let mut attributes = crate::core::Parameters::new();
        attributes.insert("name".into(), json!("Atlas"));

        let created = projects.create(&attributes).unwrap();
        assert_eq!(created["id"], json!(4));
        assert_eq!(created["status"], json!("planning"));
        assert_eq!(created["budget"], json!(0));
    }
}
