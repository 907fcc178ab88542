//! Resource collection trait definition
//!
//! Every collection the engine can read from or mutate implements this trait.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::Parameters;

/// A stored record. Always carries an integer `id` field.
pub type Entity = Map<String, Value>;

/// Errors raised by a collection when a write is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    /// Field is not part of the collection's schema
    #[error("{collection} has no field named '{field}'")]
    UnknownField { collection: String, field: String },

    /// Value cannot be stored in the field
    #[error("invalid value for '{field}': expected {expected}, got {value}")]
    InvalidValue {
        field: String,
        expected: &'static str,
        value: Value,
    },

    /// Field is assigned by the collection and cannot be written
    #[error("field '{0}' is read-only")]
    ReadOnlyField(String),
}

/// Trait for addressable sets of entities
///
/// Implementations serialize their own mutations; callers treat each call as
/// atomic.
pub trait ResourceCollection: Send + Sync {
    /// Get the name of this collection
    fn name(&self) -> &str;

    /// All entities, in insertion order
    fn get_all(&self) -> Vec<Entity>;

    fn get_by_id(&self, id: u64) -> Option<Entity>;

    /// Entities whose `field` equals `value` (strings compare case-insensitively)
    fn get_by_filter(&self, field: &str, value: &Value) -> Vec<Entity>;

    /// Insert a new entity and assign it the next identifier
    fn create(&self, attributes: &Parameters) -> Result<Entity, CollectionError>;

    /// Apply partial attributes. `Ok(None)` when no entity has this id.
    fn update(&self, id: u64, changes: &Parameters) -> Result<Option<Entity>, CollectionError>;

    /// Remove an entity. Returns false when no entity has this id.
    fn delete(&self, id: u64) -> bool;

    fn len(&self) -> usize {
        self.get_all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read the `id` field of an entity
pub fn entity_id(entity: &Entity) -> Option<u64> {
    entity.get("id").and_then(Value::as_u64)
}

/// Loose equality used by filters
///
/// Strings compare case-insensitively, numbers compare numerically, and a
/// numeric string matches the number it spells.
pub fn values_match(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => b
            .trim()
            .parse::<f64>()
            .map(|parsed| Some(parsed) == a.as_f64())
            .unwrap_or(false),
        (a, b) => a == b,
    }
}
