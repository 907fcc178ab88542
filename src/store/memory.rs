//! In-memory resource collection
//!
//! Rows live in a `RwLock<Vec<Entity>>` next to a monotonically increasing id
//! counter. A small field schema fills defaults on create and validates keys
//! and value kinds on create and update.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::collection::{entity_id, values_match, CollectionError, Entity, ResourceCollection};
use crate::core::Parameters;

/// Kind of value a field stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// One field of a collection schema
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Value used on create when the attribute is absent
    pub default: Value,
}

impl FieldSpec {
    pub fn text(name: &'static str, default: &str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            default: Value::String(default.to_string()),
        }
    }

    pub fn number(name: &'static str, default: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            default: Value::from(default),
        }
    }

    /// Convert an incoming value to this field's kind
    ///
    /// Numbers are accepted for text fields (stored as their decimal text)
    /// and numeric strings are accepted for number fields.
    pub fn coerce(&self, value: &Value) -> Result<Value, CollectionError> {
        let invalid = || CollectionError::InvalidValue {
            field: self.name.to_string(),
            expected: match self.kind {
                FieldKind::Text => "text",
                FieldKind::Number => "number",
            },
            value: value.clone(),
        };

        match (self.kind, value) {
            (FieldKind::Text, Value::String(_)) => Ok(value.clone()),
            (FieldKind::Text, Value::Number(n)) => Ok(Value::String(n.to_string())),
            (FieldKind::Number, Value::Number(_)) => Ok(value.clone()),
            (FieldKind::Number, Value::String(s)) => {
                let cleaned = s.trim().replace(',', "");
                if let Ok(int) = cleaned.parse::<i64>() {
                    Ok(Value::from(int))
                } else {
                    cleaned
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .ok_or_else(invalid)
                }
            }
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug)]
struct Rows {
    entities: Vec<Entity>,
    next_id: u64,
}

/// A `ResourceCollection` held entirely in process memory
#[derive(Debug)]
pub struct InMemoryCollection {
    name: String,
    schema: Vec<FieldSpec>,
    rows: RwLock<Rows>,
}

impl InMemoryCollection {
    /// Create an empty collection; the first id assigned is 1
    pub fn new(name: impl Into<String>, schema: Vec<FieldSpec>) -> Self {
        Self::with_rows(name, schema, Vec::new())
    }

    /// Create a collection with initial rows
    ///
    /// The id counter starts just past the highest existing id.
    pub fn with_rows(name: impl Into<String>, schema: Vec<FieldSpec>, entities: Vec<Entity>) -> Self {
        let next_id = entities.iter().filter_map(entity_id).max().unwrap_or(0) + 1;
        Self {
            name: name.into(),
            schema,
            rows: RwLock::new(Rows { entities, next_id }),
        }
    }

    pub fn schema(&self) -> &[FieldSpec] {
        &self.schema
    }

    fn read(&self) -> RwLockReadGuard<'_, Rows> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Rows> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn field(&self, name: &str) -> Result<&FieldSpec, CollectionError> {
        if name == "id" {
            return Err(CollectionError::ReadOnlyField(name.to_string()));
        }
        self.schema
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| CollectionError::UnknownField {
                collection: self.name.clone(),
                field: name.to_string(),
            })
    }

    /// Validate and coerce every attribute before anything is written
    fn validated(&self, attributes: &Parameters) -> Result<Parameters, CollectionError> {
        attributes
            .iter()
            .map(|(key, value)| -> Result<(String, Value), CollectionError> {
                let spec = self.field(key)?;
                Ok((key.clone(), spec.coerce(value)?))
            })
            .collect()
    }
}

impl ResourceCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_all(&self) -> Vec<Entity> {
        self.read().entities.clone()
    }

    fn get_by_id(&self, id: u64) -> Option<Entity> {
        self.read()
            .entities
            .iter()
            .find(|e| entity_id(e) == Some(id))
            .cloned()
    }

    fn get_by_filter(&self, field: &str, value: &Value) -> Vec<Entity> {
        self.read()
            .entities
            .iter()
            .filter(|e| e.get(field).is_some_and(|stored| values_match(stored, value)))
            .cloned()
            .collect()
    }

    fn create(&self, attributes: &Parameters) -> Result<Entity, CollectionError> {
        let mut attributes = self.validated(attributes)?;

        let mut rows = self.write();
        let id = rows.next_id;

        let mut entity = Entity::new();
        entity.insert("id".to_string(), Value::from(id));
        for spec in &self.schema {
            let value = attributes
                .remove(spec.name)
                .unwrap_or_else(|| spec.default.clone());
            entity.insert(spec.name.to_string(), value);
        }

        rows.entities.push(entity.clone());
        rows.next_id += 1;

        tracing::debug!(collection = %self.name, id, "Entity created");
        Ok(entity)
    }

    fn update(&self, id: u64, changes: &Parameters) -> Result<Option<Entity>, CollectionError> {
        let changes = self.validated(changes)?;

        let mut rows = self.write();
        let Some(entity) = rows.entities.iter_mut().find(|e| entity_id(e) == Some(id)) else {
            return Ok(None);
        };
        for (key, value) in changes {
            entity.insert(key, value);
        }

        tracing::debug!(collection = %self.name, id, "Entity updated");
        Ok(Some(entity.clone()))
    }

    fn delete(&self, id: u64) -> bool {
        let mut rows = self.write();
        match rows.entities.iter().position(|e| entity_id(e) == Some(id)) {
            Some(index) => {
                rows.entities.remove(index);
                tracing::debug!(collection = %self.name, id, "Entity deleted");
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.read().entities.len()
    }
}
