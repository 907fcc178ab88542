//! Resource collections
//!
//! The users and projects collections the engine reads from and, after
//! approval, mutates. Everything lives in process memory; nothing is
//! persisted across restarts.

mod collection;
mod memory;
mod seed;
mod set;

pub use collection::{entity_id, values_match, CollectionError, Entity, ResourceCollection};
pub use memory::{FieldKind, FieldSpec, InMemoryCollection};
pub use seed::{projects_schema, seeded_projects, seeded_users, users_schema};
pub use set::CollectionSet;
