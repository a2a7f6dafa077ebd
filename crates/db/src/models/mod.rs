//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//!
//! JSONB columns map through `sqlx::types::Json` onto the typed evidence
//! and action structs defined in `atelier-core`.

pub mod catalog;
pub mod correction;
pub mod document;
pub mod link;
pub mod pattern;
pub mod suggestion;
pub mod tag;
