//! # Entity Mapping
//!
//! Per-entity field resolvers: logical (possibly dotted) field names to
//! physical columns, and the related tables that must be joined to reach
//! them. Mappers are built once at startup and read concurrently afterwards.

mod column;
mod config;
mod entity;
mod errors;
mod registry;

pub use column::{Column, ColumnType};
pub use config::{ColumnDef, EntityDef, MappingConfig, RelationDef};
pub use entity::{EntityMapper, JoinType, JoinedEntity, Relation};
pub use errors::{MappingError, MappingResult};
pub use registry::MapperRegistry;
