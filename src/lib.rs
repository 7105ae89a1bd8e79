//! dynquery - caller-supplied query text to validated, compiled queries
//!
//! - `query`: filter grammar, order and pagination parameters, assembly
//! - `mapping`: logical field paths to physical columns and joins
//! - `compiler`: projection, joins, typed filter, order and slice

pub mod cli;
pub mod compiler;
pub mod mapping;
pub mod query;

pub use compiler::{CompileError, CompiledQuery, QueryCompiler, SqlFragment};
pub use mapping::{EntityMapper, MapperRegistry, MappingError};
pub use query::{assemble, DynamicQuery, Predicate, QueryError};
