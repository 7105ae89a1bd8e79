//! # Query Compiler
//!
//! Turns a `DynamicQuery` into typed conditions over physical columns, plus
//! the joins, projection, order and slice needed to run it.

mod compile;
mod condition;
mod errors;
mod sql;
mod value;

pub use compile::{CompiledQuery, CountQuery, Join, OrderTerm, QueryCompiler, SelectQuery};
pub use condition::{Condition, Operand};
pub use errors::{CompileError, CompileResult};
pub use sql::SqlFragment;
pub use value::{coerce, SqlValue};
