//! # Query Text
//!
//! Turns caller-supplied text into a validated `DynamicQuery`:
//!
//! - `fields`: comma-separated projection
//! - `filter`: bracketed boolean DSL, e.g. `[(a = 1 and b = 2) or (c in (x,y))]`
//! - `orderBy`: `name,price-`
//! - `offset`/`limit` or `pageIndex`/`itemsPerPage`
//! - `count`: row count only, combinable with `filter` alone
//!
//! Anything else is carried through untouched.

mod assembler;
mod dynamic;
mod errors;
pub mod keywords;
mod order;
mod pagination;
mod parser;
mod predicate;

pub use assembler::assemble;
pub use dynamic::{sort_fields, DynamicQuery};
pub use errors::{QueryError, QueryResult};
pub use order::{parse_order_list, OrderBy};
pub use pagination::{OffsetLimit, PaginationReport, MAX_LIMIT};
pub use parser::{parse_filter, MAX_NESTING};
pub use predicate::{Predicate, PredicateOperator, PredicateValue, ValueKind};
