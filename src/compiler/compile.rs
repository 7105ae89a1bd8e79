//! # Query Compiler
//!
//! Combines a `DynamicQuery` with the target entity's mapper to produce the
//! projection, joins, filter, order and slice an execution layer needs.
//!
//! - Count mode: filter only; joins follow from filter fields.
//! - Data mode: joins follow from every referenced field. With an explicit
//!   projection the identity columns of the root and of every joined entity
//!   come first, then the requested columns; without one, all root columns.
//!
//! Compilation is pure: the same query and mapper always give the same
//! result, and nothing is retained between calls.

use serde::Serialize;
use tracing::debug;

use crate::mapping::{Column, EntityMapper, JoinType, JoinedEntity, MapperRegistry};
use crate::query::{DynamicQuery, OffsetLimit};

use super::condition::Condition;
use super::errors::CompileResult;

/// A join in the compiled query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    pub table: String,
    pub join_type: JoinType,
    /// `parent_table.local_column`
    pub left: String,
    /// `table.foreign_column`
    pub right: String,
}

impl From<&JoinedEntity> for Join {
    fn from(joined: &JoinedEntity) -> Self {
        Self {
            table: joined.table().to_string(),
            join_type: joined.join_type(),
            left: format!("{}.{}", joined.parent_table(), joined.local_column()),
            right: format!("{}.{}", joined.table(), joined.foreign_column()),
        }
    }
}

/// A resolved sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    pub column: Column,
    pub ascending: bool,
}

/// Row-count query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountQuery {
    pub table: String,
    pub joins: Vec<Join>,
    pub filter: Option<Condition>,
}

/// Data query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectQuery {
    pub table: String,
    pub projection: Vec<Column>,
    pub joins: Vec<Join>,
    pub filter: Option<Condition>,
    pub order: Vec<OrderTerm>,
    pub slice: Option<OffsetLimit>,
}

/// Output of the compiler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompiledQuery {
    Count(CountQuery),
    Select(SelectQuery),
}

impl CompiledQuery {
    pub fn is_count(&self) -> bool {
        matches!(self, CompiledQuery::Count(_))
    }

    pub fn table(&self) -> &str {
        match self {
            CompiledQuery::Count(q) => &q.table,
            CompiledQuery::Select(q) => &q.table,
        }
    }

    pub fn joins(&self) -> &[Join] {
        match self {
            CompiledQuery::Count(q) => &q.joins,
            CompiledQuery::Select(q) => &q.joins,
        }
    }

    pub fn filter(&self) -> Option<&Condition> {
        match self {
            CompiledQuery::Count(q) => q.filter.as_ref(),
            CompiledQuery::Select(q) => q.filter.as_ref(),
        }
    }
}

/// Compiles queries against one entity
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    mapper: &'a EntityMapper,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(mapper: &'a EntityMapper) -> Self {
        Self { mapper }
    }

    /// Compiler for a registered entity
    pub fn for_entity(registry: &'a MapperRegistry, entity: &str) -> CompileResult<Self> {
        Ok(Self::new(registry.get(entity)?))
    }

    pub fn compile(&self, query: &DynamicQuery) -> CompileResult<CompiledQuery> {
        let compiled = if query.is_count_only() {
            CompiledQuery::Count(self.compile_count(query)?)
        } else {
            CompiledQuery::Select(self.compile_select(query)?)
        };
        debug!(
            entity = self.mapper.entity(),
            count = compiled.is_count(),
            joins = compiled.joins().len(),
            "compiled dynamic query"
        );
        Ok(compiled)
    }

    fn compile_count(&self, query: &DynamicQuery) -> CompileResult<CountQuery> {
        let joined = self.mapper.joined_entities(&query.filter_fields())?;
        Ok(CountQuery {
            table: self.mapper.table().to_string(),
            joins: joined.iter().map(Join::from).collect(),
            filter: self.compile_filter(query)?,
        })
    }

    fn compile_select(&self, query: &DynamicQuery) -> CompileResult<SelectQuery> {
        let joined = self.mapper.joined_entities(&query.all_fields())?;
        let projection = self.projection(query, &joined)?;
        let filter = self.compile_filter(query)?;

        let mut order = Vec::new();
        for order_by in query.order_by().unwrap_or_default() {
            order.push(OrderTerm {
                column: self.mapper.resolve_column(&order_by.field)?,
                ascending: order_by.is_ascending(),
            });
        }

        Ok(SelectQuery {
            table: self.mapper.table().to_string(),
            projection,
            joins: joined.iter().map(Join::from).collect(),
            filter,
            order,
            slice: query.offset_limit().copied(),
        })
    }

    fn projection(&self, query: &DynamicQuery, joined: &[JoinedEntity]) -> CompileResult<Vec<Column>> {
        let Some(fields) = query.fields() else {
            return Ok(self.mapper.columns().into_iter().cloned().collect());
        };

        let mut projection: Vec<Column> = Vec::new();
        let mut push = |column: Column| {
            if !projection.contains(&column) {
                projection.push(column);
            }
        };

        for column in self.mapper.identity_columns() {
            push(column.clone());
        }
        for entity in joined {
            for column in entity.mapper().identity_columns() {
                push(column.clone());
            }
        }
        for field in fields {
            for column in self.mapper.resolve_columns(field)? {
                push(column);
            }
        }
        Ok(projection)
    }

    fn compile_filter(&self, query: &DynamicQuery) -> CompileResult<Option<Condition>> {
        query
            .filter()
            .map(|predicate| Condition::compile(predicate, self.mapper))
            .transpose()
    }
}
