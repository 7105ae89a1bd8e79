//! # SQL Rendering
//!
//! Renders a compiled query as parameterised SQL text. Values are never
//! inlined: each one becomes a numbered `?N` placeholder. Slice bounds are
//! validated integers and are written literally.

use serde::Serialize;

use super::compile::{CompiledQuery, CountQuery, Join, OrderTerm, SelectQuery};
use super::condition::{Condition, Operand};
use super::value::SqlValue;

/// SQL text plus the values bound to its placeholders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl SqlFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` and returns its placeholder
    pub fn add_param(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }
}

impl CompiledQuery {
    pub fn to_sql(&self) -> SqlFragment {
        let mut fragment = SqlFragment::new();
        match self {
            CompiledQuery::Count(count) => render_count(&mut fragment, count),
            CompiledQuery::Select(select) => render_select(&mut fragment, select),
        }
        fragment
    }
}

fn render_count(out: &mut SqlFragment, query: &CountQuery) {
    out.push(&format!("SELECT COUNT(*) FROM {}", query.table));
    render_joins(out, &query.joins);
    render_where(out, query.filter.as_ref());
}

fn render_select(out: &mut SqlFragment, query: &SelectQuery) {
    let columns: Vec<String> = query.projection.iter().map(|c| c.qualified_name()).collect();
    out.push(&format!("SELECT {} FROM {}", columns.join(", "), query.table));
    render_joins(out, &query.joins);
    render_where(out, query.filter.as_ref());
    render_order(out, &query.order);
    if let Some(slice) = &query.slice {
        out.push(&format!(" LIMIT {} OFFSET {}", slice.limit(), slice.offset()));
    }
}

fn render_joins(out: &mut SqlFragment, joins: &[Join]) {
    for join in joins {
        out.push(&format!(
            " {} {} ON {} = {}",
            join.join_type.sql(),
            join.table,
            join.left,
            join.right
        ));
    }
}

fn render_where(out: &mut SqlFragment, filter: Option<&Condition>) {
    if let Some(condition) = filter {
        out.push(" WHERE ");
        let clause = render_condition(out, condition);
        out.push(&clause);
    }
}

fn render_order(out: &mut SqlFragment, order: &[OrderTerm]) {
    if order.is_empty() {
        return;
    }
    let terms: Vec<String> = order
        .iter()
        .map(|term| {
            let direction = if term.ascending { "ASC" } else { "DESC" };
            format!("{} {}", term.column.qualified_name(), direction)
        })
        .collect();
    out.push(&format!(" ORDER BY {}", terms.join(", ")));
}

/// Renders one condition, binding its values in reading order
fn render_condition(out: &mut SqlFragment, condition: &Condition) -> String {
    match condition {
        Condition::Comparison {
            column,
            operator,
            operand,
        } => {
            let column = column.qualified_name();
            match operand {
                Operand::None => format!("{} {}", column, operator.sql_token()),
                Operand::Single(value) => {
                    let placeholder = out.add_param(value.clone());
                    format!("{} {} {}", column, operator.sql_token(), placeholder)
                }
                Operand::Multiple(values) => {
                    let placeholders: Vec<String> =
                        values.iter().map(|v| out.add_param(v.clone())).collect();
                    format!(
                        "{} {} ({})",
                        column,
                        operator.sql_token(),
                        placeholders.join(", ")
                    )
                }
            }
        }
        Condition::Junction {
            is_conjunction,
            children,
        } => {
            let connector = if *is_conjunction { " AND " } else { " OR " };
            let parts: Vec<String> = children
                .iter()
                .map(|child| match child {
                    Condition::Junction { .. } => format!("({})", render_condition(out, child)),
                    Condition::Comparison { .. } => render_condition(out, child),
                })
                .collect();
            parts.join(connector)
        }
    }
}
