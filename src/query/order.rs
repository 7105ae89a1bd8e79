//! # Order-by clauses
//!
//! `orderBy=name,price-` : ascending by default, `+` or `-` suffix.

use std::hash::{Hash, Hasher};

use serde::Serialize;

/// A single sort key.
///
/// Equality and hashing consider only `field`, so a list never holds the
/// same field twice.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBy {
    pub field: String,
    /// `None` and `Some(true)` both mean ascending
    pub ascending: Option<bool>,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: Some(true),
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: Some(false),
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending.unwrap_or(true)
    }

    /// Parses one `field[+|-]` term
    pub fn parse(term: &str) -> Option<Self> {
        let term = term.trim();
        let (field, ascending) = if let Some(field) = term.strip_suffix('-') {
            (field, Some(false))
        } else if let Some(field) = term.strip_suffix('+') {
            (field, Some(true))
        } else {
            (term, None)
        };
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            ascending,
        })
    }

    /// Canonical text form; the default direction is left implicit
    pub fn to_term(&self) -> String {
        if self.is_ascending() {
            self.field.clone()
        } else {
            format!("{}-", self.field)
        }
    }
}

impl PartialEq for OrderBy {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
    }
}

impl Eq for OrderBy {}

impl Hash for OrderBy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
    }
}

/// Parses a comma-separated order list, keeping the first entry per field
pub fn parse_order_list(value: &str) -> Vec<OrderBy> {
    let mut orders: Vec<OrderBy> = Vec::new();
    for order in value.split(',').filter_map(OrderBy::parse) {
        if !orders.contains(&order) {
            orders.push(order);
        }
    }
    orders
}
