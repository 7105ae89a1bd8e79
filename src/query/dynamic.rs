//! # Dynamic Query
//!
//! The validated, immutable form of one request's query text.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::keywords::{COUNT, FIELDS, FILTER, ORDER_BY};
use super::order::OrderBy;
use super::pagination::OffsetLimit;
use super::predicate::Predicate;

/// Projection, filter, order and slice requested by a caller.
///
/// Built once per request (see `assembler`), then only read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicQuery {
    fields: Option<Vec<String>>,
    filter: Option<Predicate>,
    order_by: Option<Vec<OrderBy>>,
    offset_limit: Option<OffsetLimit>,
    count_only: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, String>,
}

impl DynamicQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the projection; duplicates are dropped and the rest sorted
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields = Some(sort_fields(fields));
        self
    }

    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the order list, keeping the first entry per field
    pub fn with_order_by(mut self, order_by: impl IntoIterator<Item = OrderBy>) -> Self {
        let mut orders: Vec<OrderBy> = Vec::new();
        for order in order_by {
            if !orders.contains(&order) {
                orders.push(order);
            }
        }
        self.order_by = Some(orders);
        self
    }

    pub fn with_offset_limit(mut self, offset_limit: OffsetLimit) -> Self {
        self.offset_limit = Some(offset_limit);
        self
    }

    pub fn with_count_only(mut self, count_only: bool) -> Self {
        self.count_only = Some(count_only);
        self
    }

    /// Attaches a pass-through parameter; never interpreted here
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    pub fn order_by(&self) -> Option<&[OrderBy]> {
        self.order_by.as_deref()
    }

    pub fn offset_limit(&self) -> Option<&OffsetLimit> {
        self.offset_limit.as_ref()
    }

    pub fn count_only(&self) -> Option<bool> {
        self.count_only
    }

    pub fn is_count_only(&self) -> bool {
        self.count_only.unwrap_or(false)
    }

    /// Pass-through parameters supplied alongside the query
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Fields referenced by the filter, sorted
    pub fn filter_fields(&self) -> Vec<String> {
        match &self.filter {
            Some(filter) => sort_fields(filter.fields()),
            None => Vec::new(),
        }
    }

    /// Union of projected, filtered and ordered fields, sorted.
    ///
    /// This is the input to join resolution.
    pub fn all_fields(&self) -> Vec<String> {
        let projected = self.fields.iter().flatten().map(String::as_str);
        let filtered = self.filter.iter().flat_map(Predicate::fields);
        let ordered = self
            .order_by
            .iter()
            .flatten()
            .map(|order| order.field.as_str());
        sort_fields(projected.chain(filtered).chain(ordered))
    }

    /// Renders the query back into keyword parameters.
    ///
    /// Assembling the result yields an equal query.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = self.parameters.clone();
        if let Some(fields) = &self.fields {
            params.insert(FIELDS.to_string(), fields.join(","));
        }
        if let Some(filter) = &self.filter {
            params.insert(FILTER.to_string(), filter.to_filter_string());
        }
        if let Some(order_by) = &self.order_by {
            let terms: Vec<String> = order_by.iter().map(OrderBy::to_term).collect();
            params.insert(ORDER_BY.to_string(), terms.join(","));
        }
        if let Some(offset_limit) = &self.offset_limit {
            for (key, value) in offset_limit.to_params() {
                params.insert(key.to_string(), value);
            }
        }
        if let Some(count_only) = self.count_only {
            params.insert(COUNT.to_string(), count_only.to_string());
        }
        params
    }
}

/// Deduplicates and sorts field names.
///
/// When one name contains the other the shorter comes first, otherwise
/// names compare lexicographically. That rule is not a total order, so the
/// names are pre-sorted lexicographically and then insertion-sorted, which
/// keeps the result deterministic.
pub fn sort_fields<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = fields
        .into_iter()
        .map(|f| f.as_ref().trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    let mut sorted: Vec<String> = unique.into_iter().collect();

    for i in 1..sorted.len() {
        let mut j = i;
        while j > 0 && precedes(&sorted[j], &sorted[j - 1]) {
            sorted.swap(j, j - 1);
            j -= 1;
        }
    }
    sorted
}

fn precedes(a: &str, b: &str) -> bool {
    if a.contains(b) || b.contains(a) {
        a.len() < b.len()
    } else {
        a < b
    }
}
