//! # Query Text Assembler
//!
//! Builds a `DynamicQuery` from string parameters, e.g. a decoded HTTP query
//! string. Recognised keywords are validated and parsed; every other key is
//! kept verbatim as a pass-through parameter.

use std::collections::BTreeMap;

use tracing::debug;

use super::dynamic::DynamicQuery;
use super::errors::{QueryError, QueryResult};
use super::keywords::{self, COUNT, FIELDS, FILTER, ITEMS_PER_PAGE, LIMIT, OFFSET, ORDER_BY, PAGE_INDEX};
use super::order::parse_order_list;
use super::pagination::OffsetLimit;
use super::parser::parse_filter;

/// Assembles a query from key/value pairs
pub fn assemble<I, K, V>(params: I) -> QueryResult<DynamicQuery>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect();
    let get = |key: &str| params.get(key).map(String::as_str);

    let count_only = get(COUNT).map(parse_bool).transpose()?;
    if count_only == Some(true) {
        let conflicting: Vec<String> = keywords::ALL
            .iter()
            .filter(|k| **k != COUNT && **k != FILTER && params.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !conflicting.is_empty() {
            let mut names = vec![COUNT.to_string()];
            names.extend(conflicting);
            return Err(QueryError::MutuallyExclusive(names));
        }
    }

    let offset_limit =
        OffsetLimit::from_params(get(OFFSET), get(LIMIT), get(PAGE_INDEX), get(ITEMS_PER_PAGE))?;

    let mut query = DynamicQuery::new();

    if let Some(filter) = get(FILTER) {
        query = query.with_filter(parse_filter(filter)?);
    }
    if let Some(fields) = get(FIELDS) {
        let fields: Vec<&str> = fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if !fields.is_empty() {
            query = query.with_fields(fields);
        }
    }
    if let Some(order_by) = get(ORDER_BY) {
        let orders = parse_order_list(order_by);
        if !orders.is_empty() {
            query = query.with_order_by(orders);
        }
    }
    if let Some(offset_limit) = offset_limit {
        query = query.with_offset_limit(offset_limit);
    }
    if let Some(count_only) = count_only {
        query = query.with_count_only(count_only);
    }
    for (key, value) in params.iter().filter(|(k, _)| !keywords::is_keyword(k)) {
        query = query.with_parameter(key.as_str(), value.as_str());
    }

    debug!(
        fields = ?query.fields(),
        filter = ?query.filter().map(|f| f.to_filter_string()),
        count_only = query.is_count_only(),
        passthrough = query.parameters().len(),
        "assembled dynamic query"
    );
    Ok(query)
}

fn parse_bool(value: &str) -> QueryResult<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(QueryError::NotABoolean {
            name: COUNT.to_string(),
            value: value.to_string(),
        })
    }
}

impl DynamicQuery {
    /// Assembles a query from key/value pairs
    pub fn from_params<I, K, V>(params: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        assemble(params)
    }
}
