//! # Pagination
//!
//! Converts between `offset`/`limit` and `pageIndex`/`itemsPerPage` and
//! enforces the bounds shared by both vocabularies.

use serde::Serialize;

use super::errors::{QueryError, QueryResult};
use super::keywords::{ITEMS_PER_PAGE, LIMIT, OFFSET, PAGE_INDEX};

/// Largest slice a single request may ask for
pub const MAX_LIMIT: i32 = 30;

/// A validated result slice.
///
/// `is_paging` only records which vocabulary the caller used so the slice
/// can be reported back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetLimit {
    offset: i64,
    limit: i32,
    is_paging: bool,
}

/// A slice described in the caller's own vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PaginationReport {
    Paging {
        #[serde(rename = "pageIndex")]
        page_index: i64,
        #[serde(rename = "itemsPerPage")]
        items_per_page: i32,
    },
    Offset {
        offset: i64,
        limit: i32,
    },
}

impl OffsetLimit {
    /// Offset-based slice: `offset >= 0`, `1 <= limit <= MAX_LIMIT`
    pub fn from_offset(offset: i64, limit: i32) -> QueryResult<Self> {
        check_min(OFFSET, offset, 0)?;
        check_limit(LIMIT, limit.into())?;
        Ok(Self {
            offset,
            limit,
            is_paging: false,
        })
    }

    /// Page-based slice: `page_index >= 1`, `1 <= items_per_page <= MAX_LIMIT`
    pub fn from_page(page_index: i64, items_per_page: i32) -> QueryResult<Self> {
        check_min(PAGE_INDEX, page_index, 1)?;
        check_limit(ITEMS_PER_PAGE, items_per_page.into())?;
        let offset = (page_index - 1)
            .checked_mul(items_per_page.into())
            .ok_or_else(|| QueryError::OutOfBounds {
                name: PAGE_INDEX.to_string(),
                value: page_index,
                bound: "small enough to address a row".to_string(),
            })?;
        Ok(Self {
            offset,
            limit: items_per_page,
            is_paging: true,
        })
    }

    /// Builds a slice from raw parameter text.
    ///
    /// Checks run in a fixed order: a half-supplied pair, then both pairs
    /// together, then integer format, then bounds. `Ok(None)` when neither
    /// pair is present.
    pub fn from_params(
        offset: Option<&str>,
        limit: Option<&str>,
        page_index: Option<&str>,
        items_per_page: Option<&str>,
    ) -> QueryResult<Option<Self>> {
        let offset_pair = require_pair((OFFSET, offset), (LIMIT, limit))?;
        let page_pair = require_pair((PAGE_INDEX, page_index), (ITEMS_PER_PAGE, items_per_page))?;

        match (offset_pair, page_pair) {
            (Some(_), Some(_)) => Err(QueryError::MutuallyExclusive(vec![
                OFFSET.to_string(),
                LIMIT.to_string(),
                PAGE_INDEX.to_string(),
                ITEMS_PER_PAGE.to_string(),
            ])),
            (Some((offset, limit)), None) => {
                let offset = parse_integer(OFFSET, offset)?;
                let limit = parse_limit(LIMIT, limit)?;
                Self::from_offset(offset, limit).map(Some)
            }
            (None, Some((page_index, items_per_page))) => {
                let page_index = parse_integer(PAGE_INDEX, page_index)?;
                let items_per_page = parse_limit(ITEMS_PER_PAGE, items_per_page)?;
                Self::from_page(page_index, items_per_page).map(Some)
            }
            (None, None) => Ok(None),
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i32 {
        self.limit
    }

    pub fn is_paging(&self) -> bool {
        self.is_paging
    }

    /// 1-based page index, only for page-based slices
    pub fn page_index(&self) -> Option<i64> {
        self.is_paging
            .then(|| self.offset / i64::from(self.limit) + 1)
    }

    /// Only for page-based slices
    pub fn items_per_page(&self) -> Option<i32> {
        self.is_paging.then_some(self.limit)
    }

    pub fn report(&self) -> PaginationReport {
        match (self.page_index(), self.items_per_page()) {
            (Some(page_index), Some(items_per_page)) => PaginationReport::Paging {
                page_index,
                items_per_page,
            },
            _ => PaginationReport::Offset {
                offset: self.offset,
                limit: self.limit,
            },
        }
    }

    /// The slice immediately after this one, in the same vocabulary
    pub fn next_page(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit.into()),
            ..*self
        }
    }

    /// Parameter pairs in the caller's vocabulary
    pub fn to_params(&self) -> [(&'static str, String); 2] {
        match self.report() {
            PaginationReport::Paging {
                page_index,
                items_per_page,
            } => [
                (PAGE_INDEX, page_index.to_string()),
                (ITEMS_PER_PAGE, items_per_page.to_string()),
            ],
            PaginationReport::Offset { offset, limit } => {
                [(OFFSET, offset.to_string()), (LIMIT, limit.to_string())]
            }
        }
    }
}

fn require_pair<'a>(
    first: (&str, Option<&'a str>),
    second: (&str, Option<&'a str>),
) -> QueryResult<Option<(&'a str, &'a str)>> {
    match (first.1, second.1) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (Some(_), None) => Err(QueryError::mutually_necessary(first.0, second.0)),
        (None, Some(_)) => Err(QueryError::mutually_necessary(second.0, first.0)),
        (None, None) => Ok(None),
    }
}

fn parse_integer(name: &str, value: &str) -> QueryResult<i64> {
    value.trim().parse().map_err(|_| QueryError::NotAnInteger {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_limit(name: &str, value: &str) -> QueryResult<i32> {
    let parsed = parse_integer(name, value)?;
    check_limit(name, parsed)?;
    // in range after check_limit
    Ok(parsed as i32)
}

fn check_min(name: &str, value: i64, min: i64) -> QueryResult<()> {
    if value < min {
        return Err(QueryError::OutOfBounds {
            name: name.to_string(),
            value,
            bound: format!(">= {}", min),
        });
    }
    Ok(())
}

fn check_limit(name: &str, value: i64) -> QueryResult<()> {
    if !(1..=i64::from(MAX_LIMIT)).contains(&value) {
        return Err(QueryError::OutOfBounds {
            name: name.to_string(),
            value,
            bound: format!("between 1 and {}", MAX_LIMIT),
        });
    }
    Ok(())
}
