//! Recognised query-text keywords

pub const FIELDS: &str = "fields";
pub const FILTER: &str = "filter";
pub const ORDER_BY: &str = "orderBy";
pub const OFFSET: &str = "offset";
pub const LIMIT: &str = "limit";
pub const PAGE_INDEX: &str = "pageIndex";
pub const ITEMS_PER_PAGE: &str = "itemsPerPage";
pub const COUNT: &str = "count";

/// Every keyword, in canonical rendering order
pub const ALL: [&str; 8] = [
    FIELDS,
    FILTER,
    ORDER_BY,
    OFFSET,
    LIMIT,
    PAGE_INDEX,
    ITEMS_PER_PAGE,
    COUNT,
];

pub fn is_keyword(key: &str) -> bool {
    ALL.contains(&key)
}
