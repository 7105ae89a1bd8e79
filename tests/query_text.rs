//! Query Text Invariant Tests
//!
//! Behaviour of the textual query vocabulary as seen by a caller:
//! - Filter text round-trips through its canonical form
//! - Page-based and offset-based slices agree
//! - Paired and exclusive parameters are enforced
//! - Nested and flat junctions parse as written
//! - Count mode excludes data-shaping parameters

use dynquery::query::{
    assemble, parse_filter, DynamicQuery, OffsetLimit, PaginationReport, Predicate,
    PredicateOperator, PredicateValue, QueryError, MAX_LIMIT, MAX_NESTING,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn simple(field: &str, operator: PredicateOperator, value: &str) -> Predicate {
    Predicate::Simple {
        field: field.to_string(),
        operator,
        value: Some(PredicateValue::Single(value.to_string())),
    }
}

fn query(pairs: &[(&str, &str)]) -> Result<DynamicQuery, QueryError> {
    assemble(pairs.iter().copied())
}

// =============================================================================
// Round-trip Tests
// =============================================================================

/// Canonical filter text parses back to the same predicate and text.
#[test]
fn test_filter_round_trip() {
    let inputs = [
        "[a = 1]",
        "[deleted is_null]",
        "[role in (admin, member)]",
        "[a = 1 and b != 2 and c like x%]",
        "[a = 1 or b = 2]",
        "[(a = 1 and b = 2) or (c = 3)]",
        "[(a = 1) and (b = 2 or c = 3) and (d not_in (x, y))]",
        "[((a = 1 or b = 2) and (c = 3)) or (d is_not_null)]",
    ];

    for input in inputs {
        let parsed = parse_filter(input).unwrap();
        let text = parsed.to_filter_string();
        let reparsed = parse_filter(&text).unwrap();
        assert_eq!(parsed, reparsed, "predicate changed for {}", input);
        assert_eq!(text, reparsed.to_filter_string(), "text changed for {}", input);
    }
}

/// Whitespace and connector case are normalised away.
#[test]
fn test_round_trip_normalises() {
    let parsed = parse_filter("[  a =  1   AND b = 2 ]").unwrap();
    assert_eq!(parsed.to_filter_string(), "[a = 1 and b = 2]");
}

// =============================================================================
// Grammar Tests
// =============================================================================

/// Two groups joined by `or`, the first holding an `and` junction.
#[test]
fn test_nested_junction_structure() {
    let parsed = parse_filter("[(a = 1 and b = 2) or (c = 3)]").unwrap();
    let expected = Predicate::Junction {
        is_conjunction: false,
        children: vec![
            Predicate::Junction {
                is_conjunction: true,
                children: vec![
                    simple("a", PredicateOperator::Eq, "1"),
                    simple("b", PredicateOperator::Eq, "2"),
                ],
            },
            simple("c", PredicateOperator::Eq, "3"),
        ],
    };
    assert_eq!(parsed, expected);
}

/// `and` and `or` at the same level without parentheses is ambiguous.
#[test]
fn test_mixed_connectors_rejected() {
    let err = parse_filter("[a = 1 and b = 2 or c = 3]").unwrap_err();
    assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR");

    let err = parse_filter("[(a = 1) and (b = 2) or (c = 3)]").unwrap_err();
    assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR");
}

/// Multi-value operators carry every listed value in order.
#[test]
fn test_multi_value_operator() {
    let parsed = parse_filter("[role in (admin,member)]").unwrap();
    assert_eq!(
        parsed,
        Predicate::Simple {
            field: "role".to_string(),
            operator: PredicateOperator::In,
            value: Some(PredicateValue::Multiple(vec![
                "admin".to_string(),
                "member".to_string()
            ])),
        }
    );
}

/// Every malformed shape is rejected with the matching code.
#[test]
fn test_rejections() {
    let cases = [
        ("a = 1", "DYNQ_FILTER_MALFORMED"),
        ("[a = 1", "DYNQ_FILTER_MALFORMED"),
        ("[]", "DYNQ_FILTER_GRAMMAR"),
        ("[a ~ 1]", "DYNQ_FILTER_UNKNOWN_OPERATOR"),
        ("[a is_null 1]", "DYNQ_FILTER_GRAMMAR"),
        ("[a in 1]", "DYNQ_FILTER_GRAMMAR"),
        ("[a = (1,2)]", "DYNQ_FILTER_GRAMMAR"),
        ("[(a = 1) and b = 2]", "DYNQ_FILTER_GRAMMAR"),
        ("[(a = 1 and b = 2]", "DYNQ_FILTER_GRAMMAR"),
    ];
    for (input, code) in cases {
        let err = parse_filter(input).unwrap_err();
        assert_eq!(err.code(), code, "wrong code for {}", input);
    }
}

/// Deeply nested groups are rejected as a grammar error, not a crash.
#[test]
fn test_deep_nesting_is_reported() {
    for depth in [MAX_NESTING + 1, 1_000, 50_000] {
        let filter = format!("[{}a = 1{}]", "(".repeat(depth), ")".repeat(depth));
        let err = query(&[("filter", filter.as_str())]).unwrap_err();
        assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR", "depth {}", depth);
    }

    let filter = format!("[{}a = 1{}]", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
    assert!(query(&[("filter", filter.as_str())]).is_ok());
}

/// Symbolic operators tolerate spacing on either side.
#[test]
fn test_compact_spacing() {
    for input in ["[a=1]", "[a =1]", "[a= 1]", "[a = 1]"] {
        assert_eq!(
            parse_filter(input).unwrap(),
            simple("a", PredicateOperator::Eq, "1"),
            "input {}",
            input
        );
    }
}

// =============================================================================
// Pagination Tests
// =============================================================================

/// Page to offset and back is the identity over the allowed range.
#[test]
fn test_pagination_equivalence() {
    for page_index in 1..=50i64 {
        for items_per_page in 1..=MAX_LIMIT {
            let slice = OffsetLimit::from_page(page_index, items_per_page).unwrap();
            assert_eq!(slice.offset(), (page_index - 1) * i64::from(items_per_page));
            assert_eq!(slice.page_index(), Some(page_index));
            assert_eq!(slice.items_per_page(), Some(items_per_page));
        }
    }
}

/// Both pairs together are exclusive; half a pair is incomplete.
#[test]
fn test_pagination_pairs() {
    let err = query(&[
        ("offset", "0"),
        ("limit", "10"),
        ("pageIndex", "1"),
        ("itemsPerPage", "10"),
    ])
    .unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_MUTUALLY_EXCLUSIVE");

    let err = query(&[("offset", "0")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_MUTUALLY_NECESSARY");

    let err = query(&[("itemsPerPage", "5")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_MUTUALLY_NECESSARY");
}

/// Bounds are enforced after format.
#[test]
fn test_pagination_bounds() {
    let err = query(&[("offset", "x"), ("limit", "10")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_NOT_INTEGER");

    let limit = (MAX_LIMIT + 1).to_string();
    let err = query(&[("offset", "0"), ("limit", limit.as_str())]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_OUT_OF_BOUNDS");

    let err = query(&[("pageIndex", "0"), ("itemsPerPage", "10")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_OUT_OF_BOUNDS");

    let err = query(&[("offset", "-1"), ("limit", "10")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_OUT_OF_BOUNDS");
}

/// The slice is reported back in the vocabulary it arrived in.
#[test]
fn test_pagination_report() {
    let paged = query(&[("pageIndex", "3"), ("itemsPerPage", "10")]).unwrap();
    assert_eq!(
        paged.offset_limit().unwrap().report(),
        PaginationReport::Paging {
            page_index: 3,
            items_per_page: 10
        }
    );

    let offset = query(&[("offset", "7"), ("limit", "3")]).unwrap();
    assert_eq!(
        offset.offset_limit().unwrap().report(),
        PaginationReport::Offset {
            offset: 7,
            limit: 3
        }
    );
}

// =============================================================================
// Assembly Tests
// =============================================================================

/// Projected, filtered and ordered fields form one sorted set.
#[test]
fn test_field_union() {
    let assembled = query(&[("fields", "a,b"), ("filter", "[c = 1]"), ("orderBy", "d-")]).unwrap();
    assert_eq!(assembled.all_fields(), vec!["a", "b", "c", "d"]);
    assert!(!assembled.order_by().unwrap()[0].is_ascending());
}

/// Count mode admits only a filter.
#[test]
fn test_count_mode_exclusivity() {
    let err = query(&[("count", "true"), ("fields", "a")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_MUTUALLY_EXCLUSIVE");

    let err = query(&[("count", "true"), ("offset", "0"), ("limit", "1")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_MUTUALLY_EXCLUSIVE");

    let counted = query(&[("count", "true"), ("filter", "[a=1]")]).unwrap();
    assert!(counted.is_count_only());
    assert_eq!(counted.filter(), Some(&simple("a", PredicateOperator::Eq, "1")));

    let err = query(&[("count", "maybe")]).unwrap_err();
    assert_eq!(err.code(), "DYNQ_PARAM_NOT_BOOLEAN");
}

/// Unknown keys are passed through untouched.
#[test]
fn test_pass_through_parameters() {
    let assembled = query(&[("lang", "en"), ("fields", "name")]).unwrap();
    assert_eq!(assembled.parameter("lang"), Some("en"));
    assert_eq!(assembled.fields(), Some(&["name".to_string()][..]));
}

/// A query rendered to parameters assembles to an equal query.
#[test]
fn test_params_round_trip() {
    let assembled = query(&[
        ("fields", "user.name,id"),
        ("filter", "[(a = 1) or (b in (x,y))]"),
        ("orderBy", "price-,name"),
        ("pageIndex", "2"),
        ("itemsPerPage", "15"),
        ("tenant", "acme"),
    ])
    .unwrap();
    let params = assembled.to_params();
    assert_eq!(assemble(params).unwrap(), assembled);
}
