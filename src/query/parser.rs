//! # Filter Parser
//!
//! Parses the bracketed filter DSL into a `Predicate`.
//!
//! ```text
//! filter     = "[" expression "]"
//! expression = simple
//!            / simple (connector simple)+          ; one connector kind only
//!            / group (connector group)*            ; one connector kind only
//! group      = "(" expression ")"
//! simple     = field SP operator [SP value]
//!            / field [SP] symbol [SP] value        ; e.g. a=1, b >=2
//! value      = token / "(" token ("," token)* ")"
//! connector  = "and" / "or"                        ; case-insensitive
//! ```
//!
//! A bare `simple` may not sit next to a `group`; it has to be parenthesised.
//! Groups nest at most `MAX_NESTING` levels deep.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::errors::{QueryError, QueryResult};
use super::predicate::{Predicate, PredicateOperator, PredicateValue};

fn connector_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+(and|or)\s+").expect("connector pattern"))
}

fn no_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\S+)\s+(\S+)$").expect("no-value pattern"))
}

fn single_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)$").expect("single-value pattern"))
}

/// Symbolic operator with or without surrounding spaces, e.g. `a=1`, `a =1`
fn compact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^\s=!<>()]+)\s*(!=|>=|<=|=|>|<)\s*([^\s()=!<>][^\s()]*)$")
            .expect("compact pattern")
    })
}

fn multiple_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\S+)\s+(\S+)\s+\((.*)\)$").expect("multi-value pattern"))
}

/// Deepest group nesting a filter may use
pub const MAX_NESTING: usize = 32;

/// Parses a complete `[...]` filter
pub fn parse_filter(text: &str) -> QueryResult<Predicate> {
    let trimmed = text.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('[') || !trimmed.ends_with(']') {
        return Err(QueryError::MalformedFilter(text.to_string()));
    }
    parse_expression(&trimmed[1..trimmed.len() - 1], 0)
}

/// Parses the text between the brackets (or inside a group)
fn parse_expression(text: &str, depth: usize) -> QueryResult<Predicate> {
    let expression = text.trim();
    if expression.is_empty() {
        return Err(QueryError::grammar("empty expression", text));
    }
    if expression.starts_with('(') {
        return parse_nested(expression, depth);
    }

    let connectors: Vec<&str> = connector_re()
        .captures_iter(expression)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if connectors.is_empty() {
        return parse_simple(expression);
    }

    let segments: Vec<&str> = connector_re().split(expression).collect();
    if segments.iter().any(|s| s.trim_start().starts_with('(')) {
        return parse_nested(expression, depth);
    }
    parse_flat(expression, &segments, &connectors)
}

/// `simple (connector simple)+` with a single connector kind
fn parse_flat(expression: &str, segments: &[&str], connectors: &[&str]) -> QueryResult<Predicate> {
    let is_conjunction = connectors[0].eq_ignore_ascii_case("and");
    if connectors
        .iter()
        .any(|c| c.eq_ignore_ascii_case("and") != is_conjunction)
    {
        return Err(QueryError::grammar(
            "'and' and 'or' mixed at the same level",
            expression,
        ));
    }

    let children = segments
        .iter()
        .map(|segment| parse_simple(segment.trim()))
        .collect::<QueryResult<Vec<_>>>()?;
    Predicate::junction(is_conjunction, children)
}

/// `group (connector group)*`
fn parse_nested(expression: &str, depth: usize) -> QueryResult<Predicate> {
    if depth >= MAX_NESTING {
        return Err(QueryError::grammar("nesting too deep", expression));
    }
    let groups = top_level_groups(expression)?;

    let mut is_conjunction: Option<bool> = None;
    let mut cursor = 0;
    for (index, &(open, close)) in groups.iter().enumerate() {
        let between = expression[cursor..open].trim();
        if index == 0 {
            if !between.is_empty() {
                return Err(bare_next_to_group(expression));
            }
        } else {
            let connector = if between.eq_ignore_ascii_case("and") {
                true
            } else if between.eq_ignore_ascii_case("or") {
                false
            } else if between.is_empty() {
                return Err(QueryError::grammar("missing connector between groups", expression));
            } else {
                return Err(bare_next_to_group(expression));
            };
            match is_conjunction {
                Some(current) if current != connector => {
                    return Err(QueryError::grammar(
                        "'and' and 'or' mixed at the same level",
                        expression,
                    ));
                }
                _ => is_conjunction = Some(connector),
            }
        }
        cursor = close + 1;
    }
    if !expression[cursor..].trim().is_empty() {
        return Err(bare_next_to_group(expression));
    }

    let children = groups
        .iter()
        .map(|&(open, close)| parse_expression(&expression[open + 1..close], depth + 1))
        .collect::<QueryResult<Vec<_>>>()?;

    // a single group is its own content
    Predicate::junction(is_conjunction.unwrap_or(true), children)
}

/// Byte offsets of every `(`/`)` pair at depth zero
fn top_level_groups(expression: &str) -> QueryResult<Vec<(usize, usize)>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut open = 0;

    for (i, ch) in expression.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    open = i;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(unbalanced(expression));
                }
                depth -= 1;
                if depth == 0 {
                    groups.push((open, i));
                }
            }
            _ => {}
        }
    }

    if depth != 0 || groups.is_empty() {
        return Err(unbalanced(expression));
    }
    Ok(groups)
}

/// `field operator value?`
fn parse_simple(expression: &str) -> QueryResult<Predicate> {
    let (caps, value) = if let Some(caps) = compact_re().captures(expression) {
        let value = PredicateValue::Single(caps[3].to_string());
        (caps, Some(value))
    } else if let Some(caps) = no_value_re().captures(expression) {
        (caps, None)
    } else if let Some(caps) = single_value_re()
        .captures(expression)
        .filter(|c| !is_list(&c[3]))
    {
        let value = PredicateValue::Single(caps[3].to_string());
        (caps, Some(value))
    } else if let Some(caps) = multiple_value_re().captures(expression) {
        let values: Vec<String> = caps[3]
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        if values.is_empty() {
            return Err(QueryError::grammar("empty value list", expression));
        }
        (caps, Some(PredicateValue::Multiple(values)))
    } else {
        return Err(QueryError::grammar(
            "expected 'field operator value'",
            expression,
        ));
    };

    let operator = lookup_operator(&caps, expression)?;
    Predicate::simple(&caps[1], operator, value)
}

fn lookup_operator(caps: &Captures<'_>, expression: &str) -> QueryResult<PredicateOperator> {
    PredicateOperator::from_token(&caps[2]).ok_or_else(|| QueryError::UnknownOperator {
        operator: caps[2].to_string(),
        expression: expression.to_string(),
    })
}

fn is_list(token: &str) -> bool {
    token.starts_with('(') && token.ends_with(')')
}

fn bare_next_to_group(expression: &str) -> QueryError {
    QueryError::grammar(
        "a bare comparison cannot be combined with a parenthesised group",
        expression,
    )
}

fn unbalanced(expression: &str) -> QueryError {
    QueryError::grammar("unbalanced parentheses", expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(field: &str, op: PredicateOperator, value: &str) -> Predicate {
        Predicate::Simple {
            field: field.into(),
            operator: op,
            value: Some(PredicateValue::Single(value.into())),
        }
    }

    #[test]
    fn test_parse_single_value() {
        let p = parse_filter("[age >= 18]").unwrap();
        assert_eq!(p, simple("age", PredicateOperator::Ge, "18"));

        let p = parse_filter("  [ name like %son ]  ").unwrap();
        assert_eq!(p, simple("name", PredicateOperator::Like, "%son"));
    }

    #[test]
    fn test_parse_compact_symbolic() {
        assert_eq!(parse_filter("[a=1]").unwrap(), simple("a", PredicateOperator::Eq, "1"));
        assert_eq!(parse_filter("[b>=2]").unwrap(), simple("b", PredicateOperator::Ge, "2"));
        assert_eq!(
            parse_filter("[a!=x and b<3]").unwrap().to_string(),
            "a != x and b < 3"
        );
    }

    #[test]
    fn test_parse_compact_one_sided_spacing() {
        assert_eq!(parse_filter("[a =1]").unwrap(), simple("a", PredicateOperator::Eq, "1"));
        assert_eq!(parse_filter("[a= 1]").unwrap(), simple("a", PredicateOperator::Eq, "1"));
        assert_eq!(parse_filter("[a <=-1]").unwrap(), simple("a", PredicateOperator::Le, "-1"));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            format!("[{}a = 1{}]", "(".repeat(depth), ")".repeat(depth))
        };
        assert_eq!(
            parse_filter(&nested(MAX_NESTING)).unwrap(),
            simple("a", PredicateOperator::Eq, "1")
        );

        let err = parse_filter(&nested(MAX_NESTING + 1)).unwrap_err();
        assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR");
        assert!(err.to_string().contains("nesting too deep"));

        let err = parse_filter(&nested(1000)).unwrap_err();
        assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR");
    }

    #[test]
    fn test_parse_no_value() {
        let p = parse_filter("[deleted_at is_null]").unwrap();
        assert_eq!(
            p,
            Predicate::Simple {
                field: "deleted_at".into(),
                operator: PredicateOperator::IsNull,
                value: None,
            }
        );
    }

    #[test]
    fn test_parse_multiple_values() {
        let p = parse_filter("[role in (admin,member)]").unwrap();
        assert_eq!(
            p,
            Predicate::Simple {
                field: "role".into(),
                operator: PredicateOperator::In,
                value: Some(PredicateValue::Multiple(vec!["admin".into(), "member".into()])),
            }
        );

        let p = parse_filter("[status not_in ( a , b ,c )]").unwrap();
        assert_eq!(
            p,
            Predicate::Simple {
                field: "status".into(),
                operator: PredicateOperator::NotIn,
                value: Some(PredicateValue::Multiple(vec!["a".into(), "b".into(), "c".into()])),
            }
        );
    }

    #[test]
    fn test_parse_flat_junction() {
        let p = parse_filter("[a = 1 AND b = 2 and c in (x,y)]").unwrap();
        match p {
            Predicate::Junction {
                is_conjunction,
                children,
            } => {
                assert!(is_conjunction);
                assert_eq!(children.len(), 3);
                assert_eq!(children[1], simple("b", PredicateOperator::Eq, "2"));
            }
            _ => panic!("expected junction"),
        }

        let p = parse_filter("[a = 1 or b = 2]").unwrap();
        assert!(matches!(
            p,
            Predicate::Junction {
                is_conjunction: false,
                ..
            }
        ));
    }

    #[test]
    fn test_field_names_containing_connector_words() {
        let p = parse_filter("[brand = android]").unwrap();
        assert_eq!(p, simple("brand", PredicateOperator::Eq, "android"));
    }

    #[test]
    fn test_mixed_connectors_rejected() {
        let err = parse_filter("[a = 1 and b = 2 or c = 3]").unwrap_err();
        assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR");
    }

    #[test]
    fn test_parse_nested() {
        let p = parse_filter("[(a = 1 and b = 2) or (c = 3)]").unwrap();
        assert_eq!(
            p,
            Predicate::Junction {
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
            }
        );
    }

    #[test]
    fn test_parse_three_groups() {
        let p = parse_filter("[(a = 1) and (b = 2 or c = 3) and (d in (x,y))]").unwrap();
        match p {
            Predicate::Junction {
                is_conjunction,
                children,
            } => {
                assert!(is_conjunction);
                assert_eq!(children.len(), 3);
                assert!(matches!(
                    children[1],
                    Predicate::Junction {
                        is_conjunction: false,
                        ..
                    }
                ));
            }
            _ => panic!("expected junction"),
        }
    }

    #[test]
    fn test_single_group_unwrapped() {
        let p = parse_filter("[(a = 1)]").unwrap();
        assert_eq!(p, simple("a", PredicateOperator::Eq, "1"));
    }

    #[test]
    fn test_nested_errors() {
        // bare comparison next to a group
        let err = parse_filter("[(a = 1) and b = 2]").unwrap_err();
        assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR");
        let err = parse_filter("[a = 1 or (b = 2)]").unwrap_err();
        assert_eq!(err.code(), "DYNQ_FILTER_GRAMMAR");

        // mixed connectors between groups
        let err = parse_filter("[(a = 1) and (b = 2) or (c = 3)]").unwrap_err();
        assert!(err.to_string().contains("mixed"));

        // unbalanced
        let err = parse_filter("[(a = 1 and (b = 2)]").unwrap_err();
        assert!(err.to_string().contains("unbalanced"));
    }

    #[test]
    fn test_delimiters_required() {
        assert_eq!(
            parse_filter("a = 1").unwrap_err(),
            QueryError::MalformedFilter("a = 1".into())
        );
        assert_eq!(parse_filter("[a = 1").unwrap_err().code(), "DYNQ_FILTER_MALFORMED");
        assert_eq!(parse_filter("]").unwrap_err().code(), "DYNQ_FILTER_MALFORMED");
        assert_eq!(parse_filter("[]").unwrap_err().code(), "DYNQ_FILTER_GRAMMAR");
    }

    #[test]
    fn test_unknown_operator() {
        let err = parse_filter("[name ~ bob]").unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownOperator {
                operator: "~".into(),
                expression: "name ~ bob".into(),
            }
        );
        let err = parse_filter("[a = 1 and b == 2]").unwrap_err();
        assert_eq!(err.code(), "DYNQ_FILTER_UNKNOWN_OPERATOR");
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(parse_filter("[a is_null 3]").is_err());
        assert!(parse_filter("[a in 3]").is_err());
        assert!(parse_filter("[a = (1,2)]").is_err());
        assert!(parse_filter("[a in ()]").is_err());
    }

    #[test]
    fn test_round_trip() {
        for text in [
            "[a = 1]",
            "[deleted_at is_not_null]",
            "[role in (admin,member)]",
            "[a = 1 and b != 2]",
            "[a like x% or b <= 2 or c > 3]",
            "[(a = 1 and b = 2) or (c = 3)]",
            "[(a = 1) and (b = 2 or c not_in (x,y))]",
        ] {
            let parsed = parse_filter(text).unwrap();
            assert_eq!(parsed.to_filter_string(), text);
            assert_eq!(parse_filter(&parsed.to_filter_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn test_round_trip_normalises_whitespace_and_case() {
        let parsed = parse_filter("[  a =  1   AND  b = 2 ]").unwrap();
        assert_eq!(parsed.to_filter_string(), "[a = 1 and b = 2]");
    }
}
