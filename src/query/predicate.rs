//! # Predicate AST
//!
//! Boolean filter expressions: a `Simple` comparison leaf or a `Junction`
//! combining children with a single connector.

use std::fmt;

use serde::Serialize;

use super::errors::{QueryError, QueryResult};

/// Shape of the value an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// No value (`is_null`)
    None,
    /// A single scalar
    Single,
    /// A parenthesised list of scalars
    Multiple,
}

impl ValueKind {
    /// Shape of `value`
    pub fn of(value: Option<&PredicateValue>) -> Self {
        value.map_or(ValueKind::None, PredicateValue::kind)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ValueKind::None => "no value",
            ValueKind::Single => "a single value",
            ValueKind::Multiple => "a '(v1,v2,...)' list",
        }
    }
}

/// Comparison operators of the filter DSL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateOperator {
    Eq,
    Neq,
    Like,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl PredicateOperator {
    /// Every operator, in declaration order
    pub const ALL: [PredicateOperator; 11] = [
        PredicateOperator::Eq,
        PredicateOperator::Neq,
        PredicateOperator::Like,
        PredicateOperator::Gt,
        PredicateOperator::Ge,
        PredicateOperator::Lt,
        PredicateOperator::Le,
        PredicateOperator::In,
        PredicateOperator::NotIn,
        PredicateOperator::IsNull,
        PredicateOperator::IsNotNull,
    ];

    /// Token used in filter text
    pub fn token(&self) -> &'static str {
        match self {
            PredicateOperator::Eq => "=",
            PredicateOperator::Neq => "!=",
            PredicateOperator::Like => "like",
            PredicateOperator::Gt => ">",
            PredicateOperator::Ge => ">=",
            PredicateOperator::Lt => "<",
            PredicateOperator::Le => "<=",
            PredicateOperator::In => "in",
            PredicateOperator::NotIn => "not_in",
            PredicateOperator::IsNull => "is_null",
            PredicateOperator::IsNotNull => "is_not_null",
        }
    }

    /// Token used in the compiled SQL expression
    pub fn sql_token(&self) -> &'static str {
        match self {
            PredicateOperator::Eq => "=",
            PredicateOperator::Neq => "!=",
            PredicateOperator::Like => "LIKE",
            PredicateOperator::Gt => ">",
            PredicateOperator::Ge => ">=",
            PredicateOperator::Lt => "<",
            PredicateOperator::Le => "<=",
            PredicateOperator::In => "IN",
            PredicateOperator::NotIn => "NOT IN",
            PredicateOperator::IsNull => "IS NULL",
            PredicateOperator::IsNotNull => "IS NOT NULL",
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            PredicateOperator::IsNull | PredicateOperator::IsNotNull => ValueKind::None,
            PredicateOperator::In | PredicateOperator::NotIn => ValueKind::Multiple,
            _ => ValueKind::Single,
        }
    }

    /// Looks up an operator by its exact filter token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.token() == token)
    }
}

impl fmt::Display for PredicateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Raw textual operand of a `Simple` predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PredicateValue {
    Single(String),
    Multiple(Vec<String>),
}

impl PredicateValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PredicateValue::Single(_) => ValueKind::Single,
            PredicateValue::Multiple(_) => ValueKind::Multiple,
        }
    }
}

/// A boolean filter expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// `field operator value?`
    Simple {
        field: String,
        operator: PredicateOperator,
        value: Option<PredicateValue>,
    },
    /// Children joined by `and` (`is_conjunction`) or `or`. Never empty.
    ///
    /// A one-child junction renders as its child; `Predicate::junction`
    /// collapses it on construction.
    Junction {
        is_conjunction: bool,
        children: Vec<Predicate>,
    },
}

impl Predicate {
    /// Creates a leaf comparison, checking the value shape against the operator
    pub fn simple(
        field: impl Into<String>,
        operator: PredicateOperator,
        value: Option<PredicateValue>,
    ) -> QueryResult<Self> {
        let field = field.into();
        if ValueKind::of(value.as_ref()) != operator.value_kind() {
            let expected = operator.value_kind().description();
            let rendered = Predicate::Simple {
                field,
                operator,
                value,
            };
            return Err(QueryError::grammar(
                format!("operator '{}' expects {}", operator, expected),
                rendered.to_string(),
            ));
        }
        Ok(Predicate::Simple {
            field,
            operator,
            value,
        })
    }

    /// Creates a junction from at least one child.
    ///
    /// A lone child is returned as is, since a one-child junction has no
    /// text form of its own.
    pub fn junction(is_conjunction: bool, mut children: Vec<Predicate>) -> QueryResult<Self> {
        match children.len() {
            0 => return Err(QueryError::grammar("junction has no children", "")),
            1 => return Ok(children.remove(0)),
            _ => {}
        }
        Ok(Predicate::Junction {
            is_conjunction,
            children,
        })
    }

    /// Combines with `other` under `is_conjunction`.
    ///
    /// A junction with the same connector grows in place; anything else is
    /// wrapped in a new two-child junction.
    pub fn add(self, is_conjunction: bool, other: Predicate) -> Self {
        match self {
            Predicate::Junction {
                is_conjunction: current,
                mut children,
            } if current == is_conjunction => {
                children.push(other);
                Predicate::Junction {
                    is_conjunction,
                    children,
                }
            }
            this => Predicate::Junction {
                is_conjunction,
                children: vec![this, other],
            },
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        self.add(true, other)
    }

    pub fn or(self, other: Predicate) -> Self {
        self.add(false, other)
    }

    /// Every field referenced in the tree, in order of appearance
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Simple { field, .. } => out.push(field),
            Predicate::Junction { children, .. } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }

    /// Canonical filter text, including the surrounding brackets
    pub fn to_filter_string(&self) -> String {
        format!("[{}]", self)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Simple {
                field,
                operator,
                value,
            } => {
                write!(f, "{} {}", field, operator)?;
                match value {
                    None => Ok(()),
                    Some(PredicateValue::Single(v)) => write!(f, " {}", v),
                    Some(PredicateValue::Multiple(vs)) => write!(f, " ({})", vs.join(",")),
                }
            }
            Predicate::Junction {
                is_conjunction,
                children,
            } => {
                let connector = if *is_conjunction { " and " } else { " or " };
                // A bare comparison may not sit next to a group, so one nested
                // junction forces every sibling into parentheses.
                let grouped = children
                    .iter()
                    .any(|c| matches!(c, Predicate::Junction { .. }));
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(connector)?;
                    }
                    if grouped {
                        write!(f, "({})", child)?;
                    } else {
                        write!(f, "{}", child)?;
                    }
                }
                Ok(())
            }
        }
    }
}
