//! Compiled boolean expressions over physical columns

use serde::Serialize;

use crate::mapping::{Column, EntityMapper};
use crate::query::{Predicate, PredicateOperator, PredicateValue, ValueKind};

use super::errors::{CompileError, CompileResult};
use super::value::{coerce, SqlValue};

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    None,
    Single(SqlValue),
    Multiple(Vec<SqlValue>),
}

/// A filter with every field resolved and every value typed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Comparison {
        column: Column,
        operator: PredicateOperator,
        operand: Operand,
    },
    Junction {
        is_conjunction: bool,
        children: Vec<Condition>,
    },
}

impl Condition {
    /// Translates a predicate tree against `mapper`.
    ///
    /// Stops at the first field or value that does not resolve, or at a
    /// hand-built leaf whose value does not fit its operator.
    pub fn compile(predicate: &Predicate, mapper: &EntityMapper) -> CompileResult<Self> {
        match predicate {
            Predicate::Simple {
                field,
                operator,
                value,
            } => {
                let expected = operator.value_kind();
                if ValueKind::of(value.as_ref()) != expected {
                    return Err(CompileError::ValueShape {
                        field: field.clone(),
                        operator: operator.token().to_string(),
                        expected: expected.description().to_string(),
                    });
                }
                let column = mapper.resolve_column(field)?;
                let operand = match value {
                    None => Operand::None,
                    Some(PredicateValue::Single(raw)) => {
                        Operand::Single(coerce(field, &column, *operator, raw)?)
                    }
                    Some(PredicateValue::Multiple(raws)) => Operand::Multiple(
                        raws.iter()
                            .map(|raw| coerce(field, &column, *operator, raw))
                            .collect::<CompileResult<Vec<_>>>()?,
                    ),
                };
                Ok(Condition::Comparison {
                    column,
                    operator: *operator,
                    operand,
                })
            }
            Predicate::Junction { children, .. } if children.is_empty() => {
                Err(CompileError::EmptyJunction)
            }
            Predicate::Junction {
                is_conjunction,
                children,
            } => Ok(Condition::Junction {
                is_conjunction: *is_conjunction,
                children: children
                    .iter()
                    .map(|child| Condition::compile(child, mapper))
                    .collect::<CompileResult<Vec<_>>>()?,
            }),
        }
    }

    /// Every column the condition reads
    pub fn columns(&self) -> Vec<&Column> {
        match self {
            Condition::Comparison { column, .. } => vec![column],
            Condition::Junction { children, .. } => {
                children.iter().flat_map(Condition::columns).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ColumnType;
    use crate::query::parse_filter;

    fn user() -> EntityMapper {
        EntityMapper::new("user", "users")
            .with_identity("id", "id", ColumnType::Integer)
            .with_column("role", "role", ColumnType::enumeration(["admin", "member"]))
            .with_column("joined", "joined_at", ColumnType::Date)
    }

    #[test]
    fn test_compile_in_list_coerces_each_value() {
        let predicate = parse_filter("[role in (admin,member)]").unwrap();
        let condition = Condition::compile(&predicate, &user()).unwrap();
        match condition {
            Condition::Comparison {
                column,
                operator,
                operand: Operand::Multiple(values),
            } => {
                assert_eq!(column.qualified_name(), "users.role");
                assert_eq!(operator, PredicateOperator::In);
                assert_eq!(
                    values,
                    vec![
                        SqlValue::Enum {
                            name: "admin".into(),
                            ordinal: 0
                        },
                        SqlValue::Enum {
                            name: "member".into(),
                            ordinal: 1
                        },
                    ]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_compile_junction() {
        let predicate = parse_filter("[(id > 3 and joined is_not_null) or (role = 0)]").unwrap();
        let condition = Condition::compile(&predicate, &user()).unwrap();
        let columns: Vec<String> = condition.columns().iter().map(|c| c.qualified_name()).collect();
        assert_eq!(columns, vec!["users.id", "users.joined_at", "users.role"]);
        assert!(matches!(
            condition,
            Condition::Junction {
                is_conjunction: false,
                ..
            }
        ));
    }

    #[test]
    fn test_compile_failures() {
        let predicate = parse_filter("[role in (admin,root)]").unwrap();
        let err = Condition::compile(&predicate, &user()).unwrap_err();
        assert!(matches!(err, CompileError::Coercion { ref value, .. } if value == "root"));

        let predicate = parse_filter("[name = bob]").unwrap();
        let err = Condition::compile(&predicate, &user()).unwrap_err();
        assert_eq!(err.code(), "DYNQ_FIELD_UNDEFINED");
    }

    #[test]
    fn test_value_shape_enforced_for_hand_built_leaves() {
        let cases = [
            (PredicateOperator::In, Some(PredicateValue::Single("admin".into())), "role"),
            (PredicateOperator::IsNull, Some(PredicateValue::Single("3".into())), "id"),
            (PredicateOperator::Eq, None, "id"),
            (
                PredicateOperator::Gt,
                Some(PredicateValue::Multiple(vec!["1".into(), "2".into()])),
                "id",
            ),
        ];
        for (operator, value, field) in cases {
            let leaf = Predicate::Simple {
                field: field.into(),
                operator,
                value,
            };
            let err = Condition::compile(&leaf, &user()).unwrap_err();
            assert_eq!(err.code(), "DYNQ_PREDICATE_SHAPE");
            assert!(
                matches!(err, CompileError::ValueShape { field: ref f, .. } if f == field),
                "wrong error for {}",
                operator
            );
        }
    }

    #[test]
    fn test_empty_junction_rejected() {
        let empty = Predicate::Junction {
            is_conjunction: true,
            children: Vec::new(),
        };
        assert_eq!(
            Condition::compile(&empty, &user()).unwrap_err(),
            CompileError::EmptyJunction
        );
    }
}
