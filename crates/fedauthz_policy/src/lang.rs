//! Condition expression language.
//!
//! An expression is a single clause or a list of clauses (logical OR). Each
//! clause, after normalization, is:
//!
//! ```text
//! clause  := ["not" " "] term
//! term    := "all" | "any" | "none" | "no" | type ":" value
//! type    := "o" | "org" | "n" | "name"
//! ```
//!
//! A leading `not` files the clause in the block list of its rule.

use crate::error::PolicyError;
use crate::matcher::{Condition, Target};
use fedauthz_core::{normalize_str, value_type_name};
use serde::Serialize;
use serde_json::Value;

/// Source form of an expression, kept for introspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Expression {
    /// A single clause
    Single(String),
    /// Independent clauses, any of which may match
    List(Vec<String>),
}

impl Expression {
    /// Clauses as written, in order
    pub fn clauses(&self) -> impl Iterator<Item = &str> {
        let clauses: &[String] = match self {
            Self::Single(clause) => std::slice::from_ref(clause),
            Self::List(clauses) => clauses,
        };
        clauses.iter().map(String::as_str)
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(clause) => write!(f, "{}", clause),
            Self::List(clauses) => write!(f, "[{}]", clauses.join(", ")),
        }
    }
}

/// A parsed clause and the list it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Whether the clause was prefixed with `not`
    pub blocked: bool,
    /// Compiled condition
    pub condition: Condition,
}

/// Parse one clause.
///
/// # Errors
///
/// Returns error if the clause is not a keyword or a `type:value` pair with a
/// known type
pub fn parse_clause(source: &str) -> Result<Clause, PolicyError> {
    let normalized = normalize_str(source);
    let (blocked, term) = match normalized.split_once(' ') {
        Some(("not", rest)) if !rest.contains(' ') => (true, rest),
        _ => (false, normalized.as_str()),
    };

    let condition = match term {
        "all" | "any" => Condition::AlwaysAllow,
        "none" | "no" => Condition::AlwaysDeny,
        _ => {
            let (kind, value) = match term.split_once(':') {
                Some((kind, value)) if !value.contains(':') => {
                    (normalize_str(kind), normalize_str(value))
                }
                _ => {
                    return Err(PolicyError::BadExpression {
                        expression: source.to_string(),
                    });
                }
            };
            match kind.as_str() {
                "o" | "org" => Condition::OrgMatch(Target::parse(&value)),
                "n" | "name" => Condition::NameMatch(Target::parse(&value)),
                _ => {
                    return Err(PolicyError::InvalidConditionType {
                        expression: source.to_string(),
                        kind,
                    });
                }
            }
        }
    };

    Ok(Clause { blocked, condition })
}

/// Parse an expression value: a clause string or a non-empty list of clause
/// strings. Clauses are parsed in order and the first failure is returned.
///
/// # Errors
///
/// Returns error for an empty list, a non-string list element, any other
/// value type, or an invalid clause
pub fn parse_expression(value: &Value) -> Result<(Expression, Vec<Clause>), PolicyError> {
    match value {
        Value::String(source) => {
            let clause = parse_clause(source)?;
            Ok((Expression::Single(source.clone()), vec![clause]))
        }
        Value::Array(items) => {
            if items.is_empty() {
                return Err(PolicyError::EmptyExpression);
            }
            let mut sources = Vec::with_capacity(items.len());
            let mut clauses = Vec::with_capacity(items.len());
            for item in items {
                let Value::String(source) = item else {
                    return Err(PolicyError::NonStringClause {
                        found: value_type_name(item).to_string(),
                    });
                };
                clauses.push(parse_clause(source)?);
                sources.push(source.clone());
            }
            Ok((Expression::List(sources), clauses))
        }
        other => Err(PolicyError::InvalidExpressionType {
            found: value_type_name(other).to_string(),
        }),
    }
}
