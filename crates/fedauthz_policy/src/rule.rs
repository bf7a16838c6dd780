//! Allow/block rule for one (role, right) pair.

use crate::error::PolicyError;
use crate::lang::{parse_expression, Expression};
use crate::matcher::Condition;
use fedauthz_core::AuthzContext;
use serde::Serialize;
use serde_json::Value;

/// Compiled conditions of one (role, right) pair.
///
/// Only [`RoleRightConditions::parse`] builds a value, so at least one of the
/// two lists is always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRightConditions {
    allowed: Vec<Condition>,
    blocked: Vec<Condition>,
    expression: Expression,
}

impl RoleRightConditions {
    /// Compile an expression value into allow and block lists
    ///
    /// # Errors
    ///
    /// Returns the first expression error encountered
    pub fn parse(value: &Value) -> Result<Self, PolicyError> {
        let (expression, clauses) = parse_expression(value)?;
        let mut allowed = Vec::new();
        let mut blocked = Vec::new();
        for clause in clauses {
            if clause.blocked {
                blocked.push(clause.condition);
            } else {
                allowed.push(clause.condition);
            }
        }
        Ok(Self {
            allowed,
            blocked,
            expression,
        })
    }

    /// Allow-list conditions
    #[must_use]
    pub fn allowed(&self) -> &[Condition] {
        &self.allowed
    }

    /// Block-list conditions
    #[must_use]
    pub fn blocked(&self) -> &[Condition] {
        &self.blocked
    }

    /// Expression this rule was compiled from
    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evaluate with block precedence:
    /// a matching block clause denies; otherwise a non-empty allow list
    /// must have a matching clause; otherwise permit.
    #[must_use]
    pub fn evaluate(&self, site_org: &str, ctx: &AuthzContext) -> bool {
        if any_matched(&self.blocked, site_org, ctx) {
            return false;
        }

        if !self.allowed.is_empty() {
            return any_matched(&self.allowed, site_org, ctx);
        }

        // block-only rule and nothing blocked
        true
    }
}

fn any_matched(conditions: &[Condition], site_org: &str, ctx: &AuthzContext) -> bool {
    conditions.iter().any(|c| c.evaluate(site_org, ctx))
}
