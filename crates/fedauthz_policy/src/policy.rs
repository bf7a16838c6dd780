//! Compiled, immutable policy.

use crate::decision::Decision;
use crate::lang::Expression;
use crate::rule::RoleRightConditions;
use fedauthz_core::{normalize_str, AuthzContext};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Wildcard right: a rule registered under it applies to every right of the
/// role
pub const ANY_RIGHT: &str = "*";

/// Key of the (role, right) rule map
pub(crate) fn role_right_key(role: &str, right: &str) -> String {
    format!("{}:{}", role, right)
}

/// A fully parsed ruleset.
///
/// Built once by the compiler and never mutated; a reload produces a new
/// `Policy`.
#[derive(Debug)]
pub struct Policy {
    config: Value,
    role_right_map: HashMap<String, Arc<RoleRightConditions>>,
    roles: Vec<String>,
    rights: Vec<String>,
    role_rights: IndexMap<String, IndexMap<String, Expression>>,
}

impl Policy {
    pub(crate) fn new(
        config: Value,
        role_right_map: HashMap<String, Arc<RoleRightConditions>>,
        mut roles: Vec<String>,
        mut rights: Vec<String>,
        role_rights: IndexMap<String, IndexMap<String, Expression>>,
    ) -> Self {
        roles.sort();
        roles.dedup();
        rights.sort();
        rights.dedup();
        Self {
            config,
            role_right_map,
            roles,
            rights,
            role_rights,
        }
    }

    /// Sorted, deduplicated role names
    #[must_use]
    pub fn get_roles(&self) -> &[String] {
        &self.roles
    }

    /// Sorted, deduplicated right names, including category names and `*`
    #[must_use]
    pub fn get_rights(&self) -> &[String] {
        &self.rights
    }

    /// Role -> right -> source expression, in document order
    #[must_use]
    pub fn role_rights(&self) -> &IndexMap<String, IndexMap<String, Expression>> {
        &self.role_rights
    }

    /// Raw document this policy was compiled from
    #[must_use]
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Rule registered for exactly this (role, right) pair
    #[must_use]
    pub fn conditions(&self, role: &str, right: &str) -> Option<&RoleRightConditions> {
        self.role_right_map
            .get(&role_right_key(role, right))
            .map(Arc::as_ref)
    }

    fn eval_for_role(&self, role: &str, site_org: &str, ctx: &AuthzContext) -> bool {
        let conditions = self
            .conditions(role, ANY_RIGHT)
            .or_else(|| self.conditions(role, ctx.right()));
        match conditions {
            Some(conditions) => conditions.evaluate(site_org, ctx),
            None => false,
        }
    }

    /// Evaluate the user's roles in order; the first role that permits wins.
    /// Never produces a reason.
    #[must_use]
    pub fn evaluate(&self, site_org: &str, ctx: &AuthzContext) -> Decision {
        let site_org = normalize_str(site_org);
        let permitted = ctx
            .user()
            .roles()
            .iter()
            .any(|role| self.eval_for_role(role, &site_org, ctx));
        if permitted {
            Decision::permit()
        } else {
            Decision::deny("")
        }
    }
}
