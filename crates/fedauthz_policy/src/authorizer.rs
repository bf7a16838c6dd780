//! Site authorizer: owns the current policy of one site.

use crate::compiler::PolicyCompiler;
use crate::decision::Decision;
use crate::error::PolicyError;
use crate::policy::Policy;
use chrono::{DateTime, Utc};
use fedauthz_core::{normalize_str, AuthzContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Role that bypasses policy evaluation entirely
pub const SUPER_ROLE: &str = "super";

const POLICY_NOT_DEFINED: &str = "policy not defined";

/// Settings an embedding system supplies when creating an [`Authorizer`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerConfig {
    /// Organization operating this node
    pub site_org: String,
    /// Right -> category table
    #[serde(default)]
    pub right_categories: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct LoadedPolicy {
    policy: Arc<Policy>,
    loaded_at: DateTime<Utc>,
}

/// Holds one site's policy and answers authorization queries against it.
///
/// Reloads replace the policy wholesale; queries that already hold the old
/// policy finish against it.
#[derive(Debug)]
pub struct Authorizer {
    site_org: String,
    right_categories: HashMap<String, String>,
    compiler: PolicyCompiler,
    current: RwLock<Option<LoadedPolicy>>,
}

impl Authorizer {
    /// Create an authorizer with no policy loaded
    #[must_use]
    pub fn new(site_org: &str, right_categories: Option<HashMap<String, String>>) -> Self {
        let right_categories = right_categories.unwrap_or_default();
        Self {
            site_org: normalize_str(site_org),
            compiler: PolicyCompiler::new(&right_categories),
            right_categories,
            current: RwLock::new(None),
        }
    }

    /// Create an authorizer from embedding-system settings
    #[must_use]
    pub fn from_config(config: AuthorizerConfig) -> Self {
        Self::new(&config.site_org, Some(config.right_categories))
    }

    /// Normalized site organization
    #[must_use]
    pub fn site_org(&self) -> &str {
        &self.site_org
    }

    /// Right -> category table this authorizer compiles with
    #[must_use]
    pub fn right_categories(&self) -> &HashMap<String, String> {
        &self.right_categories
    }

    /// Currently installed policy
    #[must_use]
    pub fn policy(&self) -> Option<Arc<Policy>> {
        self.loaded().map(|loaded| loaded.policy)
    }

    /// When the installed policy was loaded
    #[must_use]
    pub fn last_load_time(&self) -> Option<DateTime<Utc>> {
        self.loaded().map(|loaded| loaded.loaded_at)
    }

    fn loaded(&self) -> Option<LoadedPolicy> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Compile `config` and install it. On error the previous policy stays
    /// installed.
    ///
    /// # Errors
    ///
    /// Returns error if the document is rejected by the compiler
    pub fn load_policy(&self, config: &Value) -> Result<(), PolicyError> {
        let policy = match self.compiler.compile(config) {
            Ok(policy) => policy,
            Err(err) => {
                tracing::warn!(
                    site = %self.site_org,
                    error = %err,
                    "Rejected authorization policy, keeping previous policy"
                );
                return Err(err);
            }
        };

        tracing::info!(
            site = %self.site_org,
            roles = policy.get_roles().len(),
            rights = policy.get_rights().len(),
            "Loaded authorization policy"
        );

        let loaded = LoadedPolicy {
            policy: Arc::new(policy),
            loaded_at: Utc::now(),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded);
        Ok(())
    }

    /// Evaluate `ctx` against the installed policy, without the super-role
    /// bypass and without synthesizing a denial reason
    #[must_use]
    pub fn evaluate(&self, ctx: &AuthzContext) -> Decision {
        match self.policy() {
            Some(policy) => policy.evaluate(&self.site_org, ctx),
            None => Decision::deny(POLICY_NOT_DEFINED),
        }
    }

    /// Authorize a request. No context means nothing was requested and is
    /// permitted; users holding [`SUPER_ROLE`] are always permitted.
    #[must_use]
    pub fn authorize<'a>(&self, ctx: impl Into<Option<&'a AuthzContext>>) -> Decision {
        let ctx: Option<&AuthzContext> = ctx.into();
        let Some(ctx) = ctx else {
            return Decision::permit();
        };

        if ctx.user().roles().iter().any(|role| role == SUPER_ROLE) {
            return Decision::permit();
        }

        let decision = self.evaluate(ctx);
        if decision.permitted || !decision.reason.is_empty() {
            return decision;
        }
        Decision::deny(format!(
            "user '{}' is not authorized for '{}'",
            ctx.user().name(),
            ctx.right()
        ))
    }
}
