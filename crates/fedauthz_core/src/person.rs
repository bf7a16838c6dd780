//! Identity of a requesting user or of a submitter.

use crate::error::{CoreError, CoreResult};
use crate::text::{normalize_str, value_type_name};
use serde::Serialize;
use serde_json::Value;

/// A normalized `name`/`org`/`roles` triple.
///
/// All fields are normalized at construction and `roles` always holds at
/// least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Person {
    name: String,
    org: String,
    roles: Vec<String>,
}

impl Person {
    /// Create a person holding a single role
    #[must_use]
    pub fn new(name: &str, org: &str, role: &str) -> Self {
        Self {
            name: normalize_str(name),
            org: normalize_str(org),
            roles: vec![normalize_str(role)],
        }
    }

    /// Create a person holding several roles, in priority order
    ///
    /// # Errors
    ///
    /// Returns error if `roles` is empty
    pub fn with_roles<I, S>(name: &str, org: &str, roles: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles: Vec<String> = roles
            .into_iter()
            .map(|r| normalize_str(r.as_ref()))
            .collect();
        if roles.is_empty() {
            return Err(CoreError::InvalidRoles {
                reason: "roles not specified - it must be a list of strings".to_string(),
            });
        }
        Ok(Self {
            name: normalize_str(name),
            org: normalize_str(org),
            roles,
        })
    }

    /// Create a person from a dynamically typed role value: either a string
    /// or a non-empty list of strings.
    ///
    /// # Errors
    ///
    /// Returns error for any other shape
    pub fn from_role_value(name: &str, org: &str, role: &Value) -> CoreResult<Self> {
        match role {
            Value::String(r) => Ok(Self::new(name, org, r)),
            Value::Array(items) => {
                let mut roles = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(r) => roles.push(r.as_str()),
                        other => {
                            return Err(CoreError::InvalidRoles {
                                reason: format!(
                                    "role value must be a str but got {}",
                                    value_type_name(other)
                                ),
                            });
                        }
                    }
                }
                Self::with_roles(name, org, roles)
            }
            other => Err(CoreError::InvalidRoles {
                reason: format!(
                    "role must be a str or list of str but got {}",
                    value_type_name(other)
                ),
            }),
        }
    }

    /// The anonymous identity: empty name, org and role
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new("", "", "")
    }

    /// Normalized user name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized organization
    #[must_use]
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Normalized roles, never empty
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Whether this person holds `role` (compared after normalization)
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        let role = normalize_str(role);
        self.roles.iter().any(|r| *r == role)
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.org, self.roles[0])
    }
}
