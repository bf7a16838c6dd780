//! Authorization request context.

use crate::person::Person;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// The right being requested, who requests it, and on whose behalf.
///
/// Only `attrs` can change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthzContext {
    right: String,
    user: Person,
    submitter: Person,
    attrs: HashMap<String, Value>,
}

impl AuthzContext {
    /// Create a context. A missing submitter becomes [`Person::anonymous`].
    #[must_use]
    pub fn new(right: impl Into<String>, user: Person, submitter: Option<Person>) -> Self {
        Self {
            right: right.into(),
            user,
            submitter: submitter.unwrap_or_else(Person::anonymous),
            attrs: HashMap::new(),
        }
    }

    /// Set an extension attribute
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Right being requested
    #[must_use]
    pub fn right(&self) -> &str {
        &self.right
    }

    /// Acting user
    #[must_use]
    pub fn user(&self) -> &Person {
        &self.user
    }

    /// Originator of the object being acted upon
    #[must_use]
    pub fn submitter(&self) -> &Person {
        &self.submitter
    }

    /// Set an extension attribute, replacing any previous value
    pub fn set_attr(&mut self, key: impl Into<String>, value: Value) {
        self.attrs.insert(key.into(), value);
    }

    /// Get an extension attribute
    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Get an extension attribute, or `default` when unset
    #[must_use]
    pub fn get_attr_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.attrs.get(key).unwrap_or(default)
    }
}
