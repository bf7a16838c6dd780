//! Authorization decision value.

use serde::{Deserialize, Serialize};

/// Outcome of an authorization query. A denial is a normal outcome, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the request is permitted
    pub permitted: bool,
    /// Human-readable reason, empty when permitted or when none was produced
    pub reason: String,
}

impl Decision {
    /// A permit with no reason
    #[must_use]
    pub fn permit() -> Self {
        Self {
            permitted: true,
            reason: String::new(),
        }
    }

    /// A denial with the given reason
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            permitted: false,
            reason: reason.into(),
        }
    }

    /// Check if permitted
    #[must_use]
    pub fn is_permitted(&self) -> bool {
        self.permitted
    }

    /// Reason text
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<Decision> for (bool, String) {
    fn from(decision: Decision) -> Self {
        (decision.permitted, decision.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permit() {
        let d = Decision::permit();
        assert!(d.is_permitted());
        assert_eq!(d.reason(), "");
    }

    #[test]
    fn test_deny_into_tuple() {
        let (permitted, reason): (bool, String) = Decision::deny("nope").into();
        assert!(!permitted);
        assert_eq!(reason, "nope");
    }
}
