//! Condition evaluators.
//!
//! A compiled clause is one of four closed shapes; every shape is a pure
//! function of the local site organization and the request context.

use fedauthz_core::AuthzContext;
use serde::Serialize;

const TARGET_SITE: &str = "site";
const TARGET_SUBMITTER: &str = "submitter";

/// What a match condition compares the requesting user against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The organization operating this node
    Site,
    /// The submitter recorded in the context
    Submitter,
    /// A literal organization or user name
    Literal(String),
}

impl Target {
    /// Classify a normalized target token
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            TARGET_SITE => Self::Site,
            TARGET_SUBMITTER => Self::Submitter,
            other => Self::Literal(other.to_string()),
        }
    }

    /// The token as it appears in an expression
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Site => TARGET_SITE,
            Self::Submitter => TARGET_SUBMITTER,
            Self::Literal(value) => value,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single compiled clause of a role-right rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// User's organization equals the target organization
    OrgMatch(Target),
    /// User's name equals the target name
    NameMatch(Target),
    /// Always matches
    AlwaysAllow,
    /// Never matches
    AlwaysDeny,
}

impl Condition {
    /// Test this clause against `ctx`. `site_org` must already be normalized.
    #[must_use]
    pub fn evaluate(&self, site_org: &str, ctx: &AuthzContext) -> bool {
        match self {
            Self::OrgMatch(Target::Site) => ctx.user().org() == site_org,
            Self::OrgMatch(Target::Submitter) => ctx.user().org() == ctx.submitter().org(),
            Self::OrgMatch(Target::Literal(org)) => ctx.user().org() == org.as_str(),
            Self::NameMatch(Target::Submitter) => ctx.user().name() == ctx.submitter().name(),
            // "site" has no special meaning for names
            Self::NameMatch(target) => ctx.user().name() == target.as_str(),
            Self::AlwaysAllow => true,
            Self::AlwaysDeny => false,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrgMatch(target) => write!(f, "org:{}", target),
            Self::NameMatch(target) => write!(f, "name:{}", target),
            Self::AlwaysAllow => write!(f, "any"),
            Self::AlwaysDeny => write!(f, "none"),
        }
    }
}
