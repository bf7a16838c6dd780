//! Policy compilation errors.
//!
//! The `Display` text of each variant is the descriptive message reported to
//! whoever supplied the policy document.

/// Policy document or condition expression rejected by the compiler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Document is not a mapping
    #[error("policy definition must be a dict but got {found}")]
    NotAMapping {
        /// Type of the supplied document
        found: String,
    },

    /// Document is an empty mapping
    #[error("policy definition is empty")]
    Empty,

    /// `format_version` is absent or not `"1.0"`
    #[error("missing or invalid policy format_version: must be 1.0")]
    InvalidFormatVersion,

    /// `permissions` is absent or empty
    #[error("missing permissions")]
    MissingPermissions,

    /// `permissions` is not a mapping
    #[error("invalid permissions: expect a dict but got {found}")]
    InvalidPermissions {
        /// Type of the supplied value
        found: String,
    },

    /// Rule-spec of a role is neither an expression nor a mapping
    #[error("bad right config for role '{role}': expect a dict but got {found}")]
    InvalidRightConfig {
        /// Normalized role name
        role: String,
        /// Type of the supplied value
        found: String,
    },

    /// Clause is not a keyword and not of the form `type:value`
    #[error("bad condition expression \"{expression}\"")]
    BadExpression {
        /// Clause as written
        expression: String,
    },

    /// Clause has a `type:value` shape with an unknown type
    #[error("bad condition expression \"{expression}\": invalid type \"{kind}\"")]
    InvalidConditionType {
        /// Clause as written
        expression: String,
        /// Normalized type prefix
        kind: String,
    },

    /// Expression list has no clauses
    #[error("bad condition expression - no conditions specified")]
    EmptyExpression,

    /// Expression list holds something other than a string
    #[error("bad condition expression - expect str but got {found}")]
    NonStringClause {
        /// Type of the offending element
        found: String,
    },

    /// Expression is neither a string nor a list
    #[error("bad condition expression type - expect str or list but got {found}")]
    InvalidExpressionType {
        /// Type of the supplied value
        found: String,
    },
}
