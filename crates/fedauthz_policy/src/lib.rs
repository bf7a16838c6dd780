//! fedauthz Policy System
//!
//! Role/right policy language, compiler and decision engine. A node compiles
//! its locally held policy document once, installs it in an [`Authorizer`],
//! and answers every authorization request through the
//! [`AuthorizationService`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authorizer;
pub mod compiler;
pub mod decision;
pub mod error;
pub mod lang;
pub mod matcher;
pub mod policy;
pub mod rule;
pub mod service;

pub use authorizer::{Authorizer, AuthorizerConfig, SUPER_ROLE};
pub use compiler::{parse_policy_config, PolicyCompiler};
pub use decision::Decision;
pub use error::PolicyError;
pub use lang::{parse_clause, parse_expression, Clause, Expression};
pub use matcher::{Condition, Target};
pub use policy::{Policy, ANY_RIGHT};
pub use rule::RoleRightConditions;
pub use service::AuthorizationService;
