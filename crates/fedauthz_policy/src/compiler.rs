//! Policy compiler.
//!
//! Validates a raw policy document and builds a [`Policy`]. A role whose
//! rule-spec is a mapping is compiled in two passes: category keys first,
//! then literal right keys, so that a literal right always overrides the
//! rule it inherited from its category.

use crate::error::PolicyError;
use crate::lang::Expression;
use crate::policy::{role_right_key, Policy, ANY_RIGHT};
use crate::rule::RoleRightConditions;
use fedauthz_core::{normalize_str, value_type_name};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

const KEY_FORMAT_VERSION: &str = "format_version";
const KEY_PERMISSIONS: &str = "permissions";
const FORMAT_VERSION: &str = "1.0";

/// Compiles policy documents against a fixed right-category table
#[derive(Debug, Clone, Default)]
pub struct PolicyCompiler {
    category_rights: HashMap<String, Vec<String>>,
}

impl PolicyCompiler {
    /// Create a compiler from a right -> category table
    #[must_use]
    pub fn new(right_categories: &HashMap<String, String>) -> Self {
        let mut category_rights: HashMap<String, Vec<String>> = HashMap::new();
        for (right, category) in right_categories {
            category_rights
                .entry(category.clone())
                .or_default()
                .push(right.clone());
        }
        Self { category_rights }
    }

    /// Rights that belong to `category`, if it is a known category
    #[must_use]
    pub fn category_rights(&self, category: &str) -> Option<&[String]> {
        self.category_rights.get(category).map(Vec::as_slice)
    }

    /// Compile a policy document
    ///
    /// # Errors
    ///
    /// Returns the first validation or expression error; no partial policy is
    /// ever produced
    pub fn compile(&self, config: &Value) -> Result<Policy, PolicyError> {
        let Value::Object(document) = config else {
            return Err(PolicyError::NotAMapping {
                found: value_type_name(config).to_string(),
            });
        };
        if document.is_empty() {
            return Err(PolicyError::Empty);
        }

        match document.get(KEY_FORMAT_VERSION) {
            Some(Value::String(version)) if version == FORMAT_VERSION => {}
            _ => return Err(PolicyError::InvalidFormatVersion),
        }

        let permissions = match document.get(KEY_PERMISSIONS) {
            None => return Err(PolicyError::MissingPermissions),
            Some(value) if is_blank(value) => return Err(PolicyError::MissingPermissions),
            Some(Value::Object(permissions)) => permissions,
            Some(other) => {
                return Err(PolicyError::InvalidPermissions {
                    found: value_type_name(other).to_string(),
                });
            }
        };

        let mut builder = PolicyBuilder::default();
        for (role_name, right_conf) in permissions {
            let role = normalize_str(role_name);
            builder.roles.push(role.clone());
            builder.role_rights.insert(role.clone(), IndexMap::new());

            match right_conf {
                Value::String(_) | Value::Array(_) => {
                    let conditions = Arc::new(RoleRightConditions::parse(right_conf)?);
                    builder.register(&role, ANY_RIGHT, &conditions);
                }
                Value::Object(rights) => self.compile_role_rights(&mut builder, &role, rights)?,
                other => {
                    return Err(PolicyError::InvalidRightConfig {
                        role,
                        found: value_type_name(other).to_string(),
                    });
                }
            }
        }

        Ok(builder.build(config.clone()))
    }

    fn compile_role_rights(
        &self,
        builder: &mut PolicyBuilder,
        role: &str,
        rights: &Map<String, Value>,
    ) -> Result<(), PolicyError> {
        // category pass: every right of the category shares one compiled rule
        for (key, expression) in rights {
            let category = normalize_str(key);
            let Some(members) = self.category_rights(&category) else {
                continue;
            };
            let conditions = Arc::new(RoleRightConditions::parse(expression)?);
            builder.register(role, &category, &conditions);
            for right in members {
                builder.register(role, right, &conditions);
            }
        }

        // literal pass: overrides whatever the category pass registered
        for (key, expression) in rights {
            let right = normalize_str(key);
            if self.category_rights.contains_key(&right) {
                continue;
            }
            let conditions = Arc::new(RoleRightConditions::parse(expression)?);
            builder.register(role, &right, &conditions);
        }

        Ok(())
    }
}

/// Null, false, zero, or an empty string/list/mapping
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[derive(Default)]
struct PolicyBuilder {
    role_right_map: HashMap<String, Arc<RoleRightConditions>>,
    roles: Vec<String>,
    rights: Vec<String>,
    role_rights: IndexMap<String, IndexMap<String, Expression>>,
}

impl PolicyBuilder {
    fn register(&mut self, role: &str, right: &str, conditions: &Arc<RoleRightConditions>) {
        self.role_rights
            .entry(role.to_string())
            .or_default()
            .insert(right.to_string(), conditions.expression().clone());
        self.role_right_map
            .insert(role_right_key(role, right), Arc::clone(conditions));
        if !self.rights.iter().any(|r| r == right) {
            self.rights.push(right.to_string());
        }
    }

    fn build(self, config: Value) -> Policy {
        Policy::new(
            config,
            self.role_right_map,
            self.roles,
            self.rights,
            self.role_rights,
        )
    }
}

/// Compile `config` against an optional right -> category table
///
/// # Errors
///
/// Returns error if the document or any expression in it is invalid
pub fn parse_policy_config(
    config: &Value,
    right_categories: Option<&HashMap<String, String>>,
) -> Result<Policy, PolicyError> {
    match right_categories {
        Some(categories) => PolicyCompiler::new(categories).compile(config),
        None => PolicyCompiler::default().compile(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{Condition, Target};
    use fedauthz_core::{AuthzContext, Person};
    use proptest::prelude::*;
    use serde_json::json;

    const SITE: &str = "site-a";

    fn categories() -> HashMap<String, String> {
        HashMap::from([
            ("upload_data".to_string(), "data_right_category".to_string()),
            ("download_data".to_string(), "data_right_category".to_string()),
            (
                "specific_right_in_category".to_string(),
                "data_right_category".to_string(),
            ),
            ("submit_job".to_string(), "job_category".to_string()),
        ])
    }

    fn ctx(right: &str, org: &str, role: &str) -> AuthzContext {
        AuthzContext::new(right, Person::new("alice", org, role), None)
    }

    #[test]
    fn test_compile_wildcard_role() {
        let config = json!({"format_version": "1.0", "permissions": {"Admin": "any"}});
        let policy = parse_policy_config(&config, None).unwrap();
        assert_eq!(policy.get_roles(), ["admin"]);
        assert_eq!(policy.get_rights(), ["*"]);
        assert_eq!(
            policy.conditions("admin", ANY_RIGHT).unwrap().allowed(),
            [Condition::AlwaysAllow]
        );
    }

    #[test]
    fn test_compile_list_role() {
        let config = json!({
            "format_version": "1.0",
            "permissions": {"lead": ["org:site", "not name:mallory"]}
        });
        let policy = parse_policy_config(&config, None).unwrap();
        let rule = policy.conditions("lead", ANY_RIGHT).unwrap();
        assert_eq!(rule.allowed(), [Condition::OrgMatch(Target::Site)]);
        assert_eq!(
            rule.blocked(),
            [Condition::NameMatch(Target::Literal("mallory".into()))]
        );
    }

    #[test]
    fn test_category_override() {
        let config = json!({
            "format_version": "1.0",
            "permissions": {
                "member": {
                    "specific_right_in_category": "none",
                    "data_right_category": "org:site"
                }
            }
        });
        let policy = parse_policy_config(&config, Some(&categories())).unwrap();

        assert!(!policy
            .evaluate(SITE, &ctx("specific_right_in_category", SITE, "member"))
            .is_permitted());
        assert!(policy
            .evaluate(SITE, &ctx("upload_data", SITE, "member"))
            .is_permitted());
        assert!(!policy
            .evaluate(SITE, &ctx("download_data", "site-b", "member"))
            .is_permitted());
        assert!(!policy
            .evaluate(SITE, &ctx("submit_job", SITE, "member"))
            .is_permitted());
    }

    #[test]
    fn test_category_registers_category_and_members() {
        let config = json!({
            "format_version": "1.0",
            "permissions": {"member": {"job_category": "any", "view": "org:site"}}
        });
        let policy = parse_policy_config(&config, Some(&categories())).unwrap();
        assert_eq!(policy.get_rights(), ["job_category", "submit_job", "view"]);

        let member_rights = &policy.role_rights()["member"];
        assert_eq!(member_rights["job_category"], Expression::Single("any".into()));
        assert_eq!(member_rights["submit_job"], Expression::Single("any".into()));
        assert_eq!(member_rights["view"], Expression::Single("org:site".into()));
    }

    #[test]
    fn test_category_members_share_rule() {
        let config = json!({
            "format_version": "1.0",
            "permissions": {"member": {"data_right_category": ["o:site", "not n:eve"]}}
        });
        let policy = parse_policy_config(&config, Some(&categories())).unwrap();
        let upload = policy.conditions("member", "upload_data").unwrap();
        let download = policy.conditions("member", "download_data").unwrap();
        assert!(std::ptr::eq(upload, download));
    }

    #[test]
    fn test_right_keys_are_normalized() {
        let config = json!({
            "format_version": "1.0",
            "permissions": {" Member ": {" VIEW ": "any"}}
        });
        let policy = parse_policy_config(&config, None).unwrap();
        assert!(policy.conditions("member", "view").is_some());
    }

    #[test]
    fn test_rejects_invalid_documents() {
        let cases = [
            (json!([]), "policy definition must be a dict but got list"),
            (json!({}), "policy definition is empty"),
            (
                json!({"permissions": {"a": "any"}}),
                "missing or invalid policy format_version: must be 1.0",
            ),
            (
                json!({"format_version": 1.0, "permissions": {"a": "any"}}),
                "missing or invalid policy format_version: must be 1.0",
            ),
            (json!({"format_version": "1.0"}), "missing permissions"),
            (
                json!({"format_version": "1.0", "permissions": {}}),
                "missing permissions",
            ),
            (
                json!({"format_version": "1.0", "permissions": []}),
                "missing permissions",
            ),
            (
                json!({"format_version": "1.0", "permissions": ["any"]}),
                "invalid permissions: expect a dict but got list",
            ),
            (
                json!({"format_version": "1.0", "permissions": {"a": 5}}),
                "bad right config for role 'a': expect a dict but got number",
            ),
            (
                json!({"format_version": "1.0", "permissions": {"a": {"view": []}}}),
                "bad condition expression - no conditions specified",
            ),
            (
                json!({"format_version": "1.0", "permissions": {"a": {"view": "q:x"}}}),
                "bad condition expression \"q:x\": invalid type \"q\"",
            ),
        ];
        for (config, expected) in cases {
            let err = parse_policy_config(&config, Some(&categories())).unwrap_err();
            assert_eq!(err.to_string(), expected, "config {config}");
        }
    }

    #[test]
    fn test_error_in_category_pass_aborts() {
        let config = json!({
            "format_version": "1.0",
            "permissions": {"member": {"view": "any", "job_category": "bogus"}}
        });
        let err = parse_policy_config(&config, Some(&categories())).unwrap_err();
        assert_eq!(
            err,
            PolicyError::BadExpression {
                expression: "bogus".into()
            }
        );
    }

    #[test]
    fn test_duplicate_role_last_in_document_wins() {
        let config: Value = serde_json::from_str(
            r#"{"format_version": "1.0", "permissions": {"admin": "any", "Admin": "none"}}"#,
        )
        .unwrap();
        let policy = parse_policy_config(&config, None).unwrap();
        assert_eq!(policy.get_roles(), ["admin"]);
        assert!(!policy
            .evaluate(SITE, &ctx("submit_job", SITE, "admin"))
            .is_permitted());
    }

    #[test]
    fn test_duplicate_right_last_in_document_wins() {
        let config: Value = serde_json::from_str(
            r#"{"format_version": "1.0", "permissions": {"member": {"view": "any", "VIEW": "none"}}}"#,
        )
        .unwrap();
        let policy = parse_policy_config(&config, None).unwrap();
        assert_eq!(
            policy.role_rights()["member"]["view"],
            Expression::Single("none".into())
        );
        assert!(!policy
            .evaluate(SITE, &ctx("view", SITE, "member"))
            .is_permitted());
    }

    #[test]
    fn test_role_rights_keep_document_order() {
        let config: Value = serde_json::from_str(
            r#"{"format_version": "1.0", "permissions": {
                "zeta": {"write": "any", "read": "any"},
                "alpha": "any"
            }}"#,
        )
        .unwrap();
        let policy = parse_policy_config(&config, None).unwrap();
        let roles: Vec<&str> = policy.role_rights().keys().map(String::as_str).collect();
        assert_eq!(roles, ["zeta", "alpha"]);
        let rights: Vec<&str> = policy.role_rights()["zeta"]
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(rights, ["write", "read"]);
    }

    #[test]
    fn test_config_is_retained() {
        let config = json!({"format_version": "1.0", "permissions": {"admin": "any"}});
        let policy = parse_policy_config(&config, None).unwrap();
        assert_eq!(policy.config(), &config);
    }

    proptest! {
        #[test]
        fn prop_roles_sorted_and_deduplicated(
            names in proptest::collection::vec("[a-zA-Z]{1,6}", 1..12)
        ) {
            let mut permissions = serde_json::Map::new();
            for name in &names {
                permissions.insert(name.clone(), json!("any"));
            }
            let config = json!({"format_version": "1.0", "permissions": permissions});
            let policy = parse_policy_config(&config, None).unwrap();

            let roles = policy.get_roles();
            prop_assert!(roles.windows(2).all(|w| w[0] < w[1]));
            for name in &names {
                prop_assert!(roles.contains(&normalize_str(name)));
            }
        }
    }
}
