//! Command implementations, kept apart from argument parsing.

use color_eyre::eyre::{Result, WrapErr};
use fedauthz_core::{AuthzContext, Person};
use fedauthz_policy::{parse_policy_config, Authorizer, Decision, Policy, PolicyError};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Request assembled from `check` flags
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub site_org: String,
    pub right: String,
    pub user_name: String,
    pub user_org: String,
    pub roles: Vec<String>,
    pub submitter_name: Option<String>,
    pub submitter_org: Option<String>,
}

/// Read the policy document and the optional category table
pub fn load_inputs(
    policy: &Path,
    categories: Option<&Path>,
) -> Result<(Value, HashMap<String, String>)> {
    let document = read_json(policy)?;
    let categories = match categories {
        Some(path) => serde_json::from_value(read_json(path)?)
            .wrap_err_with(|| format!("{} is not a right -> category object", path.display()))?,
        None => HashMap::new(),
    };
    tracing::debug!(
        policy = %policy.display(),
        categories = categories.len(),
        "Loaded preview inputs"
    );
    Ok((document, categories))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

/// Compile a document against a category table
pub fn compile(
    document: &Value,
    categories: &HashMap<String, String>,
) -> Result<Policy, PolicyError> {
    parse_policy_config(document, Some(categories))
}

/// Human-readable dump of a compiled policy
pub fn render_policy(policy: &Policy) -> String {
    let mut out = format!(
        "roles: {}\nrights: {}\n",
        policy.get_roles().join(", "),
        policy.get_rights().join(", ")
    );

    let rows: Vec<(&str, &str, String)> = policy
        .role_rights()
        .iter()
        .flat_map(|(role, rights)| {
            rights
                .iter()
                .map(move |(right, expr)| (role.as_str(), right.as_str(), expr.to_string()))
        })
        .collect();
    let role_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(4);
    let right_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(5);

    out.push_str(&format!(
        "{:<role_width$}  {:<right_width$}  expression\n",
        "role", "right"
    ));
    for (role, right, expr) in rows {
        out.push_str(&format!(
            "{:<role_width$}  {:<right_width$}  {}\n",
            role, right, expr
        ));
    }
    out
}

/// Evaluate one request through a freshly loaded [`Authorizer`]
pub fn check(
    document: &Value,
    categories: HashMap<String, String>,
    request: &CheckRequest,
) -> Result<Decision> {
    let authorizer = Authorizer::new(&request.site_org, Some(categories));
    authorizer
        .load_policy(document)
        .wrap_err("policy document rejected")?;

    let user = Person::with_roles(&request.user_name, &request.user_org, &request.roles)?;
    let submitter = match (&request.submitter_name, &request.submitter_org) {
        (None, None) => None,
        (name, org) => Some(Person::new(
            name.as_deref().unwrap_or_default(),
            org.as_deref().unwrap_or_default(),
            "",
        )),
    };
    let ctx = AuthzContext::new(request.right.clone(), user, submitter);
    Ok(authorizer.authorize(&ctx))
}
