//! fedauthz CLI
//!
//! Authorization preview: validate a site's policy document and dry-run
//! requests against it before deploying it to a node.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fedauthz")]
#[command(about = "fedauthz - federated site authorization preview", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Policy inputs shared by every command
#[derive(Args)]
struct PolicyArgs {
    /// Path to the policy document (JSON)
    #[arg(short, long)]
    policy: PathBuf,
    /// Path to the right -> category table (JSON object)
    #[arg(short, long)]
    categories: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a policy document and report the first error
    Validate {
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Print roles, rights and the role/right expression table
    Show {
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Evaluate one request against a policy
    Check {
        #[command(flatten)]
        policy: PolicyArgs,
        /// Organization operating the evaluating node
        #[arg(long)]
        site_org: String,
        /// Right being requested
        #[arg(long)]
        right: String,
        /// Requesting user name
        #[arg(long)]
        user_name: String,
        /// Requesting user organization
        #[arg(long)]
        user_org: String,
        /// Requesting user roles, in priority order
        #[arg(long = "role", required = true)]
        roles: Vec<String>,
        /// Submitter name
        #[arg(long)]
        submitter_name: Option<String>,
        /// Submitter organization
        #[arg(long)]
        submitter_org: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fedauthz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { policy } => {
            let (document, categories) =
                commands::load_inputs(&policy.policy, policy.categories.as_deref())?;
            match commands::compile(&document, &categories) {
                Ok(_) => {
                    println!("policy is valid");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("policy is invalid: {}", err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Show { policy } => {
            let (document, categories) =
                commands::load_inputs(&policy.policy, policy.categories.as_deref())?;
            let compiled = commands::compile(&document, &categories)?;
            print!("{}", commands::render_policy(&compiled));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            policy,
            site_org,
            right,
            user_name,
            user_org,
            roles,
            submitter_name,
            submitter_org,
        } => {
            let (document, categories) =
                commands::load_inputs(&policy.policy, policy.categories.as_deref())?;
            let request = commands::CheckRequest {
                site_org,
                right,
                user_name,
                user_org,
                roles,
                submitter_name,
                submitter_org,
            };
            let decision = commands::check(&document, categories, &request)?;
            if decision.is_permitted() {
                println!("permitted");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("denied: {}", decision.reason());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
