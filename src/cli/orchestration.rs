//! Main workflow orchestration logic
//!
//! Opens the repository, loads the configuration and runs the engine. Kept
//! apart from `main.rs` so the workflow can be driven without clap.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::analyzer::{evaluate, VersionResult};
use crate::config::load_config;
use crate::context::EvaluationOptions;
use crate::git::Git2Repository;

/// Arguments for the evaluation workflow
///
/// Mirrors the CLI Args in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluateArgs {
    /// Directory inside the repository to evaluate
    pub path: PathBuf,

    /// Path to a custom config file
    pub config_path: Option<PathBuf>,

    /// Evaluate this branch instead of HEAD
    pub branch: Option<String>,
}

/// Evaluate the repository containing `args.path`
///
/// 1. Discover the repository
/// 2. Load `--config`, `<repo>/gitsemver.toml` or the user config
/// 3. Run the version engine
pub fn run_evaluation(args: &EvaluateArgs) -> Result<VersionResult> {
    let repository = Git2Repository::open(&args.path)
        .with_context(|| format!("No git repository found at '{}'", args.path.display()))?;

    let config = load_config(args.config_path.as_deref(), repository.workdir())
        .context("Failed to load configuration")?;

    let options = EvaluationOptions {
        target_branch: args.branch.clone(),
    };
    evaluate(&repository, &config, &options).context("Failed to calculate the version")
}
