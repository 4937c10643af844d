//! User interface module - output rendering for the binary.
//!
//! - `formatter` - Pure formatting functions
//! - This module - Output selection (text, JSON, single variable)

use anyhow::{Context, Result};

use crate::config::EffectiveConfiguration;
use crate::output::VersionVariables;

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, format_explanation, format_variables,
};

/// How the version variables are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render the variables in the requested format.
pub fn render_variables(variables: &VersionVariables, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_variables(variables)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(variables).context("Failed to serialize version variables")
        }
    }
}

/// Value of a single variable; unknown names are an error listing the valid ones.
pub fn render_variable(variables: &VersionVariables, name: &str) -> Result<String> {
    variables.get(name).with_context(|| {
        let known: Vec<&str> = variables.pairs().iter().map(|(key, _)| *key).collect();
        format!(
            "Unknown variable '{}'. Available variables: {}",
            name,
            known.join(", ")
        )
    })
}

/// Effective configuration of the current branch as TOML.
pub fn render_configuration(configuration: &EffectiveConfiguration) -> Result<String> {
    toml::to_string_pretty(configuration).context("Failed to serialize the effective configuration")
}
