//! Pure formatting functions for UI output.
//!
//! The `format_*` functions build strings and have no side effects; the
//! `display_*` functions print them.

use console::style;

use crate::analyzer::VersionResult;
use crate::boundary::BoundaryWarning;
use crate::domain::{short_sha, VersionFormat};
use crate::output::VersionVariables;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One `Name: value` line per variable, names padded to a common width.
pub fn format_variables(variables: &VersionVariables) -> String {
    let pairs = variables.pairs();
    let width = pairs.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(name, value)| format!("{:width$} {}", format!("{}:", name), value, width = width + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Candidate list with the winner marked, followed by the final version.
pub fn format_explanation(result: &VersionResult) -> String {
    let mut lines = vec![style("Base version candidates:").bold().to_string()];

    for (index, candidate) in result.candidates.iter().enumerate() {
        let marker = if index == result.selected {
            style("→").green().to_string()
        } else {
            " ".to_string()
        };
        lines.push(format!("  {} {}", marker, candidate));
    }

    let source = result
        .base_version
        .base_version_source
        .map(|oid| short_sha(&oid.to_string()))
        .unwrap_or_else(|| "none".to_string());
    lines.push(format!(
        "\n{} {} (source commit {})",
        style("Selected:").bold(),
        result.base_version.semantic_version,
        source
    ));
    lines.push(format!(
        "{} {}",
        style("Branch types:").bold(),
        if result.configuration.branch_types.is_empty() {
            "(none)".to_string()
        } else {
            result.configuration.branch_types.join(", ")
        }
    ));
    lines.push(format!(
        "{} {}",
        style("Version:").bold(),
        style(result.version.format(VersionFormat::FullSemVer)).green()
    ));

    lines.join("\n")
}
