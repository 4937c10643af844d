use std::path::PathBuf;

use clap::Parser;

use git_semver::cli::{run_evaluation, EvaluateArgs};
use git_semver::logging::init_tracing;
use git_semver::output::VersionVariables;
use git_semver::ui::{self, OutputFormat};

#[derive(clap::Parser)]
#[command(
    name = "git-semver",
    version,
    about = "Calculate the semantic version of a git repository from its history"
)]
struct Args {
    #[arg(default_value = ".", help = "Path inside the repository to evaluate")]
    path: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Calculate the version of this branch instead of HEAD")]
    branch: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    output: OutputFormat,

    #[arg(long, value_name = "NAME", help = "Print a single variable, e.g. FullSemVer")]
    show_variable: Option<String>,

    #[arg(long, help = "Print the effective configuration of the branch and exit")]
    show_config: bool,

    #[arg(long, help = "List every base version candidate and the selected one")]
    explain: bool,

    #[arg(short, long, help = "Verbose logging (overridden by RUST_LOG)")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let result = run_evaluation(&EvaluateArgs {
        path: args.path,
        config_path: args.config,
        branch: args.branch,
    })?;

    for warning in &result.warnings {
        ui::display_boundary_warning(warning);
    }

    if args.show_config {
        println!("{}", ui::render_configuration(&result.configuration)?);
        return Ok(());
    }

    if args.explain {
        eprintln!("{}\n", ui::format_explanation(&result));
    }

    let variables = VersionVariables::from_version(&result.version);
    let rendered = match &args.show_variable {
        Some(name) => ui::render_variable(&variables, name)?,
        None => ui::render_variables(&variables, args.output)?,
    };
    println!("{}", rendered);
    Ok(())
}
