use git_semver::cli::orchestration::{run_evaluation, EvaluateArgs};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_evaluate_args_default() {
    let args = EvaluateArgs::default();
    assert_eq!(args.path, PathBuf::new());
    assert_eq!(args.config_path, None);
    assert_eq!(args.branch, None);
}

#[test]
fn test_evaluate_args_structure() {
    let args = EvaluateArgs {
        path: PathBuf::from("/tmp/project"),
        config_path: Some(PathBuf::from("ci/gitsemver.toml")),
        branch: Some("release/2.0.0".to_string()),
    };

    assert_eq!(args.path, PathBuf::from("/tmp/project"));
    assert_eq!(args.config_path, Some(PathBuf::from("ci/gitsemver.toml")));
    assert_eq!(args.branch.as_deref(), Some("release/2.0.0"));
}

#[test]
fn test_run_evaluation_outside_repository() {
    let dir = TempDir::new().unwrap();
    let error = run_evaluation(&EvaluateArgs {
        path: dir.path().to_path_buf(),
        ..EvaluateArgs::default()
    })
    .unwrap_err();

    assert!(
        error.to_string().contains("No git repository found"),
        "got: {:#}",
        error
    );
}

#[test]
fn test_run_evaluation_with_missing_config() {
    let dir = TempDir::new().unwrap();
    git2::Repository::init(dir.path()).unwrap();

    let error = run_evaluation(&EvaluateArgs {
        path: dir.path().to_path_buf(),
        config_path: Some(dir.path().join("missing.toml")),
        branch: None,
    })
    .unwrap_err();

    assert!(
        error.to_string().contains("Failed to load configuration"),
        "got: {:#}",
        error
    );
}
