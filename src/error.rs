use thiserror::Error;

/// Unified error type for git-semver operations
#[derive(Error, Debug)]
pub enum GitSemverError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Repository state error: {message}. {guidance}")]
    RepositoryState { message: String, guidance: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in git-semver
pub type Result<T> = std::result::Result<T, GitSemverError>;

impl GitSemverError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitSemverError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitSemverError::Version(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        GitSemverError::Branch(msg.into())
    }

    /// Create a repository-state error carrying guidance for the user
    pub fn repository_state(msg: impl Into<String>, guidance: impl Into<String>) -> Self {
        GitSemverError::RepositoryState {
            message: msg.into(),
            guidance: guidance.into(),
        }
    }

    /// Guidance used whenever history needed for the calculation is missing
    pub fn missing_history(msg: impl Into<String>) -> Self {
        Self::repository_state(
            msg,
            "Fetch the full history (e.g. `git fetch --unshallow --tags`) and try again",
        )
    }

    /// Configuration errors are reported before any strategy runs and never retried
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, GitSemverError::Config(_) | GitSemverError::Toml(_))
    }
}
