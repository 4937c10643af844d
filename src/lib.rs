pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod git;
pub mod logging;
pub mod output;
pub mod strategies;
pub mod ui;

pub use analyzer::{evaluate, VersionResult};
pub use error::{GitSemverError, Result};
