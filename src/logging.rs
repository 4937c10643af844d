//! Tracing setup for the binary. The library only emits events.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter directive used when `RUST_LOG` is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "git_semver=debug"
    } else {
        "git_semver=info"
    }
}

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
/// Installing twice is not an error, the second call is ignored.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "git_semver=info");
        assert_eq!(default_directive(true), "git_semver=debug");
    }

    #[test]
    fn test_init_twice() {
        init_tracing(false);
        init_tracing(true);
    }
}
