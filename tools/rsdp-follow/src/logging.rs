//! Log setup for the step-by-step trace.
//!
//! Three levels controlled by CLI flags:
//! - **Quiet** (`-q`): warnings and errors only
//! - **Default** (no flag): one line per structure located, validated or written
//! - **Verbose** (`-v`): everything, including each seek and read
//!
//! `RUST_LOG` overrides the level chosen by the flags.

use env_logger::{Builder, Env};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Default,
    Verbose,
}

impl Verbosity {
    /// Pick the level from the `--quiet` and `--verbose` flags.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Default
        }
    }

    fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Default => "info",
            Self::Verbose => "debug",
        }
    }
}

/// Install the global logger. Log lines go to stderr so stdout carries only
/// the report.
pub fn init(verbosity: Verbosity) {
    Builder::from_env(Env::default().default_filter_or(verbosity.filter()))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
