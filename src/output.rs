//! Output routing and diagnostics.
//!
//! Results (translations, definitions, listings) go to stdout so they can be
//! piped. Status lines, spinners and log records go to stderr. Quiet mode
//! hides status lines and lowers logging to errors; `NO_COLOR` or
//! `--no-color` disables styling.

use std::io;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "OXYGEN_LOG";

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub quiet: bool,
    pub no_color: bool,
    /// Number of `-v` flags.
    pub verbosity: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quiet: false,
            no_color: std::env::var_os("NO_COLOR").is_some(),
            verbosity: 0,
        }
    }
}

impl OutputConfig {
    /// Filter directive used when `OXYGEN_LOG` is unset.
    pub const fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Stores the configuration and installs the stderr log subscriber.
///
/// Later calls keep the first configuration.
pub fn init(config: OutputConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!config.no_color)
        .with_target(false)
        .try_init()
        .ok();

    if OUTPUT_CONFIG.set(config).is_err() {
        tracing::debug!("output already configured");
    }
}

pub fn config() -> &'static OutputConfig {
    OUTPUT_CONFIG.get_or_init(OutputConfig::default)
}

pub fn is_quiet() -> bool {
    config().quiet
}

pub fn is_no_color() -> bool {
    config().no_color
}

/// Print a status message to stderr (respects quiet mode).
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}
