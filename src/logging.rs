use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Variable naming the log file base path.
pub const LOG_ENV: &str = "PHPUNIT_DRIVER_LOG";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Base path; the file written is `{path}.{timestamp}.{pid}`.
    pub path: PathBuf,
    /// `EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: String,
}

impl LogSettings {
    /// Read the base path from `var`. `None` when it is unset or empty.
    pub fn from_env_var(var: &str, filter: &str) -> Option<Self> {
        let path = std::env::var_os(var).filter(|p| !p.is_empty())?;
        Some(Self {
            path: PathBuf::from(path),
            filter: filter.to_string(),
        })
    }
}

/// Initialize file logging from `PHPUNIT_DRIVER_LOG`.
///
/// Off unless the variable names a file path. Editors usually own stdout and
/// stderr, so nothing is ever written there.
pub fn init_tracing() -> bool {
    match LogSettings::from_env_var(LOG_ENV, DEFAULT_FILTER) {
        Some(settings) => init_tracing_with(&settings),
        None => false,
    }
}

/// Install a file subscriber for an embedding application.
///
/// Returns `false` if the file cannot be created or a global subscriber is
/// already set.
pub fn init_tracing_with(settings: &LogSettings) -> bool {
    let unique_path = unique_log_path(&settings.path);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    let file = match std::fs::File::create(&unique_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Warning: Failed to create log file {}: {}", unique_path.display(), err);
            return false;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_ok()
}

/// `{base}.{timestamp}.{pid}`, so concurrent processes never share a file.
fn unique_log_path(base: &std::path::Path) -> PathBuf {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{}.{}", timestamp, std::process::id()));
    PathBuf::from(name)
}
