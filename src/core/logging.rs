use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::settings::LoggingSettings;
use crate::core::config::AppPaths;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the process-wide subscriber. Problems are reported on stderr and
/// never stop the service from starting.
pub fn init(paths: &AppPaths, settings: &LoggingSettings) {
    if let Err(err) = try_init(paths, settings) {
        eprintln!("ragpress: logging not installed: {}", err);
    }
}

fn try_init(paths: &AppPaths, settings: &LoggingSettings) -> Result<(), String> {
    let file_layer = match paths.ensure_log_dir() {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&paths.log_dir, &settings.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        Err(err) => {
            eprintln!(
                "ragpress: file logging disabled, cannot create {}: {}",
                paths.log_dir.display(),
                err
            );
            None
        }
    };
    let stdout_layer = settings.stdout.then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(env_filter(&settings.level))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| err.to_string())
}

/// `RUST_LOG` when set and valid, otherwise the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
