use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "animeta_core=info,animeta_api=info,animeta_runtime=info";

/// Install the global subscriber: stderr, plus a daily-rolling file in
/// `log_dir` when given. `RUST_LOG` overrides the default filter.
///
/// Keep the returned guard alive for as long as file logging is wanted.
/// If the host already installed a subscriber, that one stays in place.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "animeta.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
    {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_dir_creates_log_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let guard = init(Some(dir.path()));
        assert!(guard.is_some());

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n.starts_with("animeta.log")), "{names:?}");
    }

    #[test]
    fn test_init_without_dir_has_no_guard() {
        assert!(init(None).is_none());
    }
}
