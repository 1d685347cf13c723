use std::path::Path;

use anyhow::{Context, Result};
use redakto_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const LOG_FILE_PREFIX: &str = "redakto";
const LOG_FILES_KEPT: usize = 30;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// `RUST_LOG` wins over the configured level; `REDAKTO_LOG_JSON=1` forces JSON lines.
///
/// The returned guard flushes the file writer and must live until exit.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let json = config.json || json_from_env();

    // stdout is reserved for command output
    let mut layers: Vec<BoxedLayer> = vec![if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    }];

    let mut guard = None;
    if let Some(dir) = &config.dir {
        let (writer, file_guard) = tracing_appender::non_blocking(daily_appender(dir)?);
        let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
        layers.push(if json {
            file_layer.json().boxed()
        } else {
            file_layer.boxed()
        });
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install the log subscriber")?;
    Ok(guard)
}

/// `redakto.<date>.log` in `dir`, rotated at midnight.
fn daily_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(LOG_FILES_KEPT)
        .build(dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))
}

fn json_from_env() -> bool {
    std::env::var("REDAKTO_LOG_JSON")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
