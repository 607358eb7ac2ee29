//! Tracing subscriber setup.

use anyhow::Context as _;
use handset_config::{ConfigLoader, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. The returned guard flushes the
/// file writer and must live until exit.
pub(crate) fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(if config.json {
        fmt::layer().json().with_current_span(false).boxed()
    } else {
        fmt::layer().with_target(true).with_thread_names(true).boxed()
    });

    let mut guard = None;
    if let Some(dir) = &config.directory {
        let dir = ConfigLoader::expand_path(&dir.to_string_lossy());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir))?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("handset")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&dir)?;
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        layers.push(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed(),
        );
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(guard)
}
