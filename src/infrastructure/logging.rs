use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber: stdout plus a daily-rolling log file
/// under `logs/`, both filtered by `RUST_LOG` (default `info`).
pub fn init_logging(service_name: &str) -> Result<()> {
    let file_name = format!("{}.log", service_name);
    let file_appender = tracing_appender::rolling::daily("logs", file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard must outlive the subscriber; leak it since the subscriber is
    // global for the process lifetime anyway.
    std::mem::forget(guard);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(())
}
