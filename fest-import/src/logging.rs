use std::fs;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging with console output plus a daily-rolling JSON file.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "fest-import.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("fest_import=info".parse().expect("valid directive"))
                .add_directive("fest_core=info".parse().expect("valid directive")),
        )
        .with(file_layer)
        .with(console_layer)
        .init();

    // Keep the appender guard alive for the process lifetime so buffered
    // log lines are flushed.
    std::mem::forget(guard);
}
