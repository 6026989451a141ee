use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{config::LoggingConfig, infrastructure::directories::ResolvedPaths};

const SIGNAL_TARGETS: [&str; 3] = ["signals", "db", "scheduler"];

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// service's own targets and sqlx is kept at warn.
pub fn init_tracing(logging: &LoggingConfig, paths: &ResolvedPaths) -> Result<()> {
    if FILE_GUARD.get().is_some() {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(logging))?,
    };

    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::daily(&paths.logs_dir, &logging.log_file));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stdout).with_target(true))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_ansi(false),
        )
        .try_init()?;
    let _ = FILE_GUARD.set(guard);

    tracing::info!(
        logs = %paths.logs_dir.display(),
        file = %logging.log_file,
        "tracing initialized"
    );
    Ok(())
}

pub fn default_directives(logging: &LoggingConfig) -> String {
    let level = logging.level.trim().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(SIGNAL_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.push(format!("deal_junk_signal={level}"));
    directives.push("sqlx=warn".to_string());
    directives.join(",")
}
