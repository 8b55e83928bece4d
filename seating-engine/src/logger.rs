//! Logging Infrastructure
//!
//! Structured logging bootstrap for hosts embedding the engine:
//! - Console output, pretty for development or JSON for production
//! - Optional daily rotating application logs (deleted after 14 days)
//! - Optional daily rotating plan-history logs under the `history` target (kept)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

use crate::core::EngineConfig;

/// Days an application log file is kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Delete application log files older than the retention window
///
/// History logs are never touched.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // app.YYYY-MM-DD (tracing-appender daily naming)
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Create the `app/` and `history/` subdirectories under `dir`
fn prepare_log_dirs(dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    let app_log_dir = dir.join("app");
    let history_log_dir = dir.join("history");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&history_log_dir)?;
    Ok((app_log_dir, history_log_dir))
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug"); `RUST_LOG` takes precedence
/// * `json_format` - JSON console output instead of the pretty format
/// * `log_dir` - Optional directory for rotating file logs
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// seating_engine::logger::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + files)
/// seating_engine::logger::init_logger_with_file("info", true, Some("./logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let Some(dir) = log_dir else {
        subscriber.try_init()?;
        return Ok(());
    };

    let log_dir = Path::new(dir);
    let (app_log_dir, history_log_dir) = prepare_log_dirs(log_dir)?;
    cleanup_old_logs(log_dir)?;

    // Everything except plan history
    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() != "history"
        }));

    // Plan history only
    let history_log = RollingFileAppender::new(Rotation::DAILY, history_log_dir, "history");
    let history_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(history_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == "history"
        }));

    subscriber.with(app_layer).with(history_layer).try_init()?;
    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize logging from the engine configuration
pub fn init_from_config(config: &EngineConfig, log_dir: Option<&str>) -> anyhow::Result<()> {
    init_logger_with_file(&config.log_level, config.log_json, log_dir)
}

/// Plan history log helper
///
/// Records committed plan mutations, undo and redo under the `history`
/// target so hosts can route them to a separate sink.
///
/// # Examples
/// ```no_run
/// seating_engine::history_log!("commit", "banquet", "move 3 tables");
/// seating_engine::history_log!("undo", "banquet");
/// ```
#[macro_export]
macro_rules! history_log {
    ($action:expr, $area:expr) => {
        tracing::info!(
            target: "history",
            action = $action,
            area = %$area,
            timestamp = chrono::Local::now().to_rfc3339(),
            "HISTORY"
        );
    };
    ($action:expr, $area:expr, $label:expr) => {
        tracing::info!(
            target: "history",
            action = $action,
            area = %$area,
            label = %$label,
            timestamp = chrono::Local::now().to_rfc3339(),
            "HISTORY"
        );
    };
}
