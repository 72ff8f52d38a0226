use log::{error, info, LevelFilter};
use std::path::Path;

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Initialize the logger with timestamp, log level, and module path.
/// Logs are written to file only so console output stays clean.
pub fn init_logger(log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Create log directory if it doesn't exist
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("archive.log");
    let archived_logs_pattern = format!("{}/archive.{{}}.log", log_dir.display());

    // Set up the rotating file appender - rotate at 10MB
    let file_trigger = SizeTrigger::new(10 * 1024 * 1024);

    // Keep 5 archived log files
    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern, 5)
        .map_err(|e| format!("Failed to create log roller: {}", e))?;

    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))
        .map_err(|e| format!("Failed to create log appender: {}", e))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(Root::builder().appender("file").build(LevelFilter::Info))
        .map_err(|e| format!("Failed to build log config: {}", e))?;

    log4rs::init_config(config).map_err(|e| format!("Failed to initialize log4rs: {}", e))?;

    // Apply environment variable-based filter if provided
    let env_filter = std::env::var("PHOTO_ARCHIVE_LOG").unwrap_or_else(|_| "info".to_string());
    if let Ok(level) = env_filter.parse::<LevelFilter>() {
        log::set_max_level(level);
    }

    info!("photo archive started");
    info!("Logging to file: {}", log_file_path.display());
    Ok(())
}

/// Log a per-item failure with the offending path
pub fn log_item_error(path: &Path, error: &dyn std::error::Error) {
    error!(
        "Item failed - Path: {}, Error: {}",
        path.display(),
        error
    );
}

/// Log file system modification
pub fn log_fs_modification(operation: &str, path: &Path) {
    info!("FS CHANGE - Operation: {}, Path: {}", operation, path.display());
}

// -- Tests --
