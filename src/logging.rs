use chrono::Local;
use log::LevelFilter;
use simplelog::{self, CombinedLogger, WriteLogger};
use std::fs::OpenOptions;
use std::io::Write;

/// Sets up logging to a file
///
/// # Arguments
///
/// * `log_level` - The level of log messages to capture
/// * `log_file` - Optional path to log file. If None, creates a timestamped file
///
/// # Returns
///
/// The path to the created log file
pub fn setup_logging(log_level: LevelFilter, log_file: Option<&str>) -> std::io::Result<String> {
    let log_path = match log_file {
        Some(path) => path.to_string(),
        None => default_log_path(),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    writeln!(
        file,
        "====== NEWSLETTER CLIENT LOG - Started at {} ======",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;

    CombinedLogger::init(vec![WriteLogger::new(
        log_level,
        simplelog::Config::default(),
        file,
    )])
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    log::info!("Logging initialized to file: {}", log_path);
    log::debug!("Debug logging enabled");

    Ok(log_path)
}

pub fn default_log_path() -> String {
    format!("newsletter_client_{}.log", Local::now().format("%Y%m%d_%H"))
}

/// Shortens a secret for log output, keeping only its first few characters.
pub fn truncate_secret(secret: &str) -> String {
    if secret.chars().count() > 8 {
        format!("{}...", secret.chars().take(4).collect::<String>())
    } else {
        "<short-secret>".to_string()
    }
}
