use crate::config::Config;
use env_logger::{Builder, Target};
use std::io::Write;

/// Sends log records to stderr, filtered by the configured level.
pub fn init_logger(config: &Config) {
    let result = Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {} - {}",
                std::process::id(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(Target::Stderr)
        .parse_filters(&config.log_filter)
        .try_init();

    if let Err(e) = result {
        eprintln!("logger already initialised: {}", e);
    }
    log::debug!("log filter set to {}", config.log_filter);
}
