use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::errors::ConfigError;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} [{M}] {m}{n}";
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Initializes the process-wide logger: a size-rolling file appender, plus an
/// optional stdout console appender, at the configured level.
///
/// # Arguments
///
/// * 'log_path' - directory the rolling log files are written under
/// * 'log_level' - minimum level to record
/// * 'log_to_stdout' - whether to also echo log records to stdout
pub fn setup_logger(log_path: &str, log_level: LevelFilter, log_to_stdout: bool) -> Result<(), ConfigError> {
    let encoder = Box::new(PatternEncoder::new(PATTERN));

    let roller = FixedWindowRoller::builder()
        .build(&format!("{log_path}/ev_fleet_optimizer.{{}}.log.gz"), 5)
        .map_err(|e| ConfigError(e.to_string()))?;
    let trigger = SizeTrigger::new(MAX_LOG_SIZE);
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    let file = RollingFileAppender::builder()
        .encoder(encoder.clone())
        .build(format!("{log_path}/ev_fleet_optimizer.log"), Box::new(policy))?;

    let mut builder = LogConfig::builder().appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if log_to_stdout {
        let stdout = ConsoleAppender::builder().encoder(encoder).build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let config = builder.build(root.build(log_level))?;
    log4rs::init_config(config)?;

    Ok(())
}
