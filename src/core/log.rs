use std::{env, sync::OnceLock};

/// These are each allowed to be dead code in case the code base happens to not have any at that
/// level at the moment.
#[derive(Debug, PartialEq, PartialOrd)]
pub enum LogLevel {
    #[allow(dead_code)]
    Error,
    #[allow(dead_code)]
    Warn,
    #[allow(dead_code)]
    Info,
    #[allow(dead_code)]
    Debug,
    #[allow(dead_code)]
    Trace,
}

impl LogLevel {
    /// The level is read once from the `CADENCE_LOG` environment variable and cached for the
    /// lifetime of the process.
    fn current() -> &'static LogLevel {
        static CURRENT_LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();
        CURRENT_LOG_LEVEL.get_or_init(|| match env::var("CADENCE_LOG") {
            Ok(level) => match level.to_lowercase().as_str() {
                "error" => LogLevel::Error,
                "warn" => LogLevel::Warn,
                "info" => LogLevel::Info,
                "debug" => LogLevel::Debug,
                "trace" => LogLevel::Trace,
                _ => LogLevel::Info,
            },
            Err(_) => LogLevel::Info,
        })
    }
}

/// Accept a closure to avoid calling the construction of the formatted strings until necessary
/// (i.e. we know that our logging level asks for it).
pub fn log<F: FnOnce() -> String>(level: LogLevel, message_fn: F) {
    if &level <= LogLevel::current() {
        let message = message_fn();
        println!("[{:?}] {}", level, message);
    }
}
