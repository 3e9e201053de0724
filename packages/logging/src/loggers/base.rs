use crate::{ImmutableLogger, LogFormatter, LogInfo, Logger, Loglevel};
use std::sync::Mutex;
use termcolor::WriteColor;

pub struct BaseLogger {
    pub level: Loglevel,
    pub writer: Box<dyn WriteColor + Send>,
    pub formatter: Box<dyn LogFormatter + Send>,
}

impl Logger for BaseLogger {
    fn log(&mut self, log: LogInfo, level: Loglevel) {
        if level > self.level {
            return;
        }
        let formatted = self.formatter.format_log(&log, level);
        for str in formatted {
            if let Some(color) = str.color {
                let _ = self.writer.set_color(&color);
            }
            let _ = self.writer.write_all(str.string.as_bytes());
        }
        let _ = self.writer.reset();
    }

    fn log_level(&self) -> Loglevel {
        self.level
    }

    fn set_log_level(&mut self, level: Loglevel) {
        self.level = level;
    }
}

/// Shares a [BaseLogger] between tasks, which only need shared references
pub struct SharedLogger {
    inner: Mutex<BaseLogger>,
    level: Loglevel,
}

impl SharedLogger {
    pub fn new(inner: BaseLogger) -> Self {
        let level = inner.level;
        Self {
            inner: Mutex::new(inner),
            level,
        }
    }
}

impl ImmutableLogger for SharedLogger {
    fn log(&self, log: LogInfo, level: Loglevel) {
        let mut logger = self.inner.lock().expect("lock on shared logger poisoned");
        logger.log(log, level);
    }

    fn log_level(&self) -> Loglevel {
        self.level
    }
}

/// Discards everything. Used when the embedding application does not
/// configure a logger.
pub struct NullLogger;

impl ImmutableLogger for NullLogger {
    fn log(&self, _log: LogInfo, _level: Loglevel) {}

    fn log_level(&self) -> Loglevel {
        Loglevel::Error
    }
}
