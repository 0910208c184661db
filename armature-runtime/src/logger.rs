use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Logger for services running under systemd.
///
/// Each line is prefixed with its syslog priority so the journal can assign
/// the right level. Timestamps are left to the journal.
pub struct SystemdLogger {
    level: LevelFilter,
}

impl SystemdLogger {
    /// Install the logger as the global logger.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(Self { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    fn priority(level: Level) -> &'static str {
        match level {
            Level::Error => "<3>",
            Level::Warn => "<4>",
            Level::Info => "<6>",
            Level::Debug => "<7>",
            Level::Trace => "<7>",
        }
    }
}

impl Log for SystemdLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let priority = Self::priority(record.level());

        if record.level() == Level::Error {
            eprintln!("{}{}", priority, record.args());
        } else {
            println!("{}{}", priority, record.args());
        }
    }

    fn flush(&self) {}
}
