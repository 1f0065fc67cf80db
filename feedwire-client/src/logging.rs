use log::LevelFilter;
use simplelog::*;
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Where the client logs, how much, and which categories get through
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub enabled: bool,
    pub log_file: PathBuf,
    /// Truncate `log_file` when the logger is installed
    pub clear_on_startup: bool,
    pub features: LogFeatures,
    pub level: LevelFilter,
}

/// Categories the interaction layer logs under, each with its own `log` target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Dispatch,
    Requests,
    Reconcile,
    Notifications,
    Timers,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFeatures {
    pub dispatch: bool,
    pub requests: bool,
    pub reconcile: bool,
    pub notifications: bool,
    /// Off by default: every animation and fade schedules one
    pub timers: bool,
    pub general: bool,
}

impl LogFeatures {
    /// Every category switched to `on`
    pub fn all(on: bool) -> Self {
        Self {
            dispatch: on,
            requests: on,
            reconcile: on,
            notifications: on,
            timers: on,
            general: on,
        }
    }

    pub fn allows(&self, category: Category) -> bool {
        match category {
            Category::Dispatch => self.dispatch,
            Category::Requests => self.requests,
            Category::Reconcile => self.reconcile,
            Category::Notifications => self.notifications,
            Category::Timers => self.timers,
            Category::General => self.general,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self {
            timers: false,
            ..Self::all(true)
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("feedwire.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Debug,
        }
    }
}

impl LogConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Warnings and errors, no category lines
    pub fn minimal() -> Self {
        Self {
            level: LevelFilter::Warn,
            features: LogFeatures::all(false),
            ..Default::default()
        }
    }

    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Trace,
            features: LogFeatures::all(true),
            ..Default::default()
        }
    }

    /// Whether a line in `category` would be written
    pub fn allows(&self, category: Category) -> bool {
        self.enabled && self.features.allows(category)
    }
}

/// Install the global file logger. A disabled config installs a logger that drops everything,
/// so later `log` calls stay cheap.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(!config.clear_on_startup)
        .truncate(config.clear_on_startup)
        .open(&config.log_file)?;

    let format = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();
    WriteLogger::init(config.level, format, log_file)?;

    log::info!(
        "feedwire logging to {} at {:?}, categories {:?}",
        config.log_file.display(),
        config.level,
        config.features
    );
    Ok(())
}

#[macro_export]
macro_rules! log_dispatch {
    ($config:expr, $($arg:tt)*) => {
        if $config.allows($crate::logging::Category::Dispatch) {
            log::debug!(target: "dispatch", $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_request {
    ($config:expr, $($arg:tt)*) => {
        if $config.allows($crate::logging::Category::Requests) {
            log::debug!(target: "requests", $($arg)*);
        }
    };
}

/// Begin, settle and abandon of in-flight records
#[macro_export]
macro_rules! log_reconcile {
    ($config:expr, $($arg:tt)*) => {
        if $config.allows($crate::logging::Category::Reconcile) {
            log::debug!(target: "reconcile", $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_notification {
    ($config:expr, $($arg:tt)*) => {
        if $config.allows($crate::logging::Category::Notifications) {
            log::debug!(target: "notifications", $($arg)*);
        }
    };
}

/// Timer tasks log at trace level
#[macro_export]
macro_rules! log_timer {
    ($config:expr, $($arg:tt)*) => {
        if $config.allows($crate::logging::Category::Timers) {
            log::trace!(target: "timers", $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.allows($crate::logging::Category::General) {
            log::debug!(target: "general", $($arg)*);
        }
    };
}
