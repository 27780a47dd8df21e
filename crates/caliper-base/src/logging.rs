use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where log lines go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// Print every line to stdout.
    Stdout,
    /// Append to `<dir>/YYYY-MM-DD.log`, opening a new file when the UTC date changes.
    Dir(PathBuf),
}

/// Configuration for the process-wide logger.
#[derive(Clone, Debug)]
pub struct LogConfig {
    target: LogTarget,
    level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            target: LogTarget::Stdout,
            level: default_level(),
        }
    }
}

impl LogConfig {
    /// Set the log target.
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Log into daily files under `dir` instead of stdout.
    pub fn with_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.with_target(LogTarget::Dir(dir.into()))
    }

    /// Override the maximum level.
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn target(&self) -> &LogTarget {
        &self.target
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

/// Debug builds log everything down to Debug, release builds stop at Info.
fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Logger writing `timestamp [LEVEL] target file:line - message` lines.
pub struct Logger {
    level: LevelFilter,
    sink: Mutex<Sink>,
}

enum Sink {
    Stdout,
    Daily(DailyFile),
}

struct DailyFile {
    dir: PathBuf,
    current_date: String,
    file: File,
}

impl DailyFile {
    fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let current_date = format_today();
        let file = open_append(&dir.join(format!("{current_date}.log")))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            current_date,
            file,
        })
    }

    /// Switch to today's file if the date moved on. On failure the old file is kept.
    fn roll(&mut self, today: String) {
        if today == self.current_date {
            return;
        }
        let path = self.dir.join(format!("{today}.log"));
        match open_append(&path) {
            Ok(file) => {
                self.file = file;
                self.current_date = today;
            }
            Err(e) => eprintln!("Failed to open new log file {:?}: {}", path, e),
        }
    }

    fn write_line(&mut self, line: &str) {
        self.roll(format_today());
        if let Err(e) = writeln!(self.file, "{line}") {
            eprintln!("Failed to write to log file: {}", e);
            eprintln!("{line}");
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Logger {
    /// Build a logger for `config`.
    ///
    /// Fails only for `LogTarget::Dir` when the directory or today's file cannot be created.
    pub fn new(config: &LogConfig) -> std::io::Result<Self> {
        let sink = match config.target() {
            LogTarget::Stdout => Sink::Stdout,
            LogTarget::Dir(dir) => Sink::Daily(DailyFile::open(dir)?),
        };
        Ok(Self {
            level: config.level(),
            sink: Mutex::new(sink),
        })
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record);

        // A poisoned lock only means another thread panicked mid-write.
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *sink {
            Sink::Stdout => println!("{line}"),
            Sink::Daily(daily) => daily.write_line(&line),
        }
    }

    fn flush(&self) {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *sink {
            Sink::Stdout => {
                std::io::stdout().flush().ok();
            }
            Sink::Daily(daily) => {
                daily.file.flush().ok();
            }
        }
    }
}

fn format_line(record: &Record) -> String {
    format!(
        "{} [{}] {} {}:{} - {}",
        format_timestamp(),
        record.level(),
        record.target(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Format current time as YYYY-MM-DDTHH:MM:SS (UTC)
pub fn format_timestamp() -> String {
    let secs = unix_seconds();
    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    let time_of_day = secs % 86400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Format current date as YYYY-MM-DD (UTC)
pub fn format_today() -> String {
    let (year, month, day) = civil_from_days((unix_seconds() / 86400) as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// Days since the Unix epoch to a proleptic Gregorian (year, month, day).
/// Howard Hinnant's `civil_from_days`: http://howardhinnant.github.io/date_algorithms.html
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe as i64 + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Install a logger for the whole process.
///
/// Only the first successful call installs anything; later calls are ignored.
/// Returns an error if a `LogTarget::Dir` logger cannot be created.
pub fn init_logger(config: LogConfig) -> std::io::Result<()> {
    let logger = Logger::new(&config)?;
    let level = logger.level();

    // set_logger needs a &'static; the leak happens once per process.
    if log::set_logger(Box::leak(Box::new(logger))).is_ok() {
        log::set_max_level(level);
    }
    Ok(())
}

/// Install the default stdout logger.
pub fn init_stdout_logger() {
    // A stdout logger has no fallible setup.
    let _ = init_logger(LogConfig::default());
}

/// Log a fatal error and exit the process with status 1.
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
        $crate::log::Log::flush($crate::log::logger());
        std::process::exit(1);
    }};
}
