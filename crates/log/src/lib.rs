//! Process-wide logging for shangd.
//!
//! Library crates emit through the `log_*!` macros; the binary decides level,
//! output format and whether timestamps are printed via [`init`].

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Level {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Text = 0,
    Json = 1,
}

impl Format {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LogConfig {
    pub level: Level,
    pub format: Format,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Text,
            timestamps: true,
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);
static LOG_FORMAT: AtomicU8 = AtomicU8::new(Format::Text as u8);
static LOG_TIMESTAMPS: AtomicBool = AtomicBool::new(true);
static LOG_STDERR_ENABLED: AtomicBool = AtomicBool::new(true);

pub fn init(config: LogConfig) {
    LOG_LEVEL.store(config.level as u8, Ordering::Relaxed);
    LOG_FORMAT.store(config.format as u8, Ordering::Relaxed);
    LOG_TIMESTAMPS.store(config.timestamps, Ordering::Relaxed);
}

pub fn set_stderr_enabled(enabled: bool) {
    LOG_STDERR_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn enabled(level: Level) -> bool {
    level as u8 <= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn log(
    level: Level,
    target: &'static str,
    file: &'static str,
    line: u32,
    args: fmt::Arguments<'_>,
) {
    if !enabled(level) || !LOG_STDERR_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let record = Record {
        level,
        target,
        file,
        line,
        now: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default(),
    };
    let rendered = render(
        &record,
        Format::from_u8(LOG_FORMAT.load(Ordering::Relaxed)),
        LOG_TIMESTAMPS.load(Ordering::Relaxed),
        args,
    );
    let _ = writeln!(io::stderr().lock(), "{rendered}");
}

struct Record {
    level: Level,
    target: &'static str,
    file: &'static str,
    line: u32,
    now: Duration,
}

fn render(record: &Record, format: Format, timestamps: bool, args: fmt::Arguments<'_>) -> String {
    match format {
        Format::Text => {
            let prefix = if timestamps {
                let ts = Timestamp {
                    unix_seconds: record.now.as_secs(),
                    millis: record.now.subsec_millis(),
                };
                format!("{ts} ")
            } else {
                String::new()
            };
            format!(
                "{prefix}{} {}: {args}",
                record.level.as_str(),
                record.target
            )
        }
        Format::Json => {
            let ts_ms: u64 = record.now.as_millis().try_into().unwrap_or(u64::MAX);
            json!({
                "ts_ms": ts_ms,
                "level": record.level.as_str(),
                "target": record.target,
                "file": record.file,
                "line": record.line,
                "msg": args.to_string(),
            })
            .to_string()
        }
    }
}

#[macro_export]
macro_rules! log_at {
    ($level:expr, $($arg:tt)*) => {{
        if $crate::enabled($level) {
            $crate::log($level, module_path!(), file!(), line!(), format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Error, $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Warn, $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Info, $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Debug, $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        $crate::log_at!($crate::Level::Trace, $($arg)*);
    }};
}

struct Timestamp {
    unix_seconds: u64,
    millis: u32,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SECS_PER_DAY: u64 = 86_400;
        let days = (self.unix_seconds / SECS_PER_DAY) as i64;
        let secs_of_day = self.unix_seconds % SECS_PER_DAY;
        let hour = secs_of_day / 3600;
        let minute = (secs_of_day % 3600) / 60;
        let second = secs_of_day % 60;
        let (year, month, day) = civil_from_days(days);
        write!(
            f,
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{millis:03}Z",
            millis = self.millis
        )
    }
}

// Howard Hinnant's days-to-civil conversion.
fn civil_from_days(days_since_unix_epoch: i64) -> (i32, u32, u32) {
    let z = days_since_unix_epoch + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = (yoe as i32) + (era as i32) * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = y + if m <= 2 { 1 } else { 0 };
    (year, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            level: Level::Warn,
            target: "shangd_checkpoints::registry",
            file: "registry.rs",
            line: 7,
            now: Duration::from_millis(1_500_000_000_123),
        }
    }

    #[test]
    fn parse_level() {
        assert_eq!(Level::parse("info"), Some(Level::Info));
        assert_eq!(Level::parse("WARN"), Some(Level::Warn));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("nope"), None);
    }

    #[test]
    fn parse_format() {
        assert_eq!(Format::parse("text"), Some(Format::Text));
        assert_eq!(Format::parse("JSON"), Some(Format::Json));
        assert_eq!(Format::parse("nope"), None);
    }

    #[test]
    fn text_line_with_timestamp() {
        let line = render(
            &record(),
            Format::Text,
            true,
            format_args!("checkpoint failed at {}", 10),
        );
        assert_eq!(
            line,
            "2017-07-14T02:40:00.123Z WARN shangd_checkpoints::registry: checkpoint failed at 10"
        );
    }

    #[test]
    fn text_line_without_timestamp() {
        let line = render(&record(), Format::Text, false, format_args!("ok"));
        assert_eq!(line, "WARN shangd_checkpoints::registry: ok");
    }

    #[test]
    fn json_line_fields() {
        let line = render(&record(), Format::Json, true, format_args!("height {}", 20));
        let value: serde_json::Value = serde_json::from_str(&line).expect("json");
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["msg"], "height 20");
        assert_eq!(value["line"], 7);
        assert_eq!(value["ts_ms"], 1_500_000_000_123u64);
    }

    #[test]
    fn trace_needs_trace_level() {
        set_stderr_enabled(false);
        init(LogConfig::default());
        assert!(!enabled(Level::Debug));
        assert!(!enabled(Level::Trace));
        crate::log_trace!("filtered {}", 1);

        init(LogConfig {
            level: Level::Trace,
            ..LogConfig::default()
        });
        assert!(enabled(Level::Trace));
        crate::log_trace!("emitted {}", 2);
        init(LogConfig::default());
    }
}
