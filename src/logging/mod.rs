use std::error;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io as std_io;
use std::path::PathBuf;

pub use slog::FilterLevel as Level;
use slog::{
    Discard, Drain, Duplicate, Fuse, Level as LogLevel, LevelFilter, Logger, OwnedKV,
    SendSyncRefUnwindSafeKV,
};
use slog_async::Async;
use slog_term::{CompactFormat, Decorator, FullFormat, PlainDecorator, TermDecorator};

#[derive(Debug)]
pub enum Stream {
    StdOut,
    StdErr,
    File(File),
    Null,
}

impl Stream {
    pub fn is_null(&self) -> bool {
        match *self {
            Stream::Null => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Full,
    Compact,
}

impl Default for Format {
    fn default() -> Self {
        Format::Full
    }
}

#[derive(Debug)]
pub struct LoggerBuilder {
    stream: Stream,
    level: Level,
    format: Format,
}

impl LoggerBuilder {
    pub fn new(stream: Stream) -> Self {
        LoggerBuilder {
            stream: stream,
            level: Level::Debug,
            format: Format::Full,
        }
    }

    pub fn level(mut self, l: Level) -> Self {
        self.level = l;
        self
    }

    pub fn format(mut self, f: Format) -> Self {
        self.format = f;
        self
    }

    pub fn build<T>(self, values: OwnedKV<T>) -> Logger
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        match self.build_drain() {
            Some(drain) => Logger::root(drain.fuse(), values),
            None => Logger::root(Discard, values),
        }
    }

    fn build_drain(self) -> Option<LevelFilter<Fuse<Async>>> {
        if let Level::Off = self.level {
            return None;
        }
        let (level, format) = (self.level, self.format);
        match self.stream {
            Stream::StdOut => Some(LoggerBuilder::build_drain_from_decorator(
                TermDecorator::new().stdout().build(),
                level,
                format,
            )),
            Stream::StdErr => Some(LoggerBuilder::build_drain_from_decorator(
                TermDecorator::new().stderr().build(),
                level,
                format,
            )),
            Stream::File(f) => Some(LoggerBuilder::build_drain_from_decorator(
                PlainDecorator::new(f),
                level,
                format,
            )),
            Stream::Null => None,
        }
    }

    fn build_drain_from_decorator<D: Decorator + Send + 'static>(
        decorator: D,
        level: Level,
        format: Format,
    ) -> LevelFilter<Fuse<Async>> {
        let drain = match format {
            Format::Compact => {
                let drain = CompactFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
            Format::Full => {
                let drain = FullFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
        };
        let level = LogLevel::from_usize(level.as_usize()).unwrap_or(LogLevel::Trace);
        LevelFilter::new(drain.fuse(), level)
    }

    /// Logger writing to both builders' streams.
    pub fn build_with<T>(self, other: LoggerBuilder, values: OwnedKV<T>) -> Logger
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        match (self.build_drain(), other.build_drain()) {
            (Some(d1), Some(d2)) => Logger::root(Duplicate::new(d1, d2).fuse(), values),
            (Some(d1), None) => Logger::root(d1.fuse(), values),
            (None, Some(d2)) => Logger::root(d2.fuse(), values),
            (None, None) => Logger::root(Discard, values),
        }
    }
}

/// A logger that drops every record.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}

pub fn parse_level(name: &str) -> Result<Level, Error> {
    match name.to_lowercase().as_str() {
        "off" => Ok(Level::Off),
        "critical" | "crit" => Ok(Level::Critical),
        "error" => Ok(Level::Error),
        "warning" | "warn" => Ok(Level::Warning),
        "info" => Ok(Level::Info),
        "debug" => Ok(Level::Debug),
        "trace" => Ok(Level::Trace),
        _ => Err(Error::InvalidOption),
    }
}

#[derive(Debug)]
pub enum Error {
    InvalidOption,
    Other(std_io::Error),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::InvalidOption => None,
            Error::Other(ref e) => Some(e),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidOption => "invalid option".fmt(f),
            Error::Other(ref err) => err.fmt(f),
        }
    }
}

/// Logging section of the parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Verbosity of the terminal stream.
    pub verbosity: String,
    /// Level of the file stream; ignored without `file`.
    pub level: String,
    pub file: Option<PathBuf>,
    pub format: Format,
    pub use_stderr: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbosity: "info".to_string(),
            level: "debug".to_string(),
            file: None,
            format: Format::Full,
            use_stderr: true,
        }
    }
}

pub fn create_logger(config: &Config) -> Result<Logger, Error> {
    create_logger_with_kv(config, o!())
}

pub fn create_logger_with_kv<T>(config: &Config, values: OwnedKV<T>) -> Result<Logger, Error>
where
    T: SendSyncRefUnwindSafeKV + 'static,
{
    let level = parse_level(&config.level)?;
    let verbosity = parse_level(&config.verbosity)?;
    let fstream = match (level, config.file.as_ref()) {
        (Level::Off, _) | (_, None) => Stream::Null,
        (_, Some(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(Error::Other)?;
            Stream::File(file)
        }
    };
    let vstream = if config.use_stderr {
        Stream::StdErr
    } else {
        Stream::StdOut
    };
    let logger = LoggerBuilder::new(vstream)
        .level(verbosity)
        .format(config.format)
        .build_with(
            LoggerBuilder::new(fstream).level(level).format(config.format),
            values,
        );
    Ok(logger)
}
