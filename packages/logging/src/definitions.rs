use chrono::{DateTime, Utc};
use std::borrow::Cow;
use termcolor::ColorSpec;
use typed_builder::TypedBuilder;

pub trait LogFormatter {
    fn format_log(&self, log: &LogInfo, level: Loglevel) -> Vec<FormattedString>;
}

pub struct FormattedString {
    pub string: Cow<'static, str>,
    pub color: Option<ColorSpec>,
}

impl FormattedString {
    pub fn new(string: impl Into<Cow<'static, str>>, color: Option<ColorSpec>) -> Self {
        Self {
            string: string.into(),
            color,
        }
    }
}

impl<T> From<T> for FormattedString
where
    T: Into<Cow<'static, str>>,
{
    fn from(string: T) -> Self {
        Self::new(string, None)
    }
}

pub trait WithColor {
    fn with_color(self, color: ColorSpec) -> FormattedString;
}

impl<T> WithColor for T
where
    T: Into<Cow<'static, str>>,
{
    fn with_color(self, color: ColorSpec) -> FormattedString {
        FormattedString::new(self, Some(color))
    }
}

/// A trait for logging messages
pub trait Logger {
    fn log(&mut self, log: LogInfo, level: Loglevel);

    fn log_level(&self) -> Loglevel;
    fn set_log_level(&mut self, level: Loglevel);
}

/// A variant of the [Logger] trait that does not require mutability. This is typically an
/// abstraction over a message channel or a shared writer.
pub trait ImmutableLogger: Send + Sync {
    fn log(&self, log: LogInfo, level: Loglevel);

    fn log_level(&self) -> Loglevel;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
    Silly,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    None,
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct LogInfo {
    #[builder(default = Utc::now())]
    pub timestamp: DateTime<Utc>,
    #[builder(default)]
    pub direction: Direction,
    pub label: &'static str,
    #[builder(default, setter(strip_option))]
    pub primary_tags: Option<Vec<Cow<'static, str>>>,
    #[builder(default, setter(strip_option))]
    pub secondary_tag: Option<Cow<'static, str>>,
    #[builder(setter(into))]
    pub payload: LogPayload,
}

/// The lines of a log message
#[derive(Debug, Clone, Default)]
pub struct LogPayload {
    pub lines: Vec<Cow<'static, str>>,
}

impl LogPayload {
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<String> for LogPayload {
    fn from(line: String) -> Self {
        Self {
            lines: line.split('\n').map(|l| Cow::Owned(l.to_string())).collect(),
        }
    }
}

impl From<&'static str> for LogPayload {
    fn from(line: &'static str) -> Self {
        Self {
            lines: line.split('\n').map(Cow::Borrowed).collect(),
        }
    }
}

impl From<Vec<Cow<'static, str>>> for LogPayload {
    fn from(lines: Vec<Cow<'static, str>>) -> Self {
        Self { lines }
    }
}
