//! Logging channel identifiers.

use std::fmt;
use std::str::FromStr;

/// One of the six intercepted logging entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel
{
    /// `error`. Its original binding doubles as the fallback error logger.
    Error,
    /// `warn`
    Warn,
    /// `log`
    Log,
    /// `info`
    Info,
    /// `debug`
    Debug,
    /// `assert`. The leading condition argument is forwarded like any other.
    Assert,
}

impl Channel
{
    /// Every channel, in slot order.
    pub const ALL: [Channel; 6] = [
        Channel::Error,
        Channel::Warn,
        Channel::Log,
        Channel::Info,
        Channel::Debug,
        Channel::Assert,
    ];

    /// Slot index inside a [`Console`](crate::console::Console).
    pub const fn index(self) -> usize
    {
        match self {
            Channel::Error => 0,
            Channel::Warn => 1,
            Channel::Log => 2,
            Channel::Info => 3,
            Channel::Debug => 4,
            Channel::Assert => 5,
        }
    }

    /// Lower-case channel name.
    pub const fn name(self) -> &'static str
    {
        match self {
            Channel::Error => "error",
            Channel::Warn => "warn",
            Channel::Log => "log",
            Channel::Info => "info",
            Channel::Debug => "debug",
            Channel::Assert => "assert",
        }
    }

    /// `true` for channels whose default primitive writes to stderr.
    pub const fn is_diagnostic(self) -> bool
    {
        matches!(self, Channel::Error | Channel::Warn)
    }
}

impl fmt::Display for Channel
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

impl FromStr for Channel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" => Ok(Channel::Error),
            "warn" | "warning" => Ok(Channel::Warn),
            "log" => Ok(Channel::Log),
            "info" => Ok(Channel::Info),
            "debug" => Ok(Channel::Debug),
            "assert" => Ok(Channel::Assert),
            _ => Err(format!(
                "Unknown channel: {s}. Use 'error', 'warn', 'log', 'info', 'debug', or 'assert'"
            )),
        }
    }
}
