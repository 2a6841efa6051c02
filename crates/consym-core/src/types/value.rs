//! Logging argument types.

use std::error::Error as StdError;
use std::fmt;

/// An error-like logging argument.
///
/// Mirrors the shape of a runtime error object: a `name` (`"Error"`,
/// `"TypeError"`, ...), a `message`, and an optional raw stack string as
/// produced by the JavaScript engine. The stack usually starts with a
/// `"<name>: <message>"` header followed by one `"    at ..."` line per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue
{
    /// Error class name.
    pub name: String,
    /// Error message, possibly empty.
    pub message: String,
    /// Raw stack string, if the runtime captured one.
    pub stack: Option<String>,
}

impl ErrorValue
{
    /// Create an `Error` with the given message and no stack.
    pub fn new(message: impl Into<String>) -> Self
    {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            stack: None,
        }
    }

    /// Set the raw stack string.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self
    {
        self.stack = Some(stack.into());
        self
    }

    /// Set the error class name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self
    {
        self.name = name.into();
        self
    }

    /// Build an error argument from a Rust error.
    ///
    /// The `source()` chain, when present, becomes the stack body as
    /// `"    caused by: ..."` lines so it shows up when the value is printed.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self
    {
        let message = err.to_string();
        let mut value = Self::new(message);

        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("    caused by: {cause}"));
            source = cause.source();
        }
        if !causes.is_empty() {
            value.stack = Some(format!("{}\n{}", value.header(), causes.join("\n")));
        }
        value
    }

    /// Stack string if present and non-empty.
    pub fn stack(&self) -> Option<&str>
    {
        self.stack.as_deref().filter(|stack| !stack.is_empty())
    }

    /// `"<name>: <message>"`, or just the name for an empty message.
    pub fn header(&self) -> String
    {
        if self.message.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.message)
        }
    }
}

impl fmt::Display for ErrorValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.stack() {
            Some(stack) => f.write_str(stack),
            None => f.write_str(&self.header()),
        }
    }
}

/// A single argument passed to a logging channel.
///
/// Channels are variadic and untyped, so an invocation is a `Vec<LogValue>`.
/// Only [`LogValue::Error`] is ever looked at by the symbolication pipeline;
/// every other variant is forwarded as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue
{
    /// Absent value.
    Null,
    /// Boolean, e.g. the condition passed to `assert`.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Error-like value, the only kind that gets symbolicated.
    Error(ErrorValue),
    /// Arbitrary structured data.
    Structured(serde_json::Value),
}

/// Result of inspecting an argument at the pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified<'a>
{
    /// An error carrying a non-empty stack; worth symbolicating.
    Qualifying
    {
        /// The error message (may be empty).
        message: &'a str,
        /// The raw, non-empty stack string.
        stack: &'a str,
    },
    /// Anything else. Forwarded untouched.
    Passthrough,
}

impl LogValue
{
    /// Classify this argument for the symbolication pipeline.
    pub fn classify(&self) -> Classified<'_>
    {
        match self {
            Self::Error(error) => match error.stack() {
                Some(stack) => Classified::Qualifying {
                    message: &error.message,
                    stack,
                },
                None => Classified::Passthrough,
            },
            _ => Classified::Passthrough,
        }
    }

    /// Truthiness as understood by the `assert` channel.
    pub fn is_truthy(&self) -> bool
    {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0 && !value.is_nan(),
            Self::Str(value) => !value.is_empty(),
            Self::Error(_) => true,
            Self::Structured(value) => !value.is_null(),
        }
    }

    /// Borrow the error payload, if this is an error argument.
    pub fn as_error(&self) -> Option<&ErrorValue>
    {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for LogValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::Error(error) => write!(f, "{error}"),
            Self::Structured(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for LogValue
{
    fn from(value: &str) -> Self
    {
        Self::Str(value.to_string())
    }
}

impl From<String> for LogValue
{
    fn from(value: String) -> Self
    {
        Self::Str(value)
    }
}

impl From<bool> for LogValue
{
    fn from(value: bool) -> Self
    {
        Self::Bool(value)
    }
}

impl From<i64> for LogValue
{
    fn from(value: i64) -> Self
    {
        Self::Int(value)
    }
}

impl From<i32> for LogValue
{
    fn from(value: i32) -> Self
    {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for LogValue
{
    fn from(value: f64) -> Self
    {
        Self::Float(value)
    }
}

impl From<ErrorValue> for LogValue
{
    fn from(value: ErrorValue) -> Self
    {
        Self::Error(value)
    }
}

impl From<serde_json::Value> for LogValue
{
    fn from(value: serde_json::Value) -> Self
    {
        Self::Structured(value)
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue
{
    fn from(value: Option<T>) -> Self
    {
        value.map_or(Self::Null, Into::into)
    }
}
