//! # Error Types
//!
//! Error handling for stack parsing, symbolication, and configuration.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages. None of these errors ever reach the caller of an
//! intercepted channel: the pipeline reports them through the fallback error
//! logger and forwards the argument unsymbolicated.

use thiserror::Error;

/// A raw stack string could not be turned into a [`ParsedStack`](crate::types::ParsedStack).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackParseError
{
    /// A line looked like a call site but its location could not be read
    ///
    /// `line` is 1-based and counts every line of the raw stack, including the
    /// leading message line.
    #[error("Malformed stack frame on line {line}: {text}")]
    MalformedFrame
    {
        /// 1-based line number inside the raw stack string
        line: usize,
        /// The offending line, trimmed
        text: String,
    },
}

/// Failure while resolving bundle positions to original source positions.
///
/// An empty frame list is *not* an error: the symbolication service is
/// allowed to know nothing about a stack, in which case the argument is
/// forwarded untouched without any report.
#[derive(Error, Debug)]
pub enum SymbolicateError
{
    /// The raw stack could not be parsed before the service was contacted
    #[error("Failed to parse stack: {0}")]
    Parse(#[from] StackParseError),

    /// The development server could not be reached or the request failed mid-flight
    ///
    /// This is the usual failure when the dev server is not running.
    #[error("Symbolication request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The development server answered with a non-success status
    #[error("Symbolication service returned status {status}: {body}")]
    Status
    {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not a valid symbolication payload
    #[error("Invalid symbolication response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The parser or the symbolication service panicked
    #[error("Symbolication panicked: {0}")]
    Panicked(String),

    /// Any other failure raised by a custom symbolication service
    #[error("Symbolication service error: {0}")]
    Service(String),
}

/// Invalid configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError
{
    /// An environment variable held a value we could not interpret
    #[error("Invalid value for {key}: {value}")]
    InvalidValue
    {
        /// Environment variable name
        key: &'static str,
        /// The rejected value
        value: String,
    },

    /// The options object could not be deserialised
    #[error("Invalid symbolicator options: {0}")]
    InvalidOptions(String),
}

/// Top-level error type for the crate.
#[derive(Error, Debug)]
pub enum ConsymError
{
    /// See [`StackParseError`]
    #[error(transparent)]
    Parse(#[from] StackParseError),

    /// See [`SymbolicateError`]
    #[error(transparent)]
    Symbolicate(#[from] SymbolicateError),

    /// See [`ConfigError`]
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error (reading stack files, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, ConsymError>`
///
/// ```rust
/// use consym_core::error::ConsymResult;
/// fn foo() -> ConsymResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type ConsymResult<T> = std::result::Result<T, ConsymError>;
