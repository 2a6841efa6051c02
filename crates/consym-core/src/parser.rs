//! # Stack Parser
//!
//! Turns a raw JavaScript stack string into a [`ParsedStack`] of bundle
//! positions that a [`Symbolicator`](crate::symbolicate::Symbolicator) can resolve.
//!
//! [`DefaultStackParser`] understands the formats emitted by the engines a
//! development build runs on:
//!
//! - **V8 / Hermes**: `    at method (file:line:column)`, `    at file:line:column`,
//!   `    at method (address at file:line:column)`, `    at method (native)`
//! - **JavaScriptCore / Gecko**: `method@file:line:column`, `file:line:column`
//!
//! Lines that are not frames (the `"Error: message"` header, blank lines,
//! multi-line messages) are skipped. A line that announces itself as a frame
//! with `at ` but whose location cannot be read is kept without a location.
//! Only line or column numbers too large for `u32` fail the parse.

use crate::error::StackParseError;
use crate::types::{ParsedStack, StackFrame};

/// Method name used when the engine reports an anonymous call site.
pub const ANONYMOUS_METHOD: &str = "<unknown>";

/// Parses raw stack strings.
///
/// Implemented for any `Fn(&str) -> Result<ParsedStack, StackParseError>`,
/// which is convenient for tests.
pub trait StackParser: Send + Sync
{
    /// Parse `raw` into frames, preserving their order.
    ///
    /// ## Errors
    ///
    /// Returns [`StackParseError`] if a frame line holds numbers it cannot represent.
    fn parse(&self, raw: &str) -> Result<ParsedStack, StackParseError>;
}

impl<F> StackParser for F
where
    F: Fn(&str) -> Result<ParsedStack, StackParseError> + Send + Sync,
{
    fn parse(&self, raw: &str) -> Result<ParsedStack, StackParseError>
    {
        self(raw)
    }
}

/// Parser for V8, Hermes, JavaScriptCore and Gecko stack formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStackParser;

impl StackParser for DefaultStackParser
{
    fn parse(&self, raw: &str) -> Result<ParsedStack, StackParseError>
    {
        let mut frames = Vec::new();

        for (index, line) in raw.lines().enumerate() {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            let malformed = || StackParseError::MalformedFrame {
                line: index + 1,
                text: text.to_string(),
            };

            let frame = if let Some(rest) = text.strip_prefix("at ") {
                Some(parse_v8_frame(rest.trim()).map_err(|()| malformed())?)
            } else {
                parse_jsc_frame(text).map_err(|()| malformed())?
            };

            frames.extend(frame);
        }

        Ok(ParsedStack::new(frames))
    }
}

/// Location part of a frame.
enum Location
{
    /// Native or otherwise unlocated call site.
    Native,
    /// `file:line[:column]`
    Position
    {
        file: String,
        line: u32,
        column: Option<u32>,
    },
}

/// Why a location could not be read.
enum LocationError
{
    /// Not shaped like a location at all.
    NotALocation,
    /// Shaped like one, but a number did not fit.
    Overflow,
}

fn is_digits(s: &str) -> bool
{
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number(s: &str) -> Result<u32, LocationError>
{
    s.parse::<u32>().map_err(|_| LocationError::Overflow)
}

fn parse_location(location: &str) -> Result<Location, LocationError>
{
    let location = location.strip_prefix("address at ").unwrap_or(location).trim();

    if matches!(location, "native" | "[native code]" | "unknown" | "<anonymous>") {
        return Ok(Location::Native);
    }

    let (head, last) = location.rsplit_once(':').ok_or(LocationError::NotALocation)?;
    if !is_digits(last) {
        return Err(LocationError::NotALocation);
    }

    match head.rsplit_once(':') {
        Some((file, line)) if is_digits(line) && !file.is_empty() => Ok(Location::Position {
            file: file.to_string(),
            line: parse_number(line)?,
            column: Some(parse_number(last)?),
        }),
        _ if !head.is_empty() => Ok(Location::Position {
            file: head.to_string(),
            line: parse_number(last)?,
            column: None,
        }),
        _ => Err(LocationError::NotALocation),
    }
}

fn frame_at(method_name: &str, location: Location) -> StackFrame
{
    let method_name = if method_name.is_empty() {
        ANONYMOUS_METHOD.to_string()
    } else {
        method_name.to_string()
    };

    match location {
        Location::Native => StackFrame::unlocated(method_name),
        Location::Position { file, line, column } => StackFrame {
            method_name,
            file: Some(file),
            line_number: Some(line),
            column,
        },
    }
}

/// `method (location)` or a bare `location`, with the leading `at ` stripped.
///
/// A line the engine marked as a frame is never dropped: when its location
/// cannot be read it is kept as an unlocated frame. `Err(())` only for
/// numbers that overflow.
fn parse_v8_frame(rest: &str) -> Result<StackFrame, ()>
{
    if let Some(inner) = rest.strip_suffix(')') {
        if let Some((method, location)) = inner.split_once(" (") {
            return match parse_location(location) {
                Ok(location) => Ok(frame_at(method, location)),
                // `at async Promise.all (index 0)`, `at bar (a.js)`
                Err(LocationError::NotALocation) => Ok(frame_at(method, Location::Native)),
                Err(LocationError::Overflow) => Err(()),
            };
        }
    }

    match parse_location(rest) {
        Ok(location) => Ok(frame_at("", location)),
        // `at foo` on its own names a method with no location at all
        Err(LocationError::NotALocation) => Ok(StackFrame::unlocated(rest)),
        Err(LocationError::Overflow) => Err(()),
    }
}

/// `method@location` or a bare `file:line:column`.
///
/// Returns `Ok(None)` for lines that are not frames, `Err(())` for frames
/// whose numbers overflow.
fn parse_jsc_frame(text: &str) -> Result<Option<StackFrame>, ()>
{
    let (method, location) = match text.split_once('@') {
        Some((method, location)) if !method.contains(char::is_whitespace) => (method, location),
        // Bare locations need a column to be told apart from message text
        _ if !text.contains(char::is_whitespace) => match parse_location(text) {
            Ok(Location::Position { column: Some(_), .. }) | Err(LocationError::Overflow) => ("", text),
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };

    match parse_location(location) {
        Ok(location) => Ok(Some(frame_at(method, location))),
        Err(LocationError::NotALocation) => Ok(None),
        Err(LocationError::Overflow) => Err(()),
    }
}
