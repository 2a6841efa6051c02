//! Stack frame types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One call site of an error's stack.
///
/// The same shape is used on both sides of symbolication: the parser fills it
/// with bundle positions, the symbolication service answers with original
/// source positions. Field names serialise in camelCase to match the dev
/// server's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame
{
    /// Function name, `"<unknown>"` when the engine did not report one.
    #[serde(default = "unknown_method")]
    pub method_name: String,
    /// Source file or bundle URL.
    #[serde(default)]
    pub file: Option<String>,
    /// 1-based line number.
    #[serde(default)]
    pub line_number: Option<u32>,
    /// Column number.
    #[serde(default)]
    pub column: Option<u32>,
}

fn unknown_method() -> String
{
    "<unknown>".to_string()
}

impl StackFrame
{
    /// Frame with a method name and a full `file:line:column` location.
    pub fn new(method_name: impl Into<String>, file: impl Into<String>, line_number: u32, column: u32) -> Self
    {
        Self {
            method_name: method_name.into(),
            file: Some(file.into()),
            line_number: Some(line_number),
            column: Some(column),
        }
    }

    /// Frame without any location, e.g. a native call site.
    pub fn unlocated(method_name: impl Into<String>) -> Self
    {
        Self {
            method_name: method_name.into(),
            file: None,
            line_number: None,
            column: None,
        }
    }

    /// File if present and non-empty.
    pub fn file(&self) -> Option<&str>
    {
        self.file.as_deref().filter(|file| !file.is_empty())
    }
}

/// Renders the stack line written back into a symbolicated error:
/// `"    at <method> (<file>:<line>:<column>)"`, with `0` standing in for a
/// missing line or column, or `"    at <method> (unknown)"` without a file.
impl fmt::Display for StackFrame
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.file() {
            Some(file) => write!(
                f,
                "    at {} ({}:{}:{})",
                self.method_name,
                file,
                self.line_number.unwrap_or(0),
                self.column.unwrap_or(0)
            ),
            None => write!(f, "    at {} (unknown)", self.method_name),
        }
    }
}

/// Structured description of a raw stack string, in bundle positions.
///
/// Frame order is the order in which frames appeared in the raw stack
/// (innermost first for every engine we parse).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedStack
{
    /// Frames in their original order.
    pub frames: Vec<StackFrame>,
}

impl ParsedStack
{
    /// Wrap a list of frames.
    pub fn new(frames: Vec<StackFrame>) -> Self
    {
        Self { frames }
    }

    /// Number of frames.
    pub fn len(&self) -> usize
    {
        self.frames.len()
    }

    /// `true` if no frame could be recognised.
    pub fn is_empty(&self) -> bool
    {
        self.frames.is_empty()
    }
}

/// Position inside a [`CodeFrame`] excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFrameLocation
{
    /// 1-based row.
    pub row: u32,
    /// Column.
    pub column: u32,
}

/// Source excerpt around the first user frame, as returned by the dev server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFrame
{
    /// Pre-rendered excerpt, may contain ANSI colours.
    pub content: String,
    /// Highlighted position.
    #[serde(default)]
    pub location: Option<CodeFrameLocation>,
    /// File the excerpt comes from.
    pub file_name: String,
}

/// Answer of a symbolication service.
///
/// `frames` keeps the order the service returned; it is authoritative and
/// never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbolication
{
    /// Resolved frames in original source positions.
    #[serde(rename = "stack", default)]
    pub frames: Vec<StackFrame>,
    /// Optional source excerpt.
    #[serde(default)]
    pub code_frame: Option<CodeFrame>,
}

impl Symbolication
{
    /// Result carrying only frames.
    pub fn from_frames(frames: Vec<StackFrame>) -> Self
    {
        Self {
            frames,
            code_frame: None,
        }
    }
}
