//! # Types
//!
//! Argument and stack frame types shared by the parser, the symbolication
//! service, and the channel pipeline.

pub mod frame;
pub mod value;

pub use frame::{CodeFrame, CodeFrameLocation, ParsedStack, StackFrame, Symbolication};
pub use value::{Classified, ErrorValue, LogValue};
