//! Common module for library exports

pub use crate::channel::Channel;
pub use crate::config::{Config, Mode, SymbolicatorOptions};
pub use crate::console::{ChannelFn, ChannelFuture, Console};
pub use crate::error::{ConsymError, ConsymResult, StackParseError, SymbolicateError};
pub use crate::install::{install_console_symbolicator, install_from_config, Installer};
pub use crate::parser::{DefaultStackParser, StackParser};
pub use crate::symbolicate::{DevServerSymbolicator, Symbolicator};
pub use crate::types::{ErrorValue, LogValue, ParsedStack, StackFrame, Symbolication};
