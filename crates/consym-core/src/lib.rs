//! # consym-core
//!
//! Console channel interception and error stack symbolication.
//!
//! This crate rewrites the stack of every error passed to a logging channel
//! from bundle positions to original source positions:
//! - An explicit channel registry ([`Console`]) with one slot per channel
//! - A stack parser for V8, Hermes, JavaScriptCore and Gecko formats
//! - A symbolication seam ([`Symbolicator`]) with a dev-server implementation
//! - The per-call pipeline that resolves arguments concurrently and forwards
//!   them in their original order
//! - A one-time [`Installer`] gated on development mode
//!
//! Symbolication never makes a logging call fail: when anything goes wrong
//! the error is logged with its original stack plus one diagnostic line on
//! the original `error` channel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use consym_core::config::SymbolicatorOptions;
//! use consym_core::console::Console;
//! use consym_core::install::install_console_symbolicator;
//! use consym_core::types::{ErrorValue, LogValue};
//!
//! # async fn run() {
//! let mut console = Console::stdio();
//! install_console_symbolicator(&mut console, SymbolicatorOptions::default());
//!
//! let error = ErrorValue::new("boom").with_stack("Error: boom\n    at foo (http://localhost:8081/index.bundle:10:4)");
//! console.error(vec![LogValue::from(error)]).await;
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod console;
pub mod error;
pub mod install;
pub mod parser;
pub mod pipeline;
pub mod prelude;
pub mod symbolicate;
pub mod types;

// Re-export commonly used types
pub use channel::Channel;
pub use config::{Config, Mode, SymbolicatorOptions};
pub use console::{ChannelFn, ChannelFuture, Console};
pub use error::{ConsymError, ConsymResult};
pub use install::{install_console_symbolicator, Installer};
pub use symbolicate::Symbolicator;
