//! # Console
//!
//! Explicit registry of the six logging channel slots.
//!
//! A [`Console`] owns one [`ChannelFn`] per [`Channel`]. The installer swaps
//! each binding for a symbolicating wrapper exactly once; everything that
//! needs to log (including the wrapper's own failure reporting) goes through
//! a binding captured from this registry rather than through ambient globals.
//!
//! ## Example
//!
//! ```rust
//! use consym_core::console::Console;
//! use consym_core::types::LogValue;
//!
//! # futures::executor::block_on(async {
//! let console = Console::stdio();
//! console.log(vec![LogValue::from("hello"), LogValue::from(42)]).await;
//! # });
//! ```

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::channel::Channel;
use crate::types::LogValue;

/// Pending completion of a channel call.
///
/// Calls on unwrapped primitives complete immediately; calls on symbolicating
/// wrappers complete once every argument has been resolved and forwarded.
/// The future is `'static + Send`, so it can be awaited or handed to an
/// executor.
pub type ChannelFuture = BoxFuture<'static, ()>;

/// A function bound to a channel slot.
///
/// Cheap to clone; clones share the same underlying function, which is what
/// [`ChannelFn::ptr_eq`] compares.
#[derive(Clone)]
pub struct ChannelFn
{
    inner: Arc<dyn Fn(Vec<LogValue>) -> ChannelFuture + Send + Sync>,
}

impl ChannelFn
{
    /// Wrap an asynchronous channel function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<LogValue>) -> ChannelFuture + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap a synchronous logging primitive.
    ///
    /// The primitive runs as soon as the channel is called; the returned
    /// future is already complete.
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn(&[LogValue]) + Send + Sync + 'static,
    {
        Self::new(move |args| {
            f(&args);
            future::ready(()).boxed()
        })
    }

    /// A channel that discards everything.
    pub fn noop() -> Self
    {
        Self::from_sync(|_| {})
    }

    /// Invoke the channel.
    pub fn call(&self, args: Vec<LogValue>) -> ChannelFuture
    {
        (self.inner)(args)
    }

    /// `true` if both handles point at the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool
    {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ChannelFn
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ChannelFn")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Render the text a stdio primitive writes for `args`.
///
/// Arguments are joined with a single space. `assert` prints nothing when
/// its first argument is truthy and `"Assertion failed"` (followed by the
/// remaining arguments) otherwise.
pub fn render_line(channel: Channel, args: &[LogValue]) -> Option<String>
{
    let join = |values: &[LogValue]| values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");

    match channel {
        Channel::Assert => {
            if args.first().is_some_and(LogValue::is_truthy) {
                return None;
            }
            let rest = args.get(1..).unwrap_or_default();
            if rest.is_empty() {
                Some("Assertion failed".to_string())
            } else {
                Some(format!("Assertion failed: {}", join(rest)))
            }
        }
        _ => Some(join(args)),
    }
}

/// Default primitive for `channel`: `error` and `warn` write to stderr, the
/// others to stdout.
pub fn stdio_channel(channel: Channel) -> ChannelFn
{
    ChannelFn::from_sync(move |args| {
        let Some(line) = render_line(channel, args) else {
            return;
        };
        // A closed pipe must not bring the process down from inside a log call
        let _ = if channel.is_diagnostic() {
            writeln!(io::stderr().lock(), "{line}")
        } else {
            writeln!(io::stdout().lock(), "{line}")
        };
    })
}

/// Registry of the six channel slots.
pub struct Console
{
    slots: [ChannelFn; 6],
    symbolicated: bool,
}

impl Console
{
    /// Build a console by asking `factory` for each channel's primitive.
    pub fn new(factory: impl FnMut(Channel) -> ChannelFn) -> Self
    {
        Self {
            slots: Channel::ALL.map(factory),
            symbolicated: false,
        }
    }

    /// Console bound to the stdio primitives.
    pub fn stdio() -> Self
    {
        Self::new(stdio_channel)
    }

    /// Builder-style variant of [`Console::replace`].
    #[must_use]
    pub fn with_channel(mut self, channel: Channel, function: ChannelFn) -> Self
    {
        self.replace(channel, function);
        self
    }

    /// Current binding of `channel`.
    pub fn get(&self, channel: Channel) -> &ChannelFn
    {
        &self.slots[channel.index()]
    }

    /// Rebind `channel`, returning the previous binding.
    ///
    /// Rebinding by hand bypasses the installer's one-time guard.
    pub fn replace(&mut self, channel: Channel, function: ChannelFn) -> ChannelFn
    {
        std::mem::replace(&mut self.slots[channel.index()], function)
    }

    /// Invoke `channel` with `args`.
    ///
    /// Stdio primitives print before this returns, but a symbolicated channel
    /// does nothing until the future is polled: await it or spawn it.
    pub fn call(&self, channel: Channel, args: Vec<LogValue>) -> ChannelFuture
    {
        self.get(channel).call(args)
    }

    /// `console.error(...)`
    pub fn error(&self, args: Vec<LogValue>) -> ChannelFuture
    {
        self.call(Channel::Error, args)
    }

    /// `console.warn(...)`
    pub fn warn(&self, args: Vec<LogValue>) -> ChannelFuture
    {
        self.call(Channel::Warn, args)
    }

    /// `console.log(...)`
    pub fn log(&self, args: Vec<LogValue>) -> ChannelFuture
    {
        self.call(Channel::Log, args)
    }

    /// `console.info(...)`
    pub fn info(&self, args: Vec<LogValue>) -> ChannelFuture
    {
        self.call(Channel::Info, args)
    }

    /// `console.debug(...)`
    pub fn debug(&self, args: Vec<LogValue>) -> ChannelFuture
    {
        self.call(Channel::Debug, args)
    }

    /// `console.assert(...)`
    pub fn assert(&self, args: Vec<LogValue>) -> ChannelFuture
    {
        self.call(Channel::Assert, args)
    }

    /// `true` once an installer has replaced the slots with symbolicating wrappers.
    pub fn is_symbolicated(&self) -> bool
    {
        self.symbolicated
    }

    pub(crate) fn mark_symbolicated(&mut self)
    {
        self.symbolicated = true;
    }
}

impl Default for Console
{
    fn default() -> Self
    {
        Self::stdio()
    }
}

impl fmt::Debug for Console
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let mut map = f.debug_map();
        for channel in Channel::ALL {
            map.entry(&channel.name(), self.get(channel));
        }
        map.entry(&"symbolicated", &self.symbolicated);
        map.finish()
    }
}
