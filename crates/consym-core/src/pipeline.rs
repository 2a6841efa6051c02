//! # Symbolication Pipeline
//!
//! The wrapper installed into each channel slot.
//!
//! For every call, each argument is resolved independently and concurrently:
//!
//! 1. Arguments that are not errors, or errors without a stack, pass through.
//! 2. The raw stack is parsed and sent to the [`Symbolicator`].
//! 3. An empty answer leaves the stack untouched.
//! 4. Otherwise every resolved frame is rendered as an `"    at ..."` line,
//!    framework-internal lines are optionally dropped, and the error's stack
//!    is replaced by `"<message>\n<lines>"` (or just the lines for an empty
//!    message).
//! 5. Any failure in 2-4, panics included, is reported once through the
//!    fallback error logger and the argument is forwarded unsymbolicated.
//!
//! Once every argument has settled, the original channel receives the same
//! number of arguments in the same order.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;

use crate::channel::Channel;
use crate::config::SymbolicatorOptions;
use crate::console::{ChannelFn, ChannelFuture};
use crate::error::SymbolicateError;
use crate::parser::StackParser;
use crate::symbolicate::Symbolicator;
use crate::types::{Classified, ErrorValue, LogValue, StackFrame};

/// Path segment identifying framework-internal frames.
pub const REACT_NATIVE_CORE_PATH: &str = "node_modules/react-native";

/// First argument of every failure report sent to the fallback error logger.
pub const SYMBOLICATION_FAILURE_PREFIX: &str = "Error during symbolication:";

/// Decides which formatted stack lines survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFilter
{
    exclude_react_native_core: bool,
}

impl FrameFilter
{
    /// Filter keeping every line.
    pub const fn keep_all() -> Self
    {
        Self {
            exclude_react_native_core: false,
        }
    }

    /// Filter dropping lines that contain [`REACT_NATIVE_CORE_PATH`].
    pub const fn exclude_react_native_core() -> Self
    {
        Self {
            exclude_react_native_core: true,
        }
    }

    /// Filter matching `options`.
    pub const fn from_options(options: &SymbolicatorOptions) -> Self
    {
        Self {
            exclude_react_native_core: options.exclude_react_native_core_frames,
        }
    }

    /// `true` if `line` should stay in the rewritten stack.
    pub fn keeps(&self, line: &str) -> bool
    {
        !self.exclude_react_native_core || !line.contains(REACT_NATIVE_CORE_PATH)
    }
}

/// Render `frames` as stack lines, apply `filter`, and join with newlines.
///
/// Surviving lines keep the order of `frames`.
pub fn format_stack_body(frames: &[StackFrame], filter: FrameFilter) -> String
{
    frames
        .iter()
        .map(ToString::to_string)
        .filter(|line| filter.keeps(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full replacement stack: the message line (if any) followed by `body`.
pub fn rewrite_stack(message: &str, body: &str) -> String
{
    if message.is_empty() {
        body.to_string()
    } else {
        format!("{message}\n{body}")
    }
}

/// How a single argument left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome
{
    /// Not an error, or an error without a stack.
    NotQualifying,
    /// The service knew nothing about the stack; left untouched.
    Unresolved,
    /// Stack replaced with symbolicated frames.
    Rewritten,
    /// Parsing or symbolication failed; left untouched and reported.
    Failed,
}

fn panic_message(payload: &(dyn Any + Send)) -> String
{
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Symbolicating wrapper around one channel's original function.
pub struct SymbolicatedChannel
{
    channel: Channel,
    original: ChannelFn,
    fallback: ChannelFn,
    symbolicator: Arc<dyn Symbolicator>,
    parser: Arc<dyn StackParser>,
    filter: FrameFilter,
}

impl SymbolicatedChannel
{
    /// Wrap `original`.
    ///
    /// `fallback` receives failure reports; it must be an unwrapped function
    /// (normally the original `error` binding) so reports never loop back
    /// through a wrapper.
    pub fn new(
        channel: Channel,
        original: ChannelFn,
        fallback: ChannelFn,
        symbolicator: Arc<dyn Symbolicator>,
        parser: Arc<dyn StackParser>,
        options: &SymbolicatorOptions,
    ) -> Self
    {
        Self {
            channel,
            original,
            fallback,
            symbolicator,
            parser,
            filter: FrameFilter::from_options(options),
        }
    }

    /// Channel this wrapper was built for.
    pub fn channel(&self) -> Channel
    {
        self.channel
    }

    /// Turn the wrapper into a slot binding.
    pub fn into_channel_fn(self) -> ChannelFn
    {
        let this = Arc::new(self);
        ChannelFn::new(move |args| Arc::clone(&this).call(args))
    }

    /// Resolve every argument, then forward them to the original channel.
    pub fn call(self: Arc<Self>, args: Vec<LogValue>) -> ChannelFuture
    {
        async move {
            let count = args.len();
            let settled = join_all(args.into_iter().map(|arg| self.resolve_argument(arg))).await;

            let rewritten = settled.iter().filter(|(_, outcome)| *outcome == Outcome::Rewritten).count();
            let failed = settled.iter().filter(|(_, outcome)| *outcome == Outcome::Failed).count();
            tracing::debug!(
                channel = %self.channel,
                arguments = count,
                rewritten,
                failed,
                "Forwarding symbolicated arguments"
            );

            let resolved = settled.into_iter().map(|(arg, _)| arg).collect();
            self.original.call(resolved).await;
        }
        .boxed()
    }

    /// Run one argument through the pipeline.
    pub async fn resolve_argument(&self, mut arg: LogValue) -> (LogValue, Outcome)
    {
        let result = match arg.classify() {
            Classified::Qualifying { message, stack } => self.symbolicate_stack(message, stack).await,
            Classified::Passthrough => return (arg, Outcome::NotQualifying),
        };

        match result {
            Ok(Some(stack)) => {
                if let LogValue::Error(error) = &mut arg {
                    error.stack = Some(stack);
                }
                (arg, Outcome::Rewritten)
            }
            Ok(None) => (arg, Outcome::Unresolved),
            Err(err) => {
                tracing::debug!(channel = %self.channel, error = %err, "Symbolication failed");
                self.fallback
                    .call(vec![
                        LogValue::from(SYMBOLICATION_FAILURE_PREFIX),
                        LogValue::Error(ErrorValue::from_error(&err)),
                    ])
                    .await;
                (arg, Outcome::Failed)
            }
        }
    }

    /// New stack for an error, or `None` if the service returned no frames.
    async fn symbolicate_stack(&self, message: &str, stack: &str) -> Result<Option<String>, SymbolicateError>
    {
        let parsed = panic::catch_unwind(AssertUnwindSafe(|| self.parser.parse(stack)))
            .map_err(|payload| SymbolicateError::Panicked(panic_message(payload.as_ref())))??;

        let symbolication = AssertUnwindSafe(self.symbolicator.symbolicate(&parsed))
            .catch_unwind()
            .await
            .map_err(|payload| SymbolicateError::Panicked(panic_message(payload.as_ref())))??;

        if symbolication.frames.is_empty() {
            tracing::trace!(channel = %self.channel, "Symbolication returned no frames");
            return Ok(None);
        }

        let body = format_stack_body(&symbolication.frames, self.filter);
        let kept = if body.is_empty() { 0 } else { body.lines().count() };
        tracing::trace!(
            channel = %self.channel,
            frames = symbolication.frames.len(),
            filtered = symbolication.frames.len().saturating_sub(kept),
            "Rewriting stack"
        );
        Ok(Some(rewrite_stack(message, &body)))
    }
}

impl std::fmt::Debug for SymbolicatedChannel
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("SymbolicatedChannel")
            .field("channel", &self.channel)
            .field("original", &self.original)
            .field("fallback", &self.fallback)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
