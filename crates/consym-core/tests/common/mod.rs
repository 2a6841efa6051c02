//! Shared test doubles for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use consym_core::error::SymbolicateError;
use consym_core::types::{ErrorValue, LogValue, ParsedStack, StackFrame, Symbolication};
use consym_core::{Channel, ChannelFn, Console, Symbolicator};

/// Every call that reached an unwrapped channel, in arrival order.
pub type CallLog = Arc<Mutex<Vec<(Channel, Vec<LogValue>)>>>;

/// Console whose six primitives record their calls instead of printing.
pub fn recording_console() -> (Console, CallLog)
{
    let calls: CallLog = Arc::default();
    let console = Console::new(|channel| {
        let calls = Arc::clone(&calls);
        ChannelFn::from_sync(move |args| calls.lock().unwrap().push((channel, args.to_vec())))
    });
    (console, calls)
}

/// Calls recorded for `channel`.
pub fn calls_on(calls: &CallLog, channel: Channel) -> Vec<Vec<LogValue>>
{
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|(c, _)| *c == channel)
        .map(|(_, args)| args.clone())
        .collect()
}

/// An error with a bundle stack pointing at `bundle`.
pub fn bundle_error(message: &str, bundle: &str) -> ErrorValue
{
    let header = if message.is_empty() {
        "Error".to_string()
    } else {
        format!("Error: {message}")
    };
    ErrorValue::new(message).with_stack(format!(
        "{header}\n    at onPress (http://localhost:8081/{bundle}:120:34)\n    at apply (native)"
    ))
}

/// Returns the same frames for every stack and counts its calls.
#[derive(Default)]
pub struct Canned
{
    pub frames: Vec<StackFrame>,
    pub calls: AtomicUsize,
}

impl Canned
{
    pub fn new(frames: Vec<StackFrame>) -> Arc<Self>
    {
        Arc::new(Self {
            frames,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize
    {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Symbolicator for Canned
{
    async fn symbolicate(&self, _stack: &ParsedStack) -> Result<Symbolication, SymbolicateError>
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Symbolication::from_frames(self.frames.clone()))
    }
}

/// Behaviour keyed on the bundle file of the first parsed frame:
///
/// - `fail.bundle`: service error
/// - `panic.bundle`: panics
/// - `slow.bundle`: answers after a delay
/// - `empty.bundle`: no frames
/// - anything else: one frame named after the bundle
pub struct ByBundle;

#[async_trait]
impl Symbolicator for ByBundle
{
    async fn symbolicate(&self, stack: &ParsedStack) -> Result<Symbolication, SymbolicateError>
    {
        let file = stack
            .frames
            .first()
            .and_then(|frame| frame.file.clone())
            .unwrap_or_default();
        let bundle = file.rsplit('/').next().unwrap_or_default().to_string();

        match bundle.as_str() {
            "fail.bundle" => Err(SymbolicateError::Service("dev server offline".to_string())),
            "panic.bundle" => panic!("symbolicator exploded"),
            "empty.bundle" => Ok(Symbolication::default()),
            "slow.bundle" => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(Symbolication::from_frames(vec![StackFrame::new("slow", "src/Slow.tsx", 1, 1)]))
            }
            other => Ok(Symbolication::from_frames(vec![StackFrame::new(
                "resolved",
                format!("src/{other}.tsx"),
                7,
                3,
            )])),
        }
    }
}
