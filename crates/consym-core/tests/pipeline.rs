//! Tests for the symbolicating channel wrappers

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{bundle_error, calls_on, recording_console, ByBundle, Canned};
use consym_core::error::SymbolicateError;
use consym_core::pipeline::{SYMBOLICATION_FAILURE_PREFIX, REACT_NATIVE_CORE_PATH};
use consym_core::types::{ErrorValue, LogValue, ParsedStack, StackFrame, Symbolication};
use consym_core::{Channel, Installer, Mode, Symbolicator, SymbolicatorOptions};
use tokio::sync::Barrier;

fn installer(symbolicator: Arc<dyn Symbolicator>) -> Installer
{
    Installer::new(symbolicator).with_mode(Mode::Development)
}

fn excluding_core_frames() -> SymbolicatorOptions
{
    SymbolicatorOptions {
        exclude_react_native_core_frames: true,
    }
}

#[tokio::test]
async fn test_error_stack_is_rewritten()
{
    let (mut console, calls) = recording_console();
    installer(Canned::new(vec![StackFrame::new("foo", "App.tsx", 10, 4)])).install(&mut console);

    console.error(vec![LogValue::from(bundle_error("boom", "index.bundle"))]).await;

    let forwarded = calls_on(&calls, Channel::Error);
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].len(), 1);
    let error = forwarded[0][0].as_error().unwrap();
    assert_eq!(error.stack.as_deref(), Some("boom\n    at foo (App.tsx:10:4)"));
    assert_eq!(error.message, "boom");
}

#[tokio::test]
async fn test_empty_symbolication_leaves_stack_untouched()
{
    let (mut console, calls) = recording_console();
    installer(Canned::new(Vec::new())).install(&mut console);

    let error = bundle_error("boom", "index.bundle");
    console.error(vec![LogValue::from(error.clone())]).await;

    // Forwarded unchanged and nothing reported: an empty answer is not a failure
    assert_eq!(calls.lock().unwrap().clone(), vec![(Channel::Error, vec![LogValue::from(error)])]);
}

#[tokio::test]
async fn test_core_frames_are_excluded_when_configured()
{
    let frames = vec![
        StackFrame::new("onPress", "/app/src/App.tsx", 12, 8),
        StackFrame::new(
            "touchableHandlePress",
            "/app/node_modules/react-native/Libraries/Components/Touchable/Touchable.js",
            895,
            34,
        ),
    ];
    let (mut console, calls) = recording_console();
    installer(Canned::new(frames))
        .with_options(excluding_core_frames())
        .install(&mut console);

    console.warn(vec![LogValue::from(bundle_error("boom", "index.bundle"))]).await;

    let forwarded = calls_on(&calls, Channel::Warn);
    let stack = forwarded[0][0].as_error().unwrap().stack.clone().unwrap();
    assert_eq!(stack, "boom\n    at onPress (/app/src/App.tsx:12:8)");
    assert!(!stack.contains(REACT_NATIVE_CORE_PATH));
}

#[tokio::test]
async fn test_excluding_every_frame_leaves_only_the_message()
{
    let frames = vec![StackFrame::new(
        "touchableHandlePress",
        "/app/node_modules/react-native/Libraries/Components/Touchable/Touchable.js",
        895,
        34,
    )];
    let (mut console, calls) = recording_console();
    installer(Canned::new(frames))
        .with_options(excluding_core_frames())
        .install(&mut console);

    console.error(vec![LogValue::from(bundle_error("boom", "index.bundle"))]).await;

    let forwarded = calls_on(&calls, Channel::Error);
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0][0].as_error().unwrap().stack.as_deref(), Some("boom\n"));
}

#[tokio::test]
async fn test_core_frames_are_kept_by_default()
{
    let frames = vec![
        StackFrame::new("onPress", "/app/src/App.tsx", 12, 8),
        StackFrame::new("render", "/app/node_modules/react-native/Libraries/Renderer/implementations/ReactFabric-dev.js", 1, 2),
        StackFrame::unlocated("apply"),
    ];
    let (mut console, calls) = recording_console();
    installer(Canned::new(frames.clone())).install(&mut console);

    console.log(vec![LogValue::from(bundle_error("", "index.bundle"))]).await;

    let forwarded = calls_on(&calls, Channel::Log);
    let stack = forwarded[0][0].as_error().unwrap().stack.clone().unwrap();
    // Empty message: no header line, one line per frame
    assert_eq!(stack.lines().count(), frames.len());
    assert_eq!(stack.lines().last(), Some("    at apply (unknown)"));
}

#[tokio::test]
async fn test_line_count_is_frames_plus_message()
{
    for frame_count in 1..=4_u32 {
        let frames = (0..frame_count)
            .map(|i| StackFrame::new(format!("fn{i}"), "src/App.tsx", i + 1, 0))
            .collect::<Vec<_>>();
        let (mut console, calls) = recording_console();
        installer(Canned::new(frames)).install(&mut console);

        console.info(vec![LogValue::from(bundle_error("boom", "index.bundle"))]).await;

        let forwarded = calls_on(&calls, Channel::Info);
        let stack = forwarded[0][0].as_error().unwrap().stack.clone().unwrap();
        assert_eq!(stack.lines().count(), frame_count as usize + 1);
    }
}

#[tokio::test]
async fn test_non_error_arguments_are_untouched()
{
    let symbolicator = Canned::new(vec![StackFrame::new("foo", "App.tsx", 10, 4)]);
    let (mut console, calls) = recording_console();
    installer(symbolicator.clone()).install(&mut console);

    let args = vec![
        LogValue::from("text"),
        LogValue::from(42),
        LogValue::from(1.5),
        LogValue::from(true),
        LogValue::Null,
        LogValue::from(serde_json::json!({ "stack": "    at foo (a.js:1:1)" })),
        LogValue::from(ErrorValue::new("no stack")),
        LogValue::from(ErrorValue::new("empty stack").with_stack("")),
    ];
    console.debug(args.clone()).await;

    assert_eq!(calls_on(&calls, Channel::Debug), vec![args]);
    assert_eq!(symbolicator.calls(), 0);
}

#[tokio::test]
async fn test_argument_count_and_order_are_preserved()
{
    let (mut console, calls) = recording_console();
    installer(Arc::new(ByBundle)).install(&mut console);

    let args = vec![
        LogValue::from("before"),
        LogValue::from(bundle_error("first", "a.bundle")),
        LogValue::from(7),
        LogValue::from(bundle_error("second", "b.bundle")),
        LogValue::from("after"),
    ];
    console.log(args).await;

    let forwarded = calls_on(&calls, Channel::Log);
    assert_eq!(forwarded.len(), 1);
    let forwarded = &forwarded[0];
    assert_eq!(forwarded.len(), 5);
    assert_eq!(forwarded[0], LogValue::from("before"));
    assert_eq!(
        forwarded[1].as_error().unwrap().stack.as_deref(),
        Some("first\n    at resolved (src/a.bundle.tsx:7:3)")
    );
    assert_eq!(forwarded[2], LogValue::from(7));
    assert_eq!(
        forwarded[3].as_error().unwrap().stack.as_deref(),
        Some("second\n    at resolved (src/b.bundle.tsx:7:3)")
    );
    assert_eq!(forwarded[4], LogValue::from("after"));
}

#[tokio::test]
async fn test_slow_argument_does_not_reorder_output()
{
    let (mut console, calls) = recording_console();
    installer(Arc::new(ByBundle)).install(&mut console);

    console
        .error(vec![
            LogValue::from(bundle_error("slow", "slow.bundle")),
            LogValue::from(bundle_error("fast", "fast.bundle")),
        ])
        .await;

    let forwarded = calls_on(&calls, Channel::Error);
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0][0].as_error().unwrap().message, "slow");
    assert_eq!(
        forwarded[0][0].as_error().unwrap().stack.as_deref(),
        Some("slow\n    at slow (src/Slow.tsx:1:1)")
    );
    assert_eq!(forwarded[0][1].as_error().unwrap().message, "fast");
}

#[tokio::test]
async fn test_failure_is_contained_to_its_argument()
{
    let (mut console, calls) = recording_console();
    installer(Arc::new(ByBundle)).install(&mut console);

    let failing = bundle_error("broken", "fail.bundle");
    console
        .log(vec![
            LogValue::from(bundle_error("ok", "good.bundle")),
            LogValue::from(failing.clone()),
            LogValue::from("tail"),
        ])
        .await;

    let forwarded = calls_on(&calls, Channel::Log);
    assert_eq!(forwarded.len(), 1);
    assert_eq!(
        forwarded[0][0].as_error().unwrap().stack.as_deref(),
        Some("ok\n    at resolved (src/good.bundle.tsx:7:3)")
    );
    assert_eq!(forwarded[0][1], LogValue::from(failing));
    assert_eq!(forwarded[0][2], LogValue::from("tail"));

    // Exactly one diagnostic, on the original error channel, not on log
    let reports = calls_on(&calls, Channel::Error);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].len(), 2);
    assert_eq!(reports[0][0], LogValue::from(SYMBOLICATION_FAILURE_PREFIX));
    assert!(reports[0][1].as_error().unwrap().message.contains("dev server offline"));
}

#[tokio::test]
async fn test_report_precedes_forwarded_call()
{
    let (mut console, calls) = recording_console();
    installer(Arc::new(ByBundle)).install(&mut console);

    console.info(vec![LogValue::from(bundle_error("broken", "fail.bundle"))]).await;

    let order = calls.lock().unwrap().iter().map(|(channel, _)| *channel).collect::<Vec<_>>();
    assert_eq!(order, vec![Channel::Error, Channel::Info]);
}

#[tokio::test]
async fn test_panicking_symbolicator_is_reported()
{
    let (mut console, calls) = recording_console();
    installer(Arc::new(ByBundle)).install(&mut console);

    let error = bundle_error("boom", "panic.bundle");
    console.warn(vec![LogValue::from(error.clone())]).await;

    assert_eq!(calls_on(&calls, Channel::Warn), vec![vec![LogValue::from(error)]]);
    let reports = calls_on(&calls, Channel::Error);
    assert_eq!(reports.len(), 1);
    assert!(reports[0][1].as_error().unwrap().message.contains("symbolicator exploded"));
}

#[tokio::test]
async fn test_parse_failure_is_reported()
{
    let symbolicator = Canned::new(vec![StackFrame::new("foo", "App.tsx", 10, 4)]);
    let (mut console, calls) = recording_console();
    installer(symbolicator.clone()).install(&mut console);

    let error = ErrorValue::new("boom").with_stack("Error: boom\n    at foo (a.js:99999999999:1)");
    console.error(vec![LogValue::from(error.clone())]).await;

    let recorded = calls.lock().unwrap().clone();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].1[0], LogValue::from(SYMBOLICATION_FAILURE_PREFIX));
    assert!(recorded[0].1[1].as_error().unwrap().message.contains("Malformed stack frame on line 2"));
    assert_eq!(recorded[1].1, vec![LogValue::from(error)]);
    assert_eq!(symbolicator.calls(), 0);
}

#[tokio::test]
async fn test_custom_parser_is_used()
{
    let symbolicator = Canned::new(vec![StackFrame::new("foo", "App.tsx", 10, 4)]);
    let (mut console, calls) = recording_console();
    let parser = |_: &str| -> Result<ParsedStack, consym_core::error::StackParseError> { Ok(ParsedStack::default()) };
    installer(symbolicator.clone())
        .with_parser(Arc::new(parser))
        .install(&mut console);

    console.error(vec![LogValue::from(ErrorValue::new("x").with_stack("opaque engine format"))]).await;

    assert_eq!(symbolicator.calls(), 1);
    let forwarded = calls_on(&calls, Channel::Error);
    assert_eq!(forwarded[0][0].as_error().unwrap().stack.as_deref(), Some("x\n    at foo (App.tsx:10:4)"));
}

/// Blocks until two requests are in flight at the same time.
struct Rendezvous
{
    barrier: Barrier,
}

#[async_trait]
impl Symbolicator for Rendezvous
{
    async fn symbolicate(&self, _stack: &ParsedStack) -> Result<Symbolication, SymbolicateError>
    {
        self.barrier.wait().await;
        Ok(Symbolication::from_frames(vec![StackFrame::unlocated("together")]))
    }
}

#[tokio::test]
async fn test_arguments_are_symbolicated_concurrently()
{
    let (mut console, calls) = recording_console();
    installer(Arc::new(Rendezvous {
        barrier: Barrier::new(2),
    }))
    .install(&mut console);

    let call = console.error(vec![
        LogValue::from(bundle_error("a", "index.bundle")),
        LogValue::from(bundle_error("b", "index.bundle")),
    ]);
    tokio::time::timeout(Duration::from_secs(5), call)
        .await
        .expect("arguments were symbolicated one after another");

    let forwarded = calls_on(&calls, Channel::Error);
    assert_eq!(forwarded[0][1].as_error().unwrap().stack.as_deref(), Some("b\n    at together (unknown)"));
}

#[tokio::test]
async fn test_assert_arguments_pass_through()
{
    let (mut console, calls) = recording_console();
    installer(Canned::new(vec![StackFrame::new("foo", "App.tsx", 10, 4)])).install(&mut console);

    console
        .assert(vec![LogValue::from(false), LogValue::from(bundle_error("boom", "index.bundle"))])
        .await;

    let forwarded = calls_on(&calls, Channel::Assert);
    assert_eq!(forwarded[0][0], LogValue::from(false));
    assert_eq!(forwarded[0][1].as_error().unwrap().stack.as_deref(), Some("boom\n    at foo (App.tsx:10:4)"));
}

#[tokio::test]
async fn test_wrapped_call_can_be_spawned()
{
    let (mut console, calls) = recording_console();
    installer(Canned::new(vec![StackFrame::new("foo", "App.tsx", 10, 4)])).install(&mut console);

    let handle = tokio::spawn(console.error(vec![LogValue::from(bundle_error("boom", "index.bundle"))]));
    handle.await.unwrap();

    assert_eq!(calls_on(&calls, Channel::Error).len(), 1);
}
