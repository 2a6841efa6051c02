use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use consym_core::parser::{DefaultStackParser, StackParser};
use consym_core::symbolicate::DevServerSymbolicator;
use consym_core::types::{ErrorValue, LogValue};
use consym_core::{Channel, Config, Console, ConsymResult, Installer, Mode};
use consym_utils::{debug, init_logging};

/// Symbolicate error stacks logged through console channels back to original source positions.
#[derive(Parser, Debug)]
#[command(name = "consym")]
#[command(version)]
#[command(about = "Symbolicate error stacks back to original source positions", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Log a raw error stack through a symbolicated console channel
    Symbolicate
    {
        /// File holding the raw stack (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Error message (defaults to the message in the stack's first line)
        #[arg(short, long)]
        message: Option<String>,
        /// Channel to log through
        #[arg(short, long, default_value_t = Channel::Error)]
        channel: Channel,
        /// Drop frames from node_modules/react-native
        #[arg(long, default_value_t = false)]
        exclude_core_frames: bool,
        /// Development server base URL (overrides CONSYM_DEV_SERVER_URL)
        #[arg(long)]
        server: Option<String>,
    },
    /// Print the bundle frames of a raw stack as JSON
    Parse
    {
        /// File holding the raw stack (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main()
{
    // Reads RUST_LOG, CONSYM_LOG_FORMAT and CONSYM_LOG_FILE
    let _guard = match init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    match cli.command {
        Commands::Symbolicate {
            file,
            message,
            channel,
            exclude_core_frames,
            server,
        } => {
            let mut config = Config::from_env()?;
            if let Some(server) = server {
                config.dev_server_url = server;
            }
            config.options.exclude_react_native_core_frames |= exclude_core_frames;

            let stack = read_stack(file.as_ref())?;
            let error = error_from_stack(&stack, message);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(symbolicate(&config, channel, error))?;
            Ok(())
        }
        Commands::Parse { file } => {
            let stack = read_stack(file.as_ref())?;
            let parsed = DefaultStackParser.parse(&stack)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
            Ok(())
        }
    }
}

/// Install onto a stdio console and log `error` through `channel`.
///
/// The CLI always installs: it exists to symbolicate, whatever the build mode.
async fn symbolicate(config: &Config, channel: Channel, error: ErrorValue) -> ConsymResult<()>
{
    let symbolicator = DevServerSymbolicator::new(&config.dev_server_url)?;
    debug!(endpoint = symbolicator.endpoint(), %channel, "Symbolicating stack");

    let mut console = Console::stdio();
    Installer::new(Arc::new(symbolicator))
        .with_mode(Mode::Development)
        .with_options(config.options)
        .install(&mut console);

    let args = match channel {
        // assert only prints when its condition is falsy
        Channel::Assert => vec![LogValue::from(false), LogValue::from(error)],
        _ => vec![LogValue::from(error)],
    };
    console.call(channel, args).await;
    Ok(())
}

fn read_stack(file: Option<&PathBuf>) -> ConsymResult<String>
{
    let stack = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(stack.trim_end().to_string())
}

/// Build the logged error, taking name and message from a `"Name: message"` header line.
fn error_from_stack(stack: &str, message: Option<String>) -> ErrorValue
{
    let header = stack.lines().next().unwrap_or_default().trim();
    let (name, header_message) = match header.split_once(": ") {
        Some((name, rest)) if !name.is_empty() && !name.contains(char::is_whitespace) => (name, rest),
        _ => ("Error", ""),
    };

    ErrorValue::new(message.unwrap_or_else(|| header_message.to_string()))
        .named(name)
        .with_stack(stack)
}
