//! # Installer
//!
//! Replaces the six channel slots of a [`Console`] with symbolicating
//! wrappers.
//!
//! Installation is a guarded, one-time operation per console: the first
//! successful install marks the console as symbolicated and any later call
//! is a no-op. Without the guard a second install would capture the wrappers
//! as "originals" and every error would be symbolicated twice.
//!
//! In [`Mode::Production`] nothing is touched at all.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use consym_core::config::{Mode, SymbolicatorOptions};
//! use consym_core::console::Console;
//! use consym_core::install::Installer;
//! use consym_core::symbolicate::DevServerSymbolicator;
//!
//! let symbolicator = DevServerSymbolicator::new("http://localhost:8081")?;
//! let mut console = Console::stdio();
//!
//! Installer::new(Arc::new(symbolicator))
//!     .with_mode(Mode::Development)
//!     .with_options(SymbolicatorOptions {
//!         exclude_react_native_core_frames: true,
//!     })
//!     .install(&mut console);
//! # Ok::<(), consym_core::error::SymbolicateError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use crate::channel::Channel;
use crate::config::{Config, Mode, SymbolicatorOptions};
use crate::console::Console;
use crate::parser::{DefaultStackParser, StackParser};
use crate::pipeline::SymbolicatedChannel;
use crate::symbolicate::{DevServerSymbolicator, Symbolicator};

/// Configured installer.
pub struct Installer
{
    mode: Mode,
    options: SymbolicatorOptions,
    symbolicator: Arc<dyn Symbolicator>,
    parser: Arc<dyn StackParser>,
}

impl Installer
{
    /// Installer using `symbolicator`, the default parser, default options,
    /// and the mode of the running build.
    pub fn new(symbolicator: Arc<dyn Symbolicator>) -> Self
    {
        Self {
            mode: Mode::current(),
            options: SymbolicatorOptions::default(),
            symbolicator,
            parser: Arc::new(DefaultStackParser),
        }
    }

    /// Use a different stack parser.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn StackParser>) -> Self
    {
        self.parser = parser;
        self
    }

    /// Set installer options.
    #[must_use]
    pub fn with_options(mut self, options: SymbolicatorOptions) -> Self
    {
        self.options = options;
        self
    }

    /// Override the build mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self
    {
        self.mode = mode;
        self
    }

    /// Replace every channel slot of `console` with a symbolicating wrapper.
    ///
    /// Each wrapper closes over its slot's previous binding and over the
    /// previous `error` binding, which serves as the fallback logger for all
    /// six channels. Does nothing in production mode or if `console` was
    /// already symbolicated.
    pub fn install(&self, console: &mut Console)
    {
        if !self.mode.is_development() {
            tracing::debug!(mode = %self.mode, "Skipping console symbolication outside development mode");
            return;
        }

        if console.is_symbolicated() {
            tracing::warn!("Console symbolicator is already installed; ignoring repeated install");
            return;
        }

        // Capture every original before any slot is rebound
        let originals = Channel::ALL.map(|channel| console.get(channel).clone());
        let fallback = originals[Channel::Error.index()].clone();

        for (channel, original) in Channel::ALL.into_iter().zip(originals) {
            let wrapper = SymbolicatedChannel::new(
                channel,
                original,
                fallback.clone(),
                Arc::clone(&self.symbolicator),
                Arc::clone(&self.parser),
                &self.options,
            );
            console.replace(channel, wrapper.into_channel_fn());
        }

        console.mark_symbolicated();
        tracing::debug!(
            exclude_react_native_core_frames = self.options.exclude_react_native_core_frames,
            "Installed console symbolicator"
        );
    }
}

impl fmt::Debug for Installer
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Installer")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Install a symbolicator talking to the default development server.
///
/// Uses [`Mode::current`] and [`DefaultStackParser`]. If the HTTP client
/// cannot be created the console is left untouched.
pub fn install_console_symbolicator(console: &mut Console, options: SymbolicatorOptions)
{
    let config = Config {
        options,
        ..Config::default()
    };
    install_from_config(console, &config);
}

/// Install using a full [`Config`], e.g. one loaded with [`Config::from_env`].
///
/// If the HTTP client cannot be created the console is left untouched.
pub fn install_from_config(console: &mut Console, config: &Config)
{
    if !config.mode().is_development() {
        return;
    }

    match DevServerSymbolicator::new(&config.dev_server_url) {
        Ok(symbolicator) => Installer::new(Arc::new(symbolicator))
            .with_mode(config.mode())
            .with_options(config.options)
            .install(console),
        Err(err) => {
            tracing::error!(error = %err, "Failed to create dev server client; console symbolication disabled");
        }
    }
}
