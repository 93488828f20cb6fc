//! A fast, pluggable status line for Claude Code.
//!
//! `ccsl` reads the JSON context Claude Code pipes in on every refresh and
//! prints a single styled line built from [`ccsl_core`] segments. This
//! crate supplies the pieces around the core pipeline: the builtin
//! producers, TOML configuration, logging, and the `doctor` and `setup`
//! subcommands.
//!
//! # Library usage
//!
//! ```ignore
//! use ccsl::builtins::BuiltinsExt;
//! use ccsl_core::prelude::*;
//!
//! let loaded = ccsl::config::load();
//! let line = ccsl::statusline::render(loaded.config.into(), payload).await;
//! println!("{line}");
//! ```
//!
//! # Binaries
//!
//! ```sh
//! # What Claude Code runs
//! echo '{"model":{"display_name":"Opus"}}' | ccsl
//!
//! # Inspect timings, cache and logs against a fixture
//! ccsl doctor --json fixture.json --no-ansi
//!
//! # Add the ccusage segment after git
//! ccsl setup --enable-ccusage --token-limit max
//! ```
//!
//! `ccsl-ccusage` is a separate external producer that wraps the
//! `ccusage statusline` command.

pub mod builtins;
pub mod config;
pub mod doctor;
pub mod logging;
pub mod setup;
pub mod statusline;

pub use builtins::BuiltinsExt;
pub use config::{ConfigError, Loaded};
