//! docopts - docopt argument parsing for shell scripts.
//!
//! This library parses a script's arguments against its docopt usage text
//! and writes the result as shell source (global variables or an associative
//! array) or JSON, ready for the calling shell to `eval`. Errors and help
//! requests are written as shell source too, so the caller always gets
//! something it can evaluate.

pub mod config;
pub mod help;
pub mod mangle;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod value;

pub use config::{Action, Cli, ConfigError, StoreFormat};
pub use help::{generate_version, resolve_usage, usage_from_file, UsageError, UsageSpec};
pub use mangle::{is_shell_identifier, mangle, MangleError};
pub use output::{render, shell_quote, OutputMode, RenderError, ShellExit};
pub use parser::{DocoptEngine, ParseError, ParseOutcome, ParseRequest, UsageEngine};
pub use pipeline::{run, Exit, Invocation, Streams};
pub use store::{JsonStore, StoreError, STORE_VAR};
pub use value::{ParsedArguments, Value};
