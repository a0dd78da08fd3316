//! docopts' own command line and the output configuration derived from it.

use crate::help::DEFAULT_SEPARATOR;
use crate::mangle::is_shell_identifier;
use crate::output::{OutputMode, ShellExit};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

/// Errors in docopts' own arguments that clap cannot detect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("-A switch: not a valid Bash identifier: '{0}'")]
    InvalidAssocName(String),

    #[error("-A and -G cannot be used together")]
    ConflictingModes,

    #[error("missing ':' before the arguments to parse")]
    MissingColon,
}

/// Shell interface for docopt, the command-line interface description language.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "docopts",
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true,
    override_usage = "docopts [OPTIONS] -h <msg> : [<argv>...]\n       docopts [OPTIONS] <COMMAND>",
    after_help = "Without a value, -h and -V print docopts' own help and version."
)]
pub struct Cli {
    /// The help message in docopt format; - reads it from standard input
    #[arg(short = 'h', long = "help", value_name = "msg", num_args = 0..=1)]
    pub help: Option<Option<String>>,

    /// A version message; - reads it from standard input, after the help
    /// message when both are read from there
    #[arg(short = 'V', long = "version", value_name = "msg", num_args = 0..=1)]
    pub version: Option<Option<String>>,

    /// Separates the help message from the version message on standard input
    #[arg(short = 's', long, value_name = "str", default_value = DEFAULT_SEPARATOR, global = true)]
    pub separator: String,

    /// Treat every argument from the first positional onwards as positional
    #[arg(short = 'O', long, global = true)]
    pub options_first: bool,

    /// Don't handle --help and --version specially
    #[arg(short = 'H', long, global = true)]
    pub no_help: bool,

    /// Output a Bash 4 associative array called <name>
    #[arg(short = 'A', value_name = "name", global = true)]
    pub assoc_name: Option<String>,

    /// Output global variables named <prefix>_<option>
    #[arg(short = 'G', value_name = "prefix", global = true)]
    pub global_prefix: Option<String>,

    /// Keep full option names as variable names (not suitable for eval)
    #[arg(long, global = true)]
    pub no_mangle: bool,

    /// Don't output 'declare -A <name>' (with -A)
    #[arg(long, global = true)]
    pub no_declare: bool,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use 'return' instead of 'exit' in generated shell code
    #[arg(long, global = true)]
    pub function: bool,

    /// Log parsing details on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub action: Option<Action>,
}

/// Actions other than the default `-h <msg> : [<argv>...]` form.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Parse arguments and output JSON (shortcut for --json -h <msg>)
    Parse {
        /// Usage text in docopt format, or - for standard input
        #[arg(value_name = "msg")]
        msg: String,

        /// Arguments to parse
        #[arg(last = true, value_name = "argv")]
        argv: Vec<String>,
    },

    /// Print the value of <arg_name> from DOCOPTS_JSON
    Get {
        #[arg(value_name = "arg_name", allow_hyphen_values = true)]
        arg_name: String,
    },

    /// Print all keys from DOCOPTS_JSON
    GetKeys,

    /// Parse arguments against the usage header of <filename>
    AutoParse {
        /// Script whose comment header holds the usage text
        #[arg(value_name = "filename")]
        filename: PathBuf,

        /// Arguments to parse
        #[arg(last = true, value_name = "argv")]
        argv: Vec<String>,
    },

    /// Merge DOCOPTS_JSON with values from a config file and output JSON
    Merge {
        format: StoreFormat,

        #[arg(value_name = "config_file")]
        config_file: PathBuf,
    },

    /// Output DOCOPTS_JSON in the given format
    Dump { format: StoreFormat },

    /// Output shell code reporting an error, suitable for eval
    Fail {
        /// Error message
        #[arg(value_name = "message")]
        message: Option<String>,
    },
}

/// File formats understood by `merge` and `dump`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Ini,
    Json,
}

impl Cli {
    /// Select the output mode for parsed target arguments.
    pub fn output_mode(&self) -> Result<OutputMode, ConfigError> {
        if self.assoc_name.is_some() && self.global_prefix.is_some() {
            return Err(ConfigError::ConflictingModes);
        }

        if self.json || matches!(self.action, Some(Action::Parse { .. })) {
            return Ok(OutputMode::Json { pretty: false });
        }

        if let Some(ref name) = self.assoc_name {
            if !is_shell_identifier(name) {
                return Err(ConfigError::InvalidAssocName(name.clone()));
            }
            return Ok(OutputMode::AssocArray {
                name: name.clone(),
                declare: !self.no_declare,
            });
        }

        if let Some(ref prefix) = self.global_prefix {
            return Ok(OutputMode::GlobalVars {
                prefix: prefix.clone(),
                mangle: !self.no_mangle,
            });
        }

        match self.action {
            Some(Action::AutoParse { .. }) => Ok(OutputMode::Json { pretty: false }),
            _ => Ok(OutputMode::GlobalVars {
                prefix: String::new(),
                mangle: !self.no_mangle,
            }),
        }
    }

    /// How generated shell code leaves the calling script.
    pub fn shell_exit(&self) -> ShellExit {
        if self.function {
            ShellExit::Return
        } else {
            ShellExit::Exit
        }
    }

    /// The `-h` value, if one was given.
    pub fn usage_arg(&self) -> Option<&str> {
        self.help.as_ref().and_then(|h| h.as_deref())
    }

    /// The `-V` value, if one was given.
    pub fn version_arg(&self) -> Option<&str> {
        self.version.as_ref().and_then(|v| v.as_deref())
    }

    /// `-h` was given without a value.
    pub fn wants_own_help(&self) -> bool {
        matches!(self.help, Some(None))
    }

    /// `-V` was given without a value.
    pub fn wants_own_version(&self) -> bool {
        matches!(self.version, Some(None))
    }
}
