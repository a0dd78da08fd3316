//! Shell source generation: parsed values, errors and help text.
//!
//! Everything written here is meant to be evaluated verbatim by the calling
//! shell, so every writer produces syntactically valid shell on its own.

use crate::mangle::{mangle, MangleError};
use crate::value::{to_shell, ParsedArguments, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use thiserror::Error;

/// Exit status placed in the shell text when the target arguments are invalid.
pub const USAGE_ERROR_STATUS: u8 = 64;

/// Errors that can occur while rendering parsed arguments.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Mangle(#[from] MangleError),

    #[error("'{first}' and '{second}' both map to the shell variable '{identifier}'")]
    Collision {
        identifier: String,
        first: String,
        second: String,
    },

    #[error("unsupported value for shell output: {0}")]
    Unsupported(String),

    #[error("{0} output is not supported yet")]
    NotSupported(&'static str),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// How parsed arguments are written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// A single JSON object.
    Json { pretty: bool },
    /// Declared but unimplemented.
    IniStub,
    /// Bash 4 associative array assignments.
    AssocArray { name: String, declare: bool },
    /// One global variable assignment per argument.
    GlobalVars { prefix: String, mangle: bool },
}

/// Statement used to leave the evaluated shell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellExit {
    /// Terminate the calling script.
    #[default]
    Exit,
    /// Leave the calling shell function.
    Return,
}

impl ShellExit {
    fn statement(self, status: u8) -> String {
        match self {
            ShellExit::Exit => format!("exit {}", status),
            ShellExit::Return => format!("return {}", status),
        }
    }
}

/// Escape a string for use between single quotes.
///
/// Each `'` becomes `'\''`. Applying this twice does not give the same result
/// as applying it once.
pub fn shell_quote(value: &str) -> String {
    value.replace('\'', r"'\''")
}

/// Render parsed arguments in the given mode.
pub fn render<W: Write + ?Sized>(
    out: &mut W,
    parsed: &ParsedArguments,
    mode: &OutputMode,
) -> Result<(), RenderError> {
    match mode {
        OutputMode::Json { pretty } => render_json(out, parsed, *pretty),
        OutputMode::IniStub => Err(RenderError::NotSupported("ini")),
        OutputMode::AssocArray { name, declare } => {
            out.write_all(render_assoc_string(parsed, name, *declare).as_bytes())?;
            Ok(())
        }
        OutputMode::GlobalVars { prefix, mangle } => {
            let text = render_globals_string(parsed, prefix, *mangle)?;
            out.write_all(text.as_bytes())?;
            Ok(())
        }
    }
}

fn render_json<W: Write + ?Sized>(
    out: &mut W,
    parsed: &ParsedArguments,
    pretty: bool,
) -> Result<(), RenderError> {
    let sorted: BTreeMap<&String, &Value> = parsed.iter().collect();
    let encoded = if pretty {
        serde_json::to_string_pretty(&sorted)?
    } else {
        serde_json::to_string(&sorted)?
    };
    out.write_all(encoded.as_bytes())?;
    Ok(())
}

fn sorted_keys(parsed: &ParsedArguments) -> Vec<&String> {
    let mut keys: Vec<_> = parsed.keys().collect();
    keys.sort();
    keys
}

/// Generate associative array assignments.
///
/// Lists are flattened into `name['key,i']` entries followed by a
/// `name['key,#']` length entry, which is also written for empty lists.
pub fn render_assoc_string(parsed: &ParsedArguments, name: &str, declare: bool) -> String {
    let mut output = String::new();

    if declare {
        output.push_str(&format!("declare -A {}\n", name));
    }

    for key in sorted_keys(parsed) {
        let quoted_key = shell_quote(key);
        match &parsed[key] {
            Value::StringList(items) => {
                for (index, item) in items.iter().enumerate() {
                    output.push_str(&format!(
                        "{}['{},{}']='{}'\n",
                        name,
                        quoted_key,
                        index,
                        shell_quote(item)
                    ));
                }
                output.push_str(&format!("{}['{},#']={}\n", name, quoted_key, items.len()));
            }
            value => {
                output.push_str(&format!("{}['{}']={}\n", name, quoted_key, to_shell(value)));
            }
        }
    }

    output
}

/// Generate global variable assignments.
///
/// Fails on the first name that cannot be mangled, or when two names mangle
/// to the same identifier. Nothing is produced in either case.
pub fn render_globals_string(
    parsed: &ParsedArguments,
    prefix: &str,
    mangle_keys: bool,
) -> Result<String, RenderError> {
    let mut output = String::new();
    let mut seen: HashMap<String, &str> = HashMap::new();

    for key in sorted_keys(parsed) {
        let identifier = if mangle_keys {
            mangle(key, prefix)?
        } else {
            key.clone()
        };

        if let Some(first) = seen.insert(identifier.clone(), key) {
            return Err(RenderError::Collision {
                identifier,
                first: first.to_string(),
                second: key.clone(),
            });
        }

        output.push_str(&format!("{}={}\n", identifier, to_shell(&parsed[key])));
    }

    Ok(output)
}

/// Write shell text that reports an error on stderr and stops the script.
pub fn write_error_script<W: Write + ?Sized>(
    out: &mut W,
    message: &str,
    usage: &str,
    exit: ShellExit,
) -> io::Result<()> {
    out.write_all(generate_error_string(message, usage, exit).as_bytes())
}

/// Generate the error shell text as a string.
pub fn generate_error_string(message: &str, usage: &str, exit: ShellExit) -> String {
    format!(
        "echo 'error: {}\n{}' >&2\n{}\n",
        shell_quote(message),
        shell_quote(usage),
        exit.statement(USAGE_ERROR_STATUS)
    )
}

/// Write shell text that prints help or version text and stops the script.
pub fn write_help_script<W: Write + ?Sized>(
    out: &mut W,
    text: &str,
    exit: ShellExit,
) -> io::Result<()> {
    out.write_all(generate_help_string(text, exit).as_bytes())
}

/// Generate the help shell text as a string.
pub fn generate_help_string(text: &str, exit: ShellExit) -> String {
    format!("echo '{}'\n{}\n", shell_quote(text), exit.statement(0))
}
