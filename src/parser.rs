//! Argument parsing for target scripts against their docopt usage text.

use crate::value::{ParsedArguments, Value};
use thiserror::Error;

/// Program name placed in front of the target argv.
///
/// docopt matches the usage patterns after the program name, so the actual
/// name makes no difference.
const PROGRAM_NAME: &str = "docopts";

/// The target arguments do not match the usage text, or the usage text is
/// itself malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// What went wrong, as reported by the engine.
    pub message: String,
    /// The usage text to show alongside the message.
    pub usage: String,
}

/// Outcome of parsing target arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Successfully parsed arguments.
    Success(ParsedArguments),
    /// The user asked for help; carries the text to display.
    Help(String),
    /// The user asked for the version; carries the text to display.
    Version(String),
}

/// Everything the engine needs for one parse.
#[derive(Debug, Clone, Copy)]
pub struct ParseRequest<'a> {
    pub usage: &'a str,
    pub argv: &'a [String],
    pub version: Option<&'a str>,
    /// Treat everything from the first positional onwards as positional.
    pub options_first: bool,
    /// Leave `--help` and `--version` to the target grammar.
    pub skip_help_flags: bool,
}

/// A usage grammar matcher.
pub trait UsageEngine {
    fn parse(&self, request: &ParseRequest<'_>) -> Result<ParseOutcome, ParseError>;
}

/// Matches arguments with the `docopt` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocoptEngine;

impl UsageEngine for DocoptEngine {
    fn parse(&self, request: &ParseRequest<'_>) -> Result<ParseOutcome, ParseError> {
        let parser = docopt::Docopt::new(request.usage).map_err(|err| ParseError {
            message: err.to_string(),
            usage: request.usage.to_string(),
        })?;

        let version = if request.skip_help_flags {
            None
        } else {
            request.version.map(str::to_string)
        };

        let argv = std::iter::once(PROGRAM_NAME).chain(request.argv.iter().map(String::as_str));
        let parser = parser
            .argv(argv)
            .options_first(request.options_first)
            .help(!request.skip_help_flags)
            .version(version);

        match parser.parse() {
            Ok(matched) => Ok(ParseOutcome::Success(collect_values(&matched))),
            Err(err) => classify(err, request.usage),
        }
    }
}

fn collect_values(matched: &docopt::ArgvMap) -> ParsedArguments {
    matched
        .map
        .keys()
        .filter_map(|key| matched.find(key).map(|value| (key.clone(), convert(value))))
        .collect()
}

fn convert(value: &docopt::Value) -> Value {
    match value {
        docopt::Value::Switch(b) => Value::Boolean(*b),
        docopt::Value::Counted(n) => Value::Integer(*n),
        docopt::Value::Plain(Some(s)) => Value::String(s.clone()),
        docopt::Value::Plain(None) => Value::Absent,
        docopt::Value::List(items) => Value::StringList(items.clone()),
    }
}

/// Sort docopt's failures into help requests and real errors.
fn classify(err: docopt::Error, usage: &str) -> Result<ParseOutcome, ParseError> {
    match err {
        docopt::Error::Help => Ok(ParseOutcome::Help(usage.trim().to_string())),
        docopt::Error::Version(text) => Ok(ParseOutcome::Version(text)),
        docopt::Error::WithProgramUsage(inner, text) => match *inner {
            docopt::Error::Help => Ok(ParseOutcome::Help(text.trim().to_string())),
            docopt::Error::Version(version) => Ok(ParseOutcome::Version(version)),
            other => Err(ParseError {
                message: other.to_string(),
                usage: text.trim().to_string(),
            }),
        },
        other => Err(ParseError {
            message: other.to_string(),
            usage: usage.trim().to_string(),
        }),
    }
}
