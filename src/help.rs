//! Usage and version text: resolving it for target scripts, and docopts' own.

use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Argument value meaning "read this text from standard input".
pub const STDIN_MARKER: &str = "-";

/// Default separator between usage and version text on standard input.
pub const DEFAULT_SEPARATOR: &str = "----";

/// Errors that can occur while resolving usage or version text.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("failed to read standard input: {0}")]
    Stdin(#[source] io::Error),

    #[error("help + version on standard input: expected exactly 2 blocks, got {blocks}{detail}")]
    Split { blocks: usize, detail: String },

    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no 'Usage:' header found in '{0}'")]
    NoUsage(PathBuf),
}

/// Usage and version text of the target script, ready for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSpec {
    pub usage: String,
    pub version: Option<String>,
}

/// Resolve usage and version text, reading standard input where an argument
/// is [`STDIN_MARKER`].
///
/// When both are read from standard input, the input is split on
/// `separator` and must yield exactly two blocks, usage first. All text is
/// trimmed, and an empty version counts as no version.
pub fn resolve_usage<R: Read + ?Sized>(
    usage: &str,
    version: Option<&str>,
    separator: &str,
    stdin: &mut R,
    debug: bool,
) -> Result<UsageSpec, UsageError> {
    let usage_from_stdin = usage == STDIN_MARKER;
    let version_from_stdin = version == Some(STDIN_MARKER);

    let (usage, version) = match (usage_from_stdin, version_from_stdin) {
        (true, true) => {
            let input = read_all(stdin)?;
            let blocks: Vec<&str> = input.split(separator).collect();
            if blocks.len() != 2 {
                let detail = if debug {
                    format!(" (separator is '{}')", separator)
                } else {
                    String::new()
                };
                return Err(UsageError::Split {
                    blocks: blocks.len(),
                    detail,
                });
            }
            (blocks[0].to_string(), Some(blocks[1].to_string()))
        }
        (true, false) => (read_all(stdin)?, version.map(str::to_string)),
        (false, true) => (usage.to_string(), Some(read_all(stdin)?)),
        (false, false) => (usage.to_string(), version.map(str::to_string)),
    };

    Ok(UsageSpec {
        usage: usage.trim().to_string(),
        version: version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    })
}

fn read_all<R: Read + ?Sized>(stdin: &mut R) -> Result<String, UsageError> {
    let mut input = String::new();
    stdin
        .read_to_string(&mut input)
        .map_err(UsageError::Stdin)?;
    Ok(input)
}

fn usage_header() -> &'static Regex {
    static USAGE_HEADER: OnceLock<Regex> = OnceLock::new();
    USAGE_HEADER.get_or_init(|| {
        Regex::new(r"^(#?\s*)(?i:usage):").expect("usage header pattern is valid")
    })
}

/// Extract the usage text from the comment header of a script.
///
/// Collection starts at the first line matching `Usage:` (optionally behind a
/// `#` comment marker) and stops at the first blank line. The width of the
/// comment prefix on the `Usage:` line is stripped from every collected line.
pub fn usage_from_file(path: &Path) -> Result<String, UsageError> {
    let file = File::open(path).map_err(|source| UsageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let lines = usage_from_reader(BufReader::new(file)).map_err(|source| UsageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match lines {
        Some(lines) => Ok(lines.join("\n")),
        None => Err(UsageError::NoUsage(path.to_path_buf())),
    }
}

/// Collect the usage block from a line reader; `None` when there is no header.
pub fn usage_from_reader<R: BufRead>(reader: R) -> io::Result<Option<Vec<String>>> {
    let mut prefix_len: Option<usize> = None;
    let mut lines = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let prefix = match prefix_len {
            Some(len) => len,
            None => match usage_header().captures(&line) {
                Some(caps) => {
                    let len = caps.get(1).map_or(0, |m| m.as_str().chars().count());
                    prefix_len = Some(len);
                    len
                }
                None => continue,
            },
        };

        if line.trim().is_empty() {
            break;
        }
        lines.push(line.chars().skip(prefix).collect());
    }

    Ok(prefix_len.map(|_| lines))
}

/// Version text printed by `docopts --version`.
pub fn generate_version() -> String {
    format!(
        "docopts {} - with JSON support\n\
         License MIT <http://opensource.org/licenses/MIT>.\n\
         This is free software: you are free to change and redistribute it.\n\
         There is NO WARRANTY, to the extent permitted by law.",
        env!("CARGO_PKG_VERSION")
    )
}
