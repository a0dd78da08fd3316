//! Conversion of usage grammar names into shell identifiers.

use thiserror::Error;

/// Errors that can occur while mangling a name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MangleError {
    #[error("cannot mangle '{0}': no identifier can be derived from it")]
    Ambiguous(String),

    #[error("cannot transform into a bash identifier: '{original}' => '{attempted}'")]
    InvalidIdentifier { original: String, attempted: String },
}

/// Check whether `s` is usable as a shell variable name.
///
/// Matches `^[A-Za-z_][0-9A-Za-z_]*$`.
pub fn is_shell_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Turn an option or placeholder name into a shell identifier.
///
/// `<key-word>` becomes `key_word`, `-v` becomes `v`, `--dry-run` becomes
/// `dry_run` and bare names pass through. A non-empty `prefix` is joined with
/// an underscore. The mapping is not injective; callers rendering several
/// names are responsible for detecting collisions.
pub fn mangle(name: &str, prefix: &str) -> Result<String, MangleError> {
    if name == "-" || name == "--" {
        return Err(MangleError::Ambiguous(name.to_string()));
    }

    let stem = if let Some(inner) = name.strip_prefix('<').and_then(|n| n.strip_suffix('>')) {
        inner
    } else if let Some(long) = name.strip_prefix("--") {
        long
    } else if is_short_option(name) {
        &name[1..]
    } else {
        name
    };

    let stem = stem.replace('-', "_");
    let identifier = if prefix.is_empty() {
        stem
    } else {
        format!("{}_{}", prefix, stem)
    };

    if !is_shell_identifier(&identifier) {
        return Err(MangleError::InvalidIdentifier {
            original: name.to_string(),
            attempted: identifier,
        });
    }

    Ok(identifier)
}

/// `-x` where `x` is a single character other than `-`.
fn is_short_option(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('-') && matches!(chars.next(), Some(c) if c != '-') && chars.next().is_none()
}
