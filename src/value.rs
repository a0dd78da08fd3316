//! Parsed argument values and their rendering as shell literals.

use crate::output::{shell_quote, RenderError};
use serde::Serialize;
use std::collections::HashMap;

/// Mapping from usage grammar names (`--flag`, `-f`, `<name>`, `ARG`) to values.
///
/// Iteration order carries no meaning. Renderers that need a stable line
/// order sort the keys themselves.
pub type ParsedArguments = HashMap<String, Value>;

/// A single value produced by the usage engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A switch or command (e.g., --verbose)
    Boolean(bool),
    /// A repeat count (e.g., -vvv)
    Integer(u64),
    /// An option argument or positional
    String(String),
    /// A repeatable option or positional, in command-line order
    StringList(Vec<String>),
    /// An option or positional that was not given
    Absent,
}

/// Render a value as the right-hand side of a shell assignment.
///
/// Strings are single-quoted, booleans and integers are bare words, lists
/// become a parenthesized array literal and absent values render as nothing.
pub fn to_shell(value: &Value) -> String {
    match value {
        Value::Boolean(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::String(s) => quoted(s),
        Value::StringList(items) => {
            let items: Vec<String> = items.iter().map(|s| quoted(s)).collect();
            format!("({})", items.join(" "))
        }
        Value::Absent => String::new(),
    }
}

/// Render a value decoded from stored JSON.
///
/// Stored JSON has lost the typing of [`Value`], so arrays are printed as
/// their elements joined with newlines. Floats, objects and nested arrays
/// have no shell rendering.
pub fn json_to_shell(value: &serde_json::Value) -> Result<String, RenderError> {
    match value {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Number(n) => integer_text(n).ok_or_else(|| unsupported(value)),
        serde_json::Value::String(s) => Ok(quoted(s)),
        serde_json::Value::Array(items) => {
            let mut lines = Vec::with_capacity(items.len());
            for item in items {
                let line = match item {
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Number(n) => {
                        integer_text(n).ok_or_else(|| unsupported(item))?
                    }
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        return Err(unsupported(item))
                    }
                };
                lines.push(line);
            }
            Ok(lines.join("\n"))
        }
        serde_json::Value::Object(_) => Err(unsupported(value)),
    }
}

fn quoted(s: &str) -> String {
    format!("'{}'", shell_quote(s))
}

fn integer_text(n: &serde_json::Number) -> Option<String> {
    if let Some(u) = n.as_u64() {
        Some(u.to_string())
    } else {
        n.as_i64().map(|i| i.to_string())
    }
}

fn unsupported(value: &serde_json::Value) -> RenderError {
    RenderError::Unsupported(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_shell_string() {
        assert_eq!(to_shell(&Value::String("pipo".into())), "'pipo'");
    }

    #[test]
    fn test_to_shell_string_with_quotes() {
        assert_eq!(
            to_shell(&Value::String("i''i".into())),
            "'i'\\'''\\''i'"
        );
    }

    #[test]
    fn test_to_shell_empty_string() {
        assert_eq!(to_shell(&Value::String(String::new())), "''");
    }

    #[test]
    fn test_to_shell_integer() {
        assert_eq!(to_shell(&Value::Integer(123)), "123");
    }

    #[test]
    fn test_to_shell_boolean() {
        assert_eq!(to_shell(&Value::Boolean(true)), "true");
        assert_eq!(to_shell(&Value::Boolean(false)), "false");
    }

    #[test]
    fn test_to_shell_absent() {
        assert_eq!(to_shell(&Value::Absent), "");
    }

    #[test]
    fn test_to_shell_list() {
        let list = Value::StringList(vec!["pipo".into(), "molo".into()]);
        assert_eq!(to_shell(&list), "('pipo' 'molo')");
    }

    #[test]
    fn test_to_shell_empty_list() {
        assert_eq!(to_shell(&Value::StringList(vec![])), "()");
    }

    #[test]
    fn test_to_shell_list_escapes_elements() {
        let list = Value::StringList(vec!["it's".into(), "".into()]);
        assert_eq!(to_shell(&list), "('it'\\''s' '')");
    }

    #[test]
    fn test_value_serializes_as_plain_json() {
        let encoded = serde_json::to_string(&vec![
            Value::Boolean(true),
            Value::Integer(2),
            Value::String("x".into()),
            Value::StringList(vec!["a".into()]),
            Value::Absent,
        ])
        .unwrap();
        assert_eq!(encoded, r#"[true,2,"x",["a"],null]"#);
    }

    #[test]
    fn test_json_to_shell_scalars() {
        assert_eq!(json_to_shell(&json!(true)).unwrap(), "true");
        assert_eq!(json_to_shell(&json!(3)).unwrap(), "3");
        assert_eq!(json_to_shell(&json!(-3)).unwrap(), "-3");
        assert_eq!(json_to_shell(&json!("a'b")).unwrap(), "'a'\\''b'");
        assert_eq!(json_to_shell(&json!(null)).unwrap(), "");
    }

    #[test]
    fn test_json_to_shell_array_joins_lines() {
        let value = json!(["pipo", 2, true, null]);
        assert_eq!(json_to_shell(&value).unwrap(), "pipo\n2\ntrue\n");
    }

    #[test]
    fn test_json_to_shell_rejects_float() {
        let result = json_to_shell(&json!(1.5));
        assert!(matches!(result, Err(RenderError::Unsupported(_))));
    }

    #[test]
    fn test_json_to_shell_rejects_object() {
        let result = json_to_shell(&json!({"a": 1}));
        assert!(matches!(result, Err(RenderError::Unsupported(_))));
    }

    #[test]
    fn test_json_to_shell_rejects_nested_array() {
        let result = json_to_shell(&json!([["a"]]));
        assert!(matches!(result, Err(RenderError::Unsupported(_))));
    }
}
