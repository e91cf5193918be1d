//! Output formatters.
//!
//! Renders emitted values for JSON, text, and pretty output modes.

use anyhow::Result;
use colored::Colorize;
use loc_core::cli::OutputFormat;
use serde::Serialize;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use loc_cli::formatters::format_output;
/// use loc_core::cli::OutputFormat;
/// use serde_json::json;
///
/// let output = format_output(&json!({"GeofenceId": "depot"}), OutputFormat::Json)?;
/// assert_eq!(output, r#"{"GeofenceId":"depot"}"#);
///
/// let output = format_output(&json!("fleet-A"), OutputFormat::Text)?;
/// assert_eq!(output, "fleet-A");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as compact JSON, one document per line.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize, json};
    use serde_json::Value;

    /// Format data as plain text.
    ///
    /// Strings print without quotes and lists of scalars print one item per
    /// line, so output can be fed to other commands. Anything else falls
    /// back to compact JSON.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        match &value {
            Value::Array(items) if items.iter().all(is_scalar) => {
                Ok(items.iter().map(scalar).collect::<Vec<_>>().join("\n"))
            }
            v if is_scalar(v) => Ok(scalar(v)),
            _ => json::format(&value),
        }
    }

    fn is_scalar(value: &Value) -> bool {
        !matches!(value, Value::Array(_) | Value::Object(_))
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize};

    /// Format data as colorized, human-readable output.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        Ok(format_value(&value, 0))
    }

    /// Recursively format a JSON value with colors and indentation.
    fn format_value(value: &serde_json::Value, indent: usize) -> String {
        use serde_json::Value;

        let indent_str = "  ".repeat(indent);
        let next_indent_str = "  ".repeat(indent + 1);

        match value {
            Value::Null => "null".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => format!("\"{}\"", s.green()),
            Value::Array(arr) => {
                if arr.is_empty() {
                    return "[]".to_string();
                }

                let items: Vec<String> = arr
                    .iter()
                    .map(|item| format!("{next_indent_str}{}", format_value(item, indent + 1)))
                    .collect();
                format!("[\n{}\n{indent_str}]", items.join(",\n"))
            }
            Value::Object(obj) => {
                if obj.is_empty() {
                    return "{}".to_string();
                }

                let entries: Vec<String> = obj
                    .iter()
                    .map(|(key, val)| {
                        format!(
                            "{next_indent_str}\"{}\": {}",
                            key.blue().bold(),
                            format_value(val, indent + 1)
                        )
                    })
                    .collect();
                format!("{{\n{}\n{indent_str}}}", entries.join(",\n"))
            }
        }
    }
}
