//! Static parameter declarations.
//!
//! Each cmdlet declares its parameters as a `static` slice of
//! [`ParameterDescriptor`] values built with `const` builder methods:
//!
//! ```
//! use loc_core::{ParameterDescriptor, ParameterType};
//!
//! static PARAMETERS: &[ParameterDescriptor] = &[
//!     ParameterDescriptor::new("CollectionName", ParameterType::String)
//!         .position(0)
//!         .from_pipeline()
//!         .required(),
//!     ParameterDescriptor::new("MaxResult", ParameterType::Integer)
//!         .aliases(&["MaxResults"])
//!         .range(1, 100),
//! ];
//!
//! assert!(PARAMETERS[0].matches("collectionname"));
//! assert!(PARAMETERS[1].matches("MaxResults"));
//! ```

use crate::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// A single string.
    String,
    /// A signed 64-bit integer.
    Integer,
    /// A list of strings.
    StringList,
    /// A boolean switch.
    Switch,
}

impl ParameterType {
    /// Returns the display name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::StringList => "string[]",
            Self::Switch => "switch",
        }
    }

    /// Converts a raw value into this type's canonical JSON shape.
    ///
    /// `null` is passed through untouched; null handling is a validation
    /// concern of the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] when the value cannot represent
    /// this type.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::ParameterType;
    /// use serde_json::json;
    ///
    /// let value = ParameterType::Integer.coerce("MaxResult", json!("50")).unwrap();
    /// assert_eq!(value, json!(50));
    ///
    /// let value = ParameterType::StringList.coerce("GeofenceId", json!("g1")).unwrap();
    /// assert_eq!(value, json!(["g1"]));
    /// ```
    pub fn coerce(&self, field: &str, value: Value) -> Result<Value> {
        let mismatch = |value: &Value| Error::ValidationError {
            field: field.to_string(),
            reason: format!("cannot convert {value} to {}", self.as_str()),
        };

        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),

            (Self::String, Value::String(s)) => Ok(Value::String(s)),
            (Self::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),

            (Self::Integer, Value::Number(n)) => n
                .as_i64()
                .map(Value::from)
                .ok_or_else(|| mismatch(&Value::Number(n))),
            (Self::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| mismatch(&Value::String(s))),

            (Self::StringList, Value::Array(items)) => items
                .into_iter()
                .map(|item| match Self::String.coerce(field, item)? {
                    Value::Null => Err(Error::ValidationError {
                        field: field.to_string(),
                        reason: "list elements cannot be null".to_string(),
                    }),
                    other => Ok(other),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            (Self::StringList, scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                Ok(Value::Array(vec![Self::String.coerce(field, scalar)?]))
            }

            (Self::Switch, Value::Bool(b)) => Ok(Value::Bool(b)),
            (Self::Switch, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(mismatch(&Value::String(s))),
            },

            (_, other) => Err(mismatch(&other)),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default bound when no source supplies a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// String default
    Str(&'static str),
    /// Integer default
    Int(i64),
    /// Switch default
    Bool(bool),
}

impl DefaultValue {
    /// Converts the default to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Str(s) => Value::String((*s).to_string()),
            Self::Int(i) => Value::from(*i),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Where a bound value came from.
///
/// Variants are ordered from highest to lowest binding priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingSource {
    /// An explicit `--Name value` flag.
    Flag,
    /// A same-named property of the pipeline input object.
    PipelineByPropertyName,
    /// The pipeline input value itself.
    PipelineByValue,
    /// A positional argument.
    Positional,
    /// The descriptor's default value.
    Default,
}

impl BindingSource {
    /// Returns a short display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::PipelineByPropertyName => "pipeline-by-property-name",
            Self::PipelineByValue => "pipeline-by-value",
            Self::Positional => "positional",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static declaration of one cmdlet parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// Canonical parameter name, e.g. `CollectionName`.
    pub name: &'static str,
    /// Alternative names accepted for flags and pipeline properties.
    pub aliases: &'static [&'static str],
    /// Value type.
    pub kind: ParameterType,
    /// Positional index, if the parameter can be bound positionally.
    pub position: Option<usize>,
    /// Whether the whole pipeline value can bind to this parameter.
    pub pipeline_by_value: bool,
    /// Whether a same-named pipeline property can bind to this parameter.
    pub pipeline_by_property_name: bool,
    /// Whether the service requires this parameter.
    pub required: bool,
    /// Whether an empty string or empty list is accepted.
    pub allow_empty: bool,
    /// Whether an explicit `null` is accepted.
    pub allow_null: bool,
    /// Value bound when no source supplies one.
    pub default: Option<DefaultValue>,
    /// Inclusive range for integer parameters.
    pub range: Option<(i64, i64)>,
    /// One-line help text.
    pub help: &'static str,
}

impl ParameterDescriptor {
    /// Declares an optional parameter bindable by flag and by pipeline
    /// property name.
    #[must_use]
    pub const fn new(name: &'static str, kind: ParameterType) -> Self {
        Self {
            name,
            aliases: &[],
            kind,
            position: None,
            pipeline_by_value: false,
            pipeline_by_property_name: true,
            required: false,
            allow_empty: false,
            allow_null: false,
            default: None,
            range: None,
            help: "",
        }
    }

    /// Marks the parameter required.
    ///
    /// Required parameters accept empty and null values at bind time so the
    /// missing-required policy, not the binder, decides what happens.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self.allow_empty = true;
        self.allow_null = true;
        self
    }

    /// Sets the positional index.
    #[must_use]
    pub const fn position(mut self, index: usize) -> Self {
        self.position = Some(index);
        self
    }

    /// Allows binding the whole pipeline value.
    #[must_use]
    pub const fn from_pipeline(mut self) -> Self {
        self.pipeline_by_value = true;
        self
    }

    /// Sets alternative names.
    #[must_use]
    pub const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub const fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets an inclusive integer range.
    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Sets the help text.
    #[must_use]
    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Returns `true` if `name` is this parameter's name or one of its
    /// aliases, ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// Returns `true` if the descriptor may be bound from `source`.
    #[must_use]
    pub const fn accepts(&self, source: BindingSource) -> bool {
        match source {
            BindingSource::Flag => true,
            BindingSource::PipelineByPropertyName => self.pipeline_by_property_name,
            BindingSource::PipelineByValue => self.pipeline_by_value,
            BindingSource::Positional => self.position.is_some(),
            BindingSource::Default => self.default.is_some(),
        }
    }

    /// Coerces and validates a value for this parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the value has the wrong type,
    /// is null or empty where that is not allowed, or falls outside the
    /// declared range.
    pub fn validate(&self, value: Value) -> Result<Value> {
        let value = self.kind.coerce(self.name, value)?;
        let reject = |reason: String| Error::ValidationError {
            field: self.name.to_string(),
            reason,
        };

        match &value {
            Value::Null if !self.allow_null => {
                return Err(reject("the value cannot be null".to_string()));
            }
            Value::String(s) if s.is_empty() && !self.allow_empty => {
                return Err(reject("the value cannot be an empty string".to_string()));
            }
            Value::Array(items) if items.is_empty() && !self.allow_empty => {
                return Err(reject("the value cannot be an empty list".to_string()));
            }
            Value::Number(n) => {
                if let (Some((min, max)), Some(n)) = (self.range, n.as_i64()) {
                    if n < min || n > max {
                        return Err(reject(format!("{n} is outside the range {min}..={max}")));
                    }
                }
            }
            _ => {}
        }

        Ok(value)
    }
}

/// Looks up a descriptor by name or alias.
#[must_use]
pub fn find<'a>(
    parameters: &'a [ParameterDescriptor],
    name: &str,
) -> Option<&'a ParameterDescriptor> {
    parameters.iter().find(|p| p.matches(name))
}
