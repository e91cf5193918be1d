//! Output selection.
//!
//! The caller picks what an invocation emits with a selector string:
//!
//! - `"*"`: the whole response
//! - `"Entries"`: one response field
//! - `"^CollectionName"`: the bound value of an input parameter
//!
//! The deprecated pass-through switch is the same as `"^<primary parameter>"`.
//! Selectors are resolved into an [`OutputMode`] before anything is sent.

use crate::binding::BoundParameters;
use crate::parameter::ParameterDescriptor;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// What an invocation emits on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// The entire response.
    Full,
    /// A single response field, by canonical name.
    Field(String),
    /// The bound value of an input parameter, by canonical name.
    InputEcho(String),
}

/// Cmdlet-specific facts needed to resolve a selector.
#[derive(Debug, Clone, Copy)]
pub struct SelectorRules<'a> {
    /// Selector used when the caller gives none.
    pub default_select: &'a str,
    /// Names of the top-level response fields.
    pub response_fields: &'a [&'a str],
    /// Declared parameters.
    pub parameters: &'a [ParameterDescriptor],
    /// Parameter echoed by the legacy pass-through switch.
    pub primary_parameter: Option<&'a str>,
}

impl OutputMode {
    /// Resolves the caller's selector and pass-through switch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if both a selector and pass-through
    /// are given, if pass-through is used on a cmdlet without a primary
    /// parameter, or if the selector names an unknown field or parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::{OutputMode, SelectorRules};
    ///
    /// let rules = SelectorRules {
    ///     default_select: "Entries",
    ///     response_fields: &["Entries", "NextToken"],
    ///     parameters: &[],
    ///     primary_parameter: None,
    /// };
    ///
    /// assert_eq!(OutputMode::resolve(None, false, &rules)?, OutputMode::Field("Entries".into()));
    /// assert_eq!(OutputMode::resolve(Some("*"), false, &rules)?, OutputMode::Full);
    /// assert!(OutputMode::resolve(Some("Bogus"), false, &rules).is_err());
    /// # Ok::<(), loc_core::Error>(())
    /// ```
    pub fn resolve(select: Option<&str>, pass_thru: bool, rules: &SelectorRules<'_>) -> Result<Self> {
        if pass_thru {
            if let Some(select) = select {
                return Err(Error::ConfigError {
                    message: format!(
                        "the deprecated pass-through switch cannot be combined with --select '{select}'; \
                         use --select '^ParameterName' instead"
                    ),
                });
            }
            let primary = rules.primary_parameter.ok_or_else(|| Error::ConfigError {
                message: "this cmdlet does not support pass-through".to_string(),
            })?;
            warn!("the pass-through switch is deprecated; use --select '^{primary}' instead");
            return Ok(Self::InputEcho(primary.to_string()));
        }

        Self::parse(select.unwrap_or(rules.default_select), rules)
    }

    fn parse(select: &str, rules: &SelectorRules<'_>) -> Result<Self> {
        let select = select.trim();

        if select == "*" {
            return Ok(Self::Full);
        }

        if let Some(parameter) = select.strip_prefix('^') {
            let descriptor = crate::parameter::find(rules.parameters, parameter).ok_or_else(|| {
                Error::ConfigError {
                    message: format!(
                        "invalid --select '{select}': '{parameter}' is not a parameter of this cmdlet"
                    ),
                }
            })?;
            return Ok(Self::InputEcho(descriptor.name.to_string()));
        }

        rules
            .response_fields
            .iter()
            .find(|field| field.eq_ignore_ascii_case(select))
            .map(|field| Self::Field((*field).to_string()))
            .ok_or_else(|| Error::ConfigError {
                message: format!(
                    "invalid --select '{select}': expected '*', '^ParameterName' or one of [{}]",
                    rules.response_fields.join(", ")
                ),
            })
    }

    /// Projects a response and the bound inputs into the emitted value.
    #[must_use]
    pub fn project(&self, response: &Value, bound: &BoundParameters) -> Value {
        match self {
            Self::Full => response.clone(),
            Self::Field(field) => response.get(field).cloned().unwrap_or(Value::Null),
            Self::InputEcho(parameter) => bound
                .get(parameter.as_str())
                .map(|b| b.value.clone())
                .unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("*"),
            Self::Field(field) => f.write_str(field),
            Self::InputEcho(parameter) => write!(f, "^{parameter}"),
        }
    }
}
