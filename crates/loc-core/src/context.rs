//! Per-invocation execution context.
//!
//! The [`ExecutionContext`] is created once parameters are bound and is
//! handed to the cmdlet's request builder. It owns everything the builder
//! may read; nothing is shared with other invocations.

use crate::binding::BoundParameters;
use crate::output::OutputMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Client settings in effect for one invocation.
///
/// The service client is configured from the same settings before any
/// invocation runs. The pipeline reads this context for diagnostics only:
/// name-resolution failures report the region in effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    /// Service region, e.g. `eu-west-1`.
    pub region: Option<String>,
    /// Endpoint override.
    pub endpoint_url: Option<String>,
    /// Named credential profile.
    pub profile_name: Option<String>,
}

impl ClientContext {
    /// Returns the region, or `"(unset)"` for diagnostics.
    #[must_use]
    pub fn region_or_unset(&self) -> &str {
        self.region.as_deref().unwrap_or("(unset)")
    }
}

/// Bound parameters and settings for one invocation.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    id: Uuid,
    cmdlet: &'static str,
    bound: BoundParameters,
    output: OutputMode,
    client: ClientContext,
    warnings: Vec<String>,
}

impl ExecutionContext {
    /// Creates a context from already bound parameters.
    #[must_use]
    pub fn new(
        cmdlet: &'static str,
        bound: BoundParameters,
        output: OutputMode,
        client: ClientContext,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            cmdlet,
            bound,
            output,
            client,
            warnings: Vec::new(),
        }
    }

    /// Unique id of this invocation, used to correlate log lines.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the cmdlet being invoked.
    #[must_use]
    pub const fn cmdlet(&self) -> &'static str {
        self.cmdlet
    }

    /// The resolved output mode.
    #[must_use]
    pub const fn output(&self) -> &OutputMode {
        &self.output
    }

    /// Client settings for this invocation.
    #[must_use]
    pub const fn client(&self) -> &ClientContext {
        &self.client
    }

    /// All bound parameters.
    #[must_use]
    pub const fn bound(&self) -> &BoundParameters {
        &self.bound
    }

    /// Warnings collected while preparing the invocation.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Returns the bound value for `name`, treating `null` as unbound.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.bound.get(name).map(|b| &b.value).filter(|v| !v.is_null())
    }

    /// Returns `true` if `name` is bound to a non-null value.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Reads a string parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound value is not a string.
    pub fn string(&self, name: &str) -> Result<Option<String>> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(type_error(name, "string", other)),
        }
    }

    /// Reads an integer parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound value is not an integer.
    pub fn integer(&self, name: &str) -> Result<Option<i64>> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| type_error(name, "integer", &Value::Number(n.clone()))),
            Some(other) => Err(type_error(name, "integer", other)),
        }
    }

    /// Reads a string list parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound value is not a list of strings.
    pub fn string_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(ToString::to_string)
                        .ok_or_else(|| type_error(name, "string[]", item))
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(type_error(name, "string[]", other)),
        }
    }

    /// Reads a switch parameter; unbound switches are `false`.
    #[must_use]
    pub fn switch(&self, name: &str) -> bool {
        self.value(name).and_then(Value::as_bool).unwrap_or(false)
    }
}

fn type_error(name: &str, expected: &str, found: &Value) -> Error {
    Error::ValidationError {
        field: name.to_string(),
        reason: format!("expected {expected}, found {found}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BoundValue;
    use crate::parameter::BindingSource;
    use serde_json::json;

    fn context(values: &[(&'static str, Value)]) -> ExecutionContext {
        let bound = values
            .iter()
            .map(|(name, value)| {
                (
                    *name,
                    BoundValue {
                        value: value.clone(),
                        source: BindingSource::Flag,
                    },
                )
            })
            .collect();
        ExecutionContext::new("Get-LOCGeofenceList", bound, OutputMode::Full, ClientContext::default())
    }

    #[test]
    fn test_typed_getters() {
        let ctx = context(&[
            ("CollectionName", json!("fleet-A")),
            ("MaxResult", json!(50)),
            ("GeofenceId", json!(["g1", "g2"])),
            ("NoAutoIteration", json!(true)),
        ]);

        assert_eq!(ctx.string("CollectionName").unwrap().as_deref(), Some("fleet-A"));
        assert_eq!(ctx.integer("MaxResult").unwrap(), Some(50));
        assert_eq!(
            ctx.string_list("GeofenceId").unwrap(),
            Some(vec!["g1".to_string(), "g2".to_string()])
        );
        assert!(ctx.switch("NoAutoIteration"));
        assert!(!ctx.switch("Other"));
    }

    #[test]
    fn test_null_is_unset() {
        let ctx = context(&[("CollectionName", Value::Null)]);
        assert!(ctx.bound().contains_key("CollectionName"));
        assert!(!ctx.is_set("CollectionName"));
        assert_eq!(ctx.string("CollectionName").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch() {
        let ctx = context(&[("MaxResult", json!("fifty"))]);
        assert!(ctx.integer("MaxResult").is_err());
        assert!(ctx.string_list("MaxResult").is_err());
    }

    #[test]
    fn test_invocation_ids_are_unique() {
        let a = context(&[]);
        let b = context(&[]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_region_or_unset() {
        let mut client = ClientContext::default();
        assert_eq!(client.region_or_unset(), "(unset)");
        client.region = Some("eu-west-1".to_string());
        assert_eq!(client.region_or_unset(), "eu-west-1");
    }

    #[test]
    fn test_warnings_are_taken_once() {
        let mut ctx = context(&[]);
        ctx.push_warning("careful".to_string());
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.take_warnings(), vec!["careful".to_string()]);
        assert!(ctx.warnings().is_empty());
    }
}
