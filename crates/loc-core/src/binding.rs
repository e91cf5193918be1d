//! Parameter binding.
//!
//! Resolves raw user input into bound parameter values. Each parameter is
//! supplied by exactly one source, chosen by priority:
//!
//! 1. explicit flag
//! 2. pipeline property with the parameter's name (or alias)
//! 3. the pipeline value itself, when it is not an object
//! 4. positional argument at the parameter's index
//! 5. the descriptor default
//!
//! Values from lower-priority sources that lose are dropped and logged.

use crate::parameter::{BindingSource, ParameterDescriptor};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Raw, unbound input for one invocation.
///
/// # Examples
///
/// ```
/// use loc_core::BindingInput;
/// use serde_json::json;
///
/// let input = BindingInput::new()
///     .flag("CollectionName", json!("fleet-A"))
///     .flag("MaxResult", json!(50));
/// assert_eq!(input.flags().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingInput {
    flags: Vec<(String, Value)>,
    positional: Vec<Value>,
    pipeline: Option<Value>,
}

impl BindingInput {
    /// Creates empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an explicit flag value.
    #[must_use]
    pub fn flag(mut self, name: impl Into<String>, value: Value) -> Self {
        self.flags.push((name.into(), value));
        self
    }

    /// Appends a positional value.
    #[must_use]
    pub fn positional(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    /// Sets the pipeline input object.
    #[must_use]
    pub fn pipeline(mut self, value: Value) -> Self {
        self.pipeline = Some(value);
        self
    }

    /// Returns the explicit flags in the order given.
    #[must_use]
    pub fn flags(&self) -> &[(String, Value)] {
        &self.flags
    }

    /// Returns the positional values.
    #[must_use]
    pub fn positionals(&self) -> &[Value] {
        &self.positional
    }

    /// Returns the pipeline input, if any.
    #[must_use]
    pub const fn pipeline_value(&self) -> Option<&Value> {
        self.pipeline.as_ref()
    }
}

/// A value bound to a parameter together with the source that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    /// The coerced value.
    pub value: Value,
    /// Where it came from.
    pub source: BindingSource,
}

/// Parameters bound for one invocation, keyed by canonical name.
pub type BoundParameters = BTreeMap<&'static str, BoundValue>;

/// Binds `input` against `parameters`.
///
/// # Errors
///
/// Returns an error if a flag names no parameter, two flags name the same
/// parameter, a positional value has no parameter at its index, or a
/// value fails validation.
///
/// # Examples
///
/// ```
/// use loc_core::{bind, BindingInput, BindingSource, ParameterDescriptor, ParameterType};
/// use serde_json::json;
///
/// static PARAMETERS: &[ParameterDescriptor] = &[
///     ParameterDescriptor::new("CollectionName", ParameterType::String)
///         .position(0)
///         .required(),
/// ];
///
/// let bound = bind(PARAMETERS, &BindingInput::new().positional(json!("fleet-A")))?;
/// assert_eq!(bound["CollectionName"].value, json!("fleet-A"));
/// assert_eq!(bound["CollectionName"].source, BindingSource::Positional);
/// # Ok::<(), loc_core::Error>(())
/// ```
pub fn bind(parameters: &'static [ParameterDescriptor], input: &BindingInput) -> Result<BoundParameters> {
    let mut candidates: BTreeMap<&'static str, Vec<(BindingSource, Value)>> = BTreeMap::new();

    collect_flags(parameters, input, &mut candidates)?;
    if let Some(pipeline) = &input.pipeline {
        collect_pipeline(parameters, pipeline, &mut candidates);
    }
    collect_positional(parameters, input, &mut candidates)?;

    let mut bound = BoundParameters::new();
    for descriptor in parameters {
        let mut sources = candidates.remove(descriptor.name).unwrap_or_default();
        sources.sort_by_key(|(source, _)| *source);

        let mut sources = sources.into_iter();
        let winner = match sources.next() {
            Some(found) => Some(found),
            None => descriptor
                .default
                .map(|default| (BindingSource::Default, default.to_value())),
        };

        for (shadowed, _) in sources {
            debug!(
                parameter = descriptor.name,
                source = %shadowed,
                "ignoring lower-priority value"
            );
        }

        if let Some((source, value)) = winner {
            let value = descriptor.validate(value)?;
            debug!(parameter = descriptor.name, source = %source, "parameter bound");
            bound.insert(descriptor.name, BoundValue { value, source });
        }
    }

    Ok(bound)
}

fn collect_flags(
    parameters: &'static [ParameterDescriptor],
    input: &BindingInput,
    candidates: &mut BTreeMap<&'static str, Vec<(BindingSource, Value)>>,
) -> Result<()> {
    for (name, value) in &input.flags {
        let descriptor = crate::parameter::find(parameters, name).ok_or_else(|| {
            Error::InvalidArgument(format!("no parameter matches the name '{name}'"))
        })?;

        let entry = candidates.entry(descriptor.name).or_default();
        if entry.iter().any(|(source, _)| *source == BindingSource::Flag) {
            return Err(Error::InvalidArgument(format!(
                "parameter '{}' was specified more than once",
                descriptor.name
            )));
        }
        entry.push((BindingSource::Flag, value.clone()));
    }
    Ok(())
}

fn collect_pipeline(
    parameters: &'static [ParameterDescriptor],
    pipeline: &Value,
    candidates: &mut BTreeMap<&'static str, Vec<(BindingSource, Value)>>,
) {
    match pipeline {
        Value::Object(properties) => {
            let by_property = parameters
                .iter()
                .filter(|p| p.accepts(BindingSource::PipelineByPropertyName));
            for descriptor in by_property {
                let found = properties
                    .iter()
                    .find(|(key, _)| descriptor.matches(key))
                    .map(|(_, value)| value.clone());
                if let Some(value) = found {
                    candidates
                        .entry(descriptor.name)
                        .or_default()
                        .push((BindingSource::PipelineByPropertyName, value));
                }
            }
        }
        Value::Null => {}
        scalar_or_list => {
            if let Some(descriptor) = parameters
                .iter()
                .find(|p| p.accepts(BindingSource::PipelineByValue))
            {
                candidates
                    .entry(descriptor.name)
                    .or_default()
                    .push((BindingSource::PipelineByValue, scalar_or_list.clone()));
            }
        }
    }
}

fn collect_positional(
    parameters: &'static [ParameterDescriptor],
    input: &BindingInput,
    candidates: &mut BTreeMap<&'static str, Vec<(BindingSource, Value)>>,
) -> Result<()> {
    for (index, value) in input.positional.iter().enumerate() {
        let descriptor = parameters
            .iter()
            .find(|p| p.accepts(BindingSource::Positional) && p.position == Some(index))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "positional value {value} at index {index} cannot be bound to any parameter"
                ))
            })?;
        candidates
            .entry(descriptor.name)
            .or_default()
            .push((BindingSource::Positional, value.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{DefaultValue, ParameterType};
    use serde_json::json;

    static PARAMETERS: &[ParameterDescriptor] = &[
        ParameterDescriptor::new("CollectionName", ParameterType::String)
            .position(0)
            .from_pipeline()
            .required(),
        ParameterDescriptor::new("GeofenceId", ParameterType::StringList)
            .position(1)
            .required(),
        ParameterDescriptor::new("MaxResult", ParameterType::Integer)
            .aliases(&["MaxResults"])
            .range(1, 100),
        ParameterDescriptor::new("Mode", ParameterType::String).default_value(DefaultValue::Str("fast")),
    ];

    #[test]
    fn test_flag_binding() {
        let input = BindingInput::new()
            .flag("collectionname", json!("fleet-A"))
            .flag("MaxResults", json!("50"));
        let bound = bind(PARAMETERS, &input).unwrap();

        assert_eq!(bound["CollectionName"].value, json!("fleet-A"));
        assert_eq!(bound["CollectionName"].source, BindingSource::Flag);
        assert_eq!(bound["MaxResult"].value, json!(50));
        assert!(!bound.contains_key("GeofenceId"));
    }

    #[test]
    fn test_flag_beats_pipeline_and_positional() {
        let input = BindingInput::new()
            .flag("CollectionName", json!("from-flag"))
            .pipeline(json!({"CollectionName": "from-pipeline"}))
            .positional(json!("from-position"));
        let bound = bind(PARAMETERS, &input).unwrap();

        assert_eq!(bound["CollectionName"].value, json!("from-flag"));
        assert_eq!(bound["CollectionName"].source, BindingSource::Flag);
    }

    #[test]
    fn test_pipeline_property_beats_positional() {
        let input = BindingInput::new()
            .pipeline(json!({"collectionName": "from-pipeline"}))
            .positional(json!("from-position"));
        let bound = bind(PARAMETERS, &input).unwrap();

        assert_eq!(bound["CollectionName"].value, json!("from-pipeline"));
        assert_eq!(bound["CollectionName"].source, BindingSource::PipelineByPropertyName);
    }

    #[test]
    fn test_pipeline_by_value_binds_scalar() {
        let input = BindingInput::new().pipeline(json!("fleet-B"));
        let bound = bind(PARAMETERS, &input).unwrap();

        assert_eq!(bound["CollectionName"].value, json!("fleet-B"));
        assert_eq!(bound["CollectionName"].source, BindingSource::PipelineByValue);
    }

    #[test]
    fn test_pipeline_by_value_beats_positional() {
        let input = BindingInput::new()
            .pipeline(json!("from-pipeline"))
            .positional(json!("from-position"));
        let bound = bind(PARAMETERS, &input).unwrap();
        assert_eq!(bound["CollectionName"].source, BindingSource::PipelineByValue);
    }

    #[test]
    fn test_pipeline_object_ignores_unknown_properties() {
        let input = BindingInput::new().pipeline(json!({"CollectionName": "fleet", "Extra": 1}));
        let bound = bind(PARAMETERS, &input).unwrap();
        assert_eq!(bound.len(), 2); // CollectionName + Mode default
    }

    #[test]
    fn test_pipeline_properties_only_reach_accepting_parameters() {
        static NARROW: &[ParameterDescriptor] = &[
            ParameterDescriptor::new("CollectionName", ParameterType::String),
            ParameterDescriptor {
                pipeline_by_property_name: false,
                ..ParameterDescriptor::new("NextToken", ParameterType::String)
            },
        ];
        let input = BindingInput::new().pipeline(json!({
            "CollectionName": "fleet-A",
            "NextToken": "2",
        }));
        let bound = bind(NARROW, &input).unwrap();

        assert_eq!(bound["CollectionName"].source, BindingSource::PipelineByPropertyName);
        assert!(!bound.contains_key("NextToken"));
    }

    #[test]
    fn test_positional_binding_in_order() {
        let input = BindingInput::new()
            .positional(json!("fleet"))
            .positional(json!(["g1", "g2"]));
        let bound = bind(PARAMETERS, &input).unwrap();

        assert_eq!(bound["CollectionName"].value, json!("fleet"));
        assert_eq!(bound["GeofenceId"].value, json!(["g1", "g2"]));
        assert_eq!(bound["GeofenceId"].source, BindingSource::Positional);
    }

    #[test]
    fn test_surplus_positional_is_rejected() {
        let input = BindingInput::new()
            .positional(json!("a"))
            .positional(json!("b"))
            .positional(json!("c"));
        let err = bind(PARAMETERS, &input).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let input = BindingInput::new().flag("Nope", json!(1));
        let err = bind(PARAMETERS, &input).unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn test_duplicate_flag_via_alias_is_rejected() {
        let input = BindingInput::new()
            .flag("MaxResult", json!(1))
            .flag("MaxResults", json!(2));
        let err = bind(PARAMETERS, &input).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_default_applies_when_unbound() {
        let bound = bind(PARAMETERS, &BindingInput::new()).unwrap();
        assert_eq!(bound["Mode"].value, json!("fast"));
        assert_eq!(bound["Mode"].source, BindingSource::Default);
    }

    #[test]
    fn test_default_loses_to_any_source() {
        let input = BindingInput::new().flag("Mode", json!("slow"));
        let bound = bind(PARAMETERS, &input).unwrap();
        assert_eq!(bound["Mode"].value, json!("slow"));
    }

    #[test]
    fn test_validation_errors_surface() {
        let input = BindingInput::new().flag("MaxResult", json!(500));
        assert!(bind(PARAMETERS, &input).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_required_null_binds_as_null() {
        let input = BindingInput::new().flag("CollectionName", Value::Null);
        let bound = bind(PARAMETERS, &input).unwrap();
        assert_eq!(bound["CollectionName"].value, Value::Null);
    }

    #[test]
    fn test_null_pipeline_is_ignored() {
        let input = BindingInput::new().pipeline(Value::Null);
        let bound = bind(PARAMETERS, &input).unwrap();
        assert!(!bound.contains_key("CollectionName"));
    }
}
