//! CLI argument definitions and parsing.
//!
//! The command tree is assembled at runtime from cmdlet descriptors:
//!
//! - global flags come from [`GlobalArgs`] (clap derive)
//! - every cmdlet becomes a subcommand named after it, with a kebab-case
//!   alias (`Get-LOCGeofenceList`, `get-loc-geofence-list`)
//! - every parameter becomes a `--Name` flag with a kebab-case alias
//!   (`--CollectionName`, `--collection-name`)
//! - trailing values feed positional binding
//!
//! [`CmdletArgs`] turns the matches of a cmdlet subcommand back into the
//! raw binding input the invocation pipeline expects.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Args, Command};
use clap_complete::Shell;
use loc_core::{
    BindingInput, ClientContext, CmdletInfo, ConfirmImpact, InvocationRequest,
    ParameterDescriptor, ParameterType,
};
use serde_json::Value;
use std::path::PathBuf;

/// Binary name.
pub const BIN_NAME: &str = "loc";

/// Subcommand printing the cmdlet catalog.
pub const LIST_COMMAND: &str = "list";

/// Subcommand printing shell completions.
pub const COMPLETIONS_COMMAND: &str = "completions";

const POSITIONAL: &str = "positional";
const INPUT_OBJECT: &str = "input-object";
const SELECT: &str = "select";
const PASS_THRU: &str = "pass-thru";
const FORCE: &str = "force";
const NO_AUTO_ITERATION: &str = "no-auto-iteration";

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Service region, e.g. eu-west-1
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Endpoint URL used instead of the regional endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Named credential profile
    #[arg(long, global = true, value_name = "NAME")]
    pub profile_name: Option<String>,

    /// API key sent with map requests
    #[arg(long, global = true, env = "LOC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Configuration file (default: <config dir>/loc-cmdlets/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format (json, text, pretty)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Fail instead of warning when a required parameter has no value
    #[arg(long, global = true)]
    pub strict_required: bool,

    /// Timeout for each service call, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Converts a verb-noun or PascalCase name to lowercase kebab case.
///
/// Runs of capitals are kept together as one word.
///
/// # Examples
///
/// ```
/// use loc_cli::cli::kebab_case;
///
/// assert_eq!(kebab_case("Get-LOCGeofenceList"), "get-loc-geofence-list");
/// assert_eq!(kebab_case("CollectionName"), "collection-name");
/// ```
#[must_use]
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push('-');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}

/// Builds the full command tree.
///
/// # Examples
///
/// ```
/// use loc_cli::{cli, cmdlets};
///
/// let command = cli::build_command(cmdlets::catalog());
/// let matches = command
///     .try_get_matches_from(["loc", "get-loc-geofence-list", "fleet-A", "--max-result", "50"])
///     .unwrap();
/// assert_eq!(matches.subcommand_name(), Some("Get-LOCGeofenceList"));
/// ```
pub fn build_command(catalog: impl IntoIterator<Item = CmdletInfo>) -> Command {
    let command = Command::new(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command-line cmdlets for AWS Location Service")
        .subcommand_required(true)
        .arg_required_else_help(true);

    let mut command = GlobalArgs::augment_args(command)
        .subcommand(Command::new(LIST_COMMAND).about("List the available cmdlets"))
        .subcommand(
            Command::new(COMPLETIONS_COMMAND)
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(clap::value_parser!(Shell))
                        .help("Shell to generate completions for"),
                ),
        );

    for info in catalog {
        command = command.subcommand(cmdlet_command(&info));
    }

    command
}

/// Builds the subcommand of one cmdlet.
#[must_use]
pub fn cmdlet_command(info: &CmdletInfo) -> Command {
    let mut command = Command::new(info.name)
        .visible_alias(kebab_case(info.name))
        .about(info.synopsis)
        .long_about(format!(
            "{}\n\nCalls the {} operation.",
            info.synopsis, info.operation
        ));

    for parameter in info.parameters {
        command = command.arg(parameter_arg(parameter));
    }

    command = command
        .arg(
            Arg::new(POSITIONAL)
                .value_name("VALUE")
                .num_args(1..)
                .action(ArgAction::Append)
                .help("Values bound to positional parameters in order"),
        )
        .arg(
            Arg::new(INPUT_OBJECT)
                .long(INPUT_OBJECT)
                .value_name("JSON|-")
                .help("Pipeline input as JSON ('-' reads stdin); an array runs once per element"),
        )
        .arg(
            Arg::new(SELECT)
                .long(SELECT)
                .value_name("SELECTOR")
                .help(format!(
                    "Output selection: '*', a response field or '^ParameterName' [default: {}]",
                    info.default_select
                )),
        );

    if let Some(primary) = info.primary_parameter {
        command = command.arg(
            Arg::new(PASS_THRU)
                .long(PASS_THRU)
                .action(ArgAction::SetTrue)
                .help(format!("Deprecated: use --select '^{primary}'")),
        );
    }

    if info.impact > ConfirmImpact::None {
        command = command.arg(
            Arg::new(FORCE)
                .long(FORCE)
                .action(ArgAction::SetTrue)
                .help("Skip the confirmation prompt"),
        );
    }

    if info.paginated {
        command = command.arg(
            Arg::new(NO_AUTO_ITERATION)
                .long(NO_AUTO_ITERATION)
                .action(ArgAction::SetTrue)
                .help("Return only the first page"),
        );
    }

    command
}

fn parameter_arg(parameter: &ParameterDescriptor) -> Arg {
    let mut arg = Arg::new(parameter.name)
        .long(parameter.name)
        .visible_alias(kebab_case(parameter.name))
        .help(parameter_help(parameter));

    for alias in parameter.aliases {
        arg = arg.alias(*alias).alias(kebab_case(alias));
    }

    match parameter.kind {
        ParameterType::Switch => arg.action(ArgAction::SetTrue),
        ParameterType::StringList => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_name("VALUES"),
        ParameterType::String | ParameterType::Integer => {
            arg.action(ArgAction::Set).value_name("VALUE")
        }
    }
}

fn parameter_help(parameter: &ParameterDescriptor) -> String {
    let mut facts = vec![parameter.kind.to_string()];
    if parameter.required {
        facts.push("required".to_string());
    }
    if let Some(position) = parameter.position {
        facts.push(format!("position {position}"));
    }
    if let Some((min, max)) = parameter.range {
        facts.push(format!("{min}..={max}"));
    }
    if let Some(default) = parameter.default {
        facts.push(format!("default {}", default.to_value()));
    }
    format!("{} [{}]", parameter.help, facts.join(", "))
}

/// What the user asked one cmdlet subcommand to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CmdletArgs {
    /// Flags and positional values.
    pub arguments: BindingInput,
    /// Raw `--input-object` value.
    pub input_object: Option<String>,
    /// `--select` value.
    pub select: Option<String>,
    /// Deprecated `--pass-thru`.
    pub pass_thru: bool,
    /// `--force`.
    pub force: bool,
    /// `--no-auto-iteration`.
    pub no_auto_iteration: bool,
}

impl CmdletArgs {
    /// Reads the matches of a cmdlet subcommand.
    #[must_use]
    pub fn from_matches(info: &CmdletInfo, matches: &ArgMatches) -> Self {
        let mut arguments = BindingInput::new();

        for parameter in info.parameters {
            if matches.value_source(parameter.name) != Some(ValueSource::CommandLine) {
                continue;
            }
            let value = match parameter.kind {
                ParameterType::Switch => Value::Bool(flag(matches, parameter.name)),
                ParameterType::StringList => Value::Array(
                    strings(matches, parameter.name)
                        .into_iter()
                        .map(Value::String)
                        .collect(),
                ),
                ParameterType::String | ParameterType::Integer => strings(matches, parameter.name)
                    .pop()
                    .map_or(Value::Null, Value::String),
            };
            arguments = arguments.flag(parameter.name, value);
        }

        for value in positional_values(info.parameters, strings(matches, POSITIONAL)) {
            arguments = arguments.positional(value);
        }

        Self {
            arguments,
            input_object: strings(matches, INPUT_OBJECT).pop(),
            select: strings(matches, SELECT).pop(),
            pass_thru: flag(matches, PASS_THRU),
            force: flag(matches, FORCE),
            no_auto_iteration: flag(matches, NO_AUTO_ITERATION),
        }
    }

    /// Expands into one invocation per pipeline element, or a single
    /// invocation without pipeline input.
    #[must_use]
    pub fn into_requests(
        self,
        pipeline: Option<Vec<Value>>,
        client: &ClientContext,
    ) -> Vec<InvocationRequest> {
        let request = |arguments: BindingInput| InvocationRequest {
            arguments,
            select: self.select.clone(),
            pass_thru: self.pass_thru,
            force: self.force,
            no_auto_iteration: self.no_auto_iteration,
            client: client.clone(),
        };

        match pipeline {
            None => vec![request(self.arguments.clone())],
            Some(items) => items
                .into_iter()
                .map(|item| request(self.arguments.clone().pipeline(item)))
                .collect(),
        }
    }
}

/// Parses `--input-object` text.
///
/// JSON is decoded; anything else is taken as a plain string. A JSON array
/// yields its elements.
///
/// # Examples
///
/// ```
/// use loc_cli::cli::parse_pipeline_input;
/// use serde_json::json;
///
/// assert_eq!(parse_pipeline_input(r#"[{"CollectionName":"a"},"b"]"#).len(), 2);
/// assert_eq!(parse_pipeline_input("fleet-A"), vec![json!("fleet-A")]);
/// ```
#[must_use]
pub fn parse_pipeline_input(raw: &str) -> Vec<Value> {
    let raw = raw.trim();
    match serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())) {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Maps trailing values onto positions.
///
/// A list parameter takes every remaining value; commas inside a value
/// separate list elements.
fn positional_values(parameters: &[ParameterDescriptor], raw: Vec<String>) -> Vec<Value> {
    let mut values = Vec::with_capacity(raw.len());
    let mut rest = raw.into_iter();

    while let Some(first) = rest.next() {
        let index = values.len();
        let is_list = parameters
            .iter()
            .any(|p| p.position == Some(index) && p.kind == ParameterType::StringList);

        if is_list {
            let items = std::iter::once(first)
                .chain(rest.by_ref())
                .flat_map(|value| {
                    value
                        .split(',')
                        .map(|item| Value::String(item.trim().to_string()))
                        .collect::<Vec<_>>()
                })
                .collect();
            values.push(Value::Array(items));
        } else {
            values.push(Value::String(first));
        }
    }

    values
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .try_get_many::<String>(id)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}
