//! Command execution and runtime logic.
//!
//! Routes parsed matches to the catalog, completions or a cmdlet, runs each
//! cmdlet invocation through the pipeline and reports the outcomes.

use anyhow::{Context, Result};
use clap::ArgMatches;
use clap_complete::Shell;
use colored::Colorize;
use loc_client::{HttpLocationClient, LocationClient};
use loc_core::cli::{ExitCode, OutputFormat};
use loc_core::{CmdletInfo, InvocationEnv, Outcome};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{self, CmdletArgs};
use crate::cmdlets::{self, RegisteredCmdlet};
use crate::config::Settings;
use crate::confirm::TerminalConfirmer;
use crate::formatters::format_output;

/// Initializes logging infrastructure.
///
/// `--verbose` forces debug level; otherwise `RUST_LOG` wins over the
/// configured level.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_logging(verbose: bool, level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .context("failed to initialize logging")?;

    Ok(())
}

/// Executes the parsed command line.
///
/// # Errors
///
/// Returns an error if the command cannot be started; failures of the
/// cmdlet invocations themselves are reported and reflected in the exit
/// code.
pub async fn execute(matches: &ArgMatches, settings: &Settings) -> Result<ExitCode> {
    match matches.subcommand() {
        Some((cli::LIST_COMMAND, _)) => {
            let output = format_output(&catalog_entries(), settings.output_format()?)?;
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Some((cli::COMPLETIONS_COMMAND, sub)) => {
            let shell = sub
                .get_one::<Shell>("shell")
                .copied()
                .context("missing shell")?;
            info!("Generating {} completions", shell);
            let mut command = cli::build_command(cmdlets::catalog());
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some((name, sub)) => {
            let cmdlet = cmdlets::find(name).with_context(|| format!("unknown cmdlet: {name}"))?;
            let client = HttpLocationClient::new(settings.client_config())
                .context("failed to create service client")?;
            run_cmdlet(cmdlet, &client, sub, settings).await
        }
        None => anyhow::bail!("no command given; run `{} list`", cli::BIN_NAME),
    }
}

/// Runs one cmdlet subcommand: once per pipeline element, or once.
///
/// # Errors
///
/// Returns an error if the pipeline input or the settings are invalid.
pub async fn run_cmdlet(
    cmdlet: RegisteredCmdlet,
    client: &(dyn LocationClient + 'static),
    matches: &ArgMatches,
    settings: &Settings,
) -> Result<ExitCode> {
    let info = cmdlet.info();
    let args = CmdletArgs::from_matches(&info, matches);

    let pipeline = match args.input_object.as_deref() {
        Some("-") => Some(cli::parse_pipeline_input(&read_stdin().await?)),
        Some(raw) => Some(cli::parse_pipeline_input(raw)),
        None => None,
    };
    let requests = args.into_requests(pipeline, &settings.client_context());
    debug!(cmdlet = info.name, invocations = requests.len(), "running cmdlet");

    let cancel = CancellationToken::new();
    let watcher = watch_ctrl_c(cancel.clone());
    let confirmer = TerminalConfirmer;
    let env = InvocationEnv::new(&confirmer)
        .with_options(settings.invocation_options()?)
        .with_cancel(cancel);

    let outcomes = invoke_all(cmdlet, client, requests, &env).await;
    watcher.abort();

    report(
        &outcomes,
        settings.output_format()?,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
}

/// Invokes `cmdlet` for each request in order.
///
/// Each invocation gets its own child of `env.cancel`; once the parent is
/// cancelled the remaining requests are skipped.
pub async fn invoke_all(
    cmdlet: RegisteredCmdlet,
    client: &(dyn LocationClient + 'static),
    requests: Vec<loc_core::InvocationRequest>,
    env: &InvocationEnv<'_>,
) -> Vec<Outcome<Value>> {
    let mut outcomes = Vec::with_capacity(requests.len());

    for request in requests {
        let scoped = InvocationEnv::new(env.confirmer)
            .with_options(env.options)
            .with_cancel(env.cancel.child_token());
        outcomes.push(cmdlet.invoke_json(client, request, &scoped).await);

        if env.cancel.is_cancelled() {
            warn!("cancelled; skipping remaining pipeline input");
            break;
        }
    }

    outcomes
}

/// Writes emitted values to `out` and errors to `err`.
///
/// `null` selections print nothing and declined confirmations are silent.
/// The exit code is that of the first failure.
///
/// # Errors
///
/// Returns an error if writing or formatting fails.
pub fn report<W: Write, E: Write>(
    outcomes: &[Outcome<Value>],
    format: OutputFormat,
    out: &mut W,
    err: &mut E,
) -> Result<ExitCode> {
    let mut code = ExitCode::SUCCESS;

    for outcome in outcomes {
        match outcome {
            Outcome::Emitted(emitted) => {
                if emitted.selected.is_null() {
                    continue;
                }
                writeln!(out, "{}", format_output(&emitted.selected, format)?)?;
            }
            Outcome::Aborted => debug!("invocation declined"),
            Outcome::Failed(error) => {
                writeln!(err, "{} {}", "Error:".red().bold(), render_error(error))?;
                code = code.first_failure(ExitCode::for_error(error));
            }
        }
    }

    Ok(code)
}

/// Renders an error and the causes its message does not already include.
#[must_use]
pub fn render_error(error: &loc_core::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = std::error::Error::source(error);

    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(&format!("\n  caused by: {text}"));
        }
        source = cause.source();
    }

    rendered
}

/// One row of `loc list`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogEntry {
    /// Verb-noun name.
    pub name: &'static str,
    /// Kebab-case alias.
    pub alias: String,
    /// Service operation.
    pub operation: &'static str,
    /// Confirmation impact.
    pub impact: &'static str,
    /// One-line description.
    pub synopsis: &'static str,
}

impl From<CmdletInfo> for CatalogEntry {
    fn from(info: CmdletInfo) -> Self {
        Self {
            name: info.name,
            alias: cli::kebab_case(info.name),
            operation: info.operation,
            impact: info.impact.as_str(),
            synopsis: info.synopsis,
        }
    }
}

/// The cmdlet catalog.
#[must_use]
pub fn catalog_entries() -> Vec<CatalogEntry> {
    cmdlets::catalog().map(CatalogEntry::from).collect()
}

async fn read_stdin() -> Result<String> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read pipeline input from stdin")?;
    Ok(input)
}

fn watch_ctrl_c(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; cancelling the current invocation");
            cancel.cancel();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use loc_core::{Emitted, ServiceError};
    use serde_json::json;
    use uuid::Uuid;

    fn emitted(selected: Value) -> Outcome<Value> {
        Outcome::Emitted(Emitted {
            invocation_id: Uuid::nil(),
            selected,
            response: json!({}),
            warnings: Vec::new(),
        })
    }

    fn run_report(outcomes: &[Outcome<Value>]) -> (ExitCode, String, String) {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = report(outcomes, OutputFormat::Json, &mut out, &mut err).unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_report_emitted() {
        let (code, out, err) = run_report(&[emitted(json!(["g1"])), emitted(Value::Null)]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(out, "[\"g1\"]\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_report_declined_is_silent() {
        let (code, out, err) = run_report(&[Outcome::Aborted]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_report_keeps_first_failure_code() {
        let outcomes = [
            emitted(json!("ok")),
            Outcome::Failed(loc_core::Error::ConfigError {
                message: "bad selector".to_string(),
            }),
            Outcome::Failed(loc_core::Error::Cancelled {
                operation: "ListGeofences".to_string(),
            }),
        ];
        let (code, out, err) = run_report(&outcomes);
        assert_eq!(code, ExitCode::INVALID_INPUT);
        assert_eq!(out, "\"ok\"\n");
        assert!(err.contains("Error: Configuration error: bad selector"));
        assert!(err.contains("ListGeofences was cancelled"));
    }

    #[test]
    fn test_render_error_skips_repeated_causes() {
        let error = loc_core::Error::ServiceFailure {
            operation: "BatchDeleteGeofence".to_string(),
            source: ServiceError::remote("ResourceNotFoundException", "collection not found", 404),
        };
        let rendered = render_error(&error);
        assert!(rendered.starts_with("BatchDeleteGeofence failed:"));
        assert!(!rendered.contains("caused by"));
    }

    #[test]
    fn test_render_error_appends_new_causes() {
        let error = loc_core::Error::ConfirmationFailed {
            message: "failed to read confirmation".to_string(),
            source: Some("terminal went away".into()),
        };
        assert_eq!(
            render_error(&error),
            "Confirmation failed: failed to read confirmation\n  caused by: terminal went away"
        );
    }

    #[tokio::test]
    async fn test_run_cmdlet_against_memory_client() {
        use loc_client::MemoryLocationClient;
        use loc_client::model::geofencing::GeofenceGeometry;

        let client = MemoryLocationClient::new()
            .with_geofence("fleet-A", "g1", GeofenceGeometry::default());
        let matches = cli::build_command(cmdlets::catalog())
            .try_get_matches_from(["loc", "Get-LOCGeofenceList", "fleet-A", "--select", "NextToken"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        let cmdlet = cmdlets::find(name).unwrap();

        let code = run_cmdlet(cmdlet, &client, sub, &Settings::default()).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(client.requests().await.len(), 1);
    }

    #[test]
    fn test_catalog_entries() {
        let entries = catalog_entries();
        assert_eq!(entries.len(), cmdlets::registry().len());
        let remove = entries
            .iter()
            .find(|e| e.name == "Remove-LOCGeofence")
            .unwrap();
        assert_eq!(remove.alias, "remove-loc-geofence");
        assert_eq!(remove.impact, "high");
    }
}
