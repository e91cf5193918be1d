//! End-to-end cmdlet tests: command line in, outcomes out, against the
//! in-memory service client.

use loc_cli::cli::{self, CmdletArgs};
use loc_cli::{cmdlets, runner};
use loc_client::model::geofencing::{GeofenceGeometry, ListGeofencesRequest};
use loc_client::{MemoryLocationClient, RecordedRequest};
use loc_core::cli::ExitCode;
use loc_core::{
    AutoConfirm, ClientContext, Confirmer, Error, InvocationEnv, InvocationOptions,
    MissingRequiredPolicy, Outcome, ServiceError,
};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const COLLECTION_ARN: &str = "arn:aws:geo:eu-west-1:123456789012:geofence-collection/fleet-A";

fn fleet() -> MemoryLocationClient {
    MemoryLocationClient::new()
        .with_geofence("fleet-A", "g1", GeofenceGeometry::default())
        .with_geofence("fleet-A", "g2", GeofenceGeometry::default())
        .with_geofence("fleet-A", "g3", GeofenceGeometry::default())
        .with_collection("fleet-B")
}

async fn invoke_with(
    client: &MemoryLocationClient,
    env: &InvocationEnv<'_>,
    args: &[&str],
) -> Vec<Outcome<Value>> {
    let matches = cli::build_command(cmdlets::catalog())
        .try_get_matches_from(std::iter::once("loc").chain(args.iter().copied()))
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    let cmdlet = cmdlets::find(name).unwrap();

    let parsed = CmdletArgs::from_matches(&cmdlet.info(), sub);
    let pipeline = parsed.input_object.as_deref().map(cli::parse_pipeline_input);
    let requests = parsed.into_requests(pipeline, &ClientContext::default());

    runner::invoke_all(cmdlet, client, requests, env).await
}

async fn invoke(
    client: &MemoryLocationClient,
    confirmer: &dyn Confirmer,
    args: &[&str],
) -> Vec<Outcome<Value>> {
    invoke_with(client, &InvocationEnv::new(confirmer), args).await
}

fn single(mut outcomes: Vec<Outcome<Value>>) -> Outcome<Value> {
    assert_eq!(outcomes.len(), 1, "{outcomes:?}");
    outcomes.remove(0)
}

fn geofence_ids(selected: &Value) -> Vec<&str> {
    selected
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["GeofenceId"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_request_carries_only_bound_fields() {
    let client = fleet();
    let outcome = single(
        invoke(
            &client,
            &AutoConfirm(true),
            &["Get-LOCGeofenceList", "--CollectionName", "fleet-A", "--MaxResult", "50"],
        )
        .await,
    );

    assert_eq!(geofence_ids(outcome.selected().unwrap()), ["g1", "g2", "g3"]);

    let requests = client.requests().await;
    let expected = ListGeofencesRequest {
        collection_name: Some("fleet-A".to_string()),
        max_results: Some(50),
        next_token: None,
    };
    assert_eq!(requests, [RecordedRequest::ListGeofences(expected.clone())]);
    assert_eq!(serde_json::to_value(&expected).unwrap(), json!({"MaxResults": 50}));
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let client = fleet();
    let outcome = single(
        invoke(
            &client,
            &AutoConfirm(false),
            &["Remove-LOCGeofence", "--CollectionName", "fleet-A", "--GeofenceId", "g1,g2"],
        )
        .await,
    );

    assert!(matches!(outcome, Outcome::Aborted));
    assert!(outcome.selected().is_none());
    assert!(client.requests().await.is_empty());
    assert_eq!(client.geofence_ids("fleet-A").await, ["g1", "g2", "g3"]);
}

#[tokio::test]
async fn test_force_skips_the_prompt() {
    let client = fleet();
    let outcome = single(
        invoke(
            &client,
            &AutoConfirm(false),
            &["Remove-LOCGeofence", "fleet-A", "g1", "g9", "--force"],
        )
        .await,
    );

    let errors = outcome.selected().unwrap().as_array().unwrap().clone();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["GeofenceId"], "g9");
    assert_eq!(errors[0]["Error"]["Code"], "ResourceNotFoundError");
    assert_eq!(client.geofence_ids("fleet-A").await, ["g2", "g3"]);
}

#[tokio::test]
async fn test_selectors() {
    let client = fleet();

    let full = single(invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A", "--select", "*"]).await);
    let full = full.selected().unwrap();
    assert_eq!(geofence_ids(&full["Entries"]), ["g1", "g2", "g3"]);
    assert!(full.get("NextToken").is_none());

    let field = single(
        invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A", "--select", "nexttoken"]).await,
    );
    assert_eq!(field.selected(), Some(&Value::Null));

    let echo = single(
        invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A", "--select", "^CollectionName"]).await,
    );
    assert_eq!(echo.selected(), Some(&json!("fleet-A")));
}

#[tokio::test]
async fn test_unknown_selector_fails_before_sending() {
    let client = fleet();
    let outcome = single(
        invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A", "--select", "Bogus"]).await,
    );

    let err = outcome.error().unwrap();
    assert!(err.is_config_error());
    assert_eq!(ExitCode::for_error(err), ExitCode::INVALID_INPUT);
    assert!(client.requests().await.is_empty());
}

#[tokio::test]
async fn test_pass_thru_echoes_primary_parameter() {
    let client = MemoryLocationClient::new().with_tracker("delivery", &[]);
    let outcome = single(
        invoke(
            &client,
            &AutoConfirm(true),
            &["Add-LOCTrackerConsumer", "delivery", COLLECTION_ARN, "--pass-thru"],
        )
        .await,
    );

    assert_eq!(outcome.selected(), Some(&json!("delivery")));
    assert_eq!(client.consumers("delivery").await, [COLLECTION_ARN]);
}

#[tokio::test]
async fn test_pass_thru_with_select_is_rejected() {
    let client = MemoryLocationClient::new().with_tracker("delivery", &[]);
    let outcome = single(
        invoke(
            &client,
            &AutoConfirm(true),
            &["Add-LOCTrackerConsumer", "delivery", COLLECTION_ARN, "--pass-thru", "--select", "*"],
        )
        .await,
    );

    assert!(outcome.error().unwrap().is_config_error());
    assert!(client.requests().await.is_empty());
}

#[tokio::test]
async fn test_name_resolution_failure_is_captured() {
    let client = fleet();
    client
        .fail_next(ServiceError::NameResolution {
            host: "geofencing.geo.eu-wst-1.amazonaws.com".to_string(),
            source: "dns error: failed to lookup address information".into(),
        })
        .await;

    let outcome = single(invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A"]).await);

    let err = outcome.error().unwrap();
    assert!(err.is_name_resolution());
    assert!(err.to_string().contains("geofencing.geo.eu-wst-1.amazonaws.com"));
    assert_eq!(ExitCode::for_error(err), ExitCode::SERVICE_ERROR);
    assert!(outcome.selected().is_none());
}

#[tokio::test]
async fn test_name_resolution_reports_invocation_region() {
    let client = fleet();
    client
        .fail_next(ServiceError::NameResolution {
            host: "geofencing.geo.eu-wst-1.amazonaws.com".to_string(),
            source: "dns error".into(),
        })
        .await;

    let matches = cli::build_command(cmdlets::catalog())
        .try_get_matches_from(["loc", "Get-LOCGeofenceList", "fleet-A"])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    let cmdlet = cmdlets::find(name).unwrap();
    let context = ClientContext {
        region: Some("eu-wst-1".to_string()),
        ..ClientContext::default()
    };
    let requests = CmdletArgs::from_matches(&cmdlet.info(), sub).into_requests(None, &context);

    let confirmer = AutoConfirm(true);
    let outcome = single(runner::invoke_all(cmdlet, &client, requests, &InvocationEnv::new(&confirmer)).await);

    match outcome.error().unwrap() {
        Error::NameResolution { region, .. } => assert_eq!(region, "eu-wst-1"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_remote_failure_is_captured() {
    let client = fleet();
    let outcome = single(invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-Z"]).await);

    match outcome.error().unwrap() {
        Error::ServiceFailure { operation, source } => {
            assert_eq!(operation, "ListGeofences");
            assert_eq!(source.code(), Some("ResourceNotFoundException"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_auto_pagination_merges_pages() {
    let client = fleet().with_page_size(1);
    let outcome = single(invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A"]).await);

    assert_eq!(geofence_ids(outcome.selected().unwrap()), ["g1", "g2", "g3"]);
    assert_eq!(client.requests().await.len(), 3);
}

#[tokio::test]
async fn test_no_auto_iteration_returns_first_page() {
    let client = fleet().with_page_size(1);
    let outcome = single(
        invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A", "--no-auto-iteration", "--select", "*"])
            .await,
    );

    let selected = outcome.selected().unwrap();
    assert_eq!(geofence_ids(&selected["Entries"]), ["g1"]);
    assert_eq!(selected["NextToken"], "1");
    assert_eq!(client.requests().await.len(), 1);
}

#[tokio::test]
async fn test_explicit_next_token_fetches_one_page() {
    let client = fleet().with_page_size(1);
    let outcome = single(
        invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-A", "--next-token", "1"]).await,
    );

    assert_eq!(geofence_ids(outcome.selected().unwrap()), ["g2"]);
    assert_eq!(client.requests().await.len(), 1);
}

#[tokio::test]
async fn test_pipeline_input_runs_once_per_element() {
    let client = fleet();
    let outcomes = invoke(
        &client,
        &AutoConfirm(true),
        &[
            "Get-LOCGeofenceList",
            "--input-object",
            r#"[{"CollectionName": "fleet-A"}, "fleet-B"]"#,
            "--select",
            "^CollectionName",
        ],
    )
    .await;

    let selected: Vec<_> = outcomes.iter().map(|o| o.selected().unwrap().clone()).collect();
    assert_eq!(selected, [json!("fleet-A"), json!("fleet-B")]);
    assert_eq!(client.requests().await.len(), 2);
}

#[tokio::test]
async fn test_flag_wins_over_pipeline_property() {
    let client = fleet();
    let outcome = single(
        invoke(
            &client,
            &AutoConfirm(true),
            &[
                "Get-LOCGeofenceList",
                "--CollectionName",
                "fleet-B",
                "--input-object",
                r#"{"CollectionName": "fleet-A"}"#,
                "--select",
                "^CollectionName",
            ],
        )
        .await,
    );

    assert_eq!(outcome.selected(), Some(&json!("fleet-B")));
}

#[tokio::test]
async fn test_missing_required_warns_and_sends() {
    let client = fleet();
    let outcome = single(
        invoke(&client, &AutoConfirm(true), &["Remove-LOCGeofence", "--GeofenceId", "g1", "--force"]).await,
    );

    // The service is left to reject the call.
    let err = outcome.error().unwrap();
    assert!(err.is_service_error());
    assert_eq!(client.requests().await.len(), 1);
}

#[tokio::test]
async fn test_missing_required_rejected_under_strict_policy() {
    let client = fleet();
    let confirmer = AutoConfirm(true);
    let env = InvocationEnv::new(&confirmer).with_options(InvocationOptions {
        missing_required: MissingRequiredPolicy::Reject,
        ..InvocationOptions::default()
    });

    let outcome = single(
        invoke_with(&client, &env, &["Remove-LOCGeofence", "--GeofenceId", "g1", "--force"]).await,
    );

    assert!(matches!(
        outcome.error(),
        Some(Error::MissingRequiredParameter { parameter, .. }) if parameter == "CollectionName"
    ));
    assert!(client.requests().await.is_empty());
}

#[tokio::test]
async fn test_map_sprite_blob_is_base64() {
    let client = MemoryLocationClient::new().with_map(
        "city",
        br#"{"version":8}"#,
        &[("sprites.png", b"\x89PNG".as_slice())],
    );
    let outcome = single(invoke(&client, &AutoConfirm(true), &["Get-LOCMapSprite", "city", "sprites.png"]).await);

    let selected = outcome.selected().unwrap();
    assert_eq!(selected["Blob"], "iVBORw==");
    assert_eq!(selected["ContentType"], "image/png");
}

#[tokio::test]
async fn test_map_style_descriptor_field() {
    let client = MemoryLocationClient::new().with_map("city", br#"{"version":8}"#, &[]);
    let outcome = single(
        invoke(&client, &AutoConfirm(true), &["get-loc-map-style-descriptor", "city", "--select", "ContentType"]).await,
    );

    assert_eq!(outcome.selected(), Some(&json!("application/json")));
}

#[tokio::test]
async fn test_remove_device_position_history() {
    let client = MemoryLocationClient::new().with_tracker("delivery", &["truck-1", "truck-2"]);
    let outcome = single(
        invoke(
            &client,
            &AutoConfirm(true),
            &["Remove-LOCDevicePositionHistory", "delivery", "--DeviceIds", "truck-1"],
        )
        .await,
    );

    assert_eq!(outcome.selected(), Some(&json!([])));
    assert_eq!(client.devices("delivery").await, ["truck-2"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_in_flight_call() {
    let client = fleet().with_delay(Duration::from_secs(30));
    let confirmer = AutoConfirm(true);
    let cancel = CancellationToken::new();
    let env = InvocationEnv::new(&confirmer).with_cancel(cancel.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let outcomes = invoke_with(
        &client,
        &env,
        &["Get-LOCGeofenceList", "--input-object", r#"["fleet-A", "fleet-B"]"#],
    )
    .await;

    assert!(started.elapsed() < Duration::from_secs(30));
    let outcome = single(outcomes);
    let err = outcome.error().unwrap();
    assert!(err.is_cancelled());
    assert_eq!(ExitCode::for_error(err), ExitCode::CANCELLED);
}

#[tokio::test(start_paused = true)]
async fn test_timeout() {
    let client = fleet().with_delay(Duration::from_secs(30));
    let confirmer = AutoConfirm(true);
    let env = InvocationEnv::new(&confirmer).with_options(InvocationOptions {
        timeout: Some(Duration::from_secs(2)),
        ..InvocationOptions::default()
    });

    let outcome = single(invoke_with(&client, &env, &["Get-LOCGeofenceList", "fleet-A"]).await);

    let err = outcome.error().unwrap();
    assert!(err.is_timeout());
    assert_eq!(ExitCode::for_error(err), ExitCode::TIMEOUT);
}

#[tokio::test]
async fn test_report_of_mixed_outcomes() {
    colored::control::set_override(false);
    let client = fleet();
    let mut outcomes = invoke(
        &client,
        &AutoConfirm(true),
        &["Get-LOCGeofenceList", "fleet-A", "--select", "^CollectionName"],
    )
    .await;
    outcomes.extend(invoke(&client, &AutoConfirm(true), &["Get-LOCGeofenceList", "fleet-Z"]).await);

    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = runner::report(&outcomes, loc_core::cli::OutputFormat::Text, &mut out, &mut err).unwrap();

    assert_eq!(code, ExitCode::SERVICE_ERROR);
    assert_eq!(String::from_utf8(out).unwrap(), "fleet-A\n");
    let err = String::from_utf8(err).unwrap();
    assert!(err.starts_with("Error: ListGeofences failed"));
    assert!(err.contains("fleet-Z"));
}
