//! The command invocation pipeline.
//!
//! One invocation walks this state machine:
//!
//! ```text
//! Created -> ParametersBound -> [ConfirmationPending -> Aborted | Confirmed]
//!         -> RequestBuilt -> ResponseReceived -> OutputEmitted
//! ```
//!
//! Any step may end in `Failed`. `Aborted`, `Failed` and `OutputEmitted`
//! are terminal. Failures never escape [`Cmdlet::invoke`]; they come back as
//! [`Outcome::Failed`] so a script can react per invocation.

use crate::binding::{bind, BindingInput};
use crate::cmdlet::Cmdlet;
use crate::confirm::{ConfirmImpact, ConfirmationRequest, Confirmer};
use crate::context::{ClientContext, ExecutionContext};
use crate::output::OutputMode;
use crate::service::{ServiceError, ServiceFuture};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationState {
    /// Nothing has happened yet.
    Created,
    /// Parameters are bound and the output mode is resolved.
    ParametersBound,
    /// Waiting for the user to confirm.
    ConfirmationPending,
    /// The user declined; nothing was sent.
    Aborted,
    /// The user confirmed (or force was set).
    Confirmed,
    /// The request object exists.
    RequestBuilt,
    /// The service answered.
    ResponseReceived,
    /// The invocation failed.
    Failed,
    /// The selected value was emitted.
    OutputEmitted,
}

impl InvocationState {
    /// Returns `true` for states an invocation never leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Aborted | Self::Failed | Self::OutputEmitted)
    }

    /// Returns `true` if `next` may follow `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::InvocationState;
    ///
    /// assert!(InvocationState::Created.can_advance_to(InvocationState::ParametersBound));
    /// assert!(!InvocationState::Created.can_advance_to(InvocationState::RequestBuilt));
    /// assert!(!InvocationState::Aborted.can_advance_to(InvocationState::Failed));
    /// ```
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match self {
            Self::Created => matches!(next, Self::ParametersBound | Self::Failed),
            Self::ParametersBound => matches!(
                next,
                Self::ConfirmationPending | Self::RequestBuilt | Self::Failed
            ),
            Self::ConfirmationPending => {
                matches!(next, Self::Aborted | Self::Confirmed | Self::Failed)
            }
            Self::Confirmed => matches!(next, Self::RequestBuilt | Self::Failed),
            Self::RequestBuilt => matches!(next, Self::ResponseReceived | Self::Failed),
            Self::ResponseReceived => matches!(next, Self::OutputEmitted | Self::Failed),
            Self::Aborted | Self::Failed | Self::OutputEmitted => false,
        }
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What to do when a required parameter has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingRequiredPolicy {
    /// Log a warning and send the request with the field unset.
    #[default]
    Warn,
    /// Fail the invocation before anything is sent.
    Reject,
}

impl FromStr for MissingRequiredPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            _ => Err(Error::InvalidArgument(format!(
                "invalid missing-required policy: '{s}' (expected: warn or reject)"
            ))),
        }
    }
}

/// Settings shared by every invocation of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Cmdlets at or above this impact must be confirmed.
    pub confirm_threshold: ConfirmImpact,
    /// Missing required parameter policy.
    pub missing_required: MissingRequiredPolicy,
    /// Limit for each service call.
    pub timeout: Option<Duration>,
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self {
            confirm_threshold: ConfirmImpact::Medium,
            missing_required: MissingRequiredPolicy::Warn,
            timeout: None,
        }
    }
}

/// Everything the caller supplies for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationRequest {
    /// Raw parameter input.
    pub arguments: BindingInput,
    /// Output selector.
    pub select: Option<String>,
    /// Deprecated pass-through switch.
    pub pass_thru: bool,
    /// Skip the confirmation gate.
    pub force: bool,
    /// Fetch a single page only.
    pub no_auto_iteration: bool,
    /// Client settings for this invocation.
    pub client: ClientContext,
}

impl InvocationRequest {
    /// Creates a request from raw arguments.
    #[must_use]
    pub fn new(arguments: BindingInput) -> Self {
        Self {
            arguments,
            ..Self::default()
        }
    }

    /// Sets the output selector.
    #[must_use]
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Sets the deprecated pass-through switch.
    #[must_use]
    pub const fn pass_thru(mut self) -> Self {
        self.pass_thru = true;
        self
    }

    /// Skips the confirmation gate.
    #[must_use]
    pub const fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Disables automatic pagination.
    #[must_use]
    pub const fn no_auto_iteration(mut self) -> Self {
        self.no_auto_iteration = true;
        self
    }

    /// Sets the client settings.
    #[must_use]
    pub fn client(mut self, client: ClientContext) -> Self {
        self.client = client;
        self
    }
}

/// Collaborators an invocation runs with.
pub struct InvocationEnv<'a> {
    /// Confirmation gate.
    pub confirmer: &'a dyn Confirmer,
    /// Session options.
    pub options: InvocationOptions,
    /// Stops this invocation when cancelled.
    pub cancel: CancellationToken,
}

impl<'a> InvocationEnv<'a> {
    /// Creates an environment with default options and a fresh token.
    #[must_use]
    pub fn new(confirmer: &'a dyn Confirmer) -> Self {
        Self {
            confirmer,
            options: InvocationOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub const fn with_options(mut self, options: InvocationOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl fmt::Debug for InvocationEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationEnv")
            .field("options", &self.options)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Successful result of an invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted<R> {
    /// Invocation id used in log lines.
    pub invocation_id: Uuid,
    /// The value chosen by the output mode.
    pub selected: Value,
    /// The raw response, for introspection.
    pub response: R,
    /// Warnings raised during the invocation.
    pub warnings: Vec<String>,
}

/// Result of one invocation.
#[derive(Debug)]
pub enum Outcome<R> {
    /// The selected value and the response.
    Emitted(Emitted<R>),
    /// Confirmation was declined; nothing was sent or emitted.
    Aborted,
    /// The captured failure; nothing was emitted.
    Failed(Error),
}

impl<R> Outcome<R> {
    /// Terminal state reached by the invocation.
    #[must_use]
    pub const fn state(&self) -> InvocationState {
        match self {
            Self::Emitted(_) => InvocationState::OutputEmitted,
            Self::Aborted => InvocationState::Aborted,
            Self::Failed(_) => InvocationState::Failed,
        }
    }

    /// Returns the selected value on success.
    #[must_use]
    pub const fn selected(&self) -> Option<&Value> {
        match self {
            Self::Emitted(emitted) => Some(&emitted.selected),
            _ => None,
        }
    }

    /// Returns the captured error on failure.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if output was emitted.
    #[must_use]
    pub const fn is_emitted(&self) -> bool {
        matches!(self, Self::Emitted(_))
    }
}

impl<R: Serialize> Outcome<R> {
    /// Converts the response to JSON.
    #[must_use]
    pub fn into_json(self) -> Outcome<Value> {
        match self {
            Self::Emitted(emitted) => match serde_json::to_value(&emitted.response) {
                Ok(response) => Outcome::Emitted(Emitted {
                    invocation_id: emitted.invocation_id,
                    selected: emitted.selected,
                    response,
                    warnings: emitted.warnings,
                }),
                Err(err) => Outcome::Failed(err.into()),
            },
            Self::Aborted => Outcome::Aborted,
            Self::Failed(err) => Outcome::Failed(err),
        }
    }
}

/// Tracks and logs state transitions of one invocation.
struct Tracker {
    cmdlet: &'static str,
    state: InvocationState,
}

impl Tracker {
    const fn new(cmdlet: &'static str) -> Self {
        Self {
            cmdlet,
            state: InvocationState::Created,
        }
    }

    fn advance(&mut self, next: InvocationState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        debug!(cmdlet = self.cmdlet, from = %self.state, to = %next, "invocation state");
        self.state = next;
    }
}

impl<C, Req, Resp> Cmdlet<C, Req, Resp>
where
    C: ?Sized + Sync,
    Req: Send + 'static,
    Resp: Serialize + Send + 'static,
{
    /// Runs one invocation of this cmdlet.
    ///
    /// Never returns an error directly: failures are captured in
    /// [`Outcome::Failed`].
    pub async fn invoke(
        &self,
        client: &C,
        request: InvocationRequest,
        env: &InvocationEnv<'_>,
    ) -> Outcome<Resp> {
        let mut tracker = Tracker::new(self.name);
        match self.run(client, request, env, &mut tracker).await {
            Ok(Some(emitted)) => Outcome::Emitted(emitted),
            Ok(None) => Outcome::Aborted,
            Err(err) => {
                tracker.advance(InvocationState::Failed);
                debug!(cmdlet = self.name, error = %err, "invocation failed");
                Outcome::Failed(err)
            }
        }
    }

    async fn run(
        &self,
        client: &C,
        request: InvocationRequest,
        env: &InvocationEnv<'_>,
        tracker: &mut Tracker,
    ) -> Result<Option<Emitted<Resp>>> {
        let output = OutputMode::resolve(
            request.select.as_deref(),
            request.pass_thru,
            &self.selector_rules(),
        )?;
        let bound = bind(self.parameters, &request.arguments)?;
        let mut ctx = ExecutionContext::new(self.name, bound, output, request.client);
        self.check_required(&mut ctx, env.options.missing_required)?;
        tracker.advance(InvocationState::ParametersBound);

        if self.impact.requires_confirmation(env.options.confirm_threshold) && !request.force {
            tracker.advance(InvocationState::ConfirmationPending);
            let question = ConfirmationRequest {
                cmdlet: self.name.to_string(),
                operation: self.operation.to_string(),
                target: self.confirmation_target(&ctx),
                impact: self.impact,
            };
            if !env.confirmer.confirm(&question)? {
                tracker.advance(InvocationState::Aborted);
                info!(cmdlet = self.name, invocation = %ctx.id(), "operation declined");
                return Ok(None);
            }
            tracker.advance(InvocationState::Confirmed);
        }

        let first = (self.build_request)(&ctx)?;
        tracker.advance(InvocationState::RequestBuilt);

        let response = self
            .execute(client, &ctx, first, request.no_auto_iteration, env)
            .await?;
        tracker.advance(InvocationState::ResponseReceived);

        let json = serde_json::to_value(&response)?;
        let selected = ctx.output().project(&json, ctx.bound());
        tracker.advance(InvocationState::OutputEmitted);

        Ok(Some(Emitted {
            invocation_id: ctx.id(),
            selected,
            response,
            warnings: ctx.take_warnings(),
        }))
    }

    fn check_required(&self, ctx: &mut ExecutionContext, policy: MissingRequiredPolicy) -> Result<()> {
        for descriptor in self.parameters.iter().filter(|p| p.required) {
            if ctx.is_set(descriptor.name) {
                continue;
            }
            match policy {
                MissingRequiredPolicy::Reject => {
                    return Err(Error::MissingRequiredParameter {
                        cmdlet: self.name.to_string(),
                        parameter: descriptor.name.to_string(),
                    });
                }
                MissingRequiredPolicy::Warn => {
                    let warning = format!(
                        "You are passing $null as a value for parameter {} which is marked as required",
                        descriptor.name
                    );
                    warn!(cmdlet = self.name, parameter = descriptor.name, "{warning}");
                    ctx.push_warning(warning);
                }
            }
        }
        Ok(())
    }

    fn confirmation_target(&self, ctx: &ExecutionContext) -> String {
        let value = self.primary_parameter.and_then(|name| ctx.value(name));
        match value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map_or_else(|| item.to_string(), ToString::to_string))
                .collect::<Vec<_>>()
                .join(", "),
            Some(other) => other.to_string(),
            None => "(none)".to_string(),
        }
    }

    async fn execute(
        &self,
        client: &C,
        ctx: &ExecutionContext,
        first: Req,
        no_auto_iteration: bool,
        env: &InvocationEnv<'_>,
    ) -> Result<Resp> {
        let mut response = self.send_once(client, ctx, first, env).await?;

        let Some(pagination) = &self.pagination else {
            return Ok(response);
        };
        if no_auto_iteration || ctx.is_set(pagination.token_parameter) {
            return Ok(response);
        }

        let mut seen = HashSet::new();
        while let Some(token) = (pagination.next_token)(&response) {
            if !seen.insert(token.clone()) {
                warn!(
                    cmdlet = self.name,
                    "service returned a pagination token twice; stopping iteration"
                );
                break;
            }
            debug!(cmdlet = self.name, page = seen.len() + 1, "fetching next page");
            let mut next = (self.build_request)(ctx)?;
            (pagination.set_token)(&mut next, token);
            let page = self.send_once(client, ctx, next, env).await?;
            (pagination.merge)(&mut response, page);
        }

        Ok(response)
    }

    async fn send_once(
        &self,
        client: &C,
        ctx: &ExecutionContext,
        request: Req,
        env: &InvocationEnv<'_>,
    ) -> Result<Resp> {
        let cancelled = || Error::Cancelled {
            operation: self.operation.to_string(),
        };
        if env.cancel.is_cancelled() {
            return Err(cancelled());
        }

        info!(
            cmdlet = ctx.cmdlet(),
            operation = self.operation,
            invocation = %ctx.id(),
            "sending request"
        );
        let call: ServiceFuture<'_, Resp> = (self.send)(client, request);

        let result = match env.options.timeout {
            Some(limit) => tokio::select! {
                biased;
                () = env.cancel.cancelled() => return Err(cancelled()),
                timed = tokio::time::timeout(limit, call) => timed.map_err(|_| Error::Timeout {
                    operation: self.operation.to_string(),
                    duration_secs: limit.as_secs(),
                })?,
            },
            None => tokio::select! {
                biased;
                () = env.cancel.cancelled() => return Err(cancelled()),
                result = call => result,
            },
        };

        result.map_err(|source| self.wrap_failure(ctx, source))
    }

    fn wrap_failure(&self, ctx: &ExecutionContext, source: ServiceError) -> Error {
        match source.unresolved_host().map(ToString::to_string) {
            Some(host) => Error::NameResolution {
                operation: self.operation.to_string(),
                host,
                region: ctx.client().region_or_unset().to_string(),
                source,
            },
            None => Error::ServiceFailure {
                operation: self.operation.to_string(),
                source,
            },
        }
    }
}
