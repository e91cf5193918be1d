//! Declarative cmdlet schemas.
//!
//! A [`Cmdlet`] is a plain value: its parameters, its output rules, and
//! two functions that turn an [`ExecutionContext`] into a request and a
//! request into a service call. The invocation pipeline in
//! [`crate::pipeline`] is written once against this type.

use crate::confirm::ConfirmImpact;
use crate::context::ExecutionContext;
use crate::output::SelectorRules;
use crate::parameter::ParameterDescriptor;
use crate::pipeline::{InvocationEnv, InvocationRequest, Outcome};
use crate::service::ServiceFuture;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Hooks for cmdlets whose operation returns results in pages.
pub struct Pagination<Req, Resp> {
    /// Parameter that carries the page token, e.g. `NextToken`.
    ///
    /// When the caller binds it, automatic iteration is disabled.
    pub token_parameter: &'static str,
    /// Writes a page token into a freshly built request.
    pub set_token: fn(&mut Req, String),
    /// Reads the next page token from a response.
    pub next_token: fn(&Resp) -> Option<String>,
    /// Appends a later page to the accumulated response.
    ///
    /// Must carry over the later page's next token.
    pub merge: fn(&mut Resp, Resp),
}

impl<Req, Resp> fmt::Debug for Pagination<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pagination")
            .field("token_parameter", &self.token_parameter)
            .finish_non_exhaustive()
    }
}

/// Schema of one cmdlet, generic over the client it calls.
pub struct Cmdlet<C: ?Sized, Req, Resp>
where
    Req: 'static,
    Resp: 'static,
{
    /// Verb-noun name, e.g. `Get-LOCGeofenceList`.
    pub name: &'static str,
    /// Service operation name, e.g. `ListGeofences`.
    pub operation: &'static str,
    /// One-line description.
    pub synopsis: &'static str,
    /// Declared parameters in positional order.
    pub parameters: &'static [ParameterDescriptor],
    /// Top-level response field names, as serialized.
    pub response_fields: &'static [&'static str],
    /// Selector used when the caller gives none.
    pub default_select: &'static str,
    /// Parameter echoed by pass-through and shown in confirmation prompts.
    pub primary_parameter: Option<&'static str>,
    /// Confirmation impact.
    pub impact: ConfirmImpact,
    /// Builds the request from bound parameters.
    pub build_request: fn(&ExecutionContext) -> Result<Req>,
    /// Sends the request through the client.
    pub send: for<'a> fn(&'a C, Req) -> ServiceFuture<'a, Resp>,
    /// Pagination hooks, for paged operations.
    pub pagination: Option<Pagination<Req, Resp>>,
}

impl<C: ?Sized, Req, Resp> Cmdlet<C, Req, Resp>
where
    Req: 'static,
    Resp: 'static,
{
    /// Output selector rules of this cmdlet.
    #[must_use]
    pub const fn selector_rules(&self) -> SelectorRules<'static> {
        SelectorRules {
            default_select: self.default_select,
            response_fields: self.response_fields,
            parameters: self.parameters,
            primary_parameter: self.primary_parameter,
        }
    }

    /// Static facts about this cmdlet.
    #[must_use]
    pub const fn info(&self) -> CmdletInfo {
        CmdletInfo {
            name: self.name,
            operation: self.operation,
            synopsis: self.synopsis,
            parameters: self.parameters,
            response_fields: self.response_fields,
            default_select: self.default_select,
            primary_parameter: self.primary_parameter,
            impact: self.impact,
            paginated: self.pagination.is_some(),
        }
    }
}

impl<C: ?Sized, Req, Resp> fmt::Debug for Cmdlet<C, Req, Resp>
where
    Req: 'static,
    Resp: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmdlet")
            .field("name", &self.name)
            .field("operation", &self.operation)
            .field("impact", &self.impact)
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

/// Static, type-erased facts about a cmdlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdletInfo {
    /// Verb-noun name.
    pub name: &'static str,
    /// Service operation name.
    pub operation: &'static str,
    /// One-line description.
    pub synopsis: &'static str,
    /// Declared parameters.
    pub parameters: &'static [ParameterDescriptor],
    /// Top-level response field names.
    pub response_fields: &'static [&'static str],
    /// Default selector.
    pub default_select: &'static str,
    /// Pass-through / confirmation target parameter.
    pub primary_parameter: Option<&'static str>,
    /// Confirmation impact.
    pub impact: ConfirmImpact,
    /// Whether the operation is paged.
    pub paginated: bool,
}

/// A cmdlet with its request and response types erased.
///
/// Lets a registry hold every cmdlet for one client type in a single
/// collection.
#[async_trait]
pub trait DynCmdlet<C: ?Sized + Sync>: Send + Sync {
    /// Static facts about the cmdlet.
    fn info(&self) -> CmdletInfo;

    /// Runs the invocation pipeline and returns the response as JSON.
    async fn invoke_json(
        &self,
        client: &C,
        request: InvocationRequest,
        env: &InvocationEnv<'_>,
    ) -> Outcome<Value>;
}

#[async_trait]
impl<C, Req, Resp> DynCmdlet<C> for Cmdlet<C, Req, Resp>
where
    C: ?Sized + Sync,
    Req: Send + 'static,
    Resp: Serialize + Send + 'static,
{
    fn info(&self) -> CmdletInfo {
        Self::info(self)
    }

    async fn invoke_json(
        &self,
        client: &C,
        request: InvocationRequest,
        env: &InvocationEnv<'_>,
    ) -> Outcome<Value> {
        self.invoke(client, request, env).await.into_json()
    }
}
