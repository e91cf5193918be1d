//! Parameter binding, output projection and invocation pipeline for
//! Location Service cmdlets.
//!
//! Every cmdlet maps one-to-one onto a single service operation. Instead of
//! one hand-written command per operation, each cmdlet is a declarative
//! [`Cmdlet`] value and a single generic pipeline runs all of them.
//!
//! # Architecture
//!
//! - [`ParameterDescriptor`]: static per-parameter schema
//! - [`bind`]: resolves flags, pipeline input and positionals
//! - [`ExecutionContext`]: bound values for one invocation
//! - [`OutputMode`]: what an invocation emits
//! - [`Confirmer`]: the confirmation gate
//! - [`Cmdlet::invoke`]: the pipeline itself, returning an [`Outcome`]
//!
//! The service client is a collaborator: cmdlets are generic over it and
//! only see [`ServiceError`] from it.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod binding;
mod cmdlet;
mod confirm;
mod context;
mod error;
mod output;
mod parameter;
mod pipeline;
mod service;

pub mod cli;

pub use binding::{bind, BindingInput, BoundParameters, BoundValue};
pub use cmdlet::{Cmdlet, CmdletInfo, DynCmdlet, Pagination};
pub use confirm::{AutoConfirm, ConfirmImpact, ConfirmationRequest, Confirmer};
pub use context::{ClientContext, ExecutionContext};
pub use error::{Error, Result};
pub use output::{OutputMode, SelectorRules};
pub use parameter::{BindingSource, DefaultValue, ParameterDescriptor, ParameterType};
pub use pipeline::{
    Emitted, InvocationEnv, InvocationOptions, InvocationRequest, InvocationState,
    MissingRequiredPolicy, Outcome,
};
pub use service::{BoxError, ServiceError, ServiceFuture};
