//! Response assembler.
//!
//! Every invocation ends here exactly once. A response starts as a copy of
//! the request's desired state and context; [`Assembler::assemble`] then
//! either records a fatal result or commits the synthesized child, the
//! derived composite status and the gate's signal. Desired state is staged
//! and only committed when every write succeeded.

use std::time::Duration;

use tracing::{debug, warn};
use xfn_core::{FieldPath, fieldpath, value};
use xfn_proto::{
    Condition, Resource, ResponseMeta, RunFunctionRequest, RunFunctionResponse, Severity, State,
    Status, Target, prost_types, v1,
};

use crate::error::{Error, Result};
use crate::types::{Audience, CompositeStatus, GeneratedChildSpec, StatusSignal};

/// Condition type set once the child exists.
pub const SUCCESS_CONDITION_TYPE: &str = "FunctionSuccess";
/// Condition reason set once the child exists.
pub const SUCCESS_CONDITION_REASON: &str = "Success";

/// What the pipeline decided before assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The invocation failed before anything was synthesized.
    Fatal(Error),
    /// A child was synthesized; the signal says whether it exists yet.
    Converging {
        child: GeneratedChildSpec,
        status: CompositeStatus,
        signal: StatusSignal,
    },
}

impl Outcome {
    /// Build a converging outcome, deriving the composite status from the signal.
    pub fn converging(child: GeneratedChildSpec, signal: StatusSignal) -> Self {
        let status = CompositeStatus {
            key_name: child.name.clone(),
            ready: signal.is_success(),
        };
        Self::Converging {
            child,
            status,
            signal,
        }
    }
}

/// Start a response from a request: echo the tag, set the TTL, carry over
/// desired state and context unchanged.
pub fn response_to(request: &RunFunctionRequest, ttl: Duration) -> RunFunctionResponse {
    RunFunctionResponse {
        meta: Some(ResponseMeta {
            tag: request
                .meta
                .as_ref()
                .map(|meta| meta.tag.clone())
                .unwrap_or_default(),
            ttl: Some(proto_duration(ttl)),
        }),
        desired: request.desired.clone(),
        results: Vec::new(),
        context: request.context.clone(),
        conditions: Vec::new(),
    }
}

fn proto_duration(duration: Duration) -> prost_types::Duration {
    prost_types::Duration {
        seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
        nanos: i32::try_from(duration.subsec_nanos()).unwrap_or(0),
    }
}

/// Writes outcomes into responses.
#[derive(Debug, Clone)]
pub struct Assembler {
    status_path: FieldPath,
}

impl Assembler {
    /// Create an assembler writing the derived status at `status_path`.
    pub const fn new(status_path: FieldPath) -> Self {
        Self { status_path }
    }

    /// Finish `response` with `outcome`.
    ///
    /// Every outcome ends as exactly one [`StatusSignal`]; failures are
    /// rendered as [`StatusSignal::Fatal`] and keep the desired state the
    /// request carried.
    pub fn assemble(&self, mut response: RunFunctionResponse, outcome: Outcome) -> RunFunctionResponse {
        let signal = match outcome {
            Outcome::Fatal(error) => StatusSignal::from(&error),
            Outcome::Converging {
                child,
                status,
                signal,
            } => match self.stage_desired(response.desired.as_ref(), &child, &status) {
                Ok(desired) => {
                    debug!(
                        key = %child.key,
                        name = %child.name,
                        ready = status.ready,
                        "Desired state assembled"
                    );
                    response.desired = Some(desired);
                    signal
                }
                Err(error) => StatusSignal::from(&error),
            },
        };

        attach(&mut response, &signal);
        response
    }

    /// Build the outgoing desired state without touching the response.
    fn stage_desired(
        &self,
        current: Option<&State>,
        child: &GeneratedChildSpec,
        status: &CompositeStatus,
    ) -> Result<State> {
        let mut desired = current.cloned().unwrap_or_default();

        let composite = desired.composite.get_or_insert_with(Resource::default);
        let object = composite.resource.get_or_insert_with(prost_types::Struct::default);
        fieldpath::set_value(object, &self.status_path, status_value(status))
            .map_err(|e| Error::encode(format!("cannot set composite status: {e}")))?;

        desired.resources.insert(
            child.key.clone(),
            Resource {
                resource: Some(child.to_object()),
                ..Default::default()
            },
        );

        Ok(desired)
    }
}

fn status_value(status: &CompositeStatus) -> prost_types::Value {
    value::struct_value(value::object([
        ("keyName", value::string(&status.key_name)),
        ("ready", value::boolean(status.ready)),
    ]))
}

impl From<&Error> for StatusSignal {
    fn from(error: &Error) -> Self {
        Self::Fatal {
            message: error.to_string(),
        }
    }
}

const fn target(audience: Audience) -> Target {
    match audience {
        Audience::Composite => Target::Composite,
        Audience::CompositeAndClaim => Target::CompositeAndClaim,
    }
}

/// Render the signal. A fatal result is never emitted next to a condition.
fn attach(response: &mut RunFunctionResponse, signal: &StatusSignal) {
    let target = Some(target(signal.audience()) as i32);
    match signal {
        StatusSignal::Waiting { message, .. } => response.results.push(v1::Result {
            severity: Severity::Normal as i32,
            message: message.clone(),
            reason: None,
            target,
        }),
        StatusSignal::Success { message, .. } => response.conditions.push(Condition {
            r#type: SUCCESS_CONDITION_TYPE.to_string(),
            status: Status::ConditionTrue as i32,
            reason: SUCCESS_CONDITION_REASON.to_string(),
            message: Some(message.clone()),
            target,
        }),
        StatusSignal::Fatal { message } => {
            warn!(error = %message, "Function failed");
            response.conditions.clear();
            response.results.push(v1::Result {
                severity: Severity::Fatal as i32,
                message: message.clone(),
                reason: None,
                target,
            });
        }
    }
}
