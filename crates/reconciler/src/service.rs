//! gRPC service adapter for the function runner protocol.

use std::sync::Arc;
use std::time::Duration;

use tonic::{Request, Response, Status};
use tracing::{info, warn};
use xfn_proto::{FunctionRunnerService, RunFunctionRequest, RunFunctionResponse};

use crate::error::Error;
use crate::reconciler::{Deadline, Function};

/// Request header carrying the caller's timeout.
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Serves [`Function`] over gRPC.
#[derive(Debug, Clone)]
pub struct FunctionService {
    function: Arc<Function>,
    timeout: Option<Duration>,
}

impl FunctionService {
    /// Create a new service.
    pub fn new(function: Function) -> Self {
        Self::from_arc(Arc::new(function))
    }

    /// Create a service sharing an existing function.
    pub const fn from_arc(function: Arc<Function>) -> Self {
        Self {
            function,
            timeout: None,
        }
    }

    /// Bound every invocation by `timeout`, on top of the caller's own deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn deadline_for<T>(&self, request: &Request<T>) -> Deadline {
        let caller = request
            .metadata()
            .get(GRPC_TIMEOUT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_grpc_timeout)
            .map(Deadline::after)
            .unwrap_or_default();
        let server = self.timeout.map(Deadline::after).unwrap_or_default();
        caller.min(server)
    }
}

#[tonic::async_trait]
impl FunctionRunnerService for FunctionService {
    async fn run_function(
        &self,
        request: Request<RunFunctionRequest>,
    ) -> Result<Response<RunFunctionResponse>, Status> {
        let deadline = self.deadline_for(&request);
        let req = request.into_inner();
        let tag = req
            .meta
            .as_ref()
            .map(|meta| meta.tag.as_str())
            .unwrap_or_default();

        info!(tag = %tag, "Running function");

        match self.function.run(&req, deadline) {
            Ok(response) => Ok(Response::new(response)),
            Err(error @ Error::DeadlineExceeded { .. }) => {
                warn!(tag = %tag, error = %error, "Abandoning invocation");
                Err(Status::deadline_exceeded(error.to_string()))
            }
            Err(error) => Err(Status::internal(error.to_string())),
        }
    }
}

/// Parse a `grpc-timeout` header value: up to eight digits and a unit
/// (`H`, `M`, `S`, `m`, `u` or `n`).
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    let unit = value.chars().last()?;
    let digits = value.strip_suffix(unit)?;
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    match unit {
        'H' => amount.checked_mul(3600).map(Duration::from_secs),
        'M' => amount.checked_mul(60).map(Duration::from_secs),
        'S' => Some(Duration::from_secs(amount)),
        'm' => Some(Duration::from_millis(amount)),
        'u' => Some(Duration::from_micros(amount)),
        'n' => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}
