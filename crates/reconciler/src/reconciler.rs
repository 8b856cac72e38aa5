//! Per-invocation pipeline.

use std::time::{Duration, Instant};

use tracing::debug;
use xfn_proto::{RunFunctionRequest, RunFunctionResponse};

use crate::assemble::{Assembler, Outcome, response_to};
use crate::config::{FunctionConfig, SynthesisConfig};
use crate::decode::decode_composite;
use crate::error::{Error, Result};
use crate::gate::classify;
use crate::synthesize::synthesize;
use crate::types::{ObservedChildSet, Stage};

/// Point in time after which an invocation is abandoned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline.
    pub const fn none() -> Self {
        Self(None)
    }

    /// Expire at `instant`.
    pub const fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    /// Expire `timeout` from now. A timeout too large to represent means no deadline.
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }

    /// Earlier of two deadlines.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Self(Some(a.min(b))),
            (Some(a), None) | (None, Some(a)) => Self(Some(a)),
            (None, None) => Self(None),
        }
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with [`Error::DeadlineExceeded`] when entering `stage` too late.
    pub fn check(&self, stage: Stage) -> Result<()> {
        if self.is_expired() {
            return Err(Error::deadline_exceeded(stage));
        }
        Ok(())
    }
}

/// The encryption function: decode, synthesize, gate, assemble.
///
/// Holds configuration only; every call to [`Function::run`] is independent.
#[derive(Debug, Clone)]
pub struct Function {
    config: FunctionConfig,
    assembler: Assembler,
}

impl Function {
    /// Create a function from validated configuration.
    pub fn new(config: FunctionConfig) -> Result<Self> {
        let status_path = config.validate()?;
        Ok(Self {
            config,
            assembler: Assembler::new(status_path),
        })
    }

    /// Start building a function.
    pub fn builder() -> FunctionBuilder {
        FunctionBuilder::new()
    }

    /// Get the configuration.
    pub const fn config(&self) -> &FunctionConfig {
        &self.config
    }

    /// Run one invocation.
    ///
    /// Fatal failures are part of the returned response. Only a passed
    /// deadline is returned as an error, and then no response exists.
    pub fn run(
        &self,
        request: &RunFunctionRequest,
        deadline: Deadline,
    ) -> Result<RunFunctionResponse> {
        let response = response_to(request, self.config.response_ttl);
        let outcome = self.converge(request, deadline)?;

        deadline.check(Stage::Assembled)?;
        Ok(self.assembler.assemble(response, outcome))
    }

    /// Everything before assembly. Decode failures become a fatal outcome
    /// so the assembler still runs.
    fn converge(&self, request: &RunFunctionRequest, deadline: Deadline) -> Result<Outcome> {
        deadline.check(Stage::Decoded)?;
        let view = match decode_composite(request.observed.as_ref()) {
            Ok(view) => view,
            Err(error) => return Ok(Outcome::Fatal(error)),
        };
        debug!(
            stage = %Stage::Decoded,
            name = %view.name,
            protection_level = %view.protection_level,
            "Composite decoded"
        );

        deadline.check(Stage::Synthesized)?;
        let child = synthesize(&view, &self.config.synthesis);
        debug!(stage = %Stage::Synthesized, key = %child.key, name = %child.name, "Child synthesized");

        deadline.check(Stage::Gated)?;
        let observed = ObservedChildSet::from_state(request.observed.as_ref());
        let signal = classify(&child.key, &observed);
        debug!(
            stage = %Stage::Gated,
            observed = observed.len(),
            ready = signal.is_success(),
            "Gate evaluated"
        );

        Ok(Outcome::converging(child, signal))
    }
}

/// Builder for [`Function`].
#[derive(Debug, Clone, Default)]
pub struct FunctionBuilder {
    config: FunctionConfig,
}

impl FunctionBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: FunctionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the response TTL.
    #[must_use]
    pub fn response_ttl(mut self, ttl: Duration) -> Self {
        self.config.response_ttl = ttl;
        self
    }

    /// Set the status path.
    #[must_use]
    pub fn status_path(mut self, path: impl Into<String>) -> Self {
        self.config.status_path = path.into();
        self
    }

    /// Set the synthesis constants.
    #[must_use]
    pub fn synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.config.synthesis = synthesis;
        self
    }

    /// Build the function.
    pub fn build(self) -> Result<Function> {
        Function::new(self.config)
    }
}
