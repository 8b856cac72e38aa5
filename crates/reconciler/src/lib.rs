//! Composition function that gives every encryption-key composite a KMS
//! crypto key.
//!
//! Each invocation is a single pass over the host's request:
//!
//! - **Decode**: read the observed composite into a [`CompositeView`]
//! - **Synthesize**: derive the [`GeneratedChildSpec`] for the crypto key
//! - **Gate**: check whether the host has observed the key yet
//! - **Assemble**: write desired state, derived status and signal into the response
//!
//! The function keeps nothing between invocations. While the key does not
//! exist yet the response carries a normal "waiting" result and the host
//! calls again; once it exists a `FunctionSuccess` condition is reported.
//!
//! # Example
//!
//! ```ignore
//! use xfn_encryption::{Deadline, Function, FunctionConfig};
//!
//! let function = Function::new(FunctionConfig::default())?;
//! let response = function.run(&request, Deadline::none())?;
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod assemble;
pub mod config;
pub mod decode;
pub mod error;
pub mod gate;
pub mod reconciler;
pub mod service;
pub mod synthesize;
pub mod types;

// Re-export main types
pub use assemble::{Assembler, Outcome};
pub use config::{FunctionConfig, SynthesisConfig};
pub use error::{Error, Result};
pub use reconciler::{Deadline, Function, FunctionBuilder};
pub use service::{FunctionService, parse_grpc_timeout};
pub use types::{
    Audience, CompositeStatus, CompositeView, DeletionPolicy, GeneratedChildSpec,
    ManagementPolicy, ObservedChildSet, Stage, StatusSignal,
};
