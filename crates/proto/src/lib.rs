//! Protobuf bindings for the composition function runner protocol.
//!
//! The host (the reconciliation engine) calls `RunFunction` once per
//! reconcile of a composite resource. The message and service code is
//! generated at build time from `proto/apiextensions/fn/proto/v1/run_function.proto`.

// Include generated protobuf code
pub mod apiextensions {
    pub mod r#fn {
        pub mod proto {
            pub mod v1 {
                tonic::include_proto!("apiextensions.r#fn.proto.v1");
            }
        }
    }
}

/// Shorthand for the only protocol version served.
pub use apiextensions::r#fn::proto::v1;

// Re-export commonly used types for convenience
pub use v1::function_runner_service_server::{
    FunctionRunnerService, FunctionRunnerServiceServer, SERVICE_NAME,
};
pub use v1::{
    Condition, Ready, RequestMeta, Resource, ResponseMeta, RunFunctionRequest,
    RunFunctionResponse, Severity, State, Status, Target,
};

/// Re-exported so downstream crates name structured objects through one path.
pub use prost_types;
