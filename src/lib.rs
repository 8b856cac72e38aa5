#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # xfn
//!
//! Server binary for the encryption-key composition function.
//!
//! The function itself lives in [`xfn_encryption`]; this crate parses the
//! command line, loads configuration and serves it over gRPC.

pub mod cli;
pub mod server;

pub use xfn_encryption;
