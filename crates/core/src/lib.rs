//! Unstructured resource access for xfn.
//!
//! Resources cross the function boundary as `google.protobuf.Struct` trees.
//! This crate provides explicit, typed access to those trees:
//!
//! - [`FieldPath`] - a parsed dotted path such as `spec.protectionLevel`
//! - [`fieldpath`] - reads that separate "absent" from "wrong shape", and
//!   writes that create intermediate objects
//! - [`value`] - builders for `Value` trees
//!
//! Decoding and encoding of typed views are written against these
//! primitives, one mapping function per type, instead of round-tripping
//! through JSON.

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
pub mod fieldpath;
pub mod value;

pub use error::Error;
pub use fieldpath::FieldPath;

/// Result type alias for field-path operations.
pub type Result<T> = std::result::Result<T, Error>;
