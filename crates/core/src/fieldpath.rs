//! Dotted field paths over `google.protobuf.Struct` objects.
//!
//! A path such as `spec.forProvider.versionTemplate` names a chain of nested
//! objects. Reads distinguish "absent" (`Ok(None)`) from "present with the
//! wrong shape" (`Err`), so callers can tell missing input from malformed
//! input. A JSON `null` is treated as absent.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use prost_types::value::Kind;
use prost_types::{Struct, Value};

use crate::error::Error;
use crate::value::kind_name;
use crate::Result;

/// A parsed, non-empty dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path. Empty paths and empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::invalid_path(path, "path is empty"));
        }
        let segments = path.split('.').map(str::to_string).collect_vec();
        if segments.iter().any(String::is_empty) {
            return Err(Error::invalid_path(path, "empty segment"));
        }
        Ok(Self { segments })
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path made of the first `len` segments, for error reporting.
    fn prefix(&self, len: usize) -> String {
        self.segments.iter().take(len).join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.iter().join("."))
    }
}

fn is_null(value: &Value) -> bool {
    matches!(value.kind, None | Some(Kind::NullValue(_)))
}

/// Look up the value at `path`.
///
/// Returns `Ok(None)` when any segment is absent or null, and an error when
/// an intermediate segment holds something other than an object.
pub fn lookup<'a>(object: &'a Struct, path: &FieldPath) -> Result<Option<&'a Value>> {
    let mut fields = &object.fields;
    let mut found: Option<&'a Value> = None;

    for (depth, segment) in path.segments().iter().enumerate() {
        if let Some(parent) = found {
            match parent {
                Value {
                    kind: Some(Kind::StructValue(inner)),
                } => fields = &inner.fields,
                other => {
                    return Err(Error::wrong_type(
                        path.prefix(depth),
                        "object",
                        kind_name(other),
                    ));
                }
            }
        }
        match fields.get(segment) {
            Some(value) if !is_null(value) => found = Some(value),
            _ => return Ok(None),
        }
    }

    Ok(found)
}

/// Read the string at `path`.
pub fn get_string<'a>(object: &'a Struct, path: &FieldPath) -> Result<Option<&'a str>> {
    match lookup(object, path)? {
        None => Ok(None),
        Some(Value {
            kind: Some(Kind::StringValue(s)),
        }) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::wrong_type(path.to_string(), "string", kind_name(other))),
    }
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// Absent or null intermediates are replaced with empty objects. Any other
/// non-object intermediate is an error and leaves `object` unchanged.
pub fn set_value(object: &mut Struct, path: &FieldPath, value: Value) -> Result<()> {
    check_writable(object, path)?;
    set_in(&mut object.fields, path.segments(), value);
    Ok(())
}

/// Verify that every intermediate on `path` is absent, null or an object.
fn check_writable(object: &Struct, path: &FieldPath) -> Result<()> {
    let parents = path.segments().len().saturating_sub(1);
    let mut fields = &object.fields;

    for (depth, segment) in path.segments().iter().take(parents).enumerate() {
        match fields.get(segment) {
            None => return Ok(()),
            Some(value) if is_null(value) => return Ok(()),
            Some(Value {
                kind: Some(Kind::StructValue(inner)),
            }) => fields = &inner.fields,
            Some(other) => {
                return Err(Error::wrong_type(
                    path.prefix(depth.saturating_add(1)),
                    "object",
                    kind_name(other),
                ));
            }
        }
    }

    Ok(())
}

fn set_in(fields: &mut BTreeMap<String, Value>, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        fields.insert(head.clone(), value);
        return;
    }

    let entry = fields.entry(head.clone()).or_insert_with(|| Value {
        kind: Some(Kind::StructValue(Struct::default())),
    });
    if is_null(entry) {
        entry.kind = Some(Kind::StructValue(Struct::default()));
    }
    if let Some(Kind::StructValue(inner)) = entry.kind.as_mut() {
        set_in(&mut inner.fields, rest, value);
    }
}
