//! Builders for `google.protobuf.Value` trees.

use prost_types::value::Kind;
use prost_types::{ListValue, Struct, Value};

/// A string value.
pub fn string(s: impl Into<String>) -> Value {
    Value {
        kind: Some(Kind::StringValue(s.into())),
    }
}

/// A boolean value.
pub const fn boolean(b: bool) -> Value {
    Value {
        kind: Some(Kind::BoolValue(b)),
    }
}

/// A JSON null.
pub const fn null() -> Value {
    Value {
        kind: Some(Kind::NullValue(0)),
    }
}

/// A list value.
pub fn list(values: impl IntoIterator<Item = Value>) -> Value {
    Value {
        kind: Some(Kind::ListValue(ListValue {
            values: values.into_iter().collect(),
        })),
    }
}

/// Wrap an object as a value.
pub fn struct_value(object: Struct) -> Value {
    Value {
        kind: Some(Kind::StructValue(object)),
    }
}

/// An object built from key/value pairs. Later keys win.
pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Struct {
    Struct {
        fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
    }
}

/// Short JSON-ish name of a value's kind, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => "null",
        Some(Kind::NumberValue(_)) => "number",
        Some(Kind::StringValue(_)) => "string",
        Some(Kind::BoolValue(_)) => "bool",
        Some(Kind::StructValue(_)) => "object",
        Some(Kind::ListValue(_)) => "list",
    }
}
