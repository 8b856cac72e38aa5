//! Input decoder: observed composite -> [`CompositeView`].
//!
//! The mapping is written field by field against [`xfn_core::fieldpath`]:
//! structural problems become [`Error::Decode`], missing or empty required
//! fields become [`Error::Validation`] naming the field.

use xfn_core::{FieldPath, fieldpath};
use xfn_proto::State;
use xfn_proto::prost_types::Struct;

use crate::error::{Error, Result};
use crate::types::CompositeView;

/// Path of the composite name.
pub const NAME_PATH: &str = "metadata.name";
/// Path of the requested protection level.
pub const PROTECTION_LEVEL_PATH: &str = "spec.protectionLevel";

/// Decode the observed composite of a request.
pub fn decode_composite(observed: Option<&State>) -> Result<CompositeView> {
    let resource = observed
        .and_then(|state| state.composite.as_ref())
        .and_then(|composite| composite.resource.as_ref())
        .ok_or_else(|| Error::decode("cannot get observed composite resource"))?;

    CompositeView::try_from(resource)
}

impl TryFrom<&Struct> for CompositeView {
    type Error = Error;

    fn try_from(resource: &Struct) -> Result<Self> {
        let name = required_string(resource, NAME_PATH)?;
        let protection_level = required_string(resource, PROTECTION_LEVEL_PATH)?;

        Ok(Self {
            name,
            protection_level,
        })
    }
}

fn required_string(resource: &Struct, path: &str) -> Result<String> {
    let field = FieldPath::parse(path).map_err(|e| Error::decode(e.to_string()))?;

    match fieldpath::get_string(resource, &field) {
        Ok(Some(value)) if !value.is_empty() => Ok(value.to_string()),
        Ok(_) => Err(Error::validation(path)),
        Err(e) => Err(Error::decode(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfn_core::value;
    use xfn_proto::Resource;

    fn composite(fields: Struct) -> State {
        State {
            composite: Some(Resource {
                resource: Some(fields),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn xr(name: Option<&str>, protection_level: Option<&str>) -> Struct {
        let mut metadata = Vec::new();
        if let Some(name) = name {
            metadata.push(("name", value::string(name)));
        }
        let mut spec = Vec::new();
        if let Some(level) = protection_level {
            spec.push(("protectionLevel", value::string(level)));
        }
        value::object([
            ("apiVersion", value::string("sijoma.io/v1alpha1")),
            ("kind", value::string("XEncryptionKey")),
            ("metadata", value::struct_value(value::object(metadata))),
            ("spec", value::struct_value(value::object(spec))),
        ])
    }

    #[test]
    fn test_decode_valid_composite() {
        let state = composite(xr(Some("db1"), Some("SOFTWARE")));
        let view = decode_composite(Some(&state));
        assert_eq!(
            view,
            Ok(CompositeView {
                name: "db1".to_string(),
                protection_level: "SOFTWARE".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_protection_level_is_validation_error() {
        let state = composite(xr(Some("db1"), None));
        let err = decode_composite(Some(&state));
        assert_eq!(err, Err(Error::validation("spec.protectionLevel")));
    }

    #[test]
    fn test_empty_protection_level_is_validation_error() {
        let state = composite(xr(Some("db1"), Some("")));
        assert_eq!(
            decode_composite(Some(&state)),
            Err(Error::validation(PROTECTION_LEVEL_PATH))
        );
    }

    #[test]
    fn test_empty_name_is_validation_error() {
        let state = composite(xr(Some(""), Some("HSM")));
        assert_eq!(
            decode_composite(Some(&state)),
            Err(Error::validation(NAME_PATH))
        );
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let resource = value::object([
            ("metadata", value::string("db1")),
            (
                "spec",
                value::struct_value(value::object([("protectionLevel", value::string("HSM"))])),
            ),
        ]);
        let err = decode_composite(Some(&composite(resource)));
        assert!(matches!(err, Err(Error::Decode { .. })));
        assert!(err.err().is_some_and(|e| e.to_string().contains("metadata")));
    }

    #[test]
    fn test_non_string_protection_level_is_decode_error() {
        let resource = value::object([
            (
                "metadata",
                value::struct_value(value::object([("name", value::string("db1"))])),
            ),
            (
                "spec",
                value::struct_value(value::object([("protectionLevel", value::boolean(true))])),
            ),
        ]);
        let err = decode_composite(Some(&composite(resource)));
        assert!(matches!(err, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_missing_composite_is_decode_error() {
        assert!(matches!(decode_composite(None), Err(Error::Decode { .. })));
        assert!(matches!(
            decode_composite(Some(&State::default())),
            Err(Error::Decode { .. })
        ));
    }
}
