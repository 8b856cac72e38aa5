//! Desired-state synthesizer: [`CompositeView`] -> [`GeneratedChildSpec`].

use xfn_core::value;
use xfn_proto::prost_types::Struct;

use crate::config::SynthesisConfig;
use crate::types::{CompositeView, GeneratedChildSpec};

/// Derive the crypto key for a composite.
///
/// Pure: the output depends only on `view` and `config`.
pub fn synthesize(view: &CompositeView, config: &SynthesisConfig) -> GeneratedChildSpec {
    GeneratedChildSpec {
        key: config.resource_key.clone(),
        api_version: config.api_version.clone(),
        kind: config.kind.clone(),
        name: child_name(&view.name, &config.name_suffix),
        deletion_policy: config.deletion_policy,
        management_policies: config.management_policies.clone(),
        algorithm: config.algorithm.clone(),
        protection_level: view.protection_level.clone(),
    }
}

/// Name of the generated child: `{composite}-{suffix}`.
pub fn child_name(composite: &str, suffix: &str) -> String {
    format!("{composite}-{suffix}")
}

impl GeneratedChildSpec {
    /// Encode as the structured object the host applies.
    pub fn to_object(&self) -> Struct {
        let version_template = value::object([
            ("algorithm", value::string(&self.algorithm)),
            ("protectionLevel", value::string(&self.protection_level)),
        ]);
        let spec = value::object([
            ("deletionPolicy", value::string(self.deletion_policy.as_str())),
            (
                "managementPolicies",
                value::list(
                    self.management_policies
                        .iter()
                        .map(|policy| value::string(policy.as_str())),
                ),
            ),
            (
                "forProvider",
                value::struct_value(value::object([(
                    "versionTemplate",
                    value::struct_value(version_template),
                )])),
            ),
        ]);

        value::object([
            ("apiVersion", value::string(&self.api_version)),
            ("kind", value::string(&self.kind)),
            (
                "metadata",
                value::struct_value(value::object([("name", value::string(&self.name))])),
            ),
            ("spec", value::struct_value(spec)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeletionPolicy, ManagementPolicy};
    use xfn_core::{FieldPath, fieldpath};

    fn view() -> CompositeView {
        CompositeView {
            name: "db1".to_string(),
            protection_level: "SOFTWARE".to_string(),
        }
    }

    fn read(object: &Struct, path: &str) -> Option<String> {
        FieldPath::parse(path)
            .ok()
            .and_then(|p| fieldpath::get_string(object, &p).ok().flatten().map(str::to_string))
    }

    #[test]
    fn test_synthesize_defaults() {
        let child = synthesize(&view(), &SynthesisConfig::default());

        assert_eq!(child.key, "cryptokey");
        assert_eq!(child.name, "db1-encryption");
        assert_eq!(child.protection_level, "SOFTWARE");
        assert_eq!(child.algorithm, "GOOGLE_SYMMETRIC_ENCRYPTION");
        assert_eq!(child.deletion_policy, DeletionPolicy::Delete);
        assert_eq!(child.management_policies, vec![ManagementPolicy::All]);
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let config = SynthesisConfig::default();
        assert_eq!(synthesize(&view(), &config), synthesize(&view(), &config));
    }

    #[test]
    fn test_protection_level_is_forwarded_verbatim() {
        let view = CompositeView {
            name: "db1".to_string(),
            protection_level: "hsm  ".to_string(),
        };
        let child = synthesize(&view, &SynthesisConfig::default());
        assert_eq!(child.protection_level, "hsm  ");
    }

    #[test]
    fn test_encoding_layout() {
        let object = synthesize(&view(), &SynthesisConfig::default()).to_object();

        assert_eq!(read(&object, "apiVersion").as_deref(), Some("kms.gcp.upbound.io/v1beta2"));
        assert_eq!(read(&object, "kind").as_deref(), Some("CryptoKey"));
        assert_eq!(read(&object, "metadata.name").as_deref(), Some("db1-encryption"));
        assert_eq!(read(&object, "spec.deletionPolicy").as_deref(), Some("Delete"));
        assert_eq!(
            read(&object, "spec.forProvider.versionTemplate.algorithm").as_deref(),
            Some("GOOGLE_SYMMETRIC_ENCRYPTION")
        );
        assert_eq!(
            read(&object, "spec.forProvider.versionTemplate.protectionLevel").as_deref(),
            Some("SOFTWARE")
        );

        let policies = FieldPath::parse("spec.managementPolicies")
            .ok()
            .and_then(|p| fieldpath::lookup(&object, &p).ok().flatten().cloned());
        assert_eq!(policies, Some(value::list([value::string("*")])));
    }
}
