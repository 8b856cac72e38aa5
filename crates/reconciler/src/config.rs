//! Configuration for the encryption function.
//!
//! Every constant the synthesizer stamps onto the generated key lives in
//! [`SynthesisConfig`] and is passed in explicitly; nothing is read from
//! ambient defaults during an invocation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use xfn_core::FieldPath;

use crate::error::{Error, Result};
use crate::types::{DeletionPolicy, ManagementPolicy};

/// Logical name of the generated key in observed/desired state.
pub const DEFAULT_RESOURCE_KEY: &str = "cryptokey";
/// Suffix appended to the composite name to name the key.
pub const DEFAULT_NAME_SUFFIX: &str = "encryption";
pub const DEFAULT_API_VERSION: &str = "kms.gcp.upbound.io/v1beta2";
pub const DEFAULT_KIND: &str = "CryptoKey";
/// Symmetric encryption, the only purpose the key is created for.
pub const DEFAULT_ALGORITHM: &str = "GOOGLE_SYMMETRIC_ENCRYPTION";
/// Where the derived status is written on the desired composite.
pub const DEFAULT_STATUS_PATH: &str = "status.encryption";
/// Environment variable overriding the response TTL, in seconds.
pub const RESPONSE_TTL_VAR: &str = "XFN_RESPONSE_TTL_SECS";
/// Environment variable overriding the status path.
pub const STATUS_PATH_VAR: &str = "XFN_STATUS_PATH";
/// How long the host may cache a response.
pub const DEFAULT_RESPONSE_TTL: Duration = Duration::from_secs(60);

/// Constants stamped onto the generated crypto key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_resource_key")]
    pub resource_key: String,

    #[serde(default = "default_name_suffix")]
    pub name_suffix: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    #[serde(default = "default_management_policies")]
    pub management_policies: Vec<ManagementPolicy>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            resource_key: default_resource_key(),
            name_suffix: default_name_suffix(),
            api_version: default_api_version(),
            kind: default_kind(),
            algorithm: default_algorithm(),
            deletion_policy: DeletionPolicy::default(),
            management_policies: default_management_policies(),
        }
    }
}

impl SynthesisConfig {
    /// Set the deletion policy.
    #[must_use]
    pub const fn deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    /// Set the algorithm.
    #[must_use]
    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.resource_key.is_empty() {
            return Err(Error::config("resource_key must not be empty"));
        }
        if self.name_suffix.is_empty() {
            return Err(Error::config("name_suffix must not be empty"));
        }
        if self.management_policies.is_empty() {
            return Err(Error::config("management_policies must not be empty"));
        }
        Ok(())
    }
}

/// Configuration for the function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// TTL reported in every response.
    #[serde(with = "duration_secs", default = "default_response_ttl")]
    pub response_ttl: Duration,

    /// Field path of the derived status on the composite.
    #[serde(default = "default_status_path")]
    pub status_path: String,

    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            response_ttl: default_response_ttl(),
            status_path: default_status_path(),
            synthesis: SynthesisConfig::default(),
        }
    }
}

impl FunctionConfig {
    /// Set the response TTL.
    #[must_use]
    pub const fn response_ttl(mut self, ttl: Duration) -> Self {
        self.response_ttl = ttl;
        self
    }

    /// Set the status path.
    #[must_use]
    pub fn status_path(mut self, path: impl Into<String>) -> Self {
        self.status_path = path.into();
        self
    }

    /// Set the synthesis constants.
    #[must_use]
    pub fn synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesis = synthesis;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from variables resolved by `var`.
    ///
    /// Unset variables keep their defaults; a set but malformed variable is an error.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = var(RESPONSE_TTL_VAR) {
            let secs = secs
                .trim()
                .parse()
                .map_err(|e| Error::config(format!("{RESPONSE_TTL_VAR}: '{secs}': {e}")))?;
            config.response_ttl = Duration::from_secs(secs);
        }

        if let Some(path) = var(STATUS_PATH_VAR) {
            config.status_path = path;
        }

        Ok(config)
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;

        // Try JSON first, then TOML
        if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Failed to parse config: {e}")))
        } else {
            toml::from_str(&content)
                .map_err(|e| Error::config(format!("Failed to parse config: {e}")))
        }
    }

    /// Check the configuration and parse the status path.
    pub fn validate(&self) -> Result<FieldPath> {
        self.synthesis.validate()?;
        let status_path = FieldPath::parse(&self.status_path)
            .map_err(|e| Error::config(format!("status_path: {e}")))?;
        if status_path.segments().len() < 2 {
            return Err(Error::config(
                "status_path must name a field below the composite root",
            ));
        }
        Ok(status_path)
    }
}

fn default_resource_key() -> String {
    DEFAULT_RESOURCE_KEY.to_string()
}

fn default_name_suffix() -> String {
    DEFAULT_NAME_SUFFIX.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}

fn default_management_policies() -> Vec<ManagementPolicy> {
    vec![ManagementPolicy::All]
}

fn default_status_path() -> String {
    DEFAULT_STATUS_PATH.to_string()
}

const fn default_response_ttl() -> Duration {
    DEFAULT_RESPONSE_TTL
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
