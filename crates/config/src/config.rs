//! [`DeploymentConfig`] and its environment mapping.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `INSTANCE_ID` | `instance_id` | none (required by the lifecycle controller) |
//! | `ENVIRONMENT` | `environment` | none |
//! | `AWS_REGION` | `region` | `us-west-2` |
//! | `JWT_AUDIENCE` | `authorizer.audience` | `minecraft-server-client` |
//! | `JWT_ISSUER` | `authorizer.issuer` | `minecraft-auth` |
//! | `JWT_PUBLIC_KEY_PARAMETER` | `authorizer.public_key_parameter` | `/minecraft/jwt/public-key` |
//! | `PARAMETER_PREFIX` | `parameter_prefix` | `/minecraft` |
//!
//! Empty values are treated as unset.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Region used when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Audience bearer tokens must be issued for.
pub const DEFAULT_AUDIENCE: &str = "minecraft-server-client";

/// Issuer bearer tokens must come from.
pub const DEFAULT_ISSUER: &str = "minecraft-auth";

/// Parameter holding the public signing key.
pub const DEFAULT_PUBLIC_KEY_PARAMETER: &str = "/minecraft/jwt/public-key";

/// Prefix of environment-scoped parameters (`{prefix}/{environment}/admin_token`).
pub const DEFAULT_PARAMETER_PREFIX: &str = "/minecraft";

/// Principal id written into every authorizer policy.
pub const DEFAULT_PRINCIPAL_ID: &str = "user";

const ENV_INSTANCE_ID: &str = "INSTANCE_ID";
const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
const ENV_REGION: &str = "AWS_REGION";
const ENV_AUDIENCE: &str = "JWT_AUDIENCE";
const ENV_ISSUER: &str = "JWT_ISSUER";
const ENV_PUBLIC_KEY_PARAMETER: &str = "JWT_PUBLIC_KEY_PARAMETER";
const ENV_PARAMETER_PREFIX: &str = "PARAMETER_PREFIX";

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_owned()
}

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_owned()
}

fn default_public_key_parameter() -> String {
    DEFAULT_PUBLIC_KEY_PARAMETER.to_owned()
}

fn default_parameter_prefix() -> String {
    DEFAULT_PARAMETER_PREFIX.to_owned()
}

fn default_principal_id() -> String {
    DEFAULT_PRINCIPAL_ID.to_owned()
}

/// Expected claims and key location for bearer-token verification.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorizerSettings {
    /// Required `aud` claim.
    #[serde(default = "default_audience")]
    #[builder(into, default = default_audience())]
    pub audience: String,

    /// Required `iss` claim.
    #[serde(default = "default_issuer")]
    #[builder(into, default = default_issuer())]
    pub issuer: String,

    /// Name of the parameter holding the public signing key.
    #[serde(default = "default_public_key_parameter")]
    #[builder(into, default = default_public_key_parameter())]
    pub public_key_parameter: String,

    /// Principal id reported in the synthesized policy.
    #[serde(default = "default_principal_id")]
    #[builder(into, default = default_principal_id())]
    pub principal_id: String,
}

impl Default for AuthorizerSettings {
    fn default() -> Self {
        Self {
            audience: default_audience(),
            issuer: default_issuer(),
            public_key_parameter: default_public_key_parameter(),
            principal_id: default_principal_id(),
        }
    }
}

impl AuthorizerSettings {
    /// Rejects empty claim expectations and parameter names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("audience", &self.audience),
            ("issuer", &self.issuer),
            ("public_key_parameter", &self.public_key_parameter),
            ("principal_id", &self.principal_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

/// Process-wide deployment configuration.
///
/// The instance identifier is optional here on purpose: the authorizer does
/// not need it, and the lifecycle controller reports its absence as a
/// misconfiguration response rather than refusing to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentConfig {
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    instance_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_non_empty")]
    environment: Option<String>,

    #[serde(default = "default_region")]
    region: String,

    #[serde(default)]
    authorizer: AuthorizerSettings,

    #[serde(default = "default_parameter_prefix")]
    parameter_prefix: String,
}

#[bon::bon]
impl DeploymentConfig {
    /// Creates a configuration, validating every field.
    ///
    /// # Optional Fields
    ///
    /// * `instance_id` - Managed instance (default: none).
    /// * `environment` - Deployment environment name (default: none).
    /// * `region` - Platform region (default: `us-west-2`).
    /// * `authorizer` - Bearer-token expectations (default: [`AuthorizerSettings::default`]).
    /// * `parameter_prefix` - Prefix of environment-scoped parameters (default: `/minecraft`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the region, prefix, or any
    /// authorizer setting is empty.
    #[builder]
    pub fn new(
        #[builder(into)] instance_id: Option<String>,
        #[builder(into)] environment: Option<String>,
        #[builder(into, default = default_region())] region: String,
        #[builder(default)] authorizer: AuthorizerSettings,
        #[builder(into, default = default_parameter_prefix())] parameter_prefix: String,
    ) -> Result<Self> {
        let config = Self {
            instance_id: non_empty(instance_id),
            environment: non_empty(environment),
            region,
            authorizer,
            parameter_prefix,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`from_lookup`](Self::from_lookup).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a present override is unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(lookup(name));

        let authorizer = AuthorizerSettings::builder()
            .audience(var(ENV_AUDIENCE).unwrap_or_else(default_audience))
            .issuer(var(ENV_ISSUER).unwrap_or_else(default_issuer))
            .public_key_parameter(
                var(ENV_PUBLIC_KEY_PARAMETER).unwrap_or_else(default_public_key_parameter),
            )
            .build();

        let config = Self::builder()
            .maybe_instance_id(var(ENV_INSTANCE_ID))
            .maybe_environment(var(ENV_ENVIRONMENT))
            .region(var(ENV_REGION).unwrap_or_else(default_region))
            .authorizer(authorizer)
            .parameter_prefix(var(ENV_PARAMETER_PREFIX).unwrap_or_else(default_parameter_prefix))
            .build()?;

        tracing::debug!(
            instance_id = ?config.instance_id,
            environment = ?config.environment,
            region = %config.region,
            "deployment configuration loaded"
        );
        Ok(config)
    }

    /// Checks invariants that deserialization cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::invalid("region", "must not be empty"));
        }
        if !self.parameter_prefix.starts_with('/') {
            return Err(ConfigError::invalid("parameter_prefix", "must start with '/'"));
        }
        self.authorizer.validate()
    }

    /// Returns the managed instance identifier, if configured.
    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    /// Returns the deployment environment name, if configured.
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Returns the platform region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the bearer-token expectations.
    #[must_use]
    pub fn authorizer(&self) -> &AuthorizerSettings {
        &self.authorizer
    }

    /// Returns the prefix of environment-scoped parameters.
    #[must_use]
    pub fn parameter_prefix(&self) -> &str {
        &self.parameter_prefix
    }

    /// Name of the admin token parameter for this environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no environment is configured.
    pub fn admin_token_parameter(&self) -> Result<String> {
        let environment = self.environment().ok_or_else(|| ConfigError::missing(ENV_ENVIRONMENT))?;
        Ok(format!("{}/{environment}/admin_token", self.parameter_prefix.trim_end_matches('/')))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Blank strings deserialize as `None`, matching the builder and env paths.
fn deserialize_non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(non_empty)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = DeploymentConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.instance_id(), None);
        assert_eq!(config.environment(), None);
        assert_eq!(config.region(), DEFAULT_REGION);
        assert_eq!(config.authorizer(), &AuthorizerSettings::default());
        assert_eq!(config.parameter_prefix(), DEFAULT_PARAMETER_PREFIX);
    }

    #[test]
    fn test_values_from_environment() {
        let config = DeploymentConfig::from_lookup(lookup_from(&[
            ("INSTANCE_ID", "i-0abc"),
            ("ENVIRONMENT", "prod"),
            ("AWS_REGION", "eu-central-1"),
            ("JWT_AUDIENCE", "aud-x"),
            ("JWT_ISSUER", "iss-x"),
            ("JWT_PUBLIC_KEY_PARAMETER", "/keys/pub"),
            ("PARAMETER_PREFIX", "/game"),
        ]))
        .unwrap();

        assert_eq!(config.instance_id(), Some("i-0abc"));
        assert_eq!(config.environment(), Some("prod"));
        assert_eq!(config.region(), "eu-central-1");
        assert_eq!(config.authorizer().audience, "aud-x");
        assert_eq!(config.authorizer().issuer, "iss-x");
        assert_eq!(config.authorizer().public_key_parameter, "/keys/pub");
        assert_eq!(config.admin_token_parameter().unwrap(), "/game/prod/admin_token");
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn test_blank_instance_id_is_absent(#[case] value: &str) {
        let config = DeploymentConfig::from_lookup(lookup_from(&[("INSTANCE_ID", value)])).unwrap();
        assert_eq!(config.instance_id(), None);
    }

    #[test]
    fn test_admin_token_parameter_requires_environment() {
        let config = DeploymentConfig::builder().instance_id("i-1").build().unwrap();
        assert_eq!(config.admin_token_parameter(), Err(ConfigError::missing("ENVIRONMENT")));
    }

    #[test]
    fn test_admin_token_parameter_trims_trailing_slash() {
        let config =
            DeploymentConfig::builder().environment("dev").parameter_prefix("/mc/").build().unwrap();
        assert_eq!(config.admin_token_parameter().unwrap(), "/mc/dev/admin_token");
    }

    #[test]
    fn test_builder_rejects_empty_audience() {
        let result = DeploymentConfig::builder()
            .authorizer(AuthorizerSettings::builder().audience("").build())
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid { ref field, .. }) if field == "audience"));
    }

    #[test]
    fn test_builder_rejects_relative_prefix() {
        let result = DeploymentConfig::builder().parameter_prefix("minecraft").build();
        assert!(
            matches!(result, Err(ConfigError::Invalid { ref field, .. }) if field == "parameter_prefix")
        );
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: DeploymentConfig =
            serde_json::from_str(r#"{"instance_id":"i-9","environment":"qa"}"#).unwrap();
        config.validate().unwrap();

        assert_eq!(config.instance_id(), Some("i-9"));
        assert_eq!(config.region(), DEFAULT_REGION);
        assert_eq!(config.authorizer().issuer, DEFAULT_ISSUER);
    }

    #[rstest]
    #[case(r#"{"instance_id":"","environment":"  "}"#)]
    #[case(r#"{"instance_id":null,"environment":null}"#)]
    #[case("{}")]
    fn test_deserialize_blank_ids_are_absent(#[case] raw: &str) {
        let config: DeploymentConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.instance_id(), None);
        assert_eq!(config.environment(), None);
        assert!(config.admin_token_parameter().is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result = serde_json::from_str::<DeploymentConfig>(r#"{"instance":"i-9"}"#);
        assert!(result.is_err());
    }
}
