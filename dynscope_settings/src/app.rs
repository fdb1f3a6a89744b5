use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};

use crate::{Declarations, HostSettings, SettingsError, SettingsObject};

/// Settings for dynamic scope registration, read from the
/// `DYNAMIC_SCOPES` host section
#[derive(Clone, Debug)]
pub struct AppSettings {
    inner: SettingsObject,
}

impl AppSettings {
    /// The host configuration key holding these settings
    pub const NAME: &'static str = "DYNAMIC_SCOPES";

    /// The endpoint on the authorization server used to register scopes
    pub const RESOURCE_SERVER_REGISTER_SCOPE_URL: &'static str =
        "RESOURCE_SERVER_REGISTER_SCOPE_URL";

    /// The scope required to introspect tokens
    pub const INTROSPECT_SCOPE: &'static str = "INTROSPECT_SCOPE";

    /// The scope required to call the scope registration endpoint
    pub const REGISTER_SCOPE_SCOPE: &'static str = "REGISTER_SCOPE_SCOPE";

    fn declarations() -> Arc<Declarations> {
        static DECLARATIONS: OnceLock<Arc<Declarations>> = OnceLock::new();
        DECLARATIONS
            .get_or_init(|| {
                Arc::new(
                    Declarations::new()
                        .with_default(Self::RESOURCE_SERVER_REGISTER_SCOPE_URL, Value::Null)
                        .required(Self::INTROSPECT_SCOPE)
                        .required(Self::REGISTER_SCOPE_SCOPE),
                )
            })
            .clone()
    }

    /// Constructs the settings over an explicit mapping of overrides
    pub fn new(overrides: Map<String, Value>) -> Self {
        Self {
            inner: SettingsObject::new(Self::NAME, Self::declarations(), overrides),
        }
    }

    /// Constructs the settings from the host configuration
    pub fn from_host(host: &HostSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            inner: SettingsObject::from_host(Self::NAME, Self::declarations(), host)?,
        })
    }

    /// The endpoint used to register scopes remotely, if any
    ///
    /// An empty endpoint is treated the same as an absent one.
    pub fn register_scope_url(&self) -> Result<Option<String>, SettingsError> {
        let url: Option<String> = self
            .inner
            .get_as(Self::RESOURCE_SERVER_REGISTER_SCOPE_URL)?;
        Ok(url.filter(|u| !u.is_empty()))
    }

    /// The scope required to introspect tokens
    pub fn introspect_scope(&self) -> Result<String, SettingsError> {
        self.inner.get_as(Self::INTROSPECT_SCOPE)
    }

    /// The scope required to call the scope registration endpoint
    pub fn register_scope_scope(&self) -> Result<String, SettingsError> {
        self.inner.get_as(Self::REGISTER_SCOPE_SCOPE)
    }

    /// The underlying accessor
    #[inline]
    pub fn as_settings(&self) -> &SettingsObject {
        &self.inner
    }
}

/// Settings owned by the OAuth2 provider, read from the
/// `OAUTH2_PROVIDER` host section
///
/// Only the settings consumed by scope registration are declared here.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    inner: SettingsObject,
}

impl ProviderSettings {
    /// The host configuration key holding these settings
    pub const NAME: &'static str = "OAUTH2_PROVIDER";

    /// The bearer credential this resource server presents to the
    /// authorization server
    pub const RESOURCE_SERVER_AUTH_TOKEN: &'static str = "RESOURCE_SERVER_AUTH_TOKEN";

    fn declarations() -> Arc<Declarations> {
        static DECLARATIONS: OnceLock<Arc<Declarations>> = OnceLock::new();
        DECLARATIONS
            .get_or_init(|| {
                Arc::new(
                    Declarations::new().with_default(Self::RESOURCE_SERVER_AUTH_TOKEN, Value::Null),
                )
            })
            .clone()
    }

    /// Constructs the settings over an explicit mapping of overrides
    pub fn new(overrides: Map<String, Value>) -> Self {
        Self {
            inner: SettingsObject::new(Self::NAME, Self::declarations(), overrides),
        }
    }

    /// Constructs the settings from the host configuration
    pub fn from_host(host: &HostSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            inner: SettingsObject::from_host(Self::NAME, Self::declarations(), host)?,
        })
    }

    /// The resource server's bearer credential, if configured
    pub fn resource_server_auth_token(&self) -> Result<Option<String>, SettingsError> {
        let token: Option<String> = self.inner.get_as(Self::RESOURCE_SERVER_AUTH_TOKEN)?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    /// The underlying accessor
    #[inline]
    pub fn as_settings(&self) -> &SettingsObject {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn register_url_defaults_to_none() {
        let settings = AppSettings::new(Map::new());
        assert_eq!(settings.register_scope_url().unwrap(), None);
    }

    #[test]
    fn empty_register_url_is_none() {
        let host = HostSettings::from_json(json!({
            "DYNAMIC_SCOPES": { "RESOURCE_SERVER_REGISTER_SCOPE_URL": "" }
        }))
        .unwrap();
        let settings = AppSettings::from_host(&host).unwrap();
        assert_eq!(settings.register_scope_url().unwrap(), None);
    }

    #[test]
    #[traced_test]
    fn required_scopes_come_from_host() {
        let host = HostSettings::from_toml_str(
            r#"
            [DYNAMIC_SCOPES]
            INTROSPECT_SCOPE = "introspect"
            REGISTER_SCOPE_SCOPE = "register-scope"
            "#,
        )
        .unwrap();
        let settings = AppSettings::from_host(&host).unwrap();

        assert_eq!(settings.introspect_scope().unwrap(), "introspect");
        assert_eq!(settings.register_scope_scope().unwrap(), "register-scope");
        assert!(logs_contain("resolved setting from override"));
    }

    #[test]
    fn required_scopes_without_overrides_fail() {
        let settings = AppSettings::new(Map::new());
        assert!(matches!(
            settings.introspect_scope(),
            Err(SettingsError::Required { setting, .. }) if setting == "INTROSPECT_SCOPE"
        ));
        assert!(matches!(
            settings.register_scope_scope(),
            Err(SettingsError::Required { setting, .. }) if setting == "REGISTER_SCOPE_SCOPE"
        ));
    }

    #[test]
    fn app_settings_are_read_only() {
        let settings = AppSettings::new(Map::new());
        assert!(matches!(
            settings
                .as_settings()
                .set(AppSettings::RESOURCE_SERVER_REGISTER_SCOPE_URL, "https://x"),
            Err(SettingsError::Immutable { .. })
        ));
    }

    #[test]
    fn provider_token_is_optional() {
        let settings = ProviderSettings::new(Map::new());
        assert_eq!(settings.resource_server_auth_token().unwrap(), None);

        let host = HostSettings::from_json(json!({
            "OAUTH2_PROVIDER": { "RESOURCE_SERVER_AUTH_TOKEN": "s3cr3t" }
        }))
        .unwrap();
        let settings = ProviderSettings::from_host(&host).unwrap();
        assert_eq!(
            settings.resource_server_auth_token().unwrap().as_deref(),
            Some("s3cr3t")
        );
    }

    #[test]
    fn scalar_looking_env_values_stay_strings() {
        let mut host = HostSettings::new();
        host.merge_vars(
            [
                ("APP__OAUTH2_PROVIDER__RESOURCE_SERVER_AUTH_TOKEN", "0123456789"),
                ("APP__DYNAMIC_SCOPES__INTROSPECT_SCOPE", "true"),
                ("APP__DYNAMIC_SCOPES__REGISTER_SCOPE_SCOPE", "42"),
            ],
            "APP",
            "__",
        );

        let provider = ProviderSettings::from_host(&host).unwrap();
        assert_eq!(
            provider.resource_server_auth_token().unwrap().as_deref(),
            Some("0123456789")
        );

        let settings = AppSettings::from_host(&host).unwrap();
        assert_eq!(settings.introspect_scope().unwrap(), "true");
        assert_eq!(settings.register_scope_scope().unwrap(), "42");
    }
}
