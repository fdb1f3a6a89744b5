use std::collections::{BTreeMap, BTreeSet};

use dynscope_settings::{AppSettings, HostSettings, ProviderSettings, SettingsError};
use reqwest::Url;
use thiserror::Error;

use crate::{
    remote::{RemoteRegistrar, RemoteRegistrationError},
    store::{ScopeStore, StoreError},
    AccessToken, Scope, ScopeDefinition, ScopeName, ScopeNameRef,
};

/// An error while registering a scope
#[derive(Debug, Error)]
pub enum RegisterError {
    /// A setting needed for registration could not be resolved
    #[error("error reading registration settings")]
    Settings(#[from] SettingsError),
    /// The configured registration endpoint is not a valid URL
    #[error("invalid scope registration endpoint '{url}'")]
    InvalidEndpoint {
        /// The configured endpoint
        url: String,
        /// The underlying parse error
        source: url::ParseError,
    },
    /// A registration endpoint is configured, but no credential to
    /// present to it
    #[error("no resource server credential is configured for remote scope registration")]
    MissingCredential,
    /// The authorization server did not accept the scope
    #[error("remote scope registration failed")]
    Remote(#[from] RemoteRegistrationError),
    /// The scope could not be stored locally
    #[error("error storing scope")]
    Storage(#[from] StoreError),
}

/// The outcome of a successful registration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// The scope as stored locally
    pub scope: Scope,
    /// Whether a new local record was created
    pub created: bool,
    /// Whether the scope was also registered with the authorization server
    pub remote_synced: bool,
}

/// Registers scopes locally and, when configured, with a remote
/// authorization server
///
/// Registration is meant to run as a deployment step. Every failure is
/// returned to the caller and nothing is retried.
#[derive(Debug)]
pub struct ScopeRegistry<S, R> {
    settings: AppSettings,
    provider: ProviderSettings,
    store: S,
    registrar: R,
}

impl<S, R> ScopeRegistry<S, R> {
    /// Constructs a new registry
    pub fn new(settings: AppSettings, provider: ProviderSettings, store: S, registrar: R) -> Self {
        Self {
            settings,
            provider,
            store,
            registrar,
        }
    }

    /// Constructs a new registry with settings read from the host
    /// configuration
    pub fn from_host(host: &HostSettings, store: S, registrar: R) -> Result<Self, SettingsError> {
        Ok(Self::new(
            AppSettings::from_host(host)?,
            ProviderSettings::from_host(host)?,
            store,
            registrar,
        ))
    }

    /// The registration settings
    #[inline]
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// The underlying scope store
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ScopeStore, R: RemoteRegistrar> ScopeRegistry<S, R> {
    /// Registers a scope
    ///
    /// See [`register_definition`][Self::register_definition].
    pub async fn register(
        &self,
        name: ScopeName,
        description: impl Into<String>,
        is_default: bool,
    ) -> Result<Registration, RegisterError> {
        self.register_definition(ScopeDefinition::new(name, description).default_scope(is_default))
            .await
    }

    /// Registers a scope definition
    ///
    /// If a registration endpoint is configured, the definition is first
    /// posted to the authorization server. Any failure there aborts the
    /// registration before anything is written locally. The definition
    /// is then inserted into, or updated in, the local store.
    ///
    /// A failure to store the scope after the authorization server has
    /// accepted it leaves the two out of step; the call can simply be
    /// repeated.
    #[tracing::instrument(
        err,
        skip(self, definition),
        fields(
            scope.name = %definition.name,
            scope.is_default = definition.is_default,
        ),
    )]
    pub async fn register_definition(
        &self,
        definition: ScopeDefinition,
    ) -> Result<Registration, RegisterError> {
        let remote_synced = match self.remote_endpoint()? {
            Some(endpoint) => {
                let token = self
                    .provider
                    .resource_server_auth_token()?
                    .map(AccessToken::from)
                    .ok_or(RegisterError::MissingCredential)?;

                self.registrar
                    .register_scope(endpoint, &token, &definition)
                    .await?;
                true
            }
            None => {
                tracing::debug!("no remote registration endpoint configured");
                false
            }
        };

        let upserted = self.store.update_or_create(&definition).await?;

        tracing::info!(
            created = upserted.created,
            remote_synced,
            "registered scope"
        );

        Ok(Registration {
            scope: upserted.scope,
            created: upserted.created,
            remote_synced,
        })
    }

    fn remote_endpoint(&self) -> Result<Option<Url>, RegisterError> {
        self.settings
            .register_scope_url()?
            .map(|url| {
                Url::parse(&url).map_err(|source| RegisterError::InvalidEndpoint { url, source })
            })
            .transpose()
    }

    /// All registered scopes with their descriptions
    pub async fn all_scopes(&self) -> Result<BTreeMap<ScopeName, String>, StoreError> {
        Ok(self
            .store
            .all()
            .await?
            .into_iter()
            .map(|s| (s.name().to_owned(), s.description().to_owned()))
            .collect())
    }

    /// The scopes granted when a client does not request any explicitly
    pub async fn default_scopes(&self) -> Result<Vec<ScopeName>, StoreError> {
        Ok(self
            .store
            .all()
            .await?
            .into_iter()
            .filter(Scope::is_default)
            .map(|s| s.name().to_owned())
            .collect())
    }

    /// Whether every requested scope has been registered
    ///
    /// Any client may request any registered scope, regardless of the
    /// application that registered it.
    pub async fn contains_all<I, T>(&self, requested: I) -> Result<bool, StoreError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<ScopeNameRef>,
    {
        let known: BTreeSet<ScopeName> = self
            .store
            .all()
            .await?
            .into_iter()
            .map(|s| s.name().to_owned())
            .collect();

        Ok(requested
            .into_iter()
            .all(|name| known.contains(name.as_ref())))
    }
}
