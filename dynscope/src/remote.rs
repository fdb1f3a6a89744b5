//! Registering scopes with a remote authorization server

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::{AccessTokenRef, ScopeDefinition};

/// An error while registering a scope with the authorization server
#[derive(Debug, Error)]
pub enum RemoteRegistrationError {
    /// The authorization server answered with a non-success status
    #[error("authorization server rejected scope registration with status {status}: {body}")]
    Rejected {
        /// The status returned by the authorization server
        status: StatusCode,
        /// The body of the response
        body: String,
    },
    /// Unable to send the registration request
    #[error("error sending scope registration to authorization server")]
    RequestSend(#[source] reqwest::Error),
    /// Unable to read the response
    #[error("error reading response body")]
    BodyReadError(#[source] reqwest::Error),
}

/// Something able to register a scope definition at a remote endpoint
#[async_trait]
pub trait RemoteRegistrar: Send + Sync {
    /// Registers the scope definition at `endpoint`, authenticating with
    /// `token` as a bearer credential
    ///
    /// Succeeds only if the authorization server accepted the definition.
    async fn register_scope(
        &self,
        endpoint: Url,
        token: &AccessTokenRef,
        definition: &ScopeDefinition,
    ) -> Result<(), RemoteRegistrationError>;
}

/// A registrar that posts scope definitions as JSON over HTTP
///
/// No retries are attempted. Timeouts are whatever the supplied client
/// is configured with.
#[derive(Clone, Debug)]
pub struct HttpRegistrar {
    client: reqwest::Client,
}

impl HttpRegistrar {
    /// Constructs a registrar with a default client
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dynscope/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Constructs a registrar around an existing client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteRegistrar for HttpRegistrar {
    #[tracing::instrument(
        err,
        skip(self, endpoint, token, definition),
        fields(
            endpoint = %endpoint,
            scope.name = %definition.name,
            scope.is_default = definition.is_default,
        ),
    )]
    async fn register_scope(
        &self,
        endpoint: Url,
        token: &AccessTokenRef,
        definition: &ScopeDefinition,
    ) -> Result<(), RemoteRegistrationError> {
        tracing::trace!("registering scope with authorization server");

        let resp = self
            .client
            .post(endpoint)
            .bearer_auth(token.as_str())
            .json(definition)
            .send()
            .await
            .map_err(RemoteRegistrationError::RequestSend)?;

        let status = resp.status();
        tracing::debug!(
            response.status = status.as_u16(),
            "received scope registration response from authorization server"
        );

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .map_err(RemoteRegistrationError::BodyReadError)?;
            return Err(RemoteRegistrationError::Rejected { status, body });
        }

        Ok(())
    }
}
