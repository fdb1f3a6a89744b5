//! Scope records and the definitions used to register them

use serde::{Deserialize, Serialize};

use crate::{ApplicationId, ApplicationIdRef, ScopeName, ScopeNameRef};

/// The values a scope is registered with
///
/// This is also the payload sent to a remote authorization server. The
/// owning application is local provenance only and is never sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct ScopeDefinition {
    /// The name of the scope
    pub name: ScopeName,
    /// The description shown to users when authorizing access
    pub description: String,
    /// Whether the scope belongs to the default scope set
    pub is_default: bool,
    /// The application on whose behalf the scope is registered
    #[serde(skip)]
    pub application: Option<ApplicationId>,
}

impl ScopeDefinition {
    /// Defines a non-default scope
    pub fn new(name: ScopeName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
            is_default: false,
            application: None,
        }
    }

    /// Sets whether the scope belongs to the default scope set
    #[inline]
    pub fn default_scope(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Records the application on whose behalf the scope is registered
    #[inline]
    pub fn owned_by(mut self, application: ApplicationId) -> Self {
        self.application = Some(application);
        self
    }
}

/// A registered OAuth2 scope
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    name: ScopeName,
    description: String,
    #[serde(default)]
    is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    application: Option<ApplicationId>,
}

impl Scope {
    pub(crate) fn from_definition(definition: &ScopeDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            is_default: definition.is_default,
            application: definition.application.clone(),
        }
    }

    /// Overwrites the registered values with those from a new definition
    ///
    /// The owning application is only replaced when the definition
    /// names one.
    pub(crate) fn apply(&mut self, definition: &ScopeDefinition) {
        self.description.clone_from(&definition.description);
        self.is_default = definition.is_default;
        if let Some(application) = &definition.application {
            self.application = Some(application.clone());
        }
    }

    /// The name of the scope
    #[inline]
    pub fn name(&self) -> &ScopeNameRef {
        &self.name
    }

    /// The description shown to users when authorizing access
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the scope belongs to the default scope set
    #[inline]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// The application that registered the scope, if it was registered
    /// on behalf of an external resource server
    ///
    /// This is a record of where the scope came from. It must not be used
    /// to decide which clients may request or be granted the scope.
    #[inline]
    pub fn application(&self) -> Option<&ApplicationIdRef> {
        self.application.as_deref()
    }
}
