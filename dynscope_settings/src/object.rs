use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{Declarations, HostSettings, SettingDefault, SettingsError};

/// A named collection of settings resolved against a mapping of overrides
///
/// Both the declarations and the overrides are fixed at construction;
/// every read is an independent resolution over them.
#[derive(Clone, Debug)]
pub struct SettingsObject {
    name: String,
    declarations: Arc<Declarations>,
    overrides: Map<String, Value>,
}

impl SettingsObject {
    /// Constructs an accessor over an explicit mapping of overrides
    pub fn new(
        name: impl Into<String>,
        declarations: impl Into<Arc<Declarations>>,
        overrides: Map<String, Value>,
    ) -> Self {
        Self {
            name: name.into(),
            declarations: declarations.into(),
            overrides,
        }
    }

    /// Constructs an accessor whose overrides come from the host
    /// configuration section sharing the accessor's name
    ///
    /// A host configuration without such a section supplies no overrides.
    pub fn from_host(
        name: impl Into<String>,
        declarations: impl Into<Arc<Declarations>>,
        host: &HostSettings,
    ) -> Result<Self, SettingsError> {
        let name = name.into();
        let overrides = host.section(&name)?;
        Ok(Self::new(name, declarations, overrides))
    }

    /// The name of the accessor
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The settings known to the accessor
    #[inline]
    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    /// Whether an override was supplied for the setting
    ///
    /// An override of `null` still counts as supplied.
    #[inline]
    pub fn has_override(&self, setting: &str) -> bool {
        self.overrides.contains_key(setting)
    }

    /// Resolves a setting to its value
    pub fn get(&self, setting: &str) -> Result<Value, SettingsError> {
        let default = self
            .declarations
            .get(setting)
            .ok_or_else(|| SettingsError::Unknown {
                settings: self.name.clone(),
                setting: setting.to_owned(),
            })?;

        if let Some(value) = self.overrides.get(setting) {
            tracing::trace!(settings = %self.name, setting, "resolved setting from override");
            return Ok(value.clone());
        }

        tracing::trace!(settings = %self.name, setting, "resolving setting from default");
        match default {
            SettingDefault::Required => Err(SettingsError::Required {
                settings: self.name.clone(),
                setting: setting.to_owned(),
            }),
            SettingDefault::Value(value) => Ok(value.clone()),
            SettingDefault::Computed(rule) => rule(self),
            SettingDefault::Lazy(rule) => Ok(rule()),
        }
    }

    /// Resolves a setting and converts it into a concrete type
    pub fn get_as<T: DeserializeOwned>(&self, setting: &str) -> Result<T, SettingsError> {
        let value = self.get(setting)?;
        serde_json::from_value(value).map_err(|source| SettingsError::InvalidValue {
            settings: self.name.clone(),
            setting: setting.to_owned(),
            source,
        })
    }

    /// Attempts to write a setting
    ///
    /// Settings are read-only, so this always fails with
    /// [`SettingsError::Immutable`].
    pub fn set(&self, setting: &str, _value: impl Into<Value>) -> Result<(), SettingsError> {
        Err(SettingsError::Immutable {
            settings: self.name.clone(),
            setting: setting.to_owned(),
        })
    }
}
