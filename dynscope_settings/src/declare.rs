use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::{SettingsError, SettingsObject};

type ComputedFn = dyn Fn(&SettingsObject) -> Result<Value, SettingsError> + Send + Sync;
type LazyFn = dyn Fn() -> Value + Send + Sync;

/// The default for a declared setting
///
/// `null` is a valid default, so a setting without a default is
/// represented by [`SettingDefault::Required`] rather than by `null`.
#[derive(Clone)]
pub enum SettingDefault {
    /// No default; the setting must be overridden
    Required,
    /// A fixed default value
    Value(Value),
    /// A default computed from the owning accessor when read
    Computed(Arc<ComputedFn>),
    /// A default produced without reference to the accessor when read
    Lazy(Arc<LazyFn>),
}

impl SettingDefault {
    /// Whether the setting must be supplied by an override
    #[inline]
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}

impl fmt::Debug for SettingDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// The set of settings an accessor knows about, with their defaults
///
/// Declaring the same name twice replaces the earlier declaration.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Declarations {
    settings: Vec<(String, SettingDefault)>,
}

impl Declarations {
    /// Constructs an empty set of declarations
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a setting that has no default
    pub fn required(self, name: impl Into<String>) -> Self {
        self.declare(name, SettingDefault::Required)
    }

    /// Declares a setting with a fixed default
    pub fn with_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.declare(name, SettingDefault::Value(default.into()))
    }

    /// Declares a setting whose default is computed from the accessor
    pub fn computed<F>(self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&SettingsObject) -> Result<Value, SettingsError> + Send + Sync + 'static,
    {
        self.declare(name, SettingDefault::Computed(Arc::new(rule)))
    }

    /// Declares a setting whose default is produced on each read
    pub fn lazy<F>(self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.declare(name, SettingDefault::Lazy(Arc::new(rule)))
    }

    /// Declares a setting with an explicit default
    pub fn declare(mut self, name: impl Into<String>, default: SettingDefault) -> Self {
        let name = name.into();
        if let Some(existing) = self.settings.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = default;
        } else {
            self.settings.push((name, default));
        }
        self
    }

    /// Looks up the declaration for a setting
    pub fn get(&self, name: &str) -> Option<&SettingDefault> {
        self.settings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Whether the setting has been declared
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The declared setting names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.settings.iter().map(|(n, _)| n.as_str())
    }
}
