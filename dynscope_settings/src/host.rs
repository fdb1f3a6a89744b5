use std::path::Path;

use serde_json::{Map, Value};

use crate::{HostSettingsError, SettingsError};

/// Process-wide host configuration
///
/// The host configuration is a table of sections, each keyed by the name
/// of the settings accessor that consumes it. It is passed explicitly to
/// whatever needs it rather than being read from global state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostSettings {
    sections: Map<String, Value>,
}

impl HostSettings {
    /// Constructs an empty host configuration
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses host configuration from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, HostSettingsError> {
        let sections: Map<String, Value> = toml::from_str(source)?;
        Ok(Self { sections })
    }

    /// Reads host configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, HostSettingsError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|source| HostSettingsError::ReadError {
                path: path.to_path_buf(),
                source,
            })?;
        let sections: Map<String, Value> =
            toml::from_str(&source).map_err(|source| HostSettingsError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), sections = sections.len(), "loaded host settings");
        Ok(Self { sections })
    }

    /// Wraps an already-built JSON object
    pub fn from_json(value: Value) -> Result<Self, HostSettingsError> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            _ => Err(HostSettingsError::NotATable),
        }
    }

    /// Sets a single setting inside a section, creating the section
    /// if needed
    ///
    /// A section that exists but is not a table is replaced.
    pub fn insert(&mut self, section: &str, setting: impl Into<String>, value: impl Into<Value>) {
        let entry = self
            .sections
            .entry(section.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }

        if let Value::Object(table) = entry {
            table.insert(setting.into(), value.into());
        }
    }

    /// Applies overrides from the process environment
    ///
    /// A variable named `{prefix}{separator}{SECTION}{separator}{SETTING}`
    /// overrides `SETTING` in `SECTION`. Names and values are taken
    /// verbatim, so every override is a string. Variables whose name or
    /// value is not valid UTF-8 are skipped.
    pub fn merge_env(&mut self, prefix: &str, separator: &str) {
        let vars = std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        });
        self.merge_vars(vars, prefix, separator);
    }

    /// Applies overrides from an iterator of `(name, value)` pairs,
    /// using the same naming scheme as [`merge_env`][Self::merge_env]
    pub fn merge_vars<I, K, V>(&mut self, vars: I, prefix: &str, separator: &str)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if separator.is_empty() {
            return;
        }

        let prefix_with_sep = format!("{}{}", prefix, separator);

        for (key, value) in vars {
            let Some(path) = key.as_ref().strip_prefix(&prefix_with_sep) else {
                continue;
            };

            let Some((section, setting)) = path.split_once(separator) else {
                continue;
            };

            if section.is_empty() || setting.is_empty() {
                continue;
            }

            tracing::trace!(section, setting, "applying environment override");
            self.insert(section, setting, value.as_ref());
        }
    }

    /// The overrides for the named section
    ///
    /// A missing section yields an empty table.
    pub fn section(&self, name: &str) -> Result<Map<String, Value>, SettingsError> {
        match self.sections.get(name) {
            None => Ok(Map::new()),
            Some(Value::Object(table)) => Ok(table.clone()),
            Some(_) => Err(SettingsError::InvalidSection(name.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn toml_sections_become_overrides() {
        let host = HostSettings::from_toml_str(
            r#"
            [DYNAMIC_SCOPES]
            RESOURCE_SERVER_REGISTER_SCOPE_URL = "https://authz.example.com/scopes/"
            INTROSPECT_SCOPE = "introspect"

            [OAUTH2_PROVIDER]
            RESOURCE_SERVER_AUTH_TOKEN = "s3cr3t"
            "#,
        )
        .unwrap();

        let section = host.section("DYNAMIC_SCOPES").unwrap();
        assert_eq!(section["INTROSPECT_SCOPE"], "introspect");
        assert_eq!(
            host.section("OAUTH2_PROVIDER").unwrap()["RESOURCE_SERVER_AUTH_TOKEN"],
            "s3cr3t"
        );
    }

    #[test]
    fn missing_section_is_empty() {
        let host = HostSettings::new();
        assert!(host.section("DYNAMIC_SCOPES").unwrap().is_empty());
    }

    #[test]
    fn non_table_section_is_rejected() {
        let host = HostSettings::from_toml_str(r#"DYNAMIC_SCOPES = "nope""#).unwrap();
        assert!(matches!(
            host.section("DYNAMIC_SCOPES"),
            Err(SettingsError::InvalidSection(name)) if name == "DYNAMIC_SCOPES"
        ));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let result = HostSettings::from_toml_str("[DYNAMIC_SCOPES");
        assert!(matches!(result, Err(HostSettingsError::DeserializeError(_))));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[DYNAMIC_SCOPES]").unwrap();
        writeln!(file, "REGISTER_SCOPE_SCOPE = \"register-scope\"").unwrap();

        let host = HostSettings::from_toml_file(file.path()).unwrap();
        assert_eq!(
            host.section("DYNAMIC_SCOPES").unwrap()["REGISTER_SCOPE_SCOPE"],
            "register-scope"
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = HostSettings::from_toml_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(HostSettingsError::ReadError { .. })));
    }

    #[test]
    fn json_root_must_be_an_object() {
        assert!(matches!(
            HostSettings::from_json(json!([1, 2])),
            Err(HostSettingsError::NotATable)
        ));
    }

    #[test]
    fn env_overrides_are_kept_as_strings() {
        let mut host = HostSettings::from_toml_str(
            r#"
            [DYNAMIC_SCOPES]
            INTROSPECT_SCOPE = "from-file"
            "#,
        )
        .unwrap();

        host.merge_vars(
            vec![
                ("APP__DYNAMIC_SCOPES__INTROSPECT_SCOPE", "true"),
                ("APP__DYNAMIC_SCOPES__REGISTER_SCOPE_SCOPE", "1.5"),
                ("APP__OAUTH2_PROVIDER__RESOURCE_SERVER_AUTH_TOKEN", "0123456789"),
                ("APP__DYNAMIC_SCOPES", "ignored"),
                ("OTHER__DYNAMIC_SCOPES__X", "ignored"),
            ],
            "APP",
            "__",
        );

        let section = host.section("DYNAMIC_SCOPES").unwrap();
        assert_eq!(section["INTROSPECT_SCOPE"], "true");
        assert_eq!(section["REGISTER_SCOPE_SCOPE"], "1.5");
        assert!(!section.contains_key("X"));
        assert_eq!(section.len(), 2);
        assert_eq!(
            host.section("OAUTH2_PROVIDER").unwrap()["RESOURCE_SERVER_AUTH_TOKEN"],
            "0123456789"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_environment_is_skipped() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        std::env::set_var("HOSTENVTEST__BROKEN", OsStr::from_bytes(b"\xff\xfe"));
        std::env::set_var(
            OsStr::from_bytes(b"HOSTENVTEST__\xff__X"),
            "unreadable name",
        );
        std::env::set_var("HOSTENVTEST__DYNAMIC_SCOPES__INTROSPECT_SCOPE", "from-env");

        let mut host = HostSettings::new();
        host.merge_env("HOSTENVTEST", "__");

        let section = host.section("DYNAMIC_SCOPES").unwrap();
        assert_eq!(section["INTROSPECT_SCOPE"], "from-env");
        assert_eq!(section.len(), 1);
    }
}
