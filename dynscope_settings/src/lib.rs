//! Read-only settings accessors
//!
//! A settings accessor pairs a set of declared settings, each with an
//! optional default, with a mapping of overrides supplied by the host
//! application. Reading a setting resolves it on demand:
//!
//! 1. An override that is present wins, even when it is `null`.
//! 2. Otherwise the declared default is used. Defaults may be fixed
//!    values or rules computed when the setting is read.
//! 3. Otherwise the setting is required and reading it fails.
//!
//! Settings can never be written once an accessor exists.
//!
//! ```
//! use dynscope_settings::{Declarations, HostSettings, SettingsObject, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let host = HostSettings::from_toml_str(
//!     r#"
//!     [DYNAMIC_SCOPES]
//!     INTROSPECT_SCOPE = "introspect"
//!     "#,
//! )?;
//!
//! let declarations = Declarations::new()
//!     .with_default("RESOURCE_SERVER_REGISTER_SCOPE_URL", Value::Null)
//!     .required("INTROSPECT_SCOPE")
//!     .required("REGISTER_SCOPE_SCOPE");
//!
//! let settings = SettingsObject::from_host("DYNAMIC_SCOPES", declarations, &host)?;
//!
//! assert_eq!(settings.get("INTROSPECT_SCOPE")?, "introspect");
//! assert_eq!(settings.get("RESOURCE_SERVER_REGISTER_SCOPE_URL")?, Value::Null);
//! assert!(settings.get("REGISTER_SCOPE_SCOPE").is_err());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod app;
mod declare;
mod error;
mod host;
mod object;

pub use app::{AppSettings, ProviderSettings};
pub use declare::{Declarations, SettingDefault};
pub use error::{HostSettingsError, SettingsError};
pub use host::HostSettings;
pub use object::SettingsObject;

pub use serde_json::{Map, Value};
