//! Dynamic OAuth2 scope registration
//!
//! A resource server declares the scopes that protect its resources by
//! registering them. Each registration is written to a local
//! [store][store::ScopeStore], keyed uniquely by scope name. Registering a
//! name that already exists updates it in place.
//!
//! If the `DYNAMIC_SCOPES.RESOURCE_SERVER_REGISTER_SCOPE_URL` setting names
//! an endpoint on an external authorization server, each scope is first
//! posted there, authenticated with the resource server's bearer
//! credential from `OAUTH2_PROVIDER.RESOURCE_SERVER_AUTH_TOKEN`. Any failure
//! from the authorization server aborts the registration before the local
//! write, so a deployment step running the registration halts instead of
//! carrying on with scopes the authorization server does not know.
//!
//! ```no_run
//! use dynscope::{remote::HttpRegistrar, store::FileScopeStore, ScopeRegistry};
//! use dynscope_settings::HostSettings;
//!
//! # async fn register() -> Result<(), Box<dyn std::error::Error>> {
//! let mut host = HostSettings::from_toml_file("settings.toml")?;
//! host.merge_env("APP", "__");
//!
//! let registry = ScopeRegistry::from_host(
//!     &host,
//!     FileScopeStore::new("scopes.json"),
//!     HttpRegistrar::new()?,
//! )?;
//!
//! registry
//!     .register("orders:read".parse()?, "Read your orders", true)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! This crate does not enable TLS support in `reqwest` itself. If the
//! registration endpoint is served over HTTPS and nothing else in your
//! application enables a TLS backend for `reqwest`, enable either the
//! `default-tls` or the `rustls-tls` feature.

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

mod braids;
mod registry;
pub mod remote;
pub mod scope;
pub mod store;

pub use braids::*;
pub use registry::{RegisterError, Registration, ScopeRegistry};
pub use scope::{Scope, ScopeDefinition};
