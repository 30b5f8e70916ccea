//! Configuration for kmip-explorer.
//!
//! TOML profiles naming a server and its client credentials, global
//! defaults for the terminal UI, and resolution of the final connection
//! settings from a profile plus command-line overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kmip_explorer_core::Category;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Look for a newer release on startup.
    #[serde(default = "default_true")]
    pub check_update: bool,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_render_rate")]
    pub render_rate_ms: u64,

    /// Category shown when the explorer opens.
    #[serde(default)]
    pub filter: Category,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            check_update: true,
            tick_rate_ms: default_tick_rate(),
            render_rate_ms: default_render_rate(),
            filter: Category::All,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_tick_rate() -> u64 {
    250
}
fn default_render_rate() -> u64 {
    33
}

/// A named KMIP server and the client credentials used to reach it.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server address as `host:port`.
    pub addr: Option<String>,

    /// Client certificate (PEM).
    pub cert: Option<PathBuf>,

    /// Client private key (PEM).
    pub key: Option<PathBuf>,

    /// CA bundle used to verify the server.
    pub ca: Option<PathBuf>,

    /// Do not send correlation values with requests.
    #[serde(default)]
    pub no_ccv: bool,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "phsym", "kmip-explorer").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("kmip-explorer");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file plus `KMIP_` variables.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`. A missing file yields the defaults.
///
/// Environment variables use `__` as the nesting separator, e.g.
/// `KMIP_DEFAULTS__CHECK_UPDATE=false`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KMIP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Connection resolution ───────────────────────────────────────────

/// Values given on the command line. They override the profile.
#[derive(Debug, Default, Clone)]
pub struct ConnectionOverrides {
    pub addr: Option<String>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub ca: Option<PathBuf>,
    pub no_ccv: bool,
}

/// Fully resolved settings for opening a client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub addr: String,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca: Option<PathBuf>,
    pub no_ccv: bool,
}

impl Config {
    /// The profile named `name`, or the default profile when `name` is
    /// `None`. A missing default profile is not an error.
    pub fn profile(&self, name: Option<&str>) -> Result<Option<&Profile>, ConfigError> {
        match name {
            Some(name) => self
                .profiles
                .get(name)
                .map(Some)
                .ok_or_else(|| ConfigError::UnknownProfile(name.to_owned())),
            None => Ok(self
                .default_profile
                .as_deref()
                .and_then(|n| self.profiles.get(n))),
        }
    }

    /// Merge the selected profile with `overrides` and check that every
    /// required setting is present.
    pub fn resolve_connection(
        &self,
        profile: Option<&str>,
        overrides: ConnectionOverrides,
    ) -> Result<ConnectionSettings, ConfigError> {
        let empty = Profile::default();
        let profile = self.profile(profile)?.unwrap_or(&empty);

        let addr = overrides
            .addr
            .or_else(|| profile.addr.clone())
            .ok_or(ConfigError::Missing("server address"))?;
        let cert = overrides
            .cert
            .or_else(|| profile.cert.clone())
            .ok_or(ConfigError::Missing("client certificate"))?;
        let key = overrides
            .key
            .or_else(|| profile.key.clone())
            .ok_or(ConfigError::Missing("client private key"))?;
        let ca = overrides.ca.or_else(|| profile.ca.clone());

        if addr.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "addr".into(),
                reason: "must not be empty".into(),
            });
        }
        for (field, path) in [("cert", Some(&cert)), ("key", Some(&key)), ("ca", ca.as_ref())] {
            if path.is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "path must not be empty".into(),
                });
            }
        }

        Ok(ConnectionSettings {
            addr,
            cert,
            key,
            ca,
            no_ccv: overrides.no_ccv || profile.no_ccv,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.defaults.check_update);
        assert_eq!(config.defaults.tick_rate_ms, 250);
        assert_eq!(config.defaults.filter, Category::All);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profiles_and_defaults_are_read() {
        let file = write_config(
            r#"
default_profile = "prod"

[defaults]
check_update = false
filter = "symmetric-key"

[profiles.prod]
addr = "kms.example.com:5696"
cert = "/etc/kmip/client.pem"
key = "/etc/kmip/client.key"
no_ccv = true
"#,
        );
        let config = load_config_from(file.path()).unwrap();
        assert!(!config.defaults.check_update);
        assert_eq!(config.defaults.filter, Category::SymmetricKey);

        let settings = config
            .resolve_connection(None, ConnectionOverrides::default())
            .unwrap();
        assert_eq!(
            settings,
            ConnectionSettings {
                addr: "kms.example.com:5696".into(),
                cert: "/etc/kmip/client.pem".into(),
                key: "/etc/kmip/client.key".into(),
                ca: None,
                no_ccv: true,
            }
        );
    }

    #[test]
    fn command_line_overrides_profile() {
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                addr: Some("a:5696".into()),
                cert: Some("a.pem".into()),
                key: Some("a.key".into()),
                ..Profile::default()
            },
        );
        let settings = config
            .resolve_connection(
                None,
                ConnectionOverrides {
                    addr: Some("b:5696".into()),
                    ca: Some("ca.pem".into()),
                    ..ConnectionOverrides::default()
                },
            )
            .unwrap();
        assert_eq!(settings.addr, "b:5696");
        assert_eq!(settings.cert, PathBuf::from("a.pem"));
        assert_eq!(settings.ca, Some(PathBuf::from("ca.pem")));
        assert!(!settings.no_ccv);
    }

    #[test]
    fn missing_settings_are_reported() {
        let config = Config::default();
        let err = config
            .resolve_connection(None, ConnectionOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("server address")));

        let err = config
            .resolve_connection(
                None,
                ConnectionOverrides {
                    addr: Some("a:5696".into()),
                    cert: Some("c.pem".into()),
                    ..ConnectionOverrides::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "missing client private key");
    }

    #[test]
    fn empty_paths_are_rejected() {
        let config = Config::default();
        let err = config
            .resolve_connection(
                None,
                ConnectionOverrides {
                    addr: Some("a:5696".into()),
                    cert: Some(PathBuf::new()),
                    key: Some("k".into()),
                    ..ConnectionOverrides::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid cert: path must not be empty");
    }

    #[test]
    fn unknown_named_profile_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.resolve_connection(Some("staging"), ConnectionOverrides::default()),
            Err(ConfigError::UnknownProfile(name)) if name == "staging"
        ));
    }
}
