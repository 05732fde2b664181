//! Configuration for the domru CLI.
//!
//! Settings are layered: built-in defaults, then the TOML config file, then
//! `DOMRU_*` environment variables (nested keys use `__`, e.g.
//! `DOMRU_SESSION__ACCESS_TOKEN`). The same file stores the session obtained
//! by `domru login`, so a later invocation can sign requests without logging
//! in again.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use domru_api::{Credentials, DEFAULT_API_URL, TlsMode, TransportConfig};

/// Table holding the stored session.
const SESSION_KEY: &str = "session";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// API root, normally the vendor's production host.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Override the `User-Agent` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Extra CA certificate (PEM) to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Session written by `domru login`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<StoredSession>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
            user_agent: None,
            ca_cert: None,
            insecure: false,
            session: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_timeout() -> u64 {
    30
}

/// Persisted token pair plus the account it belongs to.
///
/// Tokens are stored in plaintext; the file is written owner-readable only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoredSession {
    pub operator_id: u64,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<u64>,
}

impl From<&Credentials> for StoredSession {
    fn from(creds: &Credentials) -> Self {
        Self {
            operator_id: creds.operator_id,
            access_token: creds.access_token.expose_secret().to_owned(),
            refresh_token: creds.refresh_token.expose_secret().to_owned(),
            phone: creds.phone,
            subscriber_id: creds.subscriber_id,
            account_id: creds.account_id.clone(),
            place_id: creds.place_id,
        }
    }
}

impl From<&StoredSession> for Credentials {
    fn from(session: &StoredSession) -> Self {
        Self {
            operator_id: session.operator_id,
            access_token: SecretString::from(session.access_token.clone()),
            refresh_token: SecretString::from(session.refresh_token.clone()),
            phone: session.phone,
            subscriber_id: session.subscriber_id,
            account_id: session.account_id.clone(),
            place_id: session.place_id,
        }
    }
}

impl Config {
    /// Parsed `api_url`.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        self.api_url.parse().map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("{e}: {}", self.api_url),
        })
    }

    /// HTTP transport settings for `domru_api::SessionClient::new`.
    pub fn transport(&self) -> Result<TransportConfig, ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        let mut transport = TransportConfig {
            tls,
            ..TransportConfig::default()
        }
        .with_timeout(Duration::from_secs(self.timeout));
        if let Some(ref agent) = self.user_agent {
            transport.user_agent.clone_from(agent);
        }
        Ok(transport)
    }

    /// Credentials from the stored session, if there is one.
    pub fn credentials(&self) -> Option<Credentials> {
        self.session.as_ref().map(Credentials::from)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("ru", "domru", "domru").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("domru");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// The provider stack used by [`load_from`].
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DOMRU_").split("__"))
}

/// Load config from `path` + environment. A missing file is not an error.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    debug!(path = %path.display(), has_session = config.session.is_some(), "config loaded");
    Ok(config)
}

/// Load config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

// ── Session persistence ─────────────────────────────────────────────

/// Write `credentials` into the `[session]` table of the file at `path`.
///
/// Other keys in the file are kept as they are; environment overrides are
/// never written back.
pub fn save_session(path: &Path, credentials: &Credentials) -> Result<(), ConfigError> {
    let mut doc = read_table(path)?;
    let session = toml::Value::try_from(StoredSession::from(credentials))?;
    doc.insert(SESSION_KEY.into(), session);
    write_table(path, &doc)?;
    debug!(path = %path.display(), "session saved");
    Ok(())
}

/// Remove the `[session]` table. Returns whether there was one.
pub fn clear_session(path: &Path) -> Result<bool, ConfigError> {
    let mut doc = read_table(path)?;
    if doc.remove(SESSION_KEY).is_none() {
        return Ok(false);
    }
    write_table(path, &doc)?;
    debug!(path = %path.display(), "session cleared");
    Ok(true)
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => raw.parse().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(toml::Table::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_table(path: &Path, doc: &toml::Table) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(doc)?;
    let mut file = open_private(path)?;
    file.write_all(toml_str.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Open `path` for writing, readable by the owner only before any byte lands.
#[cfg(unix)]
fn open_private(path: &Path) -> Result<std::fs::File, ConfigError> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a pre-existing file too.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<std::fs::File, ConfigError> {
    Ok(std::fs::File::create(path)?)
}
