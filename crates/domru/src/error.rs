//! CLI error types with miette diagnostics.
//!
//! Maps `domru_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use domru_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the MyHome API")]
    #[diagnostic(
        code(domru::connection_failed),
        help("Check your network connection, or the api_url setting / --api-url flag.")
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(domru::tls_error),
        help("Check ca_cert in your config file, or pass --insecure (-k) for an intercepting proxy.")
    )]
    TlsError { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(domru::timeout),
        help("Increase the timeout with --timeout or the timeout setting.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(code(domru::not_logged_in), help("Run: domru login"))]
    NotLoggedIn,

    #[error("Session expired")]
    #[diagnostic(
        code(domru::session_expired),
        help("The stored tokens were rejected even after a refresh.\nRun: domru login")
    )]
    SessionExpired,

    #[error("Authentication failed: {message}")]
    #[diagnostic(code(domru::auth_failed), help("Run: domru login"))]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(domru::not_found), help("{hint}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(domru::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(domru::validation))]
    Validation { field: String, reason: String },

    #[error("'{what}' needs an interactive terminal")]
    #[diagnostic(code(domru::non_interactive), help("{hint}"))]
    NonInteractive { what: String, hint: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(code(domru::config), help("Config file: {path}"))]
    Config { message: String, path: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotLoggedIn | Self::SessionExpired | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractive { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the config file path to a configuration error.
    pub fn from_config(err: ConfigError, path: &std::path::Path) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config {
                message: other.to_string(),
                path: path.display().to_string(),
            },
        }
    }
}

fn not_found(resource_type: &str, identifier: impl ToString, hint: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: identifier.to_string(),
        hint: hint.into(),
    }
}

// ── domru_api::Error → CliError mapping ──────────────────────────────

impl From<domru_api::Error> for CliError {
    fn from(err: domru_api::Error) -> Self {
        use domru_api::Error;

        match err {
            Error::NotAuthenticated => CliError::NotLoggedIn,
            Error::SessionExpired | Error::Http { status: 401, .. } => CliError::SessionExpired,

            Error::InvalidLoginData => CliError::AuthFailed {
                message: "the account record was rejected".into(),
            },
            Error::InvalidConfirmationCode => CliError::AuthFailed {
                message: "wrong SMS code".into(),
            },
            Error::Authentication { message } => CliError::AuthFailed { message },

            Error::InvalidPhone { phone, reason } => CliError::Validation {
                field: "phone".into(),
                reason: format!("{phone}: {reason}"),
            },

            Error::NoContracts { phone } => not_found(
                "contract for phone",
                phone,
                "Check the number, or register it in the MyHome app first.",
            ),
            Error::AccessControlNotFound { id } => {
                not_found("access control", id, "Run: domru access list")
            }
            Error::CameraNotFound { id } => not_found("camera", id, "Run: domru cameras list"),
            Error::GroupCameraNotFound { group_id } => not_found(
                "camera for Forpost group",
                group_id,
                "This access control has no camera attached.",
            ),
            Error::PlaceOrDeviceNotFound {
                place_id,
                access_control_id,
            } => not_found(
                "place/access control",
                format!("{place_id}/{access_control_id}"),
                "Run: domru access list",
            ),

            Error::Remote { message } => CliError::ApiError {
                code: "remote".into(),
                message,
            },

            Error::Transport(e) if e.is_timeout() => CliError::Timeout,
            Error::Transport(e) => CliError::ConnectionFailed {
                source: Box::new(e),
            },

            Error::Http { status, body } => CliError::ApiError {
                code: status.to_string(),
                message: if body.is_empty() {
                    "(empty body)".into()
                } else {
                    body
                },
            },

            Error::InvalidUrl(e) => CliError::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            },
            Error::Tls(message) => CliError::TlsError { message },

            Error::Deserialization { message, body: _ } => CliError::ApiError {
                code: "decode".into(),
                message,
            },
        }
    }
}
