use thiserror::Error;

/// Top-level error type for the `domru-api` crate.
///
/// Translated vendor responses get their own variants; any status code an
/// endpoint does not explicitly translate surfaces as [`Error::Http`] with
/// the raw body, and transport failures pass through as
/// [`Error::Transport`]. Callers should be prepared for both.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No credentials are set, or a previous refresh failed.
    #[error("Not authenticated -- set credentials or log in first")]
    NotAuthenticated,

    /// The replayed request was rejected again after a successful refresh.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// The login details were rejected by the auth service.
    #[error("Invalid login data")]
    InvalidLoginData,

    /// The SMS confirmation code was rejected.
    #[error("Invalid confirmation code")]
    InvalidConfirmationCode,

    /// Credentials could not be turned into request headers.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Validation ──────────────────────────────────────────────────
    /// The phone number failed local validation or was refused by the server.
    #[error("Invalid phone number {phone}: {reason}")]
    InvalidPhone { phone: String, reason: String },

    // ── Lookup ──────────────────────────────────────────────────────
    /// The auth service knows no contracts for this phone number (HTTP 204).
    #[error("No contracts found for phone number {phone}")]
    NoContracts { phone: u64 },

    #[error("Access control device {id} does not exist")]
    AccessControlNotFound { id: u64 },

    #[error("Camera {id} does not exist")]
    CameraNotFound { id: u64 },

    /// No camera lists the access control's Forpost group among its parents.
    #[error("Camera does not exist for Forpost group {group_id:?}")]
    GroupCameraNotFound { group_id: String },

    /// The open action was answered with HTTP 500.
    #[error("Place {place_id} or access control device {access_control_id} does not exist")]
    PlaceOrDeviceNotFound { place_id: u64, access_control_id: u64 },

    // ── Vendor ──────────────────────────────────────────────────────
    /// Structured `Error` field reported by the vendor inside a 2xx body.
    #[error("Remote error: {message}")]
    Remote { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status that the endpoint does not translate.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if logging in again might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::SessionExpired
                | Self::InvalidLoginData
                | Self::InvalidConfirmationCode
                | Self::Authentication { .. }
        ) || self.status() == Some(401)
    }

    /// Returns `true` for every "does not exist" flavour.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NoContracts { .. }
            | Self::AccessControlNotFound { .. }
            | Self::CameraNotFound { .. }
            | Self::GroupCameraNotFound { .. }
            | Self::PlaceOrDeviceNotFound { .. } => true,
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// The HTTP status behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
