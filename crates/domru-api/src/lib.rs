// domru-api: Async Rust client for the Dom.ru MyHome subscriber API

pub mod access_control;
pub mod auth;
pub mod camera;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use access_control::AccessControl;
pub use auth::{Credentials, LoginAccount, LoginDetails, SessionTokens, TokenRefresh};
pub use auth::{parse_phone, validate_phone};
pub use camera::{Camera, Snapshot};
pub use error::Error;
pub use models::{
    AccessControlDescriptor, ForpostCamera, Operator, Place, ResolvedAccessControl,
    SubscriberFinances, SubscriberPlace, SubscriberProfile,
};
pub use session::SessionClient;
pub use transport::{DEFAULT_API_URL, TlsMode, TransportConfig};
