// MyHome API response types
//
// Passive shapes of the vendor's JSON payloads. The REST endpoints use
// camelCase, the Forpost camera service uses PascalCase. Fields use
// `#[serde(default)]` liberally and keep unknown keys in `extra` because
// the vendor adds fields without notice.

use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// `{ "data": ... }` wrapper used by most `/rest/v1` and `/public/v1` endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// ── Operators ────────────────────────────────────────────────────────

/// Regional operator from `/public/v1/operators`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: u64,
    pub disp_name: String,
    #[serde(default)]
    pub location: Option<OperatorLocation>,
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub info_url: Option<String>,
    #[serde(default)]
    pub mobile_features: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorLocation {
    #[serde(default)]
    pub coordinates: Option<BoundingBox>,
    #[serde(default)]
    pub account_id_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_point: GeoPoint,
    pub max_point: GeoPoint,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

// ── Places ───────────────────────────────────────────────────────────

/// One `data[]` entry of `/rest/v1/subscriberplaces`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberPlace {
    pub id: u64,
    /// `"owner"` or `"guest"`.
    #[serde(default)]
    pub subscriber_type: Option<String>,
    #[serde(default)]
    pub subscriber_state: Option<String>,
    pub place: Place,
    #[serde(default)]
    pub subscriber: Option<Subscriber>,
    #[serde(default)]
    pub guard_call_out: Option<serde_json::Value>,
    #[serde(default)]
    pub payment: Option<PaymentOptions>,
    #[serde(default)]
    pub blocked: bool,
}

/// Subscriber premises with their access controls and cameras.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: u64,
    #[serde(default)]
    pub address: Option<PlaceAddress>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub auto_arming_state: bool,
    #[serde(default)]
    pub auto_arming_radius: Option<f64>,
    #[serde(default)]
    pub preview_available: bool,
    #[serde(default)]
    pub video_download_available: bool,
    #[serde(default)]
    pub controllers: Vec<serde_json::Value>,
    #[serde(default)]
    pub access_controls: Vec<AccessControlDescriptor>,
    #[serde(default)]
    pub cameras: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Place {
    /// Human-readable address, if the vendor provided one.
    pub fn visible_address(&self) -> Option<&str> {
        self.address.as_ref().and_then(|a| a.visible_address.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAddress {
    #[serde(default)]
    pub kladr_address: Option<KladrAddress>,
    #[serde(default)]
    pub kladr_address_string: Option<String>,
    #[serde(default)]
    pub visible_address: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Address split into KLADR (Russian address classifier) components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KladrAddress {
    pub index: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub building: Option<String>,
    pub apartment: Option<String>,
}

/// Door, gate or barrier that can be opened remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlDescriptor {
    pub id: u64,
    pub name: String,
    /// Numeric id carried as a string; matches a camera's `ParentGroups[].ID`.
    #[serde(default)]
    pub forpost_group_id: String,
    #[serde(default)]
    pub forpost_account_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub allow_open: bool,
    #[serde(default)]
    pub allow_video: bool,
    #[serde(default)]
    pub allow_call_mobile: bool,
    #[serde(default)]
    pub entrances: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An access control together with the place that owns it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAccessControl {
    pub place_id: u64,
    #[serde(flatten)]
    pub descriptor: AccessControlDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub nick_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
    #[serde(default)]
    pub use_link: bool,
}

// ── Profile & finances ───────────────────────────────────────────────

/// Payload of `/rest/v1/subscribers/profiles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberProfile {
    #[serde(default)]
    pub allow_add_phone: bool,
    pub subscriber: Subscriber,
    #[serde(default)]
    pub push_user_id: Option<String>,
    #[serde(default)]
    pub call_selected_place_only: bool,
    #[serde(default)]
    pub check_phone_for_svc_activation: bool,
    #[serde(default)]
    pub subscriber_phones: Vec<SubscriberPhone>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberPhone {
    pub id: u64,
    pub number: String,
    #[serde(default)]
    pub number_valid: bool,
}

/// Payload of `/rest/v1/subscribers/profiles/finances` (not enveloped).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberFinances {
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub amount_sum: Option<f64>,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub payment_link: Option<String>,
    #[serde(default)]
    pub blocked: bool,
}

// ── Forpost cameras ──────────────────────────────────────────────────

/// Camera from `/rest/v1/forpost/cameras`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForpostCamera {
    #[serde(rename = "ID")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_active: i64,
    #[serde(default)]
    pub is_sound: i64,
    #[serde(default)]
    pub record_type: i64,
    #[serde(default)]
    pub quota: i64,
    #[serde(default)]
    pub max_bandwidth: Option<i64>,
    #[serde(default)]
    pub home_mode: i64,
    #[serde(default)]
    pub devices: Option<serde_json::Value>,
    #[serde(default)]
    pub parent_groups: Vec<ParentGroup>,
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub time_zone: i64,
    #[serde(default)]
    pub motion_detector_mode: Option<String>,
    #[serde(default, rename = "ParentID")]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ForpostCamera {
    /// Whether one of the camera's parent groups has the given id.
    pub fn in_group(&self, group_id: u64) -> bool {
        self.parent_groups.iter().any(|g| g.id == group_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentGroup {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ParentID", default)]
    pub parent_id: Option<u64>,
}

/// `data` of `/rest/v1/forpost/cameras/{id}/video`.
///
/// Exactly one of `url` / `error` is normally set; an empty `Error` string
/// counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoStream {
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}
