// Payload shapes returned by the Mist API. Only the fields the report reads
// are typed; anything else in a response is ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of `/api/v1/const/countries`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Country {
    pub alpha2: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Per-country channel allowance from `devices/ap_channels`.
///
/// Channel lists are keyed by bandwidth in MHz (`"20"`, `"40"`, `"80"`).
/// `uses` has no fixed shape in the API, so it is kept as raw JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CountryEntry {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub dfs_ok: Option<bool>,
    pub band24_enabled: bool,
    pub band24_40mhz_allowed: bool,
    pub band5_enabled: bool,
    #[serde(default)]
    pub certified: Option<bool>,
    #[serde(default)]
    pub uses: Option<serde_json::Value>,
    #[serde(default)]
    pub band24_channels: BTreeMap<String, Vec<u16>>,
    #[serde(default)]
    pub band5_channels: BTreeMap<String, Vec<u16>>,
}

/// Identity returned by `/api/v1/self`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SelfInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// RF template as listed under `/api/v1/orgs/:org/rftemplates`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RfTemplate {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
