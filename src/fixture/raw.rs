use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A route exactly as written in the fixture file, before validation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RawRoute {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub method: String,
    /// Absent and `0` both mean 200.
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RawFixture {
    #[serde(default)]
    pub routes: Vec<RawRoute>,
}
