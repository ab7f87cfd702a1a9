//! Location report models.

use serde::{Deserialize, Serialize};

/// One appended location report. Reports are never updated or deleted;
/// "current position" is the row with the maximum `reported_at` per
/// `corrida_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub id: i64,
    pub corrida_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "preciseLocation")]
    pub precise: bool,
    #[serde(rename = "timestamp")]
    pub reported_at: String,
}

/// Request body for POST /api/location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub corrida_number: String,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(rename = "preciseLocation", default)]
    pub precise: bool,
}

impl ReportLocationRequest {
    /// Range check for coordinates. NaN fails both comparisons.
    pub fn coordinates_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Response for POST /api/location.
#[derive(Debug, Serialize)]
pub struct ReportLocationResponse {
    pub message: String,
    pub id: i64,
}

/// Response for GET /api/location/check/{corrida_number}.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCheckResponse {
    pub has_recent_location: bool,
}
