use chrono::NaiveDateTime;
use serde::Serialize;

pub(crate) const COL_TIMESTAMP: &str = "Timestamp";
pub(crate) const COL_GHI: &str = "GHI"; // Global horizontal irradiance
pub(crate) const COL_DNI: &str = "DNI"; // Direct normal irradiance
pub(crate) const COL_DHI: &str = "DHI"; // Diffuse horizontal irradiance
pub(crate) const COL_COMMENTS: &str = "Comments";
pub(crate) const COL_REGION: &str = "country";

/// One timestamped observation from a region file.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct MeasurementRow {
    pub timestamp: NaiveDateTime, // Timestamp
    pub ghi: Option<f64>,         // GHI (W/m²)
    pub dni: Option<f64>,         // DNI (W/m²)
    pub dhi: Option<f64>,         // DHI (W/m²)
    pub region: String,           // country
    pub comments: Option<String>, // Comments
}
