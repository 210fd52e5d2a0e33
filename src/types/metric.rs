//! Defines the irradiance metrics a unified frame can be summarised by.

use crate::error::SolarstatError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One of the solar irradiance measures recorded per timestamp, in W/m².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    /// Global horizontal irradiance.
    Ghi,
    /// Direct normal irradiance.
    Dni,
    /// Diffuse horizontal irradiance.
    Dhi,
}

impl Metric {
    /// All metrics in the order they are offered for selection.
    pub const ALL: [Metric; 3] = [Metric::Ghi, Metric::Dni, Metric::Dhi];

    /// The header name of this metric in a region file.
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Ghi => "GHI",
            Metric::Dni => "DNI",
            Metric::Dhi => "DHI",
        }
    }
}

/// Formats a `Metric` as its column name.
///
/// # Examples
///
/// ```
/// use solarstat::Metric;
///
/// assert_eq!(Metric::Ghi.to_string(), "GHI");
/// assert_eq!(format!("{}", Metric::Dhi), "DHI");
/// ```
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl FromStr for Metric {
    type Err = SolarstatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GHI" => Ok(Metric::Ghi),
            "DNI" => Ok(Metric::Dni),
            "DHI" => Ok(Metric::Dhi),
            _ => Err(SolarstatError::UnknownMetric(s.to_string())),
        }
    }
}
