//! Tolerance ranges and species profiles

use aquasuit_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Half-open interval `[min, max)` of values a species tolerates along one
/// environmental variable.
///
/// Bounds are expressed in the canonical units of the variable (°C for
/// temperature, metres with negative values below sea level for depth);
/// see [`crate::preprocess`] for converting source rasters to those units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct ToleranceRange {
    min: f64,
    max: f64,
}

impl ToleranceRange {
    /// Create a range. `min == max` is allowed and matches nothing.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidParameter {
                name: "range",
                value: format!("[{}, {})", min, max),
                reason: "bounds must be finite".into(),
            });
        }
        if min > max {
            return Err(Error::InvalidParameter {
                name: "range",
                value: format!("[{}, {})", min, max),
                reason: "min must not exceed max".into(),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `min <= value < max`. NaN is never contained.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }

    /// Whether `other` lies entirely within `self`.
    pub fn includes(&self, other: &ToleranceRange) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

impl TryFrom<[f64; 2]> for ToleranceRange {
    type Error = Error;

    fn try_from([min, max]: [f64; 2]) -> Result<Self> {
        Self::new(min, max)
    }
}

impl From<ToleranceRange> for [f64; 2] {
    fn from(r: ToleranceRange) -> Self {
        [r.min, r.max]
    }
}

impl fmt::Display for ToleranceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}

/// A species and its tolerance window along each environmental variable.
///
/// Serialized as JSON like:
///
/// ```json
/// { "name": "oysters", "ranges": { "temperature": [11.0, 30.0], "depth": [-70.0, 0.0] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub name: String,
    pub ranges: BTreeMap<String, ToleranceRange>,
}

impl SpeciesProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ranges: BTreeMap::new(),
        }
    }

    /// Builder-style setter for one variable's range
    pub fn with_range(mut self, variable: impl Into<String>, range: ToleranceRange) -> Self {
        self.ranges.insert(variable.into(), range);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_boundaries() {
        let r = ToleranceRange::new(11.0, 30.0).unwrap();
        assert!(r.contains(11.0));
        assert!(r.contains(29.999));
        assert!(!r.contains(30.0));
        assert!(!r.contains(10.999));
        assert!(!r.contains(f64::NAN));
    }

    #[test]
    fn test_empty_range_matches_nothing() {
        let r = ToleranceRange::new(5.0, 5.0).unwrap();
        assert!(!r.contains(5.0));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(ToleranceRange::new(30.0, 11.0).is_err());
        assert!(ToleranceRange::new(f64::NAN, 1.0).is_err());
        assert!(ToleranceRange::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_includes() {
        let wide = ToleranceRange::new(0.0, 40.0).unwrap();
        let narrow = ToleranceRange::new(11.0, 30.0).unwrap();
        assert!(wide.includes(&narrow));
        assert!(!narrow.includes(&wide));
    }

    #[test]
    fn test_profile_json() {
        let json = r#"{"name": "lump sucker", "ranges": {"temperature": [-0.5, 9.0], "depth": [-450.0, 0.0]}}"#;
        let profile: SpeciesProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "lump sucker");
        assert_eq!(profile.ranges["depth"], ToleranceRange::new(-450.0, 0.0).unwrap());

        let back = serde_json::to_string(&profile).unwrap();
        assert!(back.contains("[-0.5,9.0]"));
    }

    #[test]
    fn test_profile_json_rejects_inverted_range() {
        let json = r#"{"name": "x", "ranges": {"depth": [0.0, -70.0]}}"#;
        assert!(serde_json::from_str::<SpeciesProfile>(json).is_err());
    }
}
