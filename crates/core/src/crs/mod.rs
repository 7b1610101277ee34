//! Coordinate Reference System handling
//!
//! AquaSuit never reprojects. A CRS is carried so that co-registration can be
//! verified and so that cell areas can be computed correctly: geographic
//! (lon/lat) grids need latitude-dependent cell areas, projected grids do not.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG codes of common geographic (lon/lat) coordinate systems.
const GEOGRAPHIC_EPSG: &[u32] = &[
    4326, // WGS 84
    4269, // NAD83
    4258, // ETRS89
    4283, // GDA94
    4617, // NAD83(CSRS)
    4674, // SIRGAS 2000
    7844, // GDA2020
];

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
    /// PROJ string if available
    proj: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            proj: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
            proj: None,
        }
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        Self {
            wkt: None,
            epsg: None,
            proj: Some(proj.into()),
        }
    }

    /// Parse a user-supplied identifier: `EPSG:4326`, a bare code, a PROJ
    /// string (`+proj=...`) or anything else as WKT.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let code = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
            .unwrap_or(trimmed);
        if let Ok(code) = code.parse::<u32>() {
            return Self::from_epsg(code);
        }
        if trimmed.starts_with("+proj") {
            return Self::from_proj(trimmed);
        }
        Self::from_wkt(trimmed)
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Get PROJ string
    pub fn proj(&self) -> Option<&str> {
        self.proj.as_deref()
    }

    /// Whether coordinates are longitude/latitude in degrees.
    pub fn is_geographic(&self) -> bool {
        if let Some(code) = self.epsg {
            return GEOGRAPHIC_EPSG.contains(&code);
        }
        if let Some(proj) = &self.proj {
            return proj.contains("+proj=longlat") || proj.contains("+proj=latlong");
        }
        if let Some(wkt) = &self.wkt {
            let head = wkt.trim_start().to_ascii_uppercase();
            return head.starts_with("GEOGCS") || head.starts_with("GEOGCRS");
        }
        false
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }

        // String comparison is imperfect but conservative
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }

        if let (Some(a), Some(b)) = (&self.proj, &other.proj) {
            return a == b;
        }

        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(proj) = &self.proj {
            return proj.clone();
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt.char_indices().nth(50).map_or(wkt.len(), |(i, _)| i);
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}
