//! Total area of zone polygons, for sources that do not precompute it

use geo::{Area, GeodesicArea, MultiPolygon};
use aquasuit_core::vector::ZoneRecord;
use aquasuit_core::{Zone, CRS};

use super::cell_area::CellAreaMode;

/// Area of a zone polygon in km².
///
/// Ellipsoidal mode uses geodesic area on WGS84 (Karney 2013, via `geo`);
/// planar mode uses the shoelace area scaled by `metres_per_unit²`.
pub fn zone_area_km2(geometry: &MultiPolygon<f64>, mode: CellAreaMode, crs: Option<&CRS>) -> f64 {
    let m2 = match mode.resolve(crs) {
        CellAreaMode::Ellipsoidal => geometry.geodesic_area_unsigned(),
        CellAreaMode::Planar { metres_per_unit } => {
            geometry.unsigned_area() * metres_per_unit * metres_per_unit
        }
        CellAreaMode::Auto => unreachable!("resolve() never returns Auto"),
    };
    m2 / 1.0e6
}

/// Turn zone records into zones, computing missing areas from geometry.
pub fn zones_from_records(records: Vec<ZoneRecord>, mode: CellAreaMode, crs: Option<&CRS>) -> Vec<Zone> {
    records
        .into_iter()
        .map(|r| r.into_zone(|g| zone_area_km2(g, mode, crs)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]])
    }

    #[test]
    fn test_planar_area() {
        let zone = square(0.0, 0.0, 2000.0);
        let a = zone_area_km2(&zone, CellAreaMode::Planar { metres_per_unit: 1.0 }, None);
        assert_relative_eq!(a, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_geodesic_area_matches_cell_area() {
        let zone = square(0.0, 0.0, 1.0);
        let crs = CRS::wgs84();
        let geodesic = zone_area_km2(&zone, CellAreaMode::Auto, Some(&crs));
        let band = super::super::cell_area::geographic_cell_area_km2(0.0, 1.0, 1.0);
        // Geodesic edges differ slightly from parallels along the top edge
        assert_relative_eq!(geodesic, band, max_relative = 1e-3);
    }

    #[test]
    fn test_zones_from_records_prefers_given_area() {
        let records = vec![
            ZoneRecord {
                id: "1".into(),
                name: "given".into(),
                geometry: square(0.0, 0.0, 1000.0),
                area_km2: Some(99.0),
            },
            ZoneRecord {
                id: "2".into(),
                name: "computed".into(),
                geometry: square(0.0, 0.0, 1000.0),
                area_km2: None,
            },
        ];
        let zones = zones_from_records(records, CellAreaMode::Auto, None);
        assert_eq!(zones[0].total_area_km2, 99.0);
        assert_relative_eq!(zones[1].total_area_km2, 1.0, epsilon = 1e-12);
    }
}
