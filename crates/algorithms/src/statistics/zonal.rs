//! Zonal statistics over polygon zones
//!
//! A cell belongs to a zone when its centre lies inside (or on the boundary
//! of) the zone polygon. Area totals test every zone independently, so
//! nested zones (a region and its sub-regions) each get their full area.
//! [`rasterize_zones`] produces a single label raster instead, where the
//! first zone in input order wins on overlap.

use geo::{BoundingRect, Intersects, Point};
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, warn};
use crate::maybe_rayon::*;
use aquasuit_core::raster::{Raster, RasterElement};
use aquasuit_core::{Error, Result, Zone};

use crate::suitability::SUITABLE;

/// Zone index meaning "no zone"
pub const NO_ZONE: i32 = 0;

/// Suitable area aggregated over one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone_id: String,
    pub name: String,
    /// Ground area of suitable cells whose centre falls in the zone, km²
    pub suitable_area_km2: f64,
    /// Zone area as supplied with the zone, km²
    pub total_area_km2: f64,
    /// `suitable_area_km2 / total_area_km2 * 100`, or 0 for zones without area
    pub percent_suitable: f64,
    pub suitable_cells: usize,
    /// Grid cells assigned to the zone, suitable or not
    pub zone_cells: usize,
}

/// Inclusive-exclusive pixel window `[row0, row1) × [col0, col1)`.
#[derive(Debug, Clone, Copy)]
struct Window {
    row0: usize,
    row1: usize,
    col0: usize,
    col1: usize,
}

/// Pixel window covering the zone's bounding box, clipped to the grid.
/// `None` when the zone is entirely outside.
fn zone_window<T: RasterElement>(zone: &Zone, grid: &Raster<T>) -> Option<Window> {
    let rect = zone.geometry.bounding_rect()?;
    let (rows, cols) = grid.shape();
    let tf = grid.transform();

    let corners = [
        tf.geo_to_pixel(rect.min().x, rect.min().y),
        tf.geo_to_pixel(rect.min().x, rect.max().y),
        tf.geo_to_pixel(rect.max().x, rect.min().y),
        tf.geo_to_pixel(rect.max().x, rect.max().y),
    ];
    if corners.iter().any(|(c, r)| !c.is_finite() || !r.is_finite()) {
        return None;
    }

    let min_c = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_c = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_r = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_r = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    // Cell i has its centre at i + 0.5, so the covered cells are those with
    // min - 0.5 <= i <= max - 0.5.
    let clamp = |v: f64, hi: usize| v.max(0.0).min(hi as f64) as usize;
    let col0 = clamp((min_c - 0.5).ceil(), cols);
    let col1 = clamp((max_c - 0.5).floor() + 1.0, cols);
    let row0 = clamp((min_r - 0.5).ceil(), rows);
    let row1 = clamp((max_r - 0.5).floor() + 1.0, rows);

    (row0 < row1 && col0 < col1).then_some(Window { row0, row1, col0, col1 })
}

/// Rasterize zones onto `template`'s grid.
///
/// Each cell holds the 1-based index of the zone containing its centre, or
/// [`NO_ZONE`].
pub fn rasterize_zones<T: RasterElement>(zones: &[Zone], template: &Raster<T>) -> Result<Raster<i32>> {
    let (rows, cols) = template.shape();
    let windows: Vec<Option<Window>> = zones.iter().map(|z| zone_window(z, template)).collect();

    let data: Vec<i32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![NO_ZONE; cols];
            for (index, (zone, window)) in zones.iter().zip(windows.iter()).enumerate() {
                let Some(w) = window else { continue };
                if row < w.row0 || row >= w.row1 {
                    continue;
                }
                for (col, cell) in row_data.iter_mut().enumerate().take(w.col1).skip(w.col0) {
                    if *cell != NO_ZONE {
                        continue;
                    }
                    let (x, y) = template.cell_center(row, col);
                    if zone.geometry.intersects(&Point::new(x, y)) {
                        *cell = index as i32 + 1;
                    }
                }
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut out = template.with_data(array)?;
    out.set_nodata(Some(NO_ZONE));
    Ok(out)
}

/// Sum the ground area of suitable cells in each zone.
///
/// `mask` is a suitability grid and `cell_area` its per-cell area in km²
/// (see [`crate::area::cell_area_km2`]); both must share a grid. Each zone
/// is tested on its own, so a cell inside nested or overlapping zones counts
/// towards every one of them. Summaries come back in zone input order. Zones
/// that touch no cell summarise to zero.
pub fn zonal_suitable_area(
    mask: &Raster<u8>,
    cell_area: &Raster<f64>,
    zones: &[Zone],
) -> Result<Vec<ZoneSummary>> {
    mask.check_aligned(cell_area, "cell area")?;

    let summaries = zones
        .par_iter()
        .map(|zone| summarise_zone(zone, mask, cell_area))
        .collect();

    Ok(summaries)
}

fn summarise_zone(zone: &Zone, mask: &Raster<u8>, cell_area: &Raster<f64>) -> ZoneSummary {
    let mut suitable_area = 0.0_f64;
    let mut suitable_cells = 0_usize;
    let mut zone_cells = 0_usize;

    if let Some(w) = zone_window(zone, mask) {
        let mask_data = mask.data();
        let area_data = cell_area.data();
        for row in w.row0..w.row1 {
            for col in w.col0..w.col1 {
                let (x, y) = mask.cell_center(row, col);
                if !zone.geometry.intersects(&Point::new(x, y)) {
                    continue;
                }
                zone_cells += 1;
                if mask_data[(row, col)] == SUITABLE {
                    suitable_cells += 1;
                    suitable_area += area_data[(row, col)];
                }
            }
        }
    }

    if zone_cells == 0 {
        warn!(zone = %zone.id, "zone does not cover any grid cell");
    }
    let percent_suitable = if zone.total_area_km2 > 0.0 {
        suitable_area / zone.total_area_km2 * 100.0
    } else {
        0.0
    };
    let summary = ZoneSummary {
        zone_id: zone.id.clone(),
        name: zone.name.clone(),
        suitable_area_km2: suitable_area,
        total_area_km2: zone.total_area_km2,
        percent_suitable,
        suitable_cells,
        zone_cells,
    };
    debug!(
        zone = %summary.zone_id,
        suitable_km2 = summary.suitable_area_km2,
        percent = summary.percent_suitable,
        "zone summary"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use aquasuit_core::GeoTransform;
    use geo::{polygon, MultiPolygon};

    fn rect_zone(id: &str, x0: f64, y0: f64, x1: f64, y1: f64, area: f64) -> Zone {
        let poly = polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)];
        Zone::new(id, id, MultiPolygon::new(vec![poly]), area)
    }

    /// 4×4 grid covering x ∈ [0, 4], y ∈ [0, 4], 1 unit cells
    fn grid() -> Raster<u8> {
        let mut r: Raster<u8> = Raster::filled(4, 4, SUITABLE);
        r.set_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0));
        r
    }

    #[test]
    fn test_rasterize_halves() {
        let zones = vec![
            rect_zone("west", 0.0, 0.0, 2.0, 4.0, 8.0),
            rect_zone("east", 2.0, 0.0, 4.0, 4.0, 8.0),
        ];
        let idx = rasterize_zones(&zones, &grid()).unwrap();
        for row in 0..4 {
            assert_eq!(idx.get(row, 0).unwrap(), 1);
            assert_eq!(idx.get(row, 1).unwrap(), 1);
            assert_eq!(idx.get(row, 2).unwrap(), 2);
            assert_eq!(idx.get(row, 3).unwrap(), 2);
        }
    }

    #[test]
    fn test_rasterize_uses_cell_centres() {
        // Covers x ∈ [0, 1.4]: only column 0's centre (0.5) is inside
        let zones = vec![rect_zone("strip", 0.0, 0.0, 1.4, 4.0, 5.6)];
        let idx = rasterize_zones(&zones, &grid()).unwrap();
        assert_eq!(idx.get(0, 0).unwrap(), 1);
        assert_eq!(idx.get(0, 1).unwrap(), NO_ZONE);
    }

    #[test]
    fn test_rasterize_first_zone_wins_on_overlap() {
        let zones = vec![
            rect_zone("a", 0.0, 0.0, 3.0, 4.0, 12.0),
            rect_zone("b", 1.0, 0.0, 4.0, 4.0, 12.0),
        ];
        let idx = rasterize_zones(&zones, &grid()).unwrap();
        assert_eq!(idx.get(0, 2).unwrap(), 1);
        assert_eq!(idx.get(0, 3).unwrap(), 2);
    }

    #[test]
    fn test_zonal_area_whole_grid() {
        let mask = grid();
        let area = mask.like(1.0_f64);
        let zones = vec![rect_zone("all", 0.0, 0.0, 4.0, 4.0, 16.0)];

        let s = zonal_suitable_area(&mask, &area, &zones).unwrap();
        assert_eq!(s[0].suitable_cells, 16);
        assert_eq!(s[0].zone_cells, 16);
        assert_relative_eq!(s[0].suitable_area_km2, 16.0);
        assert_relative_eq!(s[0].percent_suitable, 100.0);
    }

    #[test]
    fn test_zonal_area_weights_by_cell_area() {
        let mut mask = grid();
        mask.set(0, 0, 0).unwrap();
        let mut area = mask.like(1.0_f64);
        area.set(3, 3, 2.5).unwrap();
        let zones = vec![rect_zone("all", 0.0, 0.0, 4.0, 4.0, 20.0)];

        let s = zonal_suitable_area(&mask, &area, &zones).unwrap();
        assert_eq!(s[0].suitable_cells, 15);
        assert_relative_eq!(s[0].suitable_area_km2, 16.5);
        assert_relative_eq!(s[0].percent_suitable, 82.5);
    }

    #[test]
    fn test_nested_zones_each_get_full_area() {
        let mask = grid();
        let area = mask.like(1.0_f64);
        let zones = vec![
            rect_zone("region", 0.0, 0.0, 4.0, 4.0, 16.0),
            rect_zone("west", 0.0, 0.0, 2.0, 4.0, 8.0),
            rect_zone("centre", 1.0, 1.0, 3.0, 3.0, 4.0),
        ];

        let s = zonal_suitable_area(&mask, &area, &zones).unwrap();
        assert_relative_eq!(s[0].suitable_area_km2, 16.0);
        assert_relative_eq!(s[1].suitable_area_km2, 8.0);
        assert_relative_eq!(s[1].percent_suitable, 100.0);
        assert_eq!(s[2].zone_cells, 4);
        assert_relative_eq!(s[2].suitable_area_km2, 4.0);
    }

    #[test]
    fn test_zone_outside_grid_is_zero() {
        let mask = grid();
        let area = mask.like(1.0_f64);
        let zones = vec![
            rect_zone("far", 100.0, 100.0, 110.0, 110.0, 100.0),
            rect_zone("all", 0.0, 0.0, 4.0, 4.0, 16.0),
        ];

        let s = zonal_suitable_area(&mask, &area, &zones).unwrap();
        assert_eq!(s[0].zone_id, "far");
        assert_eq!(s[0].suitable_area_km2, 0.0);
        assert_eq!(s[0].percent_suitable, 0.0);
        assert_eq!(s[0].zone_cells, 0);
        assert_eq!(s[1].suitable_cells, 16);
    }

    #[test]
    fn test_zone_without_area_reports_zero_percent() {
        let mask = grid();
        let area = mask.like(1.0_f64);
        let zones = vec![rect_zone("all", 0.0, 0.0, 4.0, 4.0, 0.0)];

        let s = zonal_suitable_area(&mask, &area, &zones).unwrap();
        assert_relative_eq!(s[0].suitable_area_km2, 16.0);
        assert_eq!(s[0].percent_suitable, 0.0);
    }

    #[test]
    fn test_zonal_rejects_misaligned_area() {
        let mask = grid();
        let area: Raster<f64> = Raster::filled(2, 2, 1.0);
        assert!(zonal_suitable_area(&mask, &area, &[]).is_err());
    }
}
