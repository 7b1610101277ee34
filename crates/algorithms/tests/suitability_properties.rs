//! End-to-end properties of the suitability evaluator.
//!
//! Fields are small synthetic grids; the properties hold for any values, so
//! the conjunction and monotonicity checks are driven by proptest.

use std::collections::BTreeMap;

use aquasuit_algorithms::area::{cell_area_km2, CellAreaMode};
use aquasuit_algorithms::preprocess::{normalize_temperature, TemperatureUnit};
use aquasuit_algorithms::suitability::{
    evaluate, evaluate_with, reclassify_range, EvaluationParams, ToleranceRange, SUITABLE,
    UNSUITABLE,
};
use aquasuit_core::{GeoTransform, Raster, Zone, CRS};
use approx::assert_relative_eq;
use geo::{polygon, MultiPolygon};
use proptest::prelude::*;

const SIZE: usize = 4;

/// SIZE×SIZE field of 1 km cells with its top-left corner at (0, SIZE km)
fn field(values: Vec<f64>) -> Raster<f64> {
    let mut r = Raster::from_vec(values, SIZE, SIZE).unwrap();
    r.set_transform(GeoTransform::new(0.0, SIZE as f64 * 1000.0, 1000.0, -1000.0));
    r
}

fn rect_zone(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Zone {
    let poly = polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)];
    let area = (x1 - x0) * (y1 - y0) / 1.0e6;
    Zone::new(id, id, MultiPolygon::new(vec![poly]), area)
}

fn grid_zone() -> Zone {
    let extent = SIZE as f64 * 1000.0;
    rect_zone("grid", 0.0, 0.0, extent, extent)
}

fn values() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-100.0f64..100.0, SIZE * SIZE)
}

fn cells(r: &Raster<u8>) -> Vec<u8> {
    r.data().iter().copied().collect()
}

// ---------------------------------------------------------------------------
// Worked examples
// ---------------------------------------------------------------------------

#[test]
fn two_by_two_scenario() {
    let transform = GeoTransform::new(0.0, 2000.0, 1000.0, -1000.0);
    let mut temp = Raster::from_vec(vec![10.0, 15.0, 25.0, 35.0], 2, 2).unwrap();
    temp.set_transform(transform);
    let mut depth = Raster::from_vec(vec![-10.0, -50.0, -80.0, 5.0], 2, 2).unwrap();
    depth.set_transform(transform);

    let fields = BTreeMap::from([("temperature".to_string(), temp), ("depth".to_string(), depth)]);
    let ranges = BTreeMap::from([
        ("temperature".to_string(), ToleranceRange::new(11.0, 30.0).unwrap()),
        ("depth".to_string(), ToleranceRange::new(-70.0, 0.0).unwrap()),
    ]);
    let zone = rect_zone("z", 0.0, 0.0, 2000.0, 2000.0);

    let result = evaluate(&fields, &ranges, &[zone]).unwrap();
    assert_eq!(cells(&result.grid), vec![UNSUITABLE, SUITABLE, UNSUITABLE, UNSUITABLE]);

    let summary = &result.summaries[0];
    assert_relative_eq!(summary.total_area_km2, 4.0);
    assert_relative_eq!(summary.suitable_area_km2, 1.0, epsilon = 1e-9);
    assert_relative_eq!(summary.percent_suitable, 25.0, epsilon = 1e-9);
}

#[test]
fn range_bounds_are_half_open() {
    let mut values = vec![0.0; SIZE * SIZE];
    values[0] = 11.0;
    values[1] = 30.0;
    values[2] = 29.999_999;
    values[3] = 10.999_999;
    let mask = reclassify_range(&field(values), &ToleranceRange::new(11.0, 30.0).unwrap()).unwrap();

    assert_eq!(mask.get(0, 0).unwrap(), SUITABLE);
    assert_eq!(mask.get(0, 1).unwrap(), UNSUITABLE);
    assert_eq!(mask.get(0, 2).unwrap(), SUITABLE);
    assert_eq!(mask.get(0, 3).unwrap(), UNSUITABLE);
}

#[test]
fn zone_outside_grid_has_zero_area() {
    let fields = BTreeMap::from([("temperature".to_string(), field(vec![20.0; SIZE * SIZE]))]);
    let ranges = BTreeMap::from([("temperature".to_string(), ToleranceRange::new(0.0, 40.0).unwrap())]);
    let far = rect_zone("far", 1.0e6, 1.0e6, 1.1e6, 1.1e6);

    let result = evaluate(&fields, &ranges, &[far, grid_zone()]).unwrap();
    assert_eq!(result.summaries[0].suitable_area_km2, 0.0);
    assert_eq!(result.summaries[0].percent_suitable, 0.0);
    assert_relative_eq!(result.summaries[1].suitable_area_km2, 16.0, epsilon = 1e-9);
}

#[test]
fn nested_zones_both_report_their_suitable_area() {
    let transform = GeoTransform::new(0.0, 2000.0, 1000.0, -1000.0);
    let mut temp = Raster::filled(2, 2, 20.0);
    temp.set_transform(transform);
    let fields = BTreeMap::from([("temperature".to_string(), temp)]);
    let ranges = BTreeMap::from([("temperature".to_string(), ToleranceRange::new(0.0, 40.0).unwrap())]);
    let region = rect_zone("region", 0.0, 0.0, 2000.0, 2000.0);
    let west = rect_zone("west", 0.0, 0.0, 1000.0, 2000.0);

    let result = evaluate(&fields, &ranges, &[region, west]).unwrap();
    assert_relative_eq!(result.summaries[0].suitable_area_km2, 4.0, epsilon = 1e-9);
    assert_relative_eq!(result.summaries[0].percent_suitable, 100.0, epsilon = 1e-9);
    assert_relative_eq!(result.summaries[1].suitable_area_km2, 2.0, epsilon = 1e-9);
    assert_relative_eq!(result.summaries[1].percent_suitable, 100.0, epsilon = 1e-9);
}

#[test]
fn range_excluding_everything_is_not_an_error() {
    let fields = BTreeMap::from([("temperature".to_string(), field(vec![20.0; SIZE * SIZE]))]);
    let ranges = BTreeMap::from([("temperature".to_string(), ToleranceRange::new(50.0, 60.0).unwrap())]);

    let result = evaluate(&fields, &ranges, &[grid_zone()]).unwrap();
    assert!(cells(&result.grid).iter().all(|&c| c == UNSUITABLE));
    assert_eq!(result.summaries[0].suitable_area_km2, 0.0);
}

#[test]
fn kelvin_input_matches_celsius_ranges() {
    let kelvin = field(vec![288.15; SIZE * SIZE]);
    let celsius = normalize_temperature(&kelvin, TemperatureUnit::Kelvin).unwrap();
    let fields = BTreeMap::from([("temperature".to_string(), celsius)]);
    let ranges = BTreeMap::from([("temperature".to_string(), ToleranceRange::new(11.0, 30.0).unwrap())]);

    let result = evaluate(&fields, &ranges, &[grid_zone()]).unwrap();
    assert_eq!(result.summaries[0].suitable_cells, SIZE * SIZE);
}

// ---------------------------------------------------------------------------
// Geographic grids
// ---------------------------------------------------------------------------

/// One row of 1° cells starting at `lat_top`, on WGS84
fn geographic_row(lat_top: f64) -> Raster<f64> {
    let mut r = Raster::filled(1, 4, 20.0);
    r.set_transform(GeoTransform::new(-70.0, lat_top, 1.0, -1.0));
    r.set_crs(Some(CRS::wgs84()));
    r
}

#[test]
fn high_latitude_cells_are_smaller() {
    let equator = cell_area_km2(&geographic_row(1.0), CellAreaMode::Auto).unwrap();
    let north = cell_area_km2(&geographic_row(61.0), CellAreaMode::Auto).unwrap();

    let ratio = north.get(0, 0).unwrap() / equator.get(0, 0).unwrap();
    // Roughly cos(60.5°)
    assert!((ratio - 0.492).abs() < 0.01, "ratio = {}", ratio);
}

#[test]
fn geographic_zone_area_follows_latitude() {
    let grid = geographic_row(61.0);
    let fields = BTreeMap::from([("temperature".to_string(), grid)]);
    let ranges = BTreeMap::from([("temperature".to_string(), ToleranceRange::new(0.0, 40.0).unwrap())]);
    let poly = polygon![(x: -70.0, y: 60.0), (x: -66.0, y: 60.0), (x: -66.0, y: 61.0), (x: -70.0, y: 61.0)];
    let zone = Zone::new("north", "North", MultiPolygon::new(vec![poly]), 24_500.0);

    let params = EvaluationParams { area_mode: CellAreaMode::Auto };
    let result = evaluate_with(&fields, &ranges, &[zone], &params).unwrap();
    let summary = &result.summaries[0];

    assert_eq!(summary.suitable_cells, 4);
    // A naive 1° × 1° × 111.32² km estimate would give ~12,392 km² per cell
    assert!(summary.suitable_area_km2 > 4.0 * 5_900.0);
    assert!(summary.suitable_area_km2 < 4.0 * 6_200.0);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_evaluations_agree() {
    let temp: Vec<f64> = (0..SIZE * SIZE).map(|i| i as f64 * 2.5).collect();
    let fields = BTreeMap::from([("temperature".to_string(), field(temp))]);
    let zones = vec![grid_zone()];

    let expected: Vec<f64> = (0..8)
        .map(|i| {
            let ranges = BTreeMap::from([(
                "temperature".to_string(),
                ToleranceRange::new(i as f64 * 2.0, 30.0).unwrap(),
            )]);
            evaluate(&fields, &ranges, &zones).unwrap().total_suitable_area_km2()
        })
        .collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let fields = &fields;
                let zones = &zones;
                s.spawn(move || {
                    let ranges = BTreeMap::from([(
                        "temperature".to_string(),
                        ToleranceRange::new(i as f64 * 2.0, 30.0).unwrap(),
                    )]);
                    evaluate(fields, &ranges, zones).unwrap().total_suitable_area_km2()
                })
            })
            .collect();

        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), expected[i]);
        }
    });
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_composite_is_conjunction(
        temp in values(),
        depth in values(),
        lo in -100.0f64..0.0,
        width in 0.0f64..100.0,
    ) {
        let t_range = ToleranceRange::new(lo, lo + width).unwrap();
        let d_range = ToleranceRange::new(-50.0, 10.0).unwrap();
        let t_field = field(temp);
        let d_field = field(depth);

        let t_mask = reclassify_range(&t_field, &t_range).unwrap();
        let d_mask = reclassify_range(&d_field, &d_range).unwrap();

        let fields = BTreeMap::from([
            ("temperature".to_string(), t_field),
            ("depth".to_string(), d_field),
        ]);
        let ranges = BTreeMap::from([
            ("temperature".to_string(), t_range),
            ("depth".to_string(), d_range),
        ]);
        let result = evaluate(&fields, &ranges, &[]).unwrap();

        for ((&c, &t), &d) in result.grid.data().iter().zip(t_mask.data()).zip(d_mask.data()) {
            let both = t == SUITABLE && d == SUITABLE;
            prop_assert_eq!(c == SUITABLE, both);
        }
    }

    #[test]
    fn prop_widening_never_shrinks(
        temp in values(),
        lo in -50.0f64..0.0,
        width in 0.0f64..50.0,
        extra_lo in 0.0f64..20.0,
        extra_hi in 0.0f64..20.0,
    ) {
        let fields = BTreeMap::from([("temperature".to_string(), field(temp))]);
        let narrow = BTreeMap::from([(
            "temperature".to_string(),
            ToleranceRange::new(lo, lo + width).unwrap(),
        )]);
        let wide = BTreeMap::from([(
            "temperature".to_string(),
            ToleranceRange::new(lo - extra_lo, lo + width + extra_hi).unwrap(),
        )]);
        let zones = [grid_zone()];

        let a = evaluate(&fields, &narrow, &zones).unwrap();
        let b = evaluate(&fields, &wide, &zones).unwrap();

        prop_assert!(b.summaries[0].suitable_area_km2 >= a.summaries[0].suitable_area_km2);
        for (&na, &wi) in a.grid.data().iter().zip(b.grid.data()) {
            prop_assert!(wi >= na);
        }
    }

    #[test]
    fn prop_suitable_area_bounded_by_zone(temp in values()) {
        let fields = BTreeMap::from([("temperature".to_string(), field(temp))]);
        let ranges = BTreeMap::from([(
            "temperature".to_string(),
            ToleranceRange::new(-20.0, 20.0).unwrap(),
        )]);

        let result = evaluate(&fields, &ranges, &[grid_zone()]).unwrap();
        let s = &result.summaries[0];
        prop_assert!(s.suitable_area_km2 <= s.total_area_km2 + 1e-9);
        prop_assert!((0.0..=100.0 + 1e-9).contains(&s.percent_suitable));
    }
}
