//! Unit normalisation for environmental fields
//!
//! Tolerance ranges are always written in canonical units: degrees Celsius
//! for temperature and metres of elevation (negative below sea level) for
//! depth. Source rasters frequently use other conventions (satellite SST in
//! Kelvin, bathymetry as positive depth), so the conversion is an explicit
//! input rather than something the evaluator guesses.

use ndarray::Array2;
use crate::maybe_rayon::*;
use aquasuit_core::raster::Raster;
use aquasuit_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KELVIN_OFFSET: f64 = 273.15;

/// Unit of a temperature field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Kelvin,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert one value to °C
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Kelvin => value - KELVIN_OFFSET,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "celsius" | "c" | "degc" => Ok(TemperatureUnit::Celsius),
            "kelvin" | "k" => Ok(TemperatureUnit::Kelvin),
            "fahrenheit" | "f" | "degf" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(Error::InvalidParameter {
                name: "temperature unit",
                value: s.to_string(),
                reason: "expected celsius, kelvin or fahrenheit".into(),
            }),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Kelvin => "kelvin",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        };
        f.write_str(s)
    }
}

/// Sign convention of a depth/bathymetry field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthConvention {
    /// Elevation: values below sea level are negative (GEBCO, ETOPO)
    #[default]
    NegativeDown,
    /// Depth: values below sea level are positive
    PositiveDown,
}

impl FromStr for DepthConvention {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "negative-down" | "elevation" | "negative" => Ok(DepthConvention::NegativeDown),
            "positive-down" | "depth" | "positive" => Ok(DepthConvention::PositiveDown),
            _ => Err(Error::InvalidParameter {
                name: "depth convention",
                value: s.to_string(),
                reason: "expected negative-down or positive-down".into(),
            }),
        }
    }
}

impl fmt::Display for DepthConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DepthConvention::NegativeDown => "negative-down",
            DepthConvention::PositiveDown => "positive-down",
        })
    }
}

/// Apply `f` to every valid cell; no-data cells become NaN.
pub(crate) fn map_valid<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let (rows, cols) = raster.shape();
    let view = raster.view();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let val = view[(row, col)];
                if !raster.is_nodata(val) {
                    *out = f(val);
                }
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut output = raster.with_data(array)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// Convert a temperature field to °C
pub fn normalize_temperature(field: &Raster<f64>, unit: TemperatureUnit) -> Result<Raster<f64>> {
    map_valid(field, move |v| unit.to_celsius(v))
}

/// Convert a depth field to the negative-down convention
pub fn normalize_depth(field: &Raster<f64>, convention: DepthConvention) -> Result<Raster<f64>> {
    match convention {
        DepthConvention::NegativeDown => map_valid(field, |v| v),
        DepthConvention::PositiveDown => map_valid(field, |v| -v),
    }
}
