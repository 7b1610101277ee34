//! Main Raster type

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::{Array2, ArrayView2};

/// A georeferenced 2D raster grid.
///
/// `Raster<T>` stores values of type `T` in a 2D grid with associated
/// geographic metadata (transform, CRS and no-data sentinel).
///
/// # Example
///
/// ```ignore
/// use aquasuit_core::Raster;
///
/// let mut sst: Raster<f64> = Raster::new(100, 100);
/// sst.set(10, 20, 14.5)?;
/// let value = sst.get(10, 20)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    transform: GeoTransform,
    crs: Option<CRS>,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        }
    }

    /// Create a raster with the same grid (transform, CRS) wrapping new data.
    ///
    /// The no-data sentinel is not carried over since `U` may differ from `T`.
    pub fn with_data<U: RasterElement>(&self, data: Array2<U>) -> Result<Raster<U>> {
        if data.dim() != self.shape() {
            let (ar, ac) = data.dim();
            return Err(Error::ShapeMismatch {
                variable: "output".into(),
                er: self.rows(),
                ec: self.cols(),
                ar,
                ac,
            });
        }
        Ok(Raster {
            data,
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: None,
        })
    }

    /// Create a raster with the same grid, every cell set to `fill_value`
    pub fn like<U: RasterElement>(&self, fill_value: U) -> Raster<U> {
        Raster {
            data: Array2::from_elem(self.data.dim(), fill_value),
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: None,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let (rows, cols) = self.shape();
        let cell = self.data.get_mut((row, col)).ok_or(Error::IndexOutOfBounds {
            row,
            col,
            rows,
            cols,
        })?;
        *cell = value;
        Ok(())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    // Metadata

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Coordinates of the center of cell (row, col)
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    // Co-registration

    /// Verify that `other` lies on exactly the same grid as `self`: same
    /// shape, same geotransform, same CRS.
    ///
    /// `variable` names `other` in the returned error. A CRS missing on both
    /// sides is accepted; missing on only one side is a mismatch.
    pub fn check_aligned<U: RasterElement>(&self, other: &Raster<U>, variable: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                variable: variable.to_string(),
                er: self.rows(),
                ec: self.cols(),
                ar: other.rows(),
                ac: other.cols(),
            });
        }

        if !self.transform.approx_eq(other.transform()) {
            return Err(Error::TransformMismatch {
                variable: variable.to_string(),
                expected: self.transform.to_gdal(),
                actual: other.transform().to_gdal(),
            });
        }

        match (self.crs(), other.crs()) {
            (None, None) => Ok(()),
            (Some(a), Some(b)) if a.is_equivalent(b) => Ok(()),
            (a, b) => Err(Error::CrsMismatch {
                variable: variable.to_string(),
                expected: a.map_or_else(|| "none".to_string(), CRS::identifier),
                actual: b.map_or_else(|| "none".to_string(), CRS::identifier),
            }),
        }
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Number of cells holding a valid (non no-data) value
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| !self.is_nodata(v)).count()
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter().filter(|&&v| !self.is_nodata(v)) {
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        RasterStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
