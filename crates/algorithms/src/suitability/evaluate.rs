//! The suitability evaluator
//!
//! Given co-registered environmental fields, a tolerance range per field and
//! a list of zones, produce the composite suitability grid and the suitable
//! area of each zone. The evaluation is a pure function of its arguments:
//! nothing is cached between calls and inputs are only read, so the same
//! base fields can be evaluated for many species at once.

use std::collections::BTreeMap;
use tracing::{debug, info};
use crate::maybe_rayon::*;
use aquasuit_core::raster::Raster;
use aquasuit_core::{Algorithm, Error, Result, Zone};

use super::combine::combine_masks;
use super::range::{SpeciesProfile, ToleranceRange};
use super::reclassify::reclassify_range;
use crate::area::{cell_area_km2, CellAreaMode};
use crate::statistics::{zonal_suitable_area, ZoneSummary};

/// Parameters for suitability evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationParams {
    /// How cell areas are derived from the grid
    pub area_mode: CellAreaMode,
}

/// Output of one evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Composite grid: `SUITABLE` where every variable is within range
    pub grid: Raster<u8>,
    /// One summary per input zone, in input order
    pub summaries: Vec<ZoneSummary>,
}

impl Evaluation {
    /// Suitable area summed over all zone summaries, km². A cell inside
    /// several overlapping zones is counted once per zone.
    pub fn total_suitable_area_km2(&self) -> f64 {
        self.summaries.iter().map(|s| s.suitable_area_km2).sum()
    }
}

/// Evaluation result for one species of a batch
#[derive(Debug, Clone)]
pub struct SpeciesEvaluation {
    pub species: String,
    pub evaluation: Evaluation,
}

/// Evaluate suitability with default parameters.
///
/// See [`evaluate_with`].
pub fn evaluate(
    fields: &BTreeMap<String, Raster<f64>>,
    ranges: &BTreeMap<String, ToleranceRange>,
    zones: &[Zone],
) -> Result<Evaluation> {
    evaluate_with(fields, ranges, zones, &EvaluationParams::default())
}

/// Evaluate suitability.
///
/// # Errors
/// - [`Error::InvalidParameter`] if `fields` is empty
/// - [`Error::MissingRange`] if a field has no range
/// - [`Error::MissingField`] if a range has no field
/// - [`Error::ShapeMismatch`], [`Error::TransformMismatch`] or
///   [`Error::CrsMismatch`] if the fields are not co-registered
///
/// A range that excludes every value is not an error: the grid is simply
/// all unsuitable.
pub fn evaluate_with(
    fields: &BTreeMap<String, Raster<f64>>,
    ranges: &BTreeMap<String, ToleranceRange>,
    zones: &[Zone],
    params: &EvaluationParams,
) -> Result<Evaluation> {
    check_variables(fields, ranges)?;

    let mut iter = fields.iter();
    if let Some((_, reference)) = iter.next() {
        for (name, field) in iter {
            reference.check_aligned(field, name)?;
        }
    }

    let masks = fields
        .iter()
        .map(|(name, field)| {
            let range = &ranges[name];
            let mask = reclassify_range(field, range)?;
            debug!(
                variable = %name,
                range = %range,
                suitable_cells = mask.valid_count(),
                "reclassified"
            );
            Ok(mask)
        })
        .collect::<Result<Vec<_>>>()?;

    let grid = combine_masks(&masks)?;
    let cell_area = cell_area_km2(&grid, params.area_mode)?;
    let summaries = zonal_suitable_area(&grid, &cell_area, zones)?;

    debug!(
        suitable_cells = grid.valid_count(),
        zones = summaries.len(),
        "evaluation complete"
    );

    Ok(Evaluation { grid, summaries })
}

fn check_variables(
    fields: &BTreeMap<String, Raster<f64>>,
    ranges: &BTreeMap<String, ToleranceRange>,
) -> Result<()> {
    if fields.is_empty() {
        return Err(Error::InvalidParameter {
            name: "fields",
            value: "{}".into(),
            reason: "at least one environmental field is required".into(),
        });
    }
    if let Some(variable) = fields.keys().find(|k| !ranges.contains_key(*k)) {
        return Err(Error::MissingRange {
            variable: variable.clone(),
        });
    }
    if let Some(variable) = ranges.keys().find(|k| !fields.contains_key(*k)) {
        return Err(Error::MissingField {
            variable: variable.clone(),
        });
    }
    Ok(())
}

/// Evaluate several species against the same base fields.
///
/// Species are evaluated in parallel (with the `parallel` feature); results
/// come back in profile order. The first failing species aborts the batch.
pub fn evaluate_species(
    fields: &BTreeMap<String, Raster<f64>>,
    profiles: &[SpeciesProfile],
    zones: &[Zone],
    params: &EvaluationParams,
) -> Result<Vec<SpeciesEvaluation>> {
    info!(species = profiles.len(), zones = zones.len(), "evaluating species batch");

    profiles
        .par_iter()
        .map(|profile| {
            let evaluation = evaluate_with(fields, &profile.ranges, zones, params)?;
            Ok(SpeciesEvaluation {
                species: profile.name.clone(),
                evaluation,
            })
        })
        .collect()
}

/// Owned inputs for [`SuitabilityEvaluator`]
#[derive(Debug, Clone, Default)]
pub struct SuitabilityInput {
    pub fields: BTreeMap<String, Raster<f64>>,
    pub ranges: BTreeMap<String, ToleranceRange>,
    pub zones: Vec<Zone>,
}

/// Suitability evaluation as an [`Algorithm`]
#[derive(Debug, Clone, Default)]
pub struct SuitabilityEvaluator;

impl Algorithm for SuitabilityEvaluator {
    type Input = SuitabilityInput;
    type Output = Evaluation;
    type Params = EvaluationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Suitability"
    }

    fn description(&self) -> &'static str {
        "Binary species suitability from tolerance ranges, with suitable area per zone"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        evaluate_with(&input.fields, &input.ranges, &input.zones, &params)
    }
}
