//! AquaSuit CLI - species suitability from environmental rasters

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use aquasuit_algorithms::area::{zones_from_records, CellAreaMode};
use aquasuit_algorithms::preprocess::{
    normalize_depth, normalize_temperature, resample_nearest, stack_mean, DepthConvention,
    TemperatureUnit,
};
use aquasuit_algorithms::statistics::ZoneSummary;
use aquasuit_algorithms::suitability::{
    evaluate_species, evaluate_with, Evaluation, EvaluationParams, SpeciesProfile, ToleranceRange,
};
use aquasuit_core::io::{read_feature_collection, read_geotiff, write_mask_geotiff, zone_records, ZoneFields};
use aquasuit_core::{Raster, Zone, CRS};

const TEMPERATURE: &str = "temperature";
const DEPTH: &str = "depth";

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "aquasuit")]
#[command(author, version, about = "Species suitability from environmental rasters", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Evaluate one species and write its suitability grid
    Evaluate {
        #[command(flatten)]
        inputs: InputArgs,
        /// Temperature tolerance in °C: MIN,MAX (max exclusive)
        #[arg(long, allow_hyphen_values = true)]
        temp_range: Option<String>,
        /// Depth tolerance in metres, negative below sea level: MIN,MAX
        #[arg(long, allow_hyphen_values = true)]
        depth_range: Option<String>,
        /// JSON file holding a single species profile (instead of range flags)
        #[arg(long, conflicts_with_all = ["temp_range", "depth_range"])]
        species: Option<PathBuf>,
        /// Output suitability grid (GeoTIFF, 1 = suitable)
        #[arg(short, long)]
        output: PathBuf,
        /// Write zone summaries as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Evaluate every species of a profile list against the same fields
    Batch {
        #[command(flatten)]
        inputs: InputArgs,
        /// JSON file holding a list of species profiles
        #[arg(long)]
        species: PathBuf,
        /// Directory receiving one suitability grid per species
        #[arg(long)]
        output_dir: PathBuf,
        /// Write all zone summaries as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

/// Environmental fields, zones and unit conventions shared by evaluations
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Sea-surface temperature raster(s); several files are averaged per cell
    #[arg(long, required = true, num_args = 1..)]
    sst: Vec<PathBuf>,
    /// Temperature unit of the SST rasters: celsius, kelvin, fahrenheit
    #[arg(long, default_value = "celsius")]
    temp_unit: String,
    /// Bathymetry raster, resampled onto the SST grid
    #[arg(long)]
    depth: Option<PathBuf>,
    /// Sign convention of the bathymetry: negative-down, positive-down
    #[arg(long, default_value = "negative-down")]
    depth_convention: String,
    /// Zone polygons (GeoJSON FeatureCollection)
    #[arg(long)]
    zones: PathBuf,
    /// Zone property holding the identifier
    #[arg(long, default_value = "id")]
    zone_id: String,
    /// Zone property holding the display name
    #[arg(long, default_value = "name")]
    zone_name: String,
    /// Zone property holding a precomputed area in km² (computed from geometry otherwise)
    #[arg(long)]
    zone_area: Option<String>,
    /// CRS of rasters and zones, e.g. EPSG:4326 (GeoTIFF georeferencing is read without it)
    #[arg(long)]
    crs: Option<String>,
    /// Cell area mode: auto, ellipsoidal, planar
    #[arg(long, default_value = "auto")]
    area_mode: String,
    /// Metres per CRS unit for planar area
    #[arg(long, default_value = "1.0")]
    metres_per_unit: f64,
}

/// A species file holds one profile or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpeciesFile {
    One(SpeciesProfile),
    Many(Vec<SpeciesProfile>),
}

impl SpeciesFile {
    fn into_profiles(self) -> Vec<SpeciesProfile> {
        match self {
            SpeciesFile::One(p) => vec![p],
            SpeciesFile::Many(list) => list,
        }
    }
}

/// Zone summaries of one species, as written to the summary JSON
#[derive(Debug, Serialize)]
struct SpeciesReport<'a> {
    species: &'a str,
    total_suitable_area_km2: f64,
    zones: &'a [ZoneSummary],
}

/// Fields, zones and parameters ready for evaluation
struct Prepared {
    fields: BTreeMap<String, Raster<f64>>,
    zones: Vec<Zone>,
    params: EvaluationParams,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_field(path: &Path, crs: Option<&CRS>) -> Result<Raster<f64>> {
    let pb = spinner(&format!("Reading {}...", path.display()));
    let mut raster: Raster<f64> = read_geotiff(path)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    raster.set_crs(crs.cloned());
    info!("Input: {} ({} x {})", path.display(), raster.cols(), raster.rows());
    Ok(raster)
}

fn write_grid(raster: &Raster<u8>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_mask_geotiff(raster, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_range(s: &str) -> Result<ToleranceRange> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        anyhow::bail!("Range must be 'MIN,MAX', got: {}", s);
    }
    let min: f64 = parts[0].trim().parse().context("Invalid range minimum")?;
    let max: f64 = parts[1].trim().parse().context("Invalid range maximum")?;
    ToleranceRange::new(min, max).with_context(|| format!("Invalid range: {}", s))
}

fn parse_area_mode(s: &str, metres_per_unit: f64) -> Result<CellAreaMode> {
    match s.to_lowercase().as_str() {
        "auto" => Ok(CellAreaMode::Auto),
        "ellipsoidal" | "geodesic" | "wgs84" => Ok(CellAreaMode::Ellipsoidal),
        "planar" | "projected" => Ok(CellAreaMode::Planar { metres_per_unit }),
        _ => anyhow::bail!("Unknown area mode: {}. Use auto, ellipsoidal, or planar.", s),
    }
}

fn read_species(path: &Path) -> Result<Vec<SpeciesProfile>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read species file {}", path.display()))?;
    let file: SpeciesFile = serde_json::from_str(&text)
        .with_context(|| format!("Invalid species file {}", path.display()))?;
    let profiles = file.into_profiles();
    if profiles.is_empty() {
        anyhow::bail!("Species file {} holds no profiles", path.display());
    }
    Ok(profiles)
}

fn profile_from_flags(temp_range: Option<&str>, depth_range: Option<&str>) -> Result<SpeciesProfile> {
    let mut profile = SpeciesProfile::new("species");
    if let Some(r) = temp_range {
        profile = profile.with_range(TEMPERATURE, parse_range(r)?);
    }
    if let Some(r) = depth_range {
        profile = profile.with_range(DEPTH, parse_range(r)?);
    }
    if profile.ranges.is_empty() {
        anyhow::bail!("Give --temp-range and/or --depth-range, or --species");
    }
    Ok(profile)
}

/// File-system safe name for a species grid
fn file_stem(species: &str) -> String {
    species
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// One output path per species, in profile order. Two names that map to the
/// same file stem are an error, so no grid overwrites another.
fn grid_paths(profiles: &[SpeciesProfile], output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut paths = Vec::with_capacity(profiles.len());

    for profile in profiles {
        let stem = file_stem(&profile.name);
        if let Some(first) = seen.insert(stem.clone(), &profile.name) {
            anyhow::bail!(
                "Species '{}' and '{}' would both be written to {}.tif; rename one of them",
                first,
                profile.name,
                stem
            );
        }
        paths.push(output_dir.join(format!("{}.tif", stem)));
    }
    Ok(paths)
}

/// Read, normalise and co-register the environmental fields; load zones.
fn prepare(inputs: &InputArgs) -> Result<Prepared> {
    let crs = inputs.crs.as_deref().map(CRS::parse);
    let temp_unit: TemperatureUnit = inputs.temp_unit.parse().context("Invalid --temp-unit")?;
    let convention: DepthConvention = inputs
        .depth_convention
        .parse()
        .context("Invalid --depth-convention")?;
    let area_mode = parse_area_mode(&inputs.area_mode, inputs.metres_per_unit)?;

    if crs.is_none() && area_mode == CellAreaMode::Auto {
        warn!("No --crs given: cell areas are computed as planar metres");
    }

    let layers = inputs
        .sst
        .iter()
        .map(|p| read_field(p, crs.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let sst = if layers.len() == 1 {
        layers.into_iter().next().context("No SST raster given")?
    } else {
        info!("Averaging {} SST rasters", layers.len());
        stack_mean(&layers).context("Failed to average SST rasters")?
    };
    let sst = normalize_temperature(&sst, temp_unit).context("Failed to normalise temperature")?;

    let mut fields = BTreeMap::new();
    if let Some(path) = &inputs.depth {
        let raw = read_field(path, crs.as_ref())?;
        let depth = resample_nearest(&raw, &sst).context("Failed to resample depth onto SST grid")?;
        let depth = normalize_depth(&depth, convention).context("Failed to normalise depth")?;
        fields.insert(DEPTH.to_string(), depth);
    }
    fields.insert(TEMPERATURE.to_string(), sst);

    let pb = spinner("Reading zones...");
    let collection = read_feature_collection(&inputs.zones)
        .with_context(|| format!("Failed to read zones {}", inputs.zones.display()))?;
    let zone_fields = ZoneFields {
        id: inputs.zone_id.clone(),
        name: inputs.zone_name.clone(),
        area_km2: inputs.zone_area.clone(),
    };
    let records = zone_records(&collection, &zone_fields).context("Failed to read zone attributes")?;
    let zones = zones_from_records(records, area_mode, crs.as_ref());
    pb.finish_and_clear();
    info!("Zones: {}", zones.len());

    Ok(Prepared {
        fields,
        zones,
        params: EvaluationParams { area_mode },
    })
}

fn print_summary(species: &str, evaluation: &Evaluation) {
    println!("\n{}", species);
    println!(
        "  {:<32} {:>14} {:>14} {:>10}",
        "Zone", "Suitable km²", "Total km²", "Suitable %"
    );
    for s in &evaluation.summaries {
        println!(
            "  {:<32} {:>14.2} {:>14.2} {:>10.2}",
            s.name, s.suitable_area_km2, s.total_area_km2, s.percent_suitable
        );
    }
    println!("  Total suitable area: {:.2} km²", evaluation.total_suitable_area_km2());
}

fn write_summary(path: &Path, reports: &[SpeciesReport<'_>]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports).context("Failed to serialise summary")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Summary saved to: {}", path.display());
    Ok(())
}

fn report<'a>(species: &'a str, evaluation: &'a Evaluation) -> SpeciesReport<'a> {
    SpeciesReport {
        species,
        total_suitable_area_km2: evaluation.total_suitable_area_km2(),
        zones: &evaluation.summaries,
    }
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run_info(input: &Path) -> Result<()> {
    let raster = read_field(input, None)?;
    let (rows, cols) = raster.shape();
    let bounds = raster.bounds();
    let stats = raster.statistics();
    let tf = raster.transform();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Cell size: {} x {}", tf.pixel_width, tf.pixel_height.abs());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(nodata) = raster.nodata() {
        println!("NoData: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    println!(
        "  Valid cells: {} ({:.1}%)",
        stats.valid_count,
        100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
    );
    Ok(())
}

fn run_evaluate(
    inputs: &InputArgs,
    profile: &SpeciesProfile,
    output: &Path,
    summary: Option<&Path>,
) -> Result<Evaluation> {
    let prepared = prepare(inputs)?;

    let start = Instant::now();
    let evaluation = evaluate_with(&prepared.fields, &profile.ranges, &prepared.zones, &prepared.params)
        .with_context(|| format!("Failed to evaluate {}", profile.name))?;
    let elapsed = start.elapsed();

    write_grid(&evaluation.grid, output)?;
    print_summary(&profile.name, &evaluation);
    if let Some(path) = summary {
        write_summary(path, &[report(&profile.name, &evaluation)])?;
    }
    done("Suitability grid", output, elapsed);
    Ok(evaluation)
}

fn run_batch(
    inputs: &InputArgs,
    profiles: &[SpeciesProfile],
    output_dir: &Path,
    summary: Option<&Path>,
) -> Result<()> {
    let paths = grid_paths(profiles, output_dir)?;
    let prepared = prepare(inputs)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let start = Instant::now();
    let results = evaluate_species(&prepared.fields, profiles, &prepared.zones, &prepared.params)
        .context("Failed to evaluate species batch")?;
    let elapsed = start.elapsed();

    for (r, path) in results.iter().zip(&paths) {
        write_grid(&r.evaluation.grid, path)?;
        print_summary(&r.species, &r.evaluation);
    }
    if let Some(path) = summary {
        let reports: Vec<_> = results.iter().map(|r| report(&r.species, &r.evaluation)).collect();
        write_summary(path, &reports)?;
    }
    done(&format!("{} suitability grids", results.len()), output_dir, elapsed);
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => run_info(&input)?,

        Commands::Evaluate {
            inputs,
            temp_range,
            depth_range,
            species,
            output,
            summary,
        } => {
            let profile = match species {
                Some(path) => {
                    let mut profiles = read_species(&path)?;
                    if profiles.len() > 1 {
                        anyhow::bail!(
                            "{} holds {} profiles; use `aquasuit batch` for several species",
                            path.display(),
                            profiles.len()
                        );
                    }
                    profiles.remove(0)
                }
                None => profile_from_flags(temp_range.as_deref(), depth_range.as_deref())?,
            };
            run_evaluate(&inputs, &profile, &output, summary.as_deref())?;
        }

        Commands::Batch {
            inputs,
            species,
            output_dir,
            summary,
        } => {
            let profiles = read_species(&species)?;
            run_batch(&inputs, &profiles, &output_dir, summary.as_deref())?;
        }
    }

    Ok(())
}
