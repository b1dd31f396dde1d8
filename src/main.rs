//! Entry point for the airs_l3_maps application.
//! Resolves the input granule, loads one field, renders the world and region
//! maps and prints site samples.

use airs_l3_maps::cli::Args;
use airs_l3_maps::coastline::Coastline;
use airs_l3_maps::errors::{AirsError, Result};
use airs_l3_maps::grid::Grid;
use airs_l3_maps::loader::{list_fields, load_grid, open_grid_file, resolve_input_path, LoadOptions};
use airs_l3_maps::output::{image_path, map_title};
use airs_l3_maps::region::{BoundingBox, EdgePolicy};
use airs_l3_maps::render::{render_to_file, Basemap, RenderOptions};
use airs_l3_maps::sites::{observatory_location, print_sites};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_region_summary(grid: &Grid, bbox: &BoundingBox, unit: &str) {
    let (rows, cols) = grid.dim();
    println!("\n Region {}", bbox);
    println!("==============================");
    println!(" Offset in parent grid: row {}, col {}", grid.origin.0, grid.origin.1);
    println!(" Shape: ({} × {})", rows, cols);
    if let Some(extent) = grid.extent() {
        println!(" Cell centres: {}", extent);
    }
    match grid.summary() {
        Some(s) => {
            println!("    Min: {:.2} {}", s.min, unit);
            println!("    Max: {:.2} {}", s.max, unit);
            println!("    Mean: {:.2} {}", s.mean, unit);
            println!("    Valid cells: {} / {} ({} masked)", s.valid, rows * cols, s.missing);
        }
        None => println!("\n⚠ No valid data in region"),
    }
}

fn print_sample(
    label: &str,
    grid: &Grid,
    lon: f64,
    lat: f64,
    bin: (f64, f64),
    unit: &str,
) -> Result<()> {
    let sample = grid.sample(lon, lat, bin.0, bin.1)?;
    let value = sample
        .value
        .map(|v| format!("{:.4} {}", v, unit))
        .unwrap_or_else(|| "missing".to_string());
    println!(
        "    {:<10} row={:<4} col={:<4} value={}",
        label, sample.row, sample.col, value
    );
    Ok(())
}

fn run(args: Args) -> Result<()> {
    if args.list_sites {
        print_sites();
        return Ok(());
    }

    let Some(input) = args.file.as_deref() else {
        return Err(AirsError::InvalidArgument {
            message: "no input file given".to_string(),
        });
    };
    let path = resolve_input_path(input, args.data_dir.as_deref())?;
    let file = open_grid_file(&path)?;

    if args.list_fields {
        return list_fields(&file);
    }

    let options = LoadOptions {
        field: args.field.clone(),
        longitude: args.longitude.clone(),
        latitude: args.latitude.clone(),
        level: args.level,
    };
    let grid = load_grid(&file, &options)?;
    let title = map_title(&path, &args.field);

    if !args.no_world_map {
        let mut basemap = Basemap::world();
        if let Some(coastline_path) = &args.coastline {
            let coastline = Coastline::load(coastline_path, &basemap.bounds)?;
            basemap = basemap.with_coastline(coastline);
        }
        let world = RenderOptions {
            width: 1000,
            height: 560,
            colorbar_label: args.unit.clone(),
            title: title.clone(),
            basemap: Some(basemap),
            font_path: args.font.clone(),
            ..RenderOptions::default()
        };
        let out = image_path(&args.images_dir, &path, &args.field, None);
        render_to_file(&grid, &world, &out)?;
        println!("✅ Saved world map to {}", out.display());
    }

    if let Some(bbox) = &args.region {
        let policy = if args.inclusive_edges {
            EdgePolicy::Inclusive
        } else {
            EdgePolicy::TrimUpper
        };
        let region = grid.region(bbox, policy)?;
        print_region_summary(&region, bbox, &args.unit);

        if region.values.is_empty() {
            println!("⚠ Region slice is empty after edge trimming, no map written");
        } else {
            let regional = RenderOptions {
                width: 700,
                height: 700,
                colorbar_label: args.unit.clone(),
                title: title.clone(),
                font_path: args.font.clone(),
                ..RenderOptions::default()
            };
            let out = image_path(&args.images_dir, &path, &args.field, Some("region"));
            render_to_file(&region, &regional, &out)?;
            println!("✅ Saved region map to {}", out.display());
        }
    }

    if !args.sites.is_empty() || !args.points.is_empty() {
        println!("\n Samples ({}x{} degree window)", args.bin_size.0, args.bin_size.1);
        println!("==============================");
    }
    for name in &args.sites {
        let site = observatory_location(name)?;
        print_sample(site.name, &grid, site.longitude, site.latitude, args.bin_size, &args.unit)?;
    }
    for &(lon, lat) in &args.points {
        let label = format!("{}:{}", lon, lat);
        print_sample(&label, &grid, lon, lat, args.bin_size, &args.unit)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let input = args
        .file
        .as_ref()
        .map(|f| f.display().to_string())
        .unwrap_or_default();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(file = %input, "{}", e);
            ExitCode::FAILURE
        }
    }
}
