//! airs_l3_maps: AIRS Level-3 grid access, regional extraction and map rendering
//!
//! Reads gridded atmospheric columns (total water vapour, total ozone) from
//! AIRS Level-3 granules, masks fill values, extracts geographic subregions,
//! samples the grid near named observatory sites and renders pseudocolour
//! world or regional maps.
//!
//! ## Module Organization
//!
//! - [`loader`]: locating input files, reading fields, coordinates and fill values
//! - [`mask`]: fill-value masking and statistics over valid cells
//! - [`region`]: bounding-box extraction and bin sampling over a lat/lon grid
//! - [`grid`]: the in-memory grid tying values to coordinates
//! - [`sites`]: table of observatory locations
//! - [`render`]: map rendering and image output
//! - [`coastline`]: coastline overlays from shapefiles
//! - [`output`]: output directory and file naming
//! - [`errors`]: centralized error handling
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use airs_l3_maps::prelude::*;
//! use std::path::Path;
//!
//! let file = open_grid_file(Path::new("AIRS.2016.01.01.L3.RetStd031.v6.0.31.0.G16034171018.hdf")).unwrap();
//! let grid = load_grid(&file, &LoadOptions::new("TotO3_D")).unwrap();
//!
//! // South America
//! let bbox = BoundingBox::new(-100.0, -30.0, -55.0, 15.0).unwrap();
//! let region = grid.region(&bbox, EdgePolicy::TrimUpper).unwrap();
//!
//! let site = observatory_location("ctio").unwrap();
//! let sample = grid.sample_site(site, 1.0, 1.0).unwrap();
//! println!("row={} col={} value={:?}", sample.row, sample.col, sample.value);
//! # let _ = region;
//! ```

pub mod cli;
pub mod coastline;
pub mod errors;
pub mod grid;
pub mod loader;
pub mod mask;
pub mod output;
pub mod region;
pub mod render;
pub mod sites;

pub use errors::*;
pub use grid::Grid;
pub use mask::{mask_fill, MaskedGrid, MaskedSummary};
pub use region::{extract_region, sample_bin, BinSample, BoundingBox, EdgePolicy, SubGrid};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::coastline::Coastline;
    pub use crate::errors::{AirsError, Result};
    pub use crate::grid::Grid;
    pub use crate::loader::{load_grid, open_grid_file, resolve_input_path, LoadOptions};
    pub use crate::mask::{mask_fill, MaskedGrid};
    pub use crate::region::{extract_region, sample_bin, BoundingBox, EdgePolicy};
    pub use crate::render::{render, render_grid, render_to_file, Basemap, RenderOptions};
    pub use crate::sites::{observatory_location, Site, SITES};
}
