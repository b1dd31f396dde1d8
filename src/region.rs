//! Geographic subselection over a 2D latitude/longitude grid
//!
//! Both operations build an inclusive lon/lat predicate over the coordinate
//! arrays and take the row and column index extrema of the selected cells
//! independently. The result is an axis-aligned index rectangle, not a tight
//! polygon: on irregular grids it may contain cells that failed the predicate.

use crate::errors::{AirsError, Result};
use ndarray::{s, Array2, ArrayView2};
use std::fmt;

/// Longitude/latitude box, inclusive on both sides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    /// Whole globe in the -180..180 longitude convention
    pub const WORLD: BoundingBox = BoundingBox {
        lon_min: -180.0,
        lon_max: 180.0,
        lat_min: -90.0,
        lat_max: 90.0,
    };

    /// Builds a box, rejecting non-finite bounds and `min > max` on either axis.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Result<Self> {
        let bounds = [lon_min, lon_max, lat_min, lat_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(AirsError::InvalidArgument {
                message: format!("bounding box bounds must be finite, got {:?}", bounds),
            });
        }
        if lon_min > lon_max {
            return Err(AirsError::InvalidArgument {
                message: format!("longitude min {} exceeds max {}", lon_min, lon_max),
            });
        }
        if lat_min > lat_max {
            return Err(AirsError::InvalidArgument {
                message: format!("latitude min {} exceeds max {}", lat_min, lat_max),
            });
        }
        Ok(Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    /// Window of width `d_lon` x `d_lat` centred on a point.
    pub fn around(lon: f64, lat: f64, d_lon: f64, d_lat: f64) -> Result<Self> {
        if !(d_lon.is_finite() && d_lon > 0.0 && d_lat.is_finite() && d_lat > 0.0) {
            return Err(AirsError::InvalidArgument {
                message: format!(
                    "bin window must be positive, got d_lon={}, d_lat={}",
                    d_lon, d_lat
                ),
            });
        }
        Self::new(
            lon - d_lon / 2.0,
            lon + d_lon / 2.0,
            lat - d_lat / 2.0,
            lat + d_lat / 2.0,
        )
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }

    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon [{}, {}] x lat [{}, {}]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

/// How the upper edge of the selected index rectangle is sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Half-open `[min, max)` slice. The last selected row and column are
    /// dropped even though they satisfy the box. Re-extracting a result with
    /// its own coordinate extrema loses one more row and column each time.
    #[default]
    TrimUpper,
    /// Closed `[min, max]` slice. Re-extraction with the result's own
    /// extrema returns the same sub-grid.
    Inclusive,
}

/// Rectangular slice of a parent grid plus where it sits in the parent
#[derive(Debug, Clone, PartialEq)]
pub struct SubGrid<A> {
    pub row_offset: usize,
    pub col_offset: usize,
    pub longitude: Array2<f64>,
    pub latitude: Array2<f64>,
    pub data: Array2<A>,
}

impl<A> SubGrid<A> {
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// True when the trimmed slice has no cells (single selected row or column).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Representative cell of a sampling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSample<A> {
    pub col: usize,
    pub row: usize,
    pub value: A,
}

/// Index extrema of a selection, all bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexRect {
    row_min: usize,
    row_max: usize,
    col_min: usize,
    col_max: usize,
}

fn check_shapes<A>(
    longitude: &ArrayView2<f64>,
    latitude: &ArrayView2<f64>,
    data: &ArrayView2<A>,
) -> Result<()> {
    let expected = longitude.dim();
    for found in [latitude.dim(), data.dim()] {
        if found != expected {
            return Err(AirsError::ShapeMismatch { expected, found });
        }
    }
    Ok(())
}

fn selection_extent(
    longitude: &ArrayView2<f64>,
    latitude: &ArrayView2<f64>,
    bbox: &BoundingBox,
) -> Option<IndexRect> {
    let mut rect: Option<IndexRect> = None;
    for ((row, col), &lon) in longitude.indexed_iter() {
        if !bbox.contains(lon, latitude[[row, col]]) {
            continue;
        }
        rect = Some(match rect {
            None => IndexRect {
                row_min: row,
                row_max: row,
                col_min: col,
                col_max: col,
            },
            Some(r) => IndexRect {
                row_min: r.row_min.min(row),
                row_max: r.row_max.max(row),
                col_min: r.col_min.min(col),
                col_max: r.col_max.max(col),
            },
        });
    }
    rect
}

/// Returns the minimal index rectangle covering every cell inside `bbox`.
///
/// With [`EdgePolicy::TrimUpper`] the slice is `[min, max)` on both axes.
///
/// # Errors
///
/// - [`AirsError::ShapeMismatch`] if the three arrays differ in shape
/// - [`AirsError::EmptySelection`] if no cell lies inside the box
pub fn extract_region<A: Clone>(
    longitude: ArrayView2<f64>,
    latitude: ArrayView2<f64>,
    data: ArrayView2<A>,
    bbox: &BoundingBox,
    policy: EdgePolicy,
) -> Result<SubGrid<A>> {
    check_shapes(&longitude, &latitude, &data)?;

    let rect = selection_extent(&longitude, &latitude, bbox).ok_or_else(|| {
        AirsError::EmptySelection {
            what: format!("bounding box {}", bbox),
        }
    })?;

    let (row_end, col_end) = match policy {
        EdgePolicy::TrimUpper => (rect.row_max, rect.col_max),
        EdgePolicy::Inclusive => (rect.row_max + 1, rect.col_max + 1),
    };
    let window = s![rect.row_min..row_end, rect.col_min..col_end];

    tracing::debug!(
        rows = row_end - rect.row_min,
        cols = col_end - rect.col_min,
        row_offset = rect.row_min,
        col_offset = rect.col_min,
        "extracted region {}",
        bbox
    );

    Ok(SubGrid {
        row_offset: rect.row_min,
        col_offset: rect.col_min,
        longitude: longitude.slice(window).to_owned(),
        latitude: latitude.slice(window).to_owned(),
        data: data.slice(window).to_owned(),
    })
}

/// Samples the cell representing a `d_lon` x `d_lat` window centred on a point.
///
/// The window selects cells exactly like [`extract_region`]; the returned
/// value is the top-left cell of the resulting rectangle, not an average and
/// not the closest cell. The window width, not the grid resolution, bounds
/// the precision of the sample.
///
/// # Errors
///
/// - [`AirsError::InvalidArgument`] for a non-positive or non-finite window
/// - [`AirsError::ShapeMismatch`] if the three arrays differ in shape
/// - [`AirsError::EmptySelection`] if the window contains no cell centre
pub fn sample_bin<A: Clone>(
    longitude: ArrayView2<f64>,
    latitude: ArrayView2<f64>,
    data: ArrayView2<A>,
    target_lon: f64,
    target_lat: f64,
    d_lon: f64,
    d_lat: f64,
) -> Result<BinSample<A>> {
    check_shapes(&longitude, &latitude, &data)?;
    let window = BoundingBox::around(target_lon, target_lat, d_lon, d_lat)?;

    let rect = selection_extent(&longitude, &latitude, &window).ok_or_else(|| {
        AirsError::EmptySelection {
            what: format!(
                "bin window of {}x{} degrees around ({}, {})",
                d_lon, d_lat, target_lon, target_lat
            ),
        }
    })?;

    Ok(BinSample {
        col: rect.col_min,
        row: rect.row_min,
        value: data[[rect.row_min, rect.col_min]].clone(),
    })
}
