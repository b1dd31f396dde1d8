//! World coastline polylines for map overlays.
//!
//! Reads GSHHS or Natural Earth coastline shapefiles. Polyline parts and
//! polygon rings are both kept as plain lon/lat vertex lists.

use crate::errors::Result;
use crate::region::BoundingBox;
use shapefile::Shape;
use std::path::Path;

/// Margin in degrees around the requested bounds when filtering lines
const BOUNDS_MARGIN: f64 = 1.0;

/// Coastline vertex lists in (longitude, latitude) degrees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coastline {
    lines: Vec<Vec<(f64, f64)>>,
}

impl Coastline {
    /// Loads every line touching `bounds` from a shapefile (.shp).
    pub fn load<P: AsRef<Path>>(path: P, bounds: &BoundingBox) -> Result<Self> {
        let shapes = shapefile::read_shapes(path.as_ref())?;
        let mut lines = Vec::new();

        for shape in shapes {
            match shape {
                Shape::Polyline(polyline) => {
                    for part in polyline.parts() {
                        lines.push(part.iter().map(|p| (p.x, p.y)).collect());
                    }
                }
                Shape::Polygon(polygon) => {
                    for ring in polygon.rings() {
                        lines.push(ring.points().iter().map(|p| (p.x, p.y)).collect());
                    }
                }
                _ => {}
            }
        }

        let coastline = Self::from_lines(lines).clipped_to(bounds);
        tracing::info!(
            lines = coastline.len(),
            "loaded coastline from {}",
            path.as_ref().display()
        );
        Ok(coastline)
    }

    pub fn from_lines(lines: Vec<Vec<(f64, f64)>>) -> Self {
        Self {
            lines: lines.into_iter().filter(|l| l.len() >= 2).collect(),
        }
    }

    /// Drops lines with no vertex near `bounds`.
    pub fn clipped_to(self, bounds: &BoundingBox) -> Self {
        let lines = self
            .lines
            .into_iter()
            .filter(|line| line.iter().any(|&(lon, lat)| near(bounds, lon, lat)))
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[Vec<(f64, f64)>] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn near(bounds: &BoundingBox, lon: f64, lat: f64) -> bool {
    lon >= bounds.lon_min - BOUNDS_MARGIN
        && lon <= bounds.lon_max + BOUNDS_MARGIN
        && lat >= bounds.lat_min - BOUNDS_MARGIN
        && lat <= bounds.lat_max + BOUNDS_MARGIN
}
