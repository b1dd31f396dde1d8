//! In-memory grid: a masked field with its cell-centre coordinates

use crate::errors::{AirsError, Result};
use crate::mask::{MaskedGrid, MaskedSummary};
use crate::region::{extract_region, sample_bin, BinSample, BoundingBox, EdgePolicy};
use crate::sites::Site;
use ndarray::Array2;

/// Field values with longitude and latitude arrays of the same shape
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub name: String,
    pub longitude: Array2<f64>,
    pub latitude: Array2<f64>,
    pub values: MaskedGrid,
    /// Offset of this grid inside the grid it was extracted from
    pub origin: (usize, usize),
}

impl Grid {
    /// Creates a grid, checking that all three arrays share one shape.
    pub fn new(
        name: impl Into<String>,
        longitude: Array2<f64>,
        latitude: Array2<f64>,
        values: MaskedGrid,
    ) -> Result<Self> {
        let expected = longitude.dim();
        for found in [latitude.dim(), values.dim()] {
            if found != expected {
                return Err(AirsError::ShapeMismatch { expected, found });
            }
        }
        Ok(Self {
            name: name.into(),
            longitude,
            latitude,
            values,
            origin: (0, 0),
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn summary(&self) -> Option<MaskedSummary> {
        self.values.summary()
    }

    /// Sub-grid covering `bbox`; `origin` records its offset in this grid.
    pub fn region(&self, bbox: &BoundingBox, policy: EdgePolicy) -> Result<Grid> {
        let sub = extract_region(
            self.longitude.view(),
            self.latitude.view(),
            self.values.view(),
            bbox,
            policy,
        )?;
        Ok(Grid {
            name: self.name.clone(),
            longitude: sub.longitude,
            latitude: sub.latitude,
            values: MaskedGrid::from(sub.data),
            origin: (self.origin.0 + sub.row_offset, self.origin.1 + sub.col_offset),
        })
    }

    /// Representative cell of a window around a point. The value is `None`
    /// when that cell is masked.
    pub fn sample(
        &self,
        lon: f64,
        lat: f64,
        d_lon: f64,
        d_lat: f64,
    ) -> Result<BinSample<Option<f32>>> {
        sample_bin(
            self.longitude.view(),
            self.latitude.view(),
            self.values.view(),
            lon,
            lat,
            d_lon,
            d_lat,
        )
    }

    pub fn sample_site(
        &self,
        site: &Site,
        d_lon: f64,
        d_lat: f64,
    ) -> Result<BinSample<Option<f32>>> {
        self.sample(site.longitude, site.latitude, d_lon, d_lat)
    }

    /// Coordinate extrema as a box, ignoring non-finite coordinates.
    pub fn extent(&self) -> Option<BoundingBox> {
        let finite = |a: &Array2<f64>| -> Option<(f64, f64)> {
            a.iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(None, |acc, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
        };
        let (lon_min, lon_max) = finite(&self.longitude)?;
        let (lat_min, lat_max) = finite(&self.latitude)?;
        BoundingBox::new(lon_min, lon_max, lat_min, lat_max).ok()
    }
}
