//! Fill-value masking
//!
//! Cells whose raw value matches the field's `_FillValue` become `None`.
//! Statistics on a [`MaskedGrid`] only see the remaining cells.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

/// 2D field with an explicit missing-data marker per cell
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedGrid {
    cells: Array2<Option<f32>>,
}

/// Min/max/mean over the valid cells of a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskedSummary {
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub valid: usize,
    /// Masked cells only
    pub missing: usize,
}

/// Replaces every cell equal to `fill_value` with the missing marker.
///
/// The comparison is on the bit pattern of the stored sentinel, so the value
/// must come from the file's own metadata rather than a typed-in constant.
pub fn mask_fill(data: ArrayView2<f32>, fill_value: f32) -> MaskedGrid {
    let fill_bits = fill_value.to_bits();
    let cells = data.mapv(|v| if v.to_bits() == fill_bits { None } else { Some(v) });
    MaskedGrid { cells }
}

impl MaskedGrid {
    /// Masks `data` if a fill value is known, otherwise keeps every cell.
    pub fn from_raw(data: Array2<f32>, fill_value: Option<f32>) -> Self {
        match fill_value {
            Some(fv) => mask_fill(data.view(), fv),
            None => Self {
                cells: data.mapv(Some),
            },
        }
    }

    pub fn view(&self) -> ArrayView2<'_, Option<f32>> {
        self.cells.view()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value at (row, col); `None` when missing or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.cells.get((row, col)).copied().flatten()
    }

    pub fn is_missing(&self, row: usize, col: usize) -> bool {
        matches!(self.cells.get((row, col)), Some(None))
    }

    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.len() - self.valid_count()
    }

    /// Statistics ignoring missing cells, `None` if nothing is valid.
    ///
    /// Unmasked NaN or infinite values are left out of `valid` but are not
    /// counted as `missing`, which only covers masked cells.
    pub fn summary(&self) -> Option<MaskedSummary> {
        let (min, max, sum, valid) = self
            .cells
            .par_iter()
            .filter_map(|c| *c)
            .filter(|v| v.is_finite())
            .fold(
                || (f32::INFINITY, f32::NEG_INFINITY, 0.0f64, 0usize),
                |(lo, hi, sum, n), v| (lo.min(v), hi.max(v), sum + f64::from(v), n + 1),
            )
            .reduce(
                || (f32::INFINITY, f32::NEG_INFINITY, 0.0f64, 0usize),
                |a, b| (a.0.min(b.0), a.1.max(b.1), a.2 + b.2, a.3 + b.3),
            );

        if valid == 0 {
            return None;
        }

        Some(MaskedSummary {
            min,
            max,
            mean: sum / valid as f64,
            valid,
            missing: self.missing_count(),
        })
    }
}

impl From<Array2<Option<f32>>> for MaskedGrid {
    fn from(cells: Array2<Option<f32>>) -> Self {
        Self { cells }
    }
}

