//! Output naming and directory handling for rendered maps

use crate::errors::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions stripped from granule names before building output names
const GRID_EXTENSIONS: [&str; 4] = ["hdf", "he4", "nc", "h5"];

/// File-system safe stem of an input path: extension removed, dots as underscores.
///
/// `AIRS.2016.01.01.L3.RetStd031.v6.0.31.0.G16034171018.hdf` becomes
/// `AIRS_2016_01_01_L3_RetStd031_v6_0_31_0_G16034171018`.
pub fn root_name(input: &Path) -> String {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match base.rsplit_once('.') {
        Some((stem, ext)) if GRID_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) => {
            stem.to_string()
        }
        _ => base,
    };
    stem.replace('.', "_")
}

/// Creates `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        tracing::debug!("created directory {}", dir.display());
    }
    Ok(())
}

/// `images_dir/<root>/<root>_<field>[_<suffix>].jpg`
pub fn image_path(images_dir: &Path, input: &Path, field: &str, suffix: Option<&str>) -> PathBuf {
    let root = root_name(input);
    let file_name = match suffix {
        Some(suffix) => format!("{}_{}_{}.jpg", root, field, suffix),
        None => format!("{}_{}.jpg", root, field),
    };
    images_dir.join(&root).join(file_name)
}

/// Observation date encoded in an AIRS granule name (`AIRS.YYYY.MM.DD.…`).
pub fn acquisition_date(input: &Path) -> Option<NaiveDate> {
    let name = input.file_name()?.to_str()?;
    let mut parts = name.split('.');
    if parts.next()? != "AIRS" {
        return None;
    }
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Title used on maps: base name plus field, with the date when the name encodes one.
pub fn map_title(input: &Path, field: &str) -> String {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match acquisition_date(input) {
        Some(date) => format!("{} {} ({})", base, field, date.format("%Y-%m-%d")),
        None => format!("{} {}", base, field),
    }
}
