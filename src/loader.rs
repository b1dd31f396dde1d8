//! Grid file access: locating the input, reading fields and coordinates
//!
//! Files are opened through the NetCDF library, which also reads HDF5 and,
//! when libnetcdf is built with HDF4 support, the HDF-EOS granules AIRS
//! Level-3 products ship as.

use crate::errors::{AirsError, Result};
use crate::grid::Grid;
use crate::mask::MaskedGrid;
use ndarray::{Array1, Array2};
use netcdf::{AttributeValue, File, Variable};
use std::path::{Path, PathBuf};

/// Environment variable naming the directory searched for input files
pub const DATA_DIR_ENV: &str = "HDFEOS_ZOO_DIR";

/// Which arrays to read from a grid file
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub field: String,
    pub longitude: String,
    pub latitude: String,
    /// Index into the leading axis of a 3D field
    pub level: Option<usize>,
}

impl LoadOptions {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            field: "TotH2OVap_D".to_string(),
            longitude: "Longitude".to_string(),
            latitude: "Latitude".to_string(),
            level: None,
        }
    }
}

/// Finds the input file.
///
/// A path that exists as given wins. Otherwise the name is looked up under
/// `data_dir` when one is configured. Without a data dir the name is only
/// tried relative to the working directory.
pub fn resolve_input_path(file: &Path, data_dir: Option<&Path>) -> Result<PathBuf> {
    if file.exists() {
        return Ok(file.to_path_buf());
    }
    let mut searched = vec![file.to_path_buf()];

    if let Some(dir) = data_dir {
        let candidate = dir.join(file);
        if candidate.exists() {
            tracing::debug!("resolved {} under data dir {}", file.display(), dir.display());
            return Ok(candidate);
        }
        searched.push(candidate);
    }

    Err(AirsError::FileNotFound {
        path: file.to_path_buf(),
        searched,
    })
}

/// Opens a grid file for reading.
pub fn open_grid_file(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(AirsError::FileNotFound {
            path: path.to_path_buf(),
            searched: vec![path.to_path_buf()],
        });
    }
    let file = netcdf::open(path)?;
    tracing::info!("opened grid file {}", path.display());
    Ok(file)
}

fn variable<'f>(file: &'f File, name: &str) -> Result<Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| AirsError::VariableNotFound {
            var: name.to_string(),
        })
}

/// Reads the `_FillValue` attribute of a variable as stored.
pub fn read_fill_value(var: &Variable) -> Option<f32> {
    let attr = var.attribute("_FillValue")?;
    match attr.value().ok()? {
        AttributeValue::Float(v) => Some(v),
        AttributeValue::Double(v) => Some(v as f32),
        AttributeValue::Short(v) => Some(f32::from(v)),
        AttributeValue::Ushort(v) => Some(f32::from(v)),
        AttributeValue::Int(v) => Some(v as f32),
        AttributeValue::Uint(v) => Some(v as f32),
        AttributeValue::Uchar(v) => Some(f32::from(v)),
        AttributeValue::Schar(v) => Some(f32::from(v)),
        _ => None,
    }
}

fn shape_of(var: &Variable) -> Vec<usize> {
    var.dimensions().iter().map(netcdf::Dimension::len).collect()
}

/// Reads a 2D field, or one level of a 3D field.
pub fn read_field(file: &File, name: &str, level: Option<usize>) -> Result<Array2<f32>> {
    let var = variable(file, name)?;
    let shape = shape_of(&var);

    match (shape.as_slice(), level) {
        (&[rows, cols], level) => {
            if level.is_some() {
                tracing::warn!("field '{}' is 2D, ignoring level", name);
            }
            let values = var.get_values::<f32, _>(..)?;
            Ok(Array2::from_shape_vec((rows, cols), values)?)
        }
        (&[levels, rows, cols], Some(level)) => {
            if level >= levels {
                return Err(AirsError::InvalidShape {
                    var: name.to_string(),
                    message: format!("level {} out of range (field has {} levels)", level, levels),
                });
            }
            let values = var.get_values::<f32, _>((level..level + 1, 0..rows, 0..cols))?;
            Ok(Array2::from_shape_vec((rows, cols), values)?)
        }
        (&[levels, _, _], None) => Err(AirsError::InvalidShape {
            var: name.to_string(),
            message: format!("3D field with {} levels needs a level index", levels),
        }),
        (other, _) => Err(AirsError::InvalidShape {
            var: name.to_string(),
            message: format!("expected 2 or 3 dimensions, found {:?}", other),
        }),
    }
}

/// Reads longitude and latitude as two arrays of identical shape.
///
/// 2D coordinate arrays are returned as stored. 1D coordinate vectors are
/// expanded to a (latitude, longitude) mesh.
pub fn read_coordinates(
    file: &File,
    lon_name: &str,
    lat_name: &str,
) -> Result<(Array2<f64>, Array2<f64>)> {
    let lon_var = variable(file, lon_name)?;
    let lat_var = variable(file, lat_name)?;
    let lon_shape = shape_of(&lon_var);
    let lat_shape = shape_of(&lat_var);

    match (lon_shape.as_slice(), lat_shape.as_slice()) {
        (&[rows, cols], &[lat_rows, lat_cols]) => {
            let longitude =
                Array2::from_shape_vec((rows, cols), lon_var.get_values::<f64, _>(..)?)?;
            let latitude =
                Array2::from_shape_vec((lat_rows, lat_cols), lat_var.get_values::<f64, _>(..)?)?;
            if latitude.dim() != longitude.dim() {
                return Err(AirsError::ShapeMismatch {
                    expected: longitude.dim(),
                    found: latitude.dim(),
                });
            }
            Ok((longitude, latitude))
        }
        (&[_], &[_]) => {
            let lon = Array1::from(lon_var.get_values::<f64, _>(..)?);
            let lat = Array1::from(lat_var.get_values::<f64, _>(..)?);
            Ok(meshgrid(&lon, &lat))
        }
        _ => Err(AirsError::InvalidShape {
            var: format!("{}/{}", lon_name, lat_name),
            message: format!(
                "coordinates must both be 1D or both 2D, found {:?} and {:?}",
                lon_shape, lat_shape
            ),
        }),
    }
}

/// Expands coordinate vectors into (rows = latitude, cols = longitude) arrays.
pub fn meshgrid(lon: &Array1<f64>, lat: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let dim = (lat.len(), lon.len());
    let longitude = Array2::from_shape_fn(dim, |(_, c)| lon[c]);
    let latitude = Array2::from_shape_fn(dim, |(r, _)| lat[r]);
    (longitude, latitude)
}

/// Reads a field with its coordinates and masks it with the field's own fill value.
pub fn load_grid(file: &File, options: &LoadOptions) -> Result<Grid> {
    let var = variable(file, &options.field)?;
    let fill_value = read_fill_value(&var);
    let data = read_field(file, &options.field, options.level)?;
    let (longitude, latitude) = read_coordinates(file, &options.longitude, &options.latitude)?;

    if fill_value.is_none() {
        tracing::warn!("field '{}' has no _FillValue, no cells masked", options.field);
    }

    let values = MaskedGrid::from_raw(data, fill_value);
    let (rows, cols) = values.dim();
    tracing::info!(
        field = %options.field,
        rows,
        cols,
        missing = values.missing_count(),
        "loaded grid"
    );

    Grid::new(options.field.clone(), longitude, latitude, values)
}

/// Lists every variable with its shape, units and fill value.
pub fn list_fields(file: &File) -> Result<()> {
    println!("\n Fields");
    println!("==========");

    let mut variables: Vec<_> = file.variables().collect();
    variables.sort_by(|a, b| a.name().cmp(&b.name()));

    if variables.is_empty() {
        println!("   (No fields found)");
        return Ok(());
    }

    for var in variables {
        let data_type = format!("{:?}", var.vartype()).to_lowercase();
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| format!("{}={}", d.name(), d.len()))
            .collect();

        if dims.is_empty() {
            println!("    {} ({}): scalar", var.name(), data_type);
        } else {
            println!("    {} ({}): [{}]", var.name(), data_type, dims.join(", "));
        }

        let mut key_attrs = Vec::new();
        if let Some(Ok(AttributeValue::Str(units))) = var.attribute("units").map(|a| a.value()) {
            key_attrs.push(format!("units: {}", units));
        }
        if let Some(fv) = read_fill_value(&var) {
            key_attrs.push(format!("_FillValue: {}", fv));
        }
        if !key_attrs.is_empty() {
            println!("      - {}", key_attrs.join(", "));
        }
    }

    Ok(())
}
