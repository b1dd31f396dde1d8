use airs_l3_maps::errors::AirsError;
use airs_l3_maps::loader::{
    list_fields, load_grid, open_grid_file, read_coordinates, read_field, read_fill_value,
    LoadOptions,
};
use airs_l3_maps::region::{BoundingBox, EdgePolicy};
use airs_l3_maps::sites::observatory_location;
use ndarray::{Array1, Array2, Array3};
use netcdf::create;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const FILL: f32 = -9999.0;
const ROWS: usize = 18;
const COLS: usize = 36;

/// Writes a 10 degree grid laid out like an AIRS Level-3 granule.
///
/// Latitude runs from 85 down to -85 along rows, longitude from -175 to 175
/// along columns. `TotO3_D` holds `100 * row + col` with two fill cells.
fn write_airs_like_grid(dir: &TempDir) -> PathBuf {
    let file_path = dir.path().join("AIRS.2016.01.01.L3.RetStd031.v6.0.31.0.G16034171018.nc");

    let mut file = create(&file_path).expect("Failed to create NetCDF file");
    file.add_dimension("YDim", ROWS).expect("Failed to add YDim");
    file.add_dimension("XDim", COLS).expect("Failed to add XDim");
    file.add_dimension("H2OPrsLvls", 3).expect("Failed to add levels");

    {
        let mut lat_var = file
            .add_variable::<f64>("Latitude", &["YDim", "XDim"])
            .expect("Failed to add Latitude");
        lat_var.put_attribute("units", "degrees_north").unwrap();
        let lat = Array2::from_shape_fn((ROWS, COLS), |(r, _)| 85.0 - 10.0 * r as f64);
        lat_var.put(lat.view(), ..).expect("Failed to write Latitude");
    }

    {
        let mut lon_var = file
            .add_variable::<f64>("Longitude", &["YDim", "XDim"])
            .expect("Failed to add Longitude");
        lon_var.put_attribute("units", "degrees_east").unwrap();
        let lon = Array2::from_shape_fn((ROWS, COLS), |(_, c)| -175.0 + 10.0 * c as f64);
        lon_var.put(lon.view(), ..).expect("Failed to write Longitude");
    }

    {
        let mut o3_var = file
            .add_variable::<f32>("TotO3_D", &["YDim", "XDim"])
            .expect("Failed to add TotO3_D");
        o3_var.put_attribute("units", "DU").unwrap();
        o3_var.put_attribute("_FillValue", FILL).unwrap();
        let mut o3 = Array2::from_shape_fn((ROWS, COLS), |(r, c)| (100 * r + c) as f32);
        o3[[0, 0]] = FILL;
        o3[[12, 10]] = FILL;
        o3_var.put(o3.view(), ..).expect("Failed to write TotO3_D");
    }

    {
        let mut h2o_var = file
            .add_variable::<f32>("H2O_MMR_D", &["H2OPrsLvls", "YDim", "XDim"])
            .expect("Failed to add H2O_MMR_D");
        h2o_var.put_attribute("_FillValue", FILL).unwrap();
        let h2o = Array3::from_shape_fn((3, ROWS, COLS), |(l, r, c)| {
            (1000 * l + 100 * r + c) as f32
        });
        h2o_var.put(h2o.view(), ..).expect("Failed to write H2O_MMR_D");
    }

    {
        let mut flat_var = file
            .add_variable::<f32>("NoFill_D", &["YDim", "XDim"])
            .expect("Failed to add NoFill_D");
        let flat = Array2::from_elem((ROWS, COLS), FILL);
        flat_var.put(flat.view(), ..).expect("Failed to write NoFill_D");
    }

    file_path
}

/// Writes a CF-style grid with 1D lat/lon coordinate vectors.
fn write_cf_grid(dir: &TempDir) -> PathBuf {
    let file_path = dir.path().join("cf_grid.nc");

    let mut file = create(&file_path).expect("Failed to create NetCDF file");
    file.add_dimension("lat", 3).expect("Failed to add lat");
    file.add_dimension("lon", 4).expect("Failed to add lon");

    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        lat_var
            .put(Array1::from(vec![-10.0, 0.0, 10.0]).view(), ..)
            .unwrap();
    }
    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"]).unwrap();
        lon_var
            .put(Array1::from(vec![0.0, 10.0, 20.0, 30.0]).view(), ..)
            .unwrap();
    }
    {
        let mut var = file.add_variable::<f32>("tco", &["lat", "lon"]).unwrap();
        var.put_attribute("_FillValue", -1.0f32).unwrap();
        let mut data = Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as f32);
        data[[2, 3]] = -1.0;
        var.put(data.view(), ..).unwrap();
    }

    file_path
}

#[test]
fn test_load_grid_masks_fill_values() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_airs_like_grid(&temp_dir);
    let file = open_grid_file(&path).expect("Failed to open grid file");

    let grid = load_grid(&file, &LoadOptions::new("TotO3_D")).expect("Failed to load grid");

    assert_eq!(grid.name, "TotO3_D");
    assert_eq!(grid.dim(), (ROWS, COLS));
    assert_eq!(grid.origin, (0, 0));
    assert_eq!(grid.values.missing_count(), 2);
    assert_eq!(grid.values.get(0, 0), None);
    assert_eq!(grid.values.get(12, 10), None);
    assert_eq!(grid.values.get(3, 4), Some(304.0));
    assert_eq!(grid.longitude[[5, 0]], -175.0);
    assert_eq!(grid.latitude[[5, 0]], 35.0);

    let summary = grid.summary().expect("Grid has valid cells");
    assert_eq!(summary.min, 1.0);
    assert_eq!(summary.max, (100 * (ROWS - 1) + COLS - 1) as f32);
    assert_eq!(summary.valid, ROWS * COLS - 2);
}

#[test]
fn test_field_without_fill_value_is_unmasked() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_airs_like_grid(&temp_dir);
    let file = open_grid_file(&path).unwrap();

    let var = file.variable("NoFill_D").unwrap();
    assert_eq!(read_fill_value(&var), None);
    assert_eq!(read_fill_value(&file.variable("TotO3_D").unwrap()), Some(FILL));

    let grid = load_grid(&file, &LoadOptions::new("NoFill_D")).unwrap();
    assert_eq!(grid.values.missing_count(), 0);
    assert_eq!(grid.values.get(0, 0), Some(FILL));
}

#[test]
fn test_region_and_site_sample_from_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_airs_like_grid(&temp_dir);
    let file = open_grid_file(&path).unwrap();
    let grid = load_grid(&file, &LoadOptions::new("TotO3_D")).unwrap();

    // South America
    let bbox = BoundingBox::new(-100.0, -30.0, -55.0, 15.0).unwrap();
    let region = grid.region(&bbox, EdgePolicy::Inclusive).unwrap();

    // lon -95..-35 is cols 8..=14, lat 15..-55 is rows 7..=14
    assert_eq!(region.origin, (7, 8));
    assert_eq!(region.dim(), (8, 7));
    assert_eq!(region.values.get(5, 2), None);
    assert_eq!(region.values.get(0, 0), Some(708.0));
    assert!(region
        .longitude
        .iter()
        .all(|&lon| (-100.0..=-30.0).contains(&lon)));
    assert!(region.latitude.iter().all(|&lat| (-55.0..=15.0).contains(&lat)));

    let trimmed = grid.region(&bbox, EdgePolicy::TrimUpper).unwrap();
    assert_eq!(trimmed.dim(), (7, 6));
    assert_eq!(trimmed.origin, (7, 8));

    // A 10 degree window around ctio holds the single cell centred at (-75, -35),
    // which is a fill cell
    let ctio = observatory_location("ctio").unwrap();
    let sample = grid.sample_site(ctio, 10.0, 10.0).unwrap();
    assert_eq!((sample.row, sample.col), (12, 10));
    assert_eq!(sample.value, None);

    let valid = grid.sample(-65.0, -25.0, 2.0, 2.0).unwrap();
    assert_eq!((valid.row, valid.col), (11, 11));
    assert_eq!(valid.value, Some(1111.0));
}

#[test]
fn test_read_field_levels() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_airs_like_grid(&temp_dir);
    let file = open_grid_file(&path).unwrap();

    let level = read_field(&file, "H2O_MMR_D", Some(2)).expect("Failed to read level 2");
    assert_eq!(level.dim(), (ROWS, COLS));
    assert_eq!(level[[0, 0]], 2000.0);
    assert_eq!(level[[3, 4]], 2304.0);

    match read_field(&file, "H2O_MMR_D", Some(3)) {
        Err(AirsError::InvalidShape { var, .. }) => assert_eq!(var, "H2O_MMR_D"),
        other => panic!("Expected InvalidShape, got {:?}", other.map(|a| a.dim())),
    }
    assert!(matches!(
        read_field(&file, "H2O_MMR_D", None),
        Err(AirsError::InvalidShape { .. })
    ));

    // A level on a 2D field is ignored
    let flat = read_field(&file, "TotO3_D", Some(11)).unwrap();
    assert_eq!(flat[[3, 4]], 304.0);

    let options = LoadOptions {
        level: Some(1),
        ..LoadOptions::new("H2O_MMR_D")
    };
    let grid = load_grid(&file, &options).unwrap();
    assert_eq!(grid.values.get(0, 1), Some(1001.0));
}

#[test]
fn test_missing_field_and_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_airs_like_grid(&temp_dir);
    let file = open_grid_file(&path).unwrap();

    match load_grid(&file, &LoadOptions::new("TotCO_D")) {
        Err(AirsError::VariableNotFound { var }) => assert_eq!(var, "TotCO_D"),
        other => panic!("Expected VariableNotFound, got {:?}", other.map(|g| g.dim())),
    }

    let options = LoadOptions {
        latitude: "Lat".to_string(),
        ..LoadOptions::new("TotO3_D")
    };
    assert!(matches!(
        load_grid(&file, &options),
        Err(AirsError::VariableNotFound { .. })
    ));

    let missing = temp_dir.path().join("AIRS.2016.02.01.L3.missing.hdf");
    assert!(matches!(
        open_grid_file(&missing),
        Err(AirsError::FileNotFound { .. })
    ));

    // Present but not a NetCDF/HDF file
    let garbage = temp_dir.path().join("garbage.nc");
    std::fs::write(&garbage, b"not a grid file").unwrap();
    assert!(matches!(
        open_grid_file(&garbage),
        Err(AirsError::NetCDFError(_))
    ));
}

#[test]
fn test_one_dimensional_coordinates_are_meshed() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_cf_grid(&temp_dir);
    let file = open_grid_file(&path).unwrap();

    let (longitude, latitude) = read_coordinates(&file, "lon", "lat").unwrap();
    assert_eq!(longitude.dim(), (3, 4));
    assert_eq!(longitude[[2, 3]], 30.0);
    assert_eq!(latitude[[2, 3]], 10.0);

    let options = LoadOptions {
        field: "tco".to_string(),
        longitude: "lon".to_string(),
        latitude: "lat".to_string(),
        level: None,
    };
    let grid = load_grid(&file, &options).unwrap();
    assert_eq!(grid.values.get(2, 3), None);
    assert_eq!(grid.values.get(1, 2), Some(6.0));

    let sample = grid.sample(10.0, 0.0, 1.0, 1.0).unwrap();
    assert_eq!((sample.row, sample.col, sample.value), (1, 1, Some(5.0)));
}

#[test]
fn test_list_fields_runs() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_airs_like_grid(&temp_dir);
    let file = open_grid_file(Path::new(&path)).unwrap();
    assert!(list_fields(&file).is_ok());
}
