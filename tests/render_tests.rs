//! Map rendering: pixel placement, masking, basemap overlays and file output

use airs_l3_maps::coastline::Coastline;
use airs_l3_maps::errors::AirsError;
use airs_l3_maps::render::{render, render_grid, render_to_file, Basemap, RenderOptions};
use airs_l3_maps::{BoundingBox, Grid, MaskedGrid};
use image::Rgb;
use ndarray::Array2;
use std::path::PathBuf;
use tempfile::tempdir;

const RAMP_LOW: Rgb<u8> = Rgb([68, 1, 84]);
const RAMP_HIGH: Rgb<u8> = Rgb([253, 231, 37]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// 3x4 grid, longitude 0..30 along columns, latitude 0..20 along rows,
/// value = 4 * row + col + 1.
fn small_grid(fill_at: Option<(usize, usize)>) -> Grid {
    let longitude = Array2::from_shape_fn((3, 4), |(_, c)| 10.0 * c as f64);
    let latitude = Array2::from_shape_fn((3, 4), |(r, _)| 10.0 * r as f64);
    let mut data = Array2::from_shape_fn((3, 4), |(r, c)| (4 * r + c + 1) as f32);
    if let Some(cell) = fill_at {
        data[cell] = -9999.0;
    }
    Grid::new(
        "TotO3_D",
        longitude,
        latitude,
        MaskedGrid::from_raw(data, Some(-9999.0)),
    )
    .unwrap()
}

fn small_options() -> RenderOptions {
    RenderOptions {
        width: 400,
        height: 300,
        title: "test".to_string(),
        ..RenderOptions::default()
    }
}

#[test]
fn test_cells_are_coloured_by_value() {
    // Frame spans x 70..280 and y 50..240 for a 400x300 image
    let grid = small_grid(None);
    let img = render_grid(&grid, &small_options()).expect("Failed to render");

    assert_eq!(img.dimensions(), (400, 300));
    // Lowest value at lon 0, lat 0: bottom-left of the frame
    assert_eq!(*img.get_pixel(80, 230), RAMP_LOW);
    // Highest value at lon 30, lat 20: top-right of the frame
    assert_eq!(*img.get_pixel(260, 70), RAMP_HIGH);
    // Margins stay blank
    assert_eq!(*img.get_pixel(300, 290), WHITE);
}

#[test]
fn test_missing_cells_are_left_blank() {
    let grid = small_grid(Some((1, 1)));
    let img = render_grid(&grid, &small_options()).unwrap();

    // Cell (1, 1) covers lon 5..15, lat 5..15
    assert_eq!(*img.get_pixel(120, 145), WHITE);
    assert_ne!(*img.get_pixel(160, 145), WHITE);
    assert_eq!(*img.get_pixel(80, 230), RAMP_LOW);
}

#[test]
fn test_coastline_drawn_over_world_basemap() {
    let grid = small_grid(None);
    let coastline = Coastline::from_lines(vec![vec![(-60.0, 10.0), (100.0, 10.0)]]);
    let options = RenderOptions {
        width: 1000,
        height: 560,
        basemap: Some(Basemap::world().with_coastline(coastline)),
        ..RenderOptions::default()
    };
    let img = render_grid(&grid, &options).unwrap();

    // Frame is 810x450 at (70, 50): lat 10 maps to y 250, lon 20 to x 520
    assert_eq!(*img.get_pixel(520, 250), Rgb([20, 20, 20]));
    // Equator gridline
    assert_eq!(*img.get_pixel(300, 275), Rgb([150, 150, 150]));
}

#[test]
fn test_render_to_file_creates_directories() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let grid = small_grid(Some((0, 0)));

    for name in ["map.png", "map.jpg"] {
        let path: PathBuf = temp_dir.path().join("images").join("granule").join(name);
        render_to_file(&grid, &small_options(), &path).expect("Failed to write map");
        assert!(path.is_file());

        let reopened = image::open(&path).expect("Failed to reopen map");
        assert_eq!((reopened.width(), reopened.height()), (400, 300));
    }
}

#[test]
fn test_render_rejects_unusable_input() {
    let empty = MaskedGrid::from_raw(Array2::zeros((0, 0)), None);
    let no_coords = Array2::<f64>::zeros((0, 0));
    assert!(matches!(
        render(no_coords.view(), no_coords.view(), &empty, &small_options()),
        Err(AirsError::EmptySelection { .. })
    ));

    let grid = small_grid(None);
    let short_lat = Array2::<f64>::zeros((2, 4));
    assert!(matches!(
        render(grid.longitude.view(), short_lat.view(), &grid.values, &small_options()),
        Err(AirsError::ShapeMismatch { .. })
    ));

    let tiny = RenderOptions {
        width: 100,
        height: 100,
        ..RenderOptions::default()
    };
    assert!(matches!(
        render_grid(&grid, &tiny),
        Err(AirsError::InvalidArgument { .. })
    ));

    let bad_font = RenderOptions {
        font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
        ..small_options()
    };
    assert!(matches!(
        render_grid(&grid, &bad_font),
        Err(AirsError::IoError(_))
    ));
}

#[test]
fn test_all_missing_grid_renders_blank_frame() {
    let longitude = Array2::from_shape_fn((2, 2), |(_, c)| c as f64);
    let latitude = Array2::from_shape_fn((2, 2), |(r, _)| r as f64);
    let values = MaskedGrid::from_raw(Array2::from_elem((2, 2), -1.0f32), Some(-1.0));

    let img = render(longitude.view(), latitude.view(), &values, &small_options()).unwrap();
    assert_eq!(*img.get_pixel(175, 145), WHITE);
}

#[test]
fn test_coastline_filtering() {
    let coastline = Coastline::from_lines(vec![
        vec![(0.0, 0.0)],
        vec![(-70.0, -30.0), (-71.0, -31.0)],
        vec![(120.0, 40.0), (121.0, 41.0)],
    ]);
    // Single-vertex lines are dropped
    assert_eq!(coastline.len(), 2);

    let south_america = BoundingBox::new(-100.0, -30.0, -55.0, 15.0).unwrap();
    let clipped = coastline.clipped_to(&south_america);
    assert_eq!(clipped.len(), 1);
    assert_eq!(clipped.lines()[0][0], (-70.0, -30.0));

    let missing = Coastline::load("/nonexistent/coastline.shp", &BoundingBox::WORLD);
    assert!(matches!(missing, Err(AirsError::CoastlineError(_))));
}

#[test]
fn test_invalid_gridline_spacing_is_rejected() {
    let grid = small_grid(None);
    let world = RenderOptions {
        width: 1000,
        height: 560,
        ..RenderOptions::default()
    };

    let negative = RenderOptions {
        basemap: Some(Basemap {
            parallel_spacing: -30.0,
            ..Basemap::world()
        }),
        ..world.clone()
    };
    assert!(matches!(
        render_grid(&grid, &negative),
        Err(AirsError::InvalidArgument { .. })
    ));

    let dense = RenderOptions {
        basemap: Some(Basemap {
            meridian_spacing: 1e-6,
            ..Basemap::world()
        }),
        ..world.clone()
    };
    assert!(matches!(
        render_grid(&grid, &dense),
        Err(AirsError::InvalidArgument { .. })
    ));

    let not_a_number = Basemap {
        parallel_spacing: f64::NAN,
        ..Basemap::world()
    };
    assert!(not_a_number.validate().is_err());
    assert!(Basemap::world().validate().is_ok());
}

#[test]
fn test_cells_with_non_finite_coordinates_are_skipped() {
    let mut grid = small_grid(None);
    grid.longitude[[0, 1]] = f64::NAN;
    let img = render_grid(&grid, &small_options()).unwrap();

    // Row 0 spans y 192..240; cell (0, 1) and its neighbours (0, 0), (0, 2) are left out
    assert_eq!(*img.get_pixel(80, 230), WHITE);
    assert_eq!(*img.get_pixel(120, 230), WHITE);
    assert_eq!(*img.get_pixel(160, 230), WHITE);
    // Cell (0, 3) and the rows above are still drawn
    assert_ne!(*img.get_pixel(260, 230), WHITE);
    assert_ne!(*img.get_pixel(160, 145), WHITE);
}
