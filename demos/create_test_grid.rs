//! Creates a sample grid file laid out like an AIRS Level-3 daily granule.
//!
//! The file holds 1 degree `Latitude`/`Longitude` arrays plus synthetic
//! `TotH2OVap_D` and `TotO3_D` fields with `_FillValue` cells, enough to try
//! the world map, region and site sampling paths without a real granule.

use ndarray::Array2;
use netcdf::create;
use std::path::Path;

const FILL: f32 = -9999.0;
const ROWS: usize = 180;
const COLS: usize = 360;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("AIRS.2016.01.01.L3.RetStd001.v6.0.synthetic.nc");

    println!("🔨 Creating test grid file: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let mut file = create(output_path)?;

    file.add_attribute("title", "Synthetic AIRS Level-3 daily grid")?;
    file.add_attribute("created_by", "create_test_grid.rs")?;

    file.add_dimension("YDim", ROWS)?;
    file.add_dimension("XDim", COLS)?;

    // Rows run north to south, columns west to east, 1 degree cell centres
    {
        let mut lat_var = file.add_variable::<f64>("Latitude", &["YDim", "XDim"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        let lat = Array2::from_shape_fn((ROWS, COLS), |(r, _)| 89.5 - r as f64);
        lat_var.put(lat.view(), ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f64>("Longitude", &["YDim", "XDim"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        let lon = Array2::from_shape_fn((ROWS, COLS), |(_, c)| -179.5 + c as f64);
        lon_var.put(lon.view(), ..)?;
    }

    // Moist tropics, dry poles; a swath gap over the Pacific is left as fill
    {
        let mut h2o_var = file.add_variable::<f32>("TotH2OVap_D", &["YDim", "XDim"])?;
        h2o_var.put_attribute("units", "kg/m2")?;
        h2o_var.put_attribute("_FillValue", FILL)?;
        let h2o = Array2::from_shape_fn((ROWS, COLS), |(r, c)| {
            let lat = 89.5 - r as f32;
            let lon = -179.5 + c as f32;
            if (-160.0..-140.0).contains(&lon) && lat.abs() < 40.0 {
                FILL
            } else {
                50.0 * lat.to_radians().cos().powi(3) + 2.0 * (lon / 30.0).sin()
            }
        });
        h2o_var.put(h2o.view(), ..)?;
    }

    // Ozone rising towards the poles, polar night over Antarctica left as fill
    {
        let mut o3_var = file.add_variable::<f32>("TotO3_D", &["YDim", "XDim"])?;
        o3_var.put_attribute("units", "DU")?;
        o3_var.put_attribute("_FillValue", FILL)?;
        let o3 = Array2::from_shape_fn((ROWS, COLS), |(r, c)| {
            let lat = 89.5 - r as f32;
            let lon = -179.5 + c as f32;
            if lat < -75.0 {
                FILL
            } else {
                260.0 + 100.0 * lat.to_radians().sin().abs() + 10.0 * (lon / 45.0).cos()
            }
        });
        o3_var.put(o3.view(), ..)?;
    }

    println!("✅ Successfully created test grid file with:");
    println!("   📏 Dimensions: YDim({}), XDim({})", ROWS, COLS);
    println!("   📈 Variables: Latitude, Longitude, TotH2OVap_D, TotO3_D");
    println!("   🏷️  Attributes: units, _FillValue");
    println!("\n🧪 Try it with:");
    println!(
        "   cargo run -- -f {} --field TotO3_D --unit DU --region -100:-30:-55:15 --site ctio --site ohp",
        output_path.display()
    );

    Ok(())
}
