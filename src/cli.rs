//! Defines command-line interface options using `clap` for the airs_l3_maps application.

use crate::loader::DATA_DIR_ENV;
use crate::region::BoundingBox;
use clap::Parser;
use std::path::PathBuf;

/// Maps and site samples from AIRS Level-3 grid files
#[derive(Parser, Debug)]
#[command(
    version,
    name = "airs_l3_maps",
    about = "Render AIRS Level-3 water-vapour and ozone grids and sample observatory sites"
)]
pub struct Args {
    /// Grid file, looked up under the data directory when not found as given
    #[arg(short, long, required_unless_present = "list_sites")]
    pub file: Option<PathBuf>,

    /// Directory searched for the input file
    #[arg(long, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Field to read
    #[arg(long, default_value = "TotH2OVap_D")]
    pub field: String,

    /// Longitude coordinate variable
    #[arg(long, default_value = "Longitude")]
    pub longitude: String,

    /// Latitude coordinate variable
    #[arg(long, default_value = "Latitude")]
    pub latitude: String,

    /// Level index for 3D fields (leading axis)
    #[arg(long)]
    pub level: Option<usize>,

    /// Colour-bar label
    #[arg(long, default_value = "Unit:kg/m2")]
    pub unit: String,

    /// Region to extract and map, formatted as <lon_min>:<lon_max>:<lat_min>:<lat_max>
    #[arg(long, value_parser = parse_bbox_arg, allow_hyphen_values = true)]
    pub region: Option<BoundingBox>,

    /// Keep the last selected row and column of a region
    #[arg(long, default_value_t = false)]
    pub inclusive_edges: bool,

    /// Named site to sample (repeatable), see --list-sites
    #[arg(long = "site")]
    pub sites: Vec<String>,

    /// Ad-hoc point to sample (repeatable), formatted as <lon>:<lat>
    #[arg(long = "point", value_parser = parse_point_arg, allow_hyphen_values = true)]
    pub points: Vec<(f64, f64)>,

    /// Sampling window in degrees, formatted as <d_lon>:<d_lat>
    #[arg(long, value_parser = parse_bin_size_arg, default_value = "1:1")]
    pub bin_size: (f64, f64),

    /// Root directory for rendered images
    #[arg(long, default_value = "images")]
    pub images_dir: PathBuf,

    /// Coastline shapefile drawn over the world map
    #[arg(long)]
    pub coastline: Option<PathBuf>,

    /// TrueType font for map text
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Skip the world map
    #[arg(long, default_value_t = false)]
    pub no_world_map: bool,

    /// List all fields in the file and exit
    #[arg(long)]
    pub list_fields: bool,

    /// List the known sites and exit
    #[arg(long)]
    pub list_sites: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_f64(part: &str, what: &str) -> Result<f64, String> {
    part.trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid {}: '{}'", what, part))
}

pub(crate) fn parse_bbox_arg(s: &str) -> Result<BoundingBox, String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [lon_min, lon_max, lat_min, lat_max] => BoundingBox::new(
            parse_f64(lon_min, "longitude min")?,
            parse_f64(lon_max, "longitude max")?,
            parse_f64(lat_min, "latitude min")?,
            parse_f64(lat_max, "latitude max")?,
        )
        .map_err(|e| e.to_string()),
        _ => Err("Invalid format: Expected '<lon_min>:<lon_max>:<lat_min>:<lat_max>'.".to_string()),
    }
}

pub(crate) fn parse_point_arg(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [lon, lat] => Ok((parse_f64(lon, "longitude")?, parse_f64(lat, "latitude")?)),
        _ => Err("Invalid format: Expected '<lon>:<lat>'.".to_string()),
    }
}

pub(crate) fn parse_bin_size_arg(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    let (d_lon, d_lat) = match parts.as_slice() {
        [d] => {
            let d = parse_f64(d, "bin size")?;
            (d, d)
        }
        [d_lon, d_lat] => (parse_f64(d_lon, "bin width")?, parse_f64(d_lat, "bin height")?),
        _ => return Err("Invalid format: Expected '<d_lon>:<d_lat>'.".to_string()),
    };
    if !(d_lon > 0.0 && d_lat > 0.0 && d_lon.is_finite() && d_lat.is_finite()) {
        return Err(format!("Bin size must be positive, got {}:{}", d_lon, d_lat));
    }
    Ok((d_lon, d_lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox_arg() {
        let bbox = parse_bbox_arg("-100:-30:-55:15").unwrap();
        assert_eq!(bbox, BoundingBox::new(-100.0, -30.0, -55.0, 15.0).unwrap());
        assert!(parse_bbox_arg("-30:-100:-55:15").is_err());
        assert!(parse_bbox_arg("1:2:3").is_err());
        assert!(parse_bbox_arg("a:2:3:4").is_err());
    }

    #[test]
    fn test_parse_point_and_bin_size() {
        assert_eq!(parse_point_arg("-70.8:-30.2").unwrap(), (-70.8, -30.2));
        assert!(parse_point_arg("-70.8").is_err());
        assert_eq!(parse_bin_size_arg("1:2").unwrap(), (1.0, 2.0));
        assert_eq!(parse_bin_size_arg("0.5").unwrap(), (0.5, 0.5));
        assert!(parse_bin_size_arg("0:1").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "airs_l3_maps",
            "--file",
            "granule.hdf",
            "--region",
            "-100:-30:-55:15",
            "--site",
            "ctio",
            "--site",
            "ohp",
            "--point",
            "-70:-30",
        ])
        .unwrap();
        assert_eq!(args.field, "TotH2OVap_D");
        assert_eq!(args.sites, vec!["ctio", "ohp"]);
        assert_eq!(args.points, vec![(-70.0, -30.0)]);
        assert_eq!(args.bin_size, (1.0, 1.0));
        assert!(args.region.is_some());
    }

    #[test]
    fn test_data_dir_bound_to_env_var() {
        use clap::CommandFactory;

        let command = Args::command();
        let data_dir = command
            .get_arguments()
            .find(|arg| arg.get_id() == "data_dir")
            .unwrap();
        assert_eq!(data_dir.get_env(), Some(std::ffi::OsStr::new(DATA_DIR_ENV)));
    }

    #[test]
    fn test_file_required_unless_listing_sites() {
        assert!(Args::try_parse_from(["airs_l3_maps"]).is_err());
        let args = Args::try_parse_from(["airs_l3_maps", "--list-sites"]).unwrap();
        assert!(args.file.is_none());
    }
}
