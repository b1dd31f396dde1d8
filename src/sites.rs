//! Named observatory sites used as sampling points

use crate::errors::{AirsError, Result};

/// Geographic location of an observing site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub name: &'static str,
    pub description: &'static str,
    /// Degrees east
    pub longitude: f64,
    /// Degrees north
    pub latitude: f64,
    /// Metres above sea level
    pub altitude: f64,
}

pub static SITES: [Site; 4] = [
    Site {
        name: "ctio",
        description: "Cerro Tololo Inter-American Observatory",
        longitude: -70.815,
        latitude: -30.165277777777778,
        altitude: 2214.9999999993697,
    },
    Site {
        name: "lsst",
        description: "Rubin Observatory (LSST), Cerro Pachon",
        longitude: -70.7366833333333,
        latitude: -30.240741666666672,
        altitude: 2749.999999999238,
    },
    Site {
        name: "paranal",
        description: "Cerro Paranal",
        longitude: -70.40300000000002,
        latitude: -24.625199999999996,
        altitude: 2635.0000000009704,
    },
    Site {
        name: "ohp",
        description: "Observatoire de Haute Provence",
        longitude: 5.71222222222,
        latitude: 43.9316666667,
        altitude: 650.0,
    },
];

/// Looks up a site by name, ignoring case.
pub fn observatory_location(name: &str) -> Result<&'static Site> {
    SITES
        .iter()
        .find(|site| site.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| AirsError::UnknownSite {
            name: name.to_string(),
        })
}

/// Prints the site table.
pub fn print_sites() {
    println!("\n Sites");
    println!("=========");
    for site in &SITES {
        println!(
            "    {:<8} lon {:>10.4}  lat {:>9.4}  alt {:>7.1} m  ({})",
            site.name, site.longitude, site.latitude, site.altitude, site.description
        );
    }
}
