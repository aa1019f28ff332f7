use crate::error::SetupError;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// * `id` - Unique and stable driver id, e.g. ver
/// * `name` - Driver name, e.g. Max Verstappen
/// * `team` - Team name, e.g. Red Bull Racing
/// * `color` - Team color as CSS hex string, e.g. #3671C6
/// * `tricode` - Three letter short code, e.g. VER
/// * `consistency` - (-) Value in [0.0, 1.0], 1.0 means the driver always hits the nominal pace
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DriverPars {
    pub id: String,
    pub name: String,
    pub team: String,
    pub color: String,
    pub tricode: String,
    #[serde(default = "default_consistency")]
    pub consistency: f64,
}

fn default_consistency() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub team: String,
    pub color: String,
    pub rgb: RgbColor,
    pub tricode: String,
    /// (km/h) Constant offset to the base speed, drawn once at race setup.
    pub pace_offset: f64,
}

impl Driver {
    /// Creates the driver and draws its pace offset. The standard deviation of the offset is
    /// `(1 - consistency) * pace_spread`.
    pub fn new<R: Rng + ?Sized>(
        driver_pars: &DriverPars,
        pace_spread: f64,
        rng: &mut R,
    ) -> Result<Driver, SetupError> {
        if !(0.0..=1.0).contains(&driver_pars.consistency) {
            return Err(SetupError::InvalidConsistency {
                driver_id: driver_pars.id.to_owned(),
                value: driver_pars.consistency,
            });
        }

        let color = driver_pars
            .color
            .parse::<css_color_parser::Color>()
            .map_err(|_| SetupError::InvalidColor {
                driver_id: driver_pars.id.to_owned(),
                color: driver_pars.color.to_owned(),
            })?;

        let std_dev = (1.0 - driver_pars.consistency) * pace_spread;

        let pace_offset = if std_dev > 0.0 {
            match Normal::new(0.0, std_dev) {
                Ok(normal) => normal.sample(rng),
                Err(_) => 0.0,
            }
        } else {
            0.0
        };

        Ok(Driver {
            id: driver_pars.id.to_owned(),
            name: driver_pars.name.to_owned(),
            team: driver_pars.team.to_owned(),
            color: driver_pars.color.to_owned(),
            rgb: RgbColor {
                r: color.r,
                g: color.g,
                b: color.b,
            },
            tricode: driver_pars.tricode.to_owned(),
            pace_offset,
        })
    }
}
