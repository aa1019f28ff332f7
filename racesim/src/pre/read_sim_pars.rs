use crate::core::driver::DriverPars;
use crate::core::race::{RacePars, SimConstants};
use crate::core::tireset::{TireCompound, TireConfig};
use crate::core::track::TrackPars;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs. The order of `drivers` is the starting
/// grid, `tires` maps driver ids to their starting compound (Medium if missing).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimPars {
    pub race_pars: RacePars,
    pub track_pars: TrackPars,
    pub drivers: Vec<DriverPars>,
    #[serde(default)]
    pub tires: HashMap<String, TireCompound>,
    #[serde(default)]
    pub sim_consts: SimConstants,
    #[serde(default)]
    pub tire_config: TireConfig,
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}
