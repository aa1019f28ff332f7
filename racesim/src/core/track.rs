use crate::error::SetupError;
use serde::{Deserialize, Serialize};

/// Half-open lap fraction interval `[start, end[` in which DRS may be used.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct DrsZone {
    pub start: f64,
    pub end: f64,
}

impl DrsZone {
    pub fn contains(&self, lap_frac: f64) -> bool {
        self.start <= lap_frac && lap_frac < self.end
    }
}

/// * `name` - Track name
/// * `path` - Track geometry as used by the visualization (opaque for the simulation)
/// * `length` - (m) Length of the track
/// * `drs_zones` - DRS zones as lap fractions, zones may overlap
/// * `grid_spacing` - (m) Distance between two grid positions
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackPars {
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub length: f64,
    #[serde(default)]
    pub drs_zones: Vec<DrsZone>,
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: f64,
}

fn default_grid_spacing() -> f64 {
    8.0
}

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub path: String,
    pub length: f64,
    pub drs_zones: Vec<DrsZone>,
    pub grid_spacing: f64,
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Result<Track, SetupError> {
        if !(track_pars.length.is_finite() && track_pars.length > 0.0) {
            return Err(SetupError::InvalidTrackLength(track_pars.length));
        }

        for zone in track_pars.drs_zones.iter() {
            if !(0.0 <= zone.start && zone.start < zone.end && zone.end <= 1.0) {
                return Err(SetupError::InvalidDrsZone {
                    start: zone.start,
                    end: zone.end,
                });
            }
        }

        Ok(Track {
            name: track_pars.name.to_owned(),
            path: track_pars.path.to_owned(),
            length: track_pars.length,
            drs_zones: track_pars.drs_zones.to_owned(),
            grid_spacing: track_pars.grid_spacing.max(0.0),
        })
    }

    /// The method checks whether the given lap fraction lies inside any DRS zone.
    pub fn is_in_drs_zone(&self, lap_frac: f64) -> bool {
        self.drs_zones.iter().any(|zone| zone.contains(lap_frac))
    }

    /// The method converts a race distance into the current lap (1-based) and the lap progress in
    /// percent. Distances before the start line (grid) count as lap 1 with zero progress.
    pub fn lap_and_progress(&self, total_distance: f64) -> (u32, f64) {
        if total_distance <= 0.0 {
            return (1, 0.0);
        }

        let compl_laps = (total_distance / self.length).floor();
        let progress = (total_distance - compl_laps * self.length) / self.length * 100.0;

        (compl_laps as u32 + 1, progress.max(0.0))
    }
}
