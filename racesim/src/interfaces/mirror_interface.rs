use crate::core::driver::RgbColor;
use crate::core::environment::{TrackCondition, Weather, WindDirection};
use crate::core::flag::FlagState;
use crate::core::tireset::TireCompound;
use serde::{Deserialize, Serialize};

/// Maximum number of snapshots per second sent to an external consumer in real-time mode.
pub const MAX_SNAPSHOT_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    pub driver_id: String,
    pub driver_name: String,
    pub team: String,
    pub tricode: String,
    pub color: RgbColor,
    pub position: u32,
    pub lap: u32,
    pub progress: f64,
    pub speed: f64,
    pub tire: TireCompound,
    pub tire_wear: f64,
    pub is_pitting: bool,
    pub pit_stops: u32,
    pub total_distance: f64,
    pub drs_status: bool,
    pub interval: f64,
    pub fuel: f64,
    pub highlight: bool,
}

/// RaceState is a self-contained copy of the race for consumers outside the simulation, e.g. a
/// remote persistence mirror. Cars are ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    pub race_time: f64,
    pub cur_lap: u32,
    pub tot_no_laps: u32,
    pub weather: Weather,
    pub wetness: f64,
    pub track_condition: TrackCondition,
    pub wind_speed: f64,
    pub wind_direction: WindDirection,
    pub flag: FlagState,
    pub sc_time_remaining: Option<f64>,
    pub is_finished: bool,
    pub is_active: bool,
    pub track_name: String,
    pub car_states: Vec<CarState>,
}

impl RaceState {
    pub fn leader(&self) -> Option<&CarState> {
        self.car_states.first()
    }

    pub fn get_car(&self, driver_id: &str) -> Option<&CarState> {
        self.car_states.iter().find(|car| car.driver_id == driver_id)
    }
}
