use crate::core::environment::Weather;
use crate::core::flag::FlagState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// RaceEvent describes a discrete change that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaceEvent {
    Overtake {
        overtaking_id: String,
        overtaken_id: String,
    },
    PitStopStart {
        driver_id: String,
    },
    PitStopEnd {
        driver_id: String,
    },
    WeatherChange {
        new_weather: Weather,
    },
    FlagChange {
        new_flag: FlagState,
    },
    RaceStart,
    RaceFinish,
}

impl fmt::Display for RaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RaceEvent::Overtake {
                overtaking_id,
                overtaken_id,
            } => write!(f, "{} overtakes {}", overtaking_id, overtaken_id),
            RaceEvent::PitStopStart { driver_id } => write!(f, "{} enters the pits", driver_id),
            RaceEvent::PitStopEnd { driver_id } => write!(f, "{} leaves the pits", driver_id),
            RaceEvent::WeatherChange { new_weather } => write!(f, "Weather changes to {}", new_weather),
            RaceEvent::FlagChange { new_flag } => write!(f, "{} flag", new_flag),
            RaceEvent::RaceStart => write!(f, "Race start"),
            RaceEvent::RaceFinish => write!(f, "Race finish"),
        }
    }
}
