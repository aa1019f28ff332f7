use crate::core::event::RaceEvent;
use crate::core::tireset::TireCompound;
use crate::interfaces::mirror_interface::{CarState, RaceState};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Number of pit stops after which no further stop is recommended.
pub const MAX_RECOMMENDED_PIT_STOPS: u32 = 3;

/// describe_race turns the newest events into a short text for an external commentary
/// generator. Events without commentary value are skipped, an empty string means there is
/// nothing to comment on.
pub fn describe_race(race_state: &RaceState, events: &[RaceEvent]) -> String {
    let mut description = String::new();

    for event in events.iter() {
        let line = match event {
            RaceEvent::RaceStart => Some("The race has just started! Lights out and away we go!".to_owned()),
            RaceEvent::Overtake {
                overtaking_id,
                overtaken_id,
            } => match (race_state.get_car(overtaking_id), race_state.get_car(overtaken_id)) {
                (Some(overtaking), Some(overtaken)) => Some(format!(
                    "{} has just overtaken {} for P{}!",
                    overtaking.driver_name, overtaken.driver_name, overtaking.position
                )),
                _ => None,
            },
            RaceEvent::PitStopStart { driver_id } => race_state
                .get_car(driver_id)
                .map(|car| format!("{} comes into the pits from P{}.", car.driver_name, car.position)),
            RaceEvent::WeatherChange { new_weather } => {
                Some(format!("The weather is changing: {} now.", new_weather))
            }
            RaceEvent::FlagChange { new_flag } => Some(format!("{} flag!", new_flag)),
            RaceEvent::RaceFinish => race_state
                .leader()
                .map(|car| format!("{} wins the race!", car.driver_name)),
            RaceEvent::PitStopEnd { .. } => None,
        };

        if let Some(line) = line {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(&line);
        }
    }

    if !description.is_empty() {
        let _ = write!(
            &mut description,
            " (Lap {} of {}, {}, {} flag)",
            race_state.cur_lap.min(race_state.tot_no_laps),
            race_state.tot_no_laps,
            race_state.weather,
            race_state.flag
        );
    }

    description
}

/// Input of an external pit stop lap prediction for one car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStrategyInput {
    pub tire_wear: f64,
    pub pit_stops: u32,
    pub current_lap: u32,
    pub total_laps: u32,
    pub tire_compound: TireCompound,
}

impl PitStrategyInput {
    pub fn from_car(car: &CarState, total_laps: u32) -> PitStrategyInput {
        PitStrategyInput {
            tire_wear: car.tire_wear,
            pit_stops: car.pit_stops,
            current_lap: car.lap.min(total_laps),
            total_laps,
            tire_compound: car.tire,
        }
    }

    /// Returns false once a car has made so many stops that another one is never worth it. Only
    /// then a prediction should be requested at all.
    pub fn stop_recommendable(&self) -> bool {
        self.pit_stops < MAX_RECOMMENDED_PIT_STOPS
    }

    pub fn no_stop_reasoning(&self) -> Option<String> {
        if self.stop_recommendable() {
            None
        } else {
            Some(format!(
                "With {} pit stops already taken, another stop is not recommended under normal conditions.",
                self.pit_stops
            ))
        }
    }
}
