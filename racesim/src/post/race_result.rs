use crate::core::event::RaceEvent;
use crate::core::tireset::TireCompound;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs::OpenOptions;
use std::io::Write as IoWrite;
use std::path::Path;

/// ClassifiedCar is used to store the final state of a car for post-processing the results.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassifiedCar {
    pub position: u32,
    pub driver_id: String,
    pub tricode: String,
    pub team: String,
    pub laps: u32,
    pub total_distance: f64,
    pub interval: f64,
    pub pit_stops: u32,
    pub tire: TireCompound,
}

/// Race event together with the race time (s) and lap it happened in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimedEvent {
    pub time_s: f64,
    pub lap: u32,
    pub event: RaceEvent,
}

/// RaceResult contains all race information that is required for post-processing the results.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RaceResult {
    pub track_name: String,
    pub tot_no_laps: u32,
    pub race_time: f64,
    pub is_finished: bool,
    pub classification: Vec<ClassifiedCar>,
    pub events: Vec<TimedEvent>,
}

impl RaceResult {
    pub fn winner(&self) -> Option<&ClassifiedCar> {
        self.classification.iter().find(|car| car.position == 1)
    }

    pub fn count_events<F: Fn(&RaceEvent) -> bool>(&self, filter: F) -> usize {
        self.events.iter().filter(|e| filter(&e.event)).count()
    }

    fn classification_string(&self) -> Result<String, std::fmt::Error> {
        let mut tmp_string = String::new();

        writeln!(
            &mut tmp_string,
            "pos, driver, {:20}, laps, interval, stops, tire",
            "team"
        )?;

        for car in self.classification.iter() {
            let interval = if car.position == 1 {
                "  leader".to_owned()
            } else {
                format!("{:7.3}s", car.interval)
            };

            writeln!(
                &mut tmp_string,
                "{:3}, {:>6}, {:20}, {:4}, {}, {:5}, {}",
                car.position, car.tricode, car.team, car.laps, interval, car.pit_stops, car.tire
            )?;
        }

        Ok(tmp_string)
    }

    /// print_result prints the classification and the race control events to the console output.
    pub fn print_result(&self) {
        println!(
            "RESULT: {} after {:.3}s ({} laps{})",
            self.track_name,
            self.race_time,
            self.tot_no_laps,
            if self.is_finished { "" } else { ", not finished" }
        );

        match self.classification_string() {
            Ok(classification) => println!("{}", classification),
            Err(e) => eprintln!("WARNING: Could not format classification: {}", e),
        }

        println!("RESULT: Race control");
        for timed_event in self.events.iter() {
            if matches!(
                timed_event.event,
                RaceEvent::FlagChange { .. } | RaceEvent::WeatherChange { .. }
            ) {
                println!(
                    "{:9.3}s, lap {:3}, {}",
                    timed_event.time_s, timed_event.lap, timed_event.event
                );
            }
        }

        println!(
            "RESULT: {} overtakes, {} pit stops",
            self.count_events(|e| matches!(e, RaceEvent::Overtake { .. })),
            self.count_events(|e| matches!(e, RaceEvent::PitStopStart { .. }))
        );
    }

    /// write_to_file writes the result as JSON file.
    pub fn write_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context(format!(
                    "Failed to create output directory {}!",
                    parent.display()
                ))?;
            }
        }

        let mut fh = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .context(format!("Failed to open result file {}!", path.display()))?;

        serde_json::to_writer_pretty(&mut fh, self)
            .context(format!("Failed to write result file {}!", path.display()))?;
        fh.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flag::FlagState;

    fn result() -> RaceResult {
        RaceResult {
            track_name: "Test".to_owned(),
            tot_no_laps: 2,
            race_time: 60.0,
            is_finished: true,
            classification: vec![
                ClassifiedCar {
                    position: 1,
                    driver_id: "ham".to_owned(),
                    tricode: "HAM".to_owned(),
                    team: "Mercedes".to_owned(),
                    laps: 2,
                    total_distance: 2001.0,
                    interval: 0.0,
                    pit_stops: 0,
                    tire: TireCompound::Medium,
                },
                ClassifiedCar {
                    position: 2,
                    driver_id: "ver".to_owned(),
                    tricode: "VER".to_owned(),
                    team: "Red Bull Racing".to_owned(),
                    laps: 2,
                    total_distance: 1990.0,
                    interval: 0.2,
                    pit_stops: 1,
                    tire: TireCompound::Hard,
                },
            ],
            events: vec![
                TimedEvent {
                    time_s: 0.1,
                    lap: 1,
                    event: RaceEvent::RaceStart,
                },
                TimedEvent {
                    time_s: 30.0,
                    lap: 1,
                    event: RaceEvent::FlagChange {
                        new_flag: FlagState::Yellow,
                    },
                },
            ],
        }
    }

    #[test]
    fn classification_lists_all_cars() {
        let result = result();
        assert_eq!(result.winner().map(|c| c.driver_id.as_str()), Some("ham"));

        let classification = result.classification_string().unwrap();
        assert_eq!(classification.lines().count(), 3);
        assert!(classification.contains("VER"));
        assert_eq!(
            result.count_events(|e| matches!(e, RaceEvent::FlagChange { .. })),
            1
        );
    }

    #[test]
    fn json_contains_tagged_events() {
        let json = serde_json::to_string(&result()).unwrap();
        assert!(json.contains(r#""type":"RACE_START""#));
        assert!(json.contains(r#""type":"FLAG_CHANGE","payload":{"new_flag":"Yellow"}"#));

        let parsed: RaceResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.events, result().events);
    }
}
