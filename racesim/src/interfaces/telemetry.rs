use crate::core::car::Car;
use crate::core::tireset::TireCompound;
use serde::{Deserialize, Serialize};

/// One telemetry sample of a car. Records are only reported, they never influence the
/// simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// (s) Race time
    pub timestamp: f64,
    pub car_id: String,
    pub lap: u32,
    pub position: u32,
    /// (km/h)
    pub speed: f64,
    pub tire: TireCompound,
    /// (%)
    pub fuel: f64,
    pub message: String,
}

impl TelemetryRecord {
    pub fn from_car(car: &Car, timestamp: f64) -> TelemetryRecord {
        let message = if car.is_pitting {
            "In pit lane".to_owned()
        } else if car.drs_status {
            "DRS open".to_owned()
        } else {
            String::new()
        };

        TelemetryRecord {
            timestamp,
            car_id: car.id().to_owned(),
            lap: car.lap,
            position: car.position,
            speed: car.speed,
            tire: car.tire,
            fuel: car.fuel,
            message,
        }
    }
}

/// Receiver of the telemetry records.
pub type TelemetrySink = Box<dyn FnMut(&TelemetryRecord) + Send>;
