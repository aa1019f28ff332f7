use thiserror::Error;

/// SetupError is returned if the race settings violate an invariant the simulation relies on.
/// Once a race is constructed, the tick itself never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error("Driver roster is empty!")]
    EmptyRoster,

    #[error("Total number of laps must be positive!")]
    NoLaps,

    #[error("Track length must be positive and finite, but is {0}m!")]
    InvalidTrackLength(f64),

    #[error("DRS zone [{start}, {end}[ is not a valid lap fraction interval!")]
    InvalidDrsZone { start: f64, end: f64 },

    #[error("Driver id {0} is used more than once!")]
    DuplicateDriver(String),

    #[error("Tire compound assigned to unknown driver {0}!")]
    UnknownDriverTire(String),

    #[error("Could not parse color {color} of driver {driver_id}!")]
    InvalidColor { driver_id: String, color: String },

    #[error("Consistency of driver {driver_id} must be in [0.0, 1.0], but is {value}!")]
    InvalidConsistency { driver_id: String, value: f64 },
}
