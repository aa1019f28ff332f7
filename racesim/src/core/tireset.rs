use helpers::general::lin_interp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track wetness values (%) at which the grip curves of the compounds are defined.
pub const WETNESS_POINTS: [f64; 5] = [0.0, 10.0, 40.0, 80.0, 100.0];

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TireCompound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
}

impl Default for TireCompound {
    fn default() -> Self {
        TireCompound::Medium
    }
}

impl fmt::Display for TireCompound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TireCompound::Soft => "Soft",
            TireCompound::Medium => "Medium",
            TireCompound::Hard => "Hard",
            TireCompound::Intermediate => "Intermediate",
            TireCompound::Wet => "Wet",
        };
        write!(f, "{}", name)
    }
}

/// * `speed_factor` - (-) Fixed speed multiplier of the compound
/// * `wear_rate` - (%/s) Tire wear per second of driving
/// * `pit_threshold` - (%) Range of the wear at which the car pits, the actual threshold is drawn
/// in this range on every check
/// * `grip` - (-) Grip multiplier at the wetness values in `WETNESS_POINTS`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TireCompoundConfig {
    pub speed_factor: f64,
    pub wear_rate: f64,
    pub pit_threshold: [f64; 2],
    pub grip: [f64; 5],
}

impl TireCompoundConfig {
    /// The method returns the grip multiplier of the compound for the given track wetness.
    pub fn grip_factor(&self, wetness: f64) -> f64 {
        lin_interp(wetness, &WETNESS_POINTS, &self.grip)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TireConfig {
    pub soft: TireCompoundConfig,
    pub medium: TireCompoundConfig,
    pub hard: TireCompoundConfig,
    pub intermediate: TireCompoundConfig,
    pub wet: TireCompoundConfig,
}

impl TireConfig {
    pub fn for_compound(&self, compound: TireCompound) -> &TireCompoundConfig {
        match compound {
            TireCompound::Soft => &self.soft,
            TireCompound::Medium => &self.medium,
            TireCompound::Hard => &self.hard,
            TireCompound::Intermediate => &self.intermediate,
            TireCompound::Wet => &self.wet,
        }
    }
}

const SLICK_GRIP: [f64; 5] = [1.0, 0.95, 0.85, 0.75, 0.70];

impl Default for TireConfig {
    fn default() -> Self {
        TireConfig {
            soft: TireCompoundConfig {
                speed_factor: 1.015,
                wear_rate: 0.20,
                pit_threshold: [50.0, 60.0],
                grip: SLICK_GRIP,
            },
            medium: TireCompoundConfig {
                speed_factor: 1.0,
                wear_rate: 0.14,
                pit_threshold: [70.0, 80.0],
                grip: SLICK_GRIP,
            },
            hard: TireCompoundConfig {
                speed_factor: 0.985,
                wear_rate: 0.10,
                pit_threshold: [85.0, 95.0],
                grip: SLICK_GRIP,
            },
            intermediate: TireCompoundConfig {
                speed_factor: 0.97,
                wear_rate: 0.16,
                pit_threshold: [65.0, 75.0],
                grip: [0.96, 1.0, 1.0, 0.92, 0.88],
            },
            wet: TireCompoundConfig {
                speed_factor: 0.94,
                wear_rate: 0.14,
                pit_threshold: [70.0, 80.0],
                grip: [0.92, 0.96, 0.98, 1.0, 1.0],
            },
        }
    }
}
