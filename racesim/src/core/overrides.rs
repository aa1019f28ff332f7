use crate::core::tireset::TireCompound;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Manually supplied values for one car. A set field takes precedence over the value the
/// simulation would compute itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarOverride {
    /// (km/h) Starting speed for the kinematics, multipliers are applied on top of it.
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub tire: Option<TireCompound>,
}

impl CarOverride {
    pub fn speed(speed: f64) -> CarOverride {
        CarOverride {
            speed: Some(speed),
            tire: None,
        }
    }

    pub fn tire(tire: TireCompound) -> CarOverride {
        CarOverride {
            speed: None,
            tire: Some(tire),
        }
    }

    /// Fields set in `patch` replace the current ones, unset fields are kept.
    pub fn merge(&mut self, patch: &CarOverride) {
        if patch.speed.is_some() {
            self.speed = patch.speed;
        }
        if patch.tire.is_some() {
            self.tire = patch.tire;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_none() && self.tire.is_none()
    }
}

/// Override update as delivered by an external producer (e.g. a remote database listener).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideUpdate {
    pub car_id: String,
    pub patch: CarOverride,
}

/// Overrides is the per-car override table, keyed by driver id.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: HashMap<String, CarOverride>,
}

impl Overrides {
    pub fn get(&self, car_id: &str) -> Option<&CarOverride> {
        self.entries.get(car_id)
    }

    pub fn upsert(&mut self, car_id: &str, patch: &CarOverride) {
        self.entries
            .entry(car_id.to_owned())
            .or_default()
            .merge(patch);
    }

    /// Removes the tire part of the override of a car, e.g. after a new tire set was fitted.
    pub fn clear_tire(&mut self, car_id: &str) {
        if let Some(entry) = self.entries.get_mut(car_id) {
            entry.tire = None;
            if entry.is_empty() {
                self.entries.remove(car_id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
