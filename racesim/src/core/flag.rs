use crate::core::event::RaceEvent;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagState {
    Green,
    Yellow,
    Red,
    Blue,
    White,
    Checkered,
    SafetyCar,
}

impl Default for FlagState {
    fn default() -> Self {
        FlagState::Green
    }
}

impl fmt::Display for FlagState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FlagState::Green => "Green",
            FlagState::Yellow => "Yellow",
            FlagState::Red => "Red",
            FlagState::Blue => "Blue",
            FlagState::White => "White",
            FlagState::Checkered => "Checkered",
            FlagState::SafetyCar => "Safety Car",
        };
        write!(f, "{}", name)
    }
}

/// FlagRegime is the single source of truth for the active flag. Under a safety car it also
/// holds the remaining time until the safety car comes in.
#[derive(Debug, Clone)]
pub struct FlagRegime {
    flag: FlagState,
    sc_timer: Option<f64>,
    sc_duration: f64,
}

impl FlagRegime {
    pub fn new(sc_duration: f64) -> FlagRegime {
        FlagRegime {
            flag: FlagState::Green,
            sc_timer: None,
            sc_duration,
        }
    }

    pub fn flag(&self) -> FlagState {
        self.flag
    }

    /// (s) Remaining safety car time, only set while the safety car is out.
    pub fn sc_time_remaining(&self) -> Option<f64> {
        self.sc_timer
    }

    pub fn speed_multiplier(&self) -> f64 {
        match self.flag {
            FlagState::Yellow => 0.6,
            FlagState::SafetyCar => 0.4,
            _ => 1.0,
        }
    }

    pub fn overtaking_allowed(&self) -> bool {
        !matches!(self.flag, FlagState::Yellow | FlagState::SafetyCar)
    }

    pub fn is_red(&self) -> bool {
        matches!(self.flag, FlagState::Red)
    }

    /// set_flag changes the flag. Returns an empty list if the flag is unchanged, otherwise a
    /// single `FlagChange` event.
    pub fn set_flag(&mut self, flag: FlagState) -> Vec<RaceEvent> {
        if flag == self.flag {
            return Vec::new();
        }

        self.flag = flag;
        self.sc_timer = if matches!(flag, FlagState::SafetyCar) {
            info!("SAFETY CAR DEPLOYED for {:.0}s", self.sc_duration);
            Some(self.sc_duration)
        } else {
            None
        };

        vec![RaceEvent::FlagChange { new_flag: flag }]
    }

    /// update counts down the safety car timer. When it expires the race goes green again and a
    /// `FlagChange` event is returned.
    pub fn update(&mut self, dt: f64) -> Option<RaceEvent> {
        let remaining = self.sc_timer? - dt;

        if remaining <= 0.0 {
            info!("SAFETY CAR IN THIS LAP - RACE RESUMING");
            self.flag = FlagState::Green;
            self.sc_timer = None;
            Some(RaceEvent::FlagChange {
                new_flag: FlagState::Green,
            })
        } else {
            self.sc_timer = Some(remaining);
            None
        }
    }

    /// Forces the flag back to green without emitting an event (used by a race restart).
    pub fn reset(&mut self) {
        self.flag = FlagState::Green;
        self.sc_timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_and_overtaking() {
        let mut regime = FlagRegime::new(60.0);
        assert_eq!(regime.speed_multiplier(), 1.0);
        assert!(regime.overtaking_allowed());

        regime.set_flag(FlagState::Yellow);
        assert_eq!(regime.speed_multiplier(), 0.6);
        assert!(!regime.overtaking_allowed());

        regime.set_flag(FlagState::SafetyCar);
        assert_eq!(regime.speed_multiplier(), 0.4);
        assert!(!regime.overtaking_allowed());

        regime.set_flag(FlagState::Blue);
        assert_eq!(regime.speed_multiplier(), 1.0);
        assert!(regime.overtaking_allowed());
    }

    #[test]
    fn set_flag_is_idempotent() {
        let mut regime = FlagRegime::new(60.0);
        assert!(regime.set_flag(FlagState::Green).is_empty());
        assert_eq!(
            regime.set_flag(FlagState::Yellow),
            vec![RaceEvent::FlagChange {
                new_flag: FlagState::Yellow
            }]
        );
        assert!(regime.set_flag(FlagState::Yellow).is_empty());
    }

    #[test]
    fn safety_car_expires_to_green() {
        let mut regime = FlagRegime::new(60.0);
        regime.set_flag(FlagState::SafetyCar);
        assert_eq!(regime.sc_time_remaining(), Some(60.0));

        let mut events = Vec::new();
        for _ in 0..70 {
            events.extend(regime.update(1.0));
        }
        assert_eq!(
            events,
            vec![RaceEvent::FlagChange {
                new_flag: FlagState::Green
            }]
        );
        assert_eq!(regime.flag(), FlagState::Green);
        assert_eq!(regime.sc_time_remaining(), None);
    }

    #[test]
    fn leaving_safety_car_clears_countdown() {
        let mut regime = FlagRegime::new(60.0);
        regime.set_flag(FlagState::SafetyCar);
        regime.set_flag(FlagState::Yellow);
        assert_eq!(regime.sc_time_remaining(), None);
        assert!(regime.update(100.0).is_none());
        assert_eq!(regime.flag(), FlagState::Yellow);
    }
}
