use crate::core::car::Car;
use crate::core::environment::Weather;
use crate::core::event::RaceEvent;
use crate::core::flag::FlagState;
use crate::core::race::SimConstants;
use crate::core::tireset::{TireCompound, TireConfig};
use helpers::general::{draw_chance, draw_uniform};
use log::debug;
use rand::Rng;
use std::collections::HashMap;

/// Race information the pit wall bases its decisions on.
#[derive(Debug, Clone, Copy)]
pub struct PitContext<'a> {
    pub weather: Weather,
    pub flag: FlagState,
    pub tot_no_laps: u32,
    pub tire_config: &'a TireConfig,
    pub sim_consts: &'a SimConstants,
}

/// Outcome of the pit handling of a car for one tick. Only `Racing` cars are moved by the
/// kinematics afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum PitStep {
    Racing,
    Entered(RaceEvent),
    Stationary,
    Exited(RaceEvent),
}

/// PitStopController holds the remaining standstill time of every car currently in the pits,
/// keyed by driver id. An entry exists exactly while the car is pitting.
#[derive(Debug, Clone, Default)]
pub struct PitStopController {
    timers: HashMap<String, f64>,
}

impl PitStopController {
    /// (s) Remaining standstill time of the car, `None` if it is not pitting.
    pub fn remaining(&self, car_id: &str) -> Option<f64> {
        self.timers.get(car_id).copied()
    }

    pub fn clear(&mut self) {
        self.timers.clear()
    }

    /// handle_car runs the pit state machine (racing -> pitting -> racing) of one car for one
    /// tick.
    pub fn handle_car<R: Rng + ?Sized>(
        &mut self,
        car: &mut Car,
        ctx: &PitContext,
        dt: f64,
        rng: &mut R,
    ) -> PitStep {
        if let Some(remaining) = self.timers.get_mut(car.id()) {
            *remaining -= dt;

            if *remaining > 0.0 {
                return PitStep::Stationary;
            }

            self.timers.remove(car.id());
            let tire = PitStopController::select_tire(ctx.weather, car.lap, ctx.tot_no_laps);
            car.is_pitting = false;
            car.fit_tires(tire);
            car.fuel = 100.0;
            debug!("{} leaves the pits on {} tires", car.driver.tricode, tire);

            return PitStep::Exited(RaceEvent::PitStopEnd {
                driver_id: car.id().to_owned(),
            });
        }

        if PitStopController::wants_to_pit(car, ctx, dt, rng) {
            let consts = ctx.sim_consts;
            let duration = draw_uniform(rng, consts.pit_duration[0], consts.pit_duration[1]);

            car.is_pitting = true;
            car.pit_stops += 1;
            car.speed = 0.0;
            car.drs_status = false;
            self.timers.insert(car.id().to_owned(), duration);
            debug!(
                "{} enters the pits (lap {}, {} at {:.1}% wear, fuel {:.1}%)",
                car.driver.tricode, car.lap, car.tire, car.tire_wear, car.fuel
            );

            return PitStep::Entered(RaceEvent::PitStopStart {
                driver_id: car.id().to_owned(),
            });
        }

        PitStep::Racing
    }

    /// wants_to_pit checks the entry conditions: worn tires, low fuel, a strategic stop in the
    /// pit window or an opportunistic stop under the safety car.
    fn wants_to_pit<R: Rng + ?Sized>(car: &Car, ctx: &PitContext, dt: f64, rng: &mut R) -> bool {
        let consts = ctx.sim_consts;
        let tire_cfg = ctx.tire_config.for_compound(car.tire);

        let wear_threshold = draw_uniform(rng, tire_cfg.pit_threshold[0], tire_cfg.pit_threshold[1]);
        if car.tire_wear > wear_threshold {
            return true;
        }

        if car.fuel < consts.low_fuel_threshold {
            return true;
        }

        let in_pit_window = consts.pit_window[0] <= car.lap && car.lap <= consts.pit_window[1];
        if in_pit_window && draw_chance(rng, consts.pit_window_rate * dt) {
            return true;
        }

        matches!(ctx.flag, FlagState::SafetyCar) && draw_chance(rng, consts.sc_pit_rate * dt)
    }

    /// select_tire picks the compound fitted at the end of a pit stop: wet family in the rain,
    /// otherwise the medium for a short remaining distance and the hard for a long one.
    pub fn select_tire(weather: Weather, cur_lap: u32, tot_no_laps: u32) -> TireCompound {
        match weather {
            Weather::LightRain => TireCompound::Intermediate,
            Weather::HeavyRain => TireCompound::Wet,
            Weather::Dry => {
                let laps_remaining = (tot_no_laps + 1).saturating_sub(cur_lap) as f64;
                if laps_remaining <= 0.4 * tot_no_laps as f64 {
                    TireCompound::Medium
                } else {
                    TireCompound::Hard
                }
            }
        }
    }
}
