use crate::core::driver::Driver;
use crate::core::environment::Environment;
use crate::core::overrides::CarOverride;
use crate::core::race::SimConstants;
use crate::core::tireset::{TireCompound, TireConfig};
use crate::core::track::Track;
use helpers::general::draw_uniform;
use rand::Rng;
use std::sync::Arc;

/// Everything the kinematics of a single car reads from the race besides the car itself.
#[derive(Debug, Clone, Copy)]
pub struct DriveContext<'a> {
    pub track: &'a Track,
    pub environment: &'a Environment,
    pub flag_multiplier: f64,
    pub tire_config: &'a TireConfig,
    pub sim_consts: &'a SimConstants,
}

#[derive(Debug, Clone)]
pub struct Car {
    pub driver: Arc<Driver>,
    pub p_grid: u32,
    /// 1-based rank, only changed by the race order resolver.
    pub position: u32,
    /// 1-based lap, derived from `total_distance`.
    pub lap: u32,
    /// (%) Lap progress in [0, 100[, derived from `total_distance`.
    pub progress: f64,
    /// (km/h)
    pub speed: f64,
    pub tire: TireCompound,
    /// (%) Saturates at 100.
    pub tire_wear: f64,
    pub is_pitting: bool,
    pub pit_stops: u32,
    /// (m) Race distance, negative while the car stands behind the start line.
    pub total_distance: f64,
    pub drs_status: bool,
    /// (s) Gap to the car ahead, 0 for the leader.
    pub interval: f64,
    /// (%) Remaining fuel.
    pub fuel: f64,
    pub highlight: bool,
}

impl Car {
    pub fn new(driver: Arc<Driver>, p_grid: u32, tire: TireCompound, track: &Track) -> Car {
        let total_distance = -((p_grid.max(1) - 1) as f64) * track.grid_spacing;
        let (lap, progress) = track.lap_and_progress(total_distance);

        Car {
            driver,
            p_grid,
            position: p_grid,
            lap,
            progress,
            speed: 0.0,
            tire,
            tire_wear: 0.0,
            is_pitting: false,
            pit_stops: 0,
            total_distance,
            drs_status: false,
            interval: 0.0,
            fuel: 100.0,
            highlight: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.driver.id
    }

    /// (-) Lap progress as fraction in [0, 1[.
    pub fn lap_frac(&self) -> f64 {
        self.progress / 100.0
    }

    /// set_total_distance sets the race distance and keeps lap and progress consistent with it.
    pub fn set_total_distance(&mut self, total_distance: f64, track: &Track) {
        self.total_distance = total_distance;
        let (lap, progress) = track.lap_and_progress(total_distance);
        self.lap = lap;
        self.progress = progress;
    }

    /// calc_speed returns the speed of the car for the current tick in km/h. A tire override
    /// replaces the mounted compound on the way.
    pub fn calc_speed<R: Rng + ?Sized>(
        &mut self,
        ctx: &DriveContext,
        car_override: Option<&CarOverride>,
        rng: &mut R,
    ) -> f64 {
        let consts = ctx.sim_consts;

        let mut speed = match car_override.and_then(|o| o.speed) {
            Some(speed) => speed.max(0.0),
            None => {
                let base = draw_uniform(rng, consts.base_speed[0], consts.base_speed[1])
                    + self.driver.pace_offset;
                let wear_factor = 1.0 - self.tire_wear.min(100.0) / consts.wear_speed_divisor;
                let fuel_factor =
                    1.0 + consts.fuel_speed_gain * (1.0 - self.fuel.clamp(0.0, 100.0) / 100.0);
                base * wear_factor * fuel_factor
            }
        };

        if let Some(tire) = car_override.and_then(|o| o.tire) {
            self.tire = tire;
        }

        let tire_cfg = ctx.tire_config.for_compound(self.tire);
        speed *= tire_cfg.speed_factor;

        if self.drs_status && ctx.track.is_in_drs_zone(self.lap_frac()) {
            speed *= consts.drs_boost;
        }

        speed *= tire_cfg.grip_factor(ctx.environment.wetness);
        speed += ctx.environment.wind_effect();
        speed *= ctx.flag_multiplier;

        speed.clamp(0.0, consts.v_max)
    }

    /// drive advances the car by one tick: speed, distance, tire wear and fuel. Returns true if
    /// the car started a new lap.
    pub fn drive<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        ctx: &DriveContext,
        car_override: Option<&CarOverride>,
        rng: &mut R,
    ) -> bool {
        self.speed = self.calc_speed(ctx, car_override, rng);

        let distance = self.speed / 3.6 * dt;
        let lap_prev = self.lap;
        self.set_total_distance(self.total_distance + distance, ctx.track);

        if self.tire_wear < 100.0 {
            let wear_rate = ctx.tire_config.for_compound(self.tire).wear_rate;
            self.tire_wear = (self.tire_wear + wear_rate * dt).min(100.0);
        }

        self.fuel = (self.fuel - distance * ctx.sim_consts.fuel_per_meter).max(0.0);

        self.lap > lap_prev
    }

    /// Mounts a new set of tires.
    pub fn fit_tires(&mut self, tire: TireCompound) {
        self.tire = tire;
        self.tire_wear = 0.0;
    }

    /// restart puts the car on the start of its current lap (used after a red flag).
    pub fn restart(&mut self, track: &Track, base_speed: f64) {
        let lap_start = (self.lap.max(1) - 1) as f64 * track.length;
        self.set_total_distance(lap_start, track);
        self.speed = base_speed;
        self.is_pitting = false;
        self.drs_status = false;
        self.highlight = false;
    }
}
