use crate::core::car::{Car, DriveContext};
use crate::core::driver::Driver;
use crate::core::environment::{Environment, EnvironmentMode, EnvironmentPars, Weather};
use crate::core::event::RaceEvent;
use crate::core::flag::{FlagRegime, FlagState};
use crate::core::overrides::Overrides;
use crate::core::pit_stop::{PitContext, PitStep, PitStopController};
use crate::core::race_order::{resolve_order, snapshot_ranks, OrderContext, RankEntry};
use crate::core::tireset::{TireCompound, TireConfig};
use crate::core::track::Track;
use crate::error::SetupError;
use crate::interfaces::mirror_interface::{CarState, RaceState};
use crate::post::race_result::{ClassifiedCar, RaceResult, TimedEvent};
use crate::pre::read_sim_pars::SimPars;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// * `tot_no_laps` - Total number of laps
/// * `weather` - Initial weather
/// * `environment_mode` - Dynamic (random weather and wind) or fixed environment
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RacePars {
    pub tot_no_laps: u32,
    #[serde(default = "default_weather")]
    pub weather: Weather,
    #[serde(default)]
    pub environment_mode: EnvironmentMode,
}

fn default_weather() -> Weather {
    Weather::Dry
}

/// SimConstants holds the tuning constants of the simulation.
///
/// * `base_speed` - (km/h) Range of the base speed drawn per car and tick
/// * `pace_spread` - (km/h) Pace offset standard deviation of a driver with consistency 0
/// * `wear_speed_divisor` - (%) Speed factor is `1 - wear / wear_speed_divisor`
/// * `fuel_speed_gain` - (-) Relative speed gain of a car with an empty tank
/// * `drs_boost` - (-) Speed multiplier with open DRS
/// * `drs_interval` - (s) Maximum interval to the car ahead for DRS
/// * `v_max` - (km/h) Upper speed limit
/// * `fuel_per_meter` - (%/m) Fuel consumption
/// * `low_fuel_threshold` - (%) Fuel level below which a car pits
/// * `pit_duration` - (s) Range of the pit standstill time
/// * `pit_window` - Laps in which strategic pit stops can happen
/// * `pit_window_rate` - (1/s) Probability per second of a strategic stop inside the pit window
/// * `sc_pit_rate` - (1/s) Probability per second of a stop under the safety car
/// * `sc_duration` - (s) Time until the safety car comes in
/// * `min_gap` - (m) Minimum distance to the car ahead if overtaking is not allowed
/// * `min_interval_speed` - (km/h) Lower speed limit for the interval calculation
/// * `max_elapsed` - (s) Larger elapsed times are treated as a pause
/// * `fallback_elapsed` - (s) Time step used instead of a paused elapsed time
/// * `telemetry_interval` - (s) Simulated time between two telemetry records of a car
/// * `environment` - Parameters of the dynamic environment
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SimConstants {
    pub base_speed: [f64; 2],
    pub pace_spread: f64,
    pub wear_speed_divisor: f64,
    pub fuel_speed_gain: f64,
    pub drs_boost: f64,
    pub drs_interval: f64,
    pub v_max: f64,
    pub fuel_per_meter: f64,
    pub low_fuel_threshold: f64,
    pub pit_duration: [f64; 2],
    pub pit_window: [u32; 2],
    pub pit_window_rate: f64,
    pub sc_pit_rate: f64,
    pub sc_duration: f64,
    pub min_gap: f64,
    pub min_interval_speed: f64,
    pub max_elapsed: f64,
    pub fallback_elapsed: f64,
    pub telemetry_interval: f64,
    pub environment: EnvironmentPars,
}

impl Default for SimConstants {
    fn default() -> Self {
        SimConstants {
            base_speed: [280.0, 300.0],
            pace_spread: 4.0,
            wear_speed_divisor: 200.0,
            fuel_speed_gain: 0.03,
            drs_boost: 1.05,
            drs_interval: 1.0,
            v_max: 330.0,
            fuel_per_meter: 0.0011,
            low_fuel_threshold: 5.0,
            pit_duration: [2.0, 3.0],
            pit_window: [18, 22],
            pit_window_rate: 0.007,
            sc_pit_rate: 0.01,
            sc_duration: 60.0,
            min_gap: 10.0,
            min_interval_speed: 80.0,
            max_elapsed: 1.0,
            fallback_elapsed: 1.0 / 60.0,
            telemetry_interval: 1.0,
            environment: EnvironmentPars::default(),
        }
    }
}

/// Race is the state of a single race. The cars list is always ordered by position.
#[derive(Debug)]
pub struct Race {
    pub cur_racetime: f64,
    /// Highest lap of all cars.
    pub cur_lap: u32,
    pub tot_no_laps: u32,
    pub track: Track,
    pub environment: Environment,
    pub flag_regime: FlagRegime,
    pub cars_list: Vec<Car>,
    pub is_finished: bool,
    /// True between the first advancing tick of an epoch and the finish.
    pub is_active: bool,
    pub sim_consts: SimConstants,
    pub tire_config: TireConfig,
    pit_stops: PitStopController,
    prev_ranks: Vec<RankEntry>,
    event_log: Vec<TimedEvent>,
}

impl Race {
    /// Creates the race from the settings. The roster order is the starting grid.
    pub fn new<R: Rng + ?Sized>(sim_pars: &SimPars, rng: &mut R) -> Result<Race, SetupError> {
        if sim_pars.drivers.is_empty() {
            return Err(SetupError::EmptyRoster);
        }
        if sim_pars.race_pars.tot_no_laps == 0 {
            return Err(SetupError::NoLaps);
        }

        let track = Track::new(&sim_pars.track_pars)?;

        let mut ids = HashSet::with_capacity(sim_pars.drivers.len());
        for driver_pars in sim_pars.drivers.iter() {
            if !ids.insert(driver_pars.id.as_str()) {
                return Err(SetupError::DuplicateDriver(driver_pars.id.to_owned()));
            }
        }

        let mut unknown_tire_ids: Vec<&String> =
            sim_pars.tires.keys().filter(|id| !ids.contains(id.as_str())).collect();
        unknown_tire_ids.sort();
        if let Some(id) = unknown_tire_ids.first() {
            return Err(SetupError::UnknownDriverTire(id.to_string()));
        }

        let sim_consts = sim_pars.sim_consts.to_owned();
        let mut cars_list = Vec::with_capacity(sim_pars.drivers.len());

        for (i, driver_pars) in sim_pars.drivers.iter().enumerate() {
            let driver = Driver::new(driver_pars, sim_consts.pace_spread, rng)?;
            let tire = sim_pars
                .tires
                .get(&driver_pars.id)
                .copied()
                .unwrap_or(TireCompound::Medium);

            cars_list.push(Car::new(Arc::new(driver), i as u32 + 1, tire, &track));
        }

        let environment = Environment::new(
            sim_pars.race_pars.environment_mode,
            sim_pars.race_pars.weather,
            sim_consts.environment.to_owned(),
        );
        let prev_ranks = snapshot_ranks(&cars_list);

        Ok(Race {
            cur_racetime: 0.0,
            cur_lap: 1,
            tot_no_laps: sim_pars.race_pars.tot_no_laps,
            track,
            environment,
            flag_regime: FlagRegime::new(sim_consts.sc_duration),
            cars_list,
            is_finished: false,
            is_active: false,
            sim_consts,
            tire_config: sim_pars.tire_config.to_owned(),
            pit_stops: PitStopController::default(),
            prev_ranks,
            event_log: Vec::new(),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// advance simulates `dt` seconds of racing and returns the events in the order they happened.
    /// Nothing happens under a red flag, after the finish or for a non-positive time step.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        overrides: &mut Overrides,
        rng: &mut R,
    ) -> Vec<RaceEvent> {
        if self.is_finished || self.flag_regime.is_red() || !dt.is_finite() || dt <= 0.0 {
            return Vec::new();
        }

        let mut events = Vec::new();

        if !self.is_active {
            info!("Race start on {} ({} laps)", self.track.name, self.tot_no_laps);
            self.is_active = true;
            events.push(RaceEvent::RaceStart);
        }

        self.cur_racetime += dt;

        events.extend(self.environment.update(dt, rng));
        events.extend(self.flag_regime.update(dt));

        // flag of this tick, a car finishing in it does not change it
        let flag = self.flag_regime.flag();
        let overtaking_allowed = self.flag_regime.overtaking_allowed();

        self.prev_ranks = snapshot_ranks(&self.cars_list);

        // handle pit stops and movement of every car
        let pit_ctx = PitContext {
            weather: self.environment.weather,
            flag,
            tot_no_laps: self.tot_no_laps,
            tire_config: &self.tire_config,
            sim_consts: &self.sim_consts,
        };
        let drive_ctx = DriveContext {
            track: &self.track,
            environment: &self.environment,
            flag_multiplier: self.flag_regime.speed_multiplier(),
            tire_config: &self.tire_config,
            sim_consts: &self.sim_consts,
        };

        for car in self.cars_list.iter_mut() {
            match self.pit_stops.handle_car(car, &pit_ctx, dt, rng) {
                PitStep::Racing => {
                    let car_override = overrides.get(car.id()).copied();
                    car.drive(dt, &drive_ctx, car_override.as_ref(), rng);
                }
                PitStep::Entered(event) => events.push(event),
                PitStep::Stationary => {}
                PitStep::Exited(event) => {
                    overrides.clear_tire(car.id());
                    events.push(event);
                }
            }
        }

        // resolve race order
        let order_ctx = OrderContext {
            track: &self.track,
            weather: self.environment.weather,
            flag,
            overtaking_allowed,
            sim_consts: &self.sim_consts,
        };
        events.extend(resolve_order(&mut self.cars_list, &self.prev_ranks, &order_ctx));

        // laps are final only after the resolver held the cars behind each other
        events.extend(self.update_cur_lap());

        self.log_events(&events);
        events
    }

    // ---------------------------------------------------------------------------------------------
    // RACE CONTROL --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// set_flag changes the flag. Showing the checkered flag finishes the race, afterwards the flag
    /// cannot be changed anymore.
    pub fn set_flag(&mut self, flag: FlagState) -> Vec<RaceEvent> {
        if self.is_finished {
            debug!("Race is finished, ignoring {} flag", flag);
            return Vec::new();
        }

        let mut events = self.flag_regime.set_flag(flag);

        if matches!(flag, FlagState::Checkered) && !events.is_empty() {
            info!("Race finished by race control");
            self.is_finished = true;
            self.is_active = false;
            events.push(RaceEvent::RaceFinish);
        }

        if !events.is_empty() {
            info!("{} flag", flag);
        }

        self.log_events(&events);
        events
    }

    /// restart_race puts every car back to the start of its current lap (red flag recovery). Laps,
    /// positions and pit stop counters are kept, pit stops in progress are aborted.
    pub fn restart_race(&mut self) {
        if self.is_finished {
            debug!("Race is finished, ignoring restart");
            return;
        }

        let restart_speed = self.sim_consts.base_speed[0];

        for car in self.cars_list.iter_mut() {
            car.restart(&self.track, restart_speed);
        }

        self.pit_stops.clear();
        self.flag_regime.reset();
        self.is_active = false;
        self.prev_ranks = snapshot_ranks(&self.cars_list);

        info!("Race restart in lap {}", self.cur_lap);
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn get_car(&self, car_id: &str) -> Option<&Car> {
        self.cars_list.iter().find(|car| car.id() == car_id)
    }

    pub fn get_car_mut(&mut self, car_id: &str) -> Option<&mut Car> {
        self.cars_list.iter_mut().find(|car| car.id() == car_id)
    }

    /// (s) Remaining standstill time of a car in the pits.
    pub fn pit_time_remaining(&self, car_id: &str) -> Option<f64> {
        self.pit_stops.remaining(car_id)
    }

    /// update_cur_lap raises the race lap to the highest lap of all cars and finishes the race once
    /// the leader completed the last lap.
    fn update_cur_lap(&mut self) -> Vec<RaceEvent> {
        let max_lap = self.cars_list.iter().map(|car| car.lap).max().unwrap_or(self.cur_lap);

        if max_lap <= self.cur_lap {
            return Vec::new();
        }
        self.cur_lap = max_lap;

        if self.cur_lap <= self.tot_no_laps {
            return Vec::new();
        }

        if let Some(winner) = self.cars_list.iter().find(|car| car.lap == max_lap) {
            info!("{} takes the checkered flag", winner.driver.name);
        }
        self.is_finished = true;
        self.is_active = false;

        let mut events = self.flag_regime.set_flag(FlagState::Checkered);
        events.push(RaceEvent::RaceFinish);
        events
    }

    fn log_events(&mut self, events: &[RaceEvent]) {
        let lap = self.cur_lap.min(self.tot_no_laps);
        let time_s = self.cur_racetime;

        self.event_log.extend(events.iter().map(|event| TimedEvent {
            time_s,
            lap,
            event: event.to_owned(),
        }));
    }

    pub fn snapshot(&self) -> RaceState {
        RaceState {
            race_time: self.cur_racetime,
            cur_lap: self.cur_lap,
            tot_no_laps: self.tot_no_laps,
            weather: self.environment.weather,
            wetness: self.environment.wetness,
            track_condition: self.environment.track_condition,
            wind_speed: self.environment.wind_speed,
            wind_direction: self.environment.wind_direction,
            flag: self.flag_regime.flag(),
            sc_time_remaining: self.flag_regime.sc_time_remaining(),
            is_finished: self.is_finished,
            is_active: self.is_active,
            track_name: self.track.name.to_owned(),
            car_states: self
                .cars_list
                .iter()
                .map(|car| CarState {
                    driver_id: car.id().to_owned(),
                    driver_name: car.driver.name.to_owned(),
                    team: car.driver.team.to_owned(),
                    tricode: car.driver.tricode.to_owned(),
                    color: car.driver.rgb,
                    position: car.position,
                    lap: car.lap,
                    progress: car.progress,
                    speed: car.speed,
                    tire: car.tire,
                    tire_wear: car.tire_wear,
                    is_pitting: car.is_pitting,
                    pit_stops: car.pit_stops,
                    total_distance: car.total_distance,
                    drs_status: car.drs_status,
                    interval: car.interval,
                    fuel: car.fuel,
                    highlight: car.highlight,
                })
                .collect(),
        }
    }

    pub fn get_race_result(&self) -> RaceResult {
        RaceResult {
            track_name: self.track.name.to_owned(),
            tot_no_laps: self.tot_no_laps,
            race_time: self.cur_racetime,
            is_finished: self.is_finished,
            classification: self
                .cars_list
                .iter()
                .map(|car| ClassifiedCar {
                    position: car.position,
                    driver_id: car.id().to_owned(),
                    tricode: car.driver.tricode.to_owned(),
                    team: car.driver.team.to_owned(),
                    laps: car.lap.min(self.tot_no_laps),
                    total_distance: car.total_distance,
                    interval: car.interval,
                    pit_stops: car.pit_stops,
                    tire: car.tire,
                })
                .collect(),
            events: self.event_log.to_owned(),
        }
    }
}
