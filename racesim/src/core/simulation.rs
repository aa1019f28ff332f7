use crate::core::event::RaceEvent;
use crate::core::flag::FlagState;
use crate::core::overrides::{CarOverride, OverrideUpdate, Overrides};
use crate::core::race::Race;
use crate::error::SetupError;
use crate::interfaces::mirror_interface::RaceState;
use crate::interfaces::telemetry::{TelemetryRecord, TelemetrySink};
use crate::pre::read_sim_pars::SimPars;
use flume::{Receiver, Sender};
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Simulation owns a race together with its random source, the tick clock and the manual
/// overrides. It is driven by calling `tick` with the time elapsed since the previous call.
pub struct Simulation<R = ChaCha8Rng> {
    race: Race,
    rng: R,
    overrides: Overrides,
    clock_primed: bool,
    override_tx: Sender<OverrideUpdate>,
    override_rx: Receiver<OverrideUpdate>,
    telemetry_sink: Option<TelemetrySink>,
    t_last_telemetry: Option<f64>,
}

impl Simulation<ChaCha8Rng> {
    /// Creates a simulation with a seeded ChaCha8 generator, i.e. equal seeds give equal races.
    pub fn with_seed(sim_pars: &SimPars, seed: u64) -> Result<Simulation<ChaCha8Rng>, SetupError> {
        Simulation::new(sim_pars, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    pub fn new(sim_pars: &SimPars, mut rng: R) -> Result<Simulation<R>, SetupError> {
        let race = Race::new(sim_pars, &mut rng)?;
        let (override_tx, override_rx) = flume::unbounded();

        Ok(Simulation {
            race,
            rng,
            overrides: Overrides::default(),
            clock_primed: false,
            override_tx,
            override_rx,
            telemetry_sink: None,
            t_last_telemetry: None,
        })
    }

    /// tick advances the race by `elapsed` seconds and returns the events of the tick.
    ///
    /// The first call after construction or a restart only primes the clock. An elapsed time
    /// above `max_elapsed` is treated as a pause and charged as `fallback_elapsed`.
    pub fn tick(&mut self, elapsed: f64) -> Vec<RaceEvent> {
        if !self.clock_primed {
            self.clock_primed = true;
            return Vec::new();
        }

        if self.race.is_finished {
            return Vec::new();
        }

        self.apply_pending_overrides();

        let dt = match self.calc_timestep(elapsed) {
            Some(dt) => dt,
            None => return Vec::new(),
        };

        let racetime_prev = self.race.cur_racetime;
        let events = self.race.advance(dt, &mut self.overrides, &mut self.rng);

        if self.race.cur_racetime > racetime_prev {
            self.emit_telemetry();
        }

        events
    }

    fn calc_timestep(&self, elapsed: f64) -> Option<f64> {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return None;
        }

        let consts = &self.race.sim_consts;

        if elapsed > consts.max_elapsed {
            warn!(
                "Elapsed time {:.3}s exceeds {:.3}s, simulating {:.4}s instead",
                elapsed, consts.max_elapsed, consts.fallback_elapsed
            );
            Some(consts.fallback_elapsed)
        } else {
            Some(elapsed)
        }
    }

    fn emit_telemetry(&mut self) {
        let sink = match self.telemetry_sink.as_mut() {
            Some(sink) => sink,
            None => return,
        };

        let racetime = self.race.cur_racetime;
        let interval = self.race.sim_consts.telemetry_interval;
        let due = self
            .t_last_telemetry
            .map_or(true, |t_last| racetime - t_last >= interval - 1e-9);

        if !due {
            return;
        }

        for car in self.race.cars_list.iter() {
            sink(&TelemetryRecord::from_car(car, racetime));
        }
        self.t_last_telemetry = Some(racetime);
    }

    fn apply_pending_overrides(&mut self) {
        let updates: Vec<OverrideUpdate> = self.override_rx.try_iter().collect();

        for update in updates {
            self.update_car_from_db(&update.car_id, update.patch);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // RACE CONTROL --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn set_flag(&mut self, flag: FlagState) -> Vec<RaceEvent> {
        self.race.set_flag(flag)
    }

    /// restart_race restarts the race after a red flag. Overrides of the previous epoch are
    /// discarded and the next tick primes the clock again.
    pub fn restart_race(&mut self) {
        if self.race.is_finished {
            return;
        }

        self.race.restart_race();
        self.overrides.clear();

        let no_discarded = self.override_rx.drain().count();
        if no_discarded > 0 {
            debug!("Discarding {} queued overrides of the previous race epoch", no_discarded);
        }

        self.clock_primed = false;
        self.t_last_telemetry = None;
    }

    /// update_car_from_db installs a manual override for a car. A tire is fitted immediately as a
    /// fresh set. Unknown cars are ignored.
    pub fn update_car_from_db(&mut self, car_id: &str, patch: CarOverride) {
        let car = match self.race.get_car_mut(car_id) {
            Some(car) => car,
            None => {
                debug!("Ignoring override for unknown car {}", car_id);
                return;
            }
        };

        if let Some(tire) = patch.tire {
            car.fit_tires(tire);
        }

        self.overrides.upsert(car_id, &patch);
    }

    /// Returns a sender through which overrides can be delivered from other threads. They are
    /// applied at the start of the next tick.
    pub fn override_sender(&self) -> Sender<OverrideUpdate> {
        self.override_tx.clone()
    }

    pub fn set_telemetry_sink(&mut self, sink: TelemetrySink) {
        self.telemetry_sink = Some(sink);
        self.t_last_telemetry = None;
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn snapshot(&self) -> RaceState {
        self.race.snapshot()
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    pub fn race_mut(&mut self) -> &mut Race {
        &mut self.race
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn clock_primed(&self) -> bool {
        self.clock_primed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::{EnvironmentMode, Weather};
    use crate::core::tireset::TireCompound;
    use crate::pre::defaults::default_sim_pars;
    use std::sync::{Arc, Mutex};

    fn sim() -> Simulation {
        let mut sim_pars = default_sim_pars();
        sim_pars.race_pars.environment_mode = EnvironmentMode::Fixed;
        sim_pars.race_pars.weather = Weather::Dry;
        Simulation::with_seed(&sim_pars, 42).unwrap()
    }

    #[test]
    fn first_tick_primes_the_clock() {
        let mut sim = sim();
        assert!(!sim.clock_primed());
        assert!(sim.tick(0.5).is_empty());
        assert_eq!(sim.race().cur_racetime, 0.0);

        let events = sim.tick(0.5);
        assert_eq!(events.first(), Some(&RaceEvent::RaceStart));
        assert_eq!(sim.race().cur_racetime, 0.5);
    }

    #[test]
    fn long_pauses_are_clamped() {
        let mut sim = sim();
        sim.tick(0.0);
        sim.tick(30.0);
        assert!((sim.race().cur_racetime - 1.0 / 60.0).abs() < 1e-12);

        sim.tick(-1.0);
        sim.tick(f64::INFINITY);
        assert!((sim.race().cur_racetime - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn equal_seeds_give_equal_races() {
        let mut a = sim();
        let mut b = sim();
        a.tick(0.0);
        b.tick(0.0);

        for _ in 0..500 {
            assert_eq!(a.tick(0.1), b.tick(0.1));
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn tire_override_fits_fresh_set_immediately() {
        let mut sim = sim();
        sim.tick(0.0);
        for _ in 0..100 {
            sim.tick(0.1);
        }
        let id = sim.race().cars_list[0].id().to_owned();
        assert!(sim.race().cars_list[0].tire_wear > 0.0);

        sim.update_car_from_db(&id, CarOverride::tire(TireCompound::Soft));
        let car = sim.race().get_car(&id).unwrap();
        assert_eq!(car.tire, TireCompound::Soft);
        assert_eq!(car.tire_wear, 0.0);

        sim.update_car_from_db("nobody", CarOverride::speed(100.0));
        assert_eq!(sim.overrides().len(), 1);
    }

    #[test]
    fn queued_overrides_apply_on_next_tick() {
        let mut sim = sim();
        let id = sim.race().cars_list[3].id().to_owned();
        let tx = sim.override_sender();
        let car_id = id.to_owned();

        std::thread::spawn(move || {
            tx.send(OverrideUpdate {
                car_id,
                patch: CarOverride::tire(TireCompound::Hard),
            })
            .unwrap();
        })
        .join()
        .unwrap();

        sim.tick(0.0);
        assert_eq!(sim.race().get_car(&id).unwrap().tire, TireCompound::Medium);
        sim.tick(0.1);
        assert_eq!(sim.race().get_car(&id).unwrap().tire, TireCompound::Hard);
    }

    #[test]
    fn telemetry_is_throttled() {
        let mut sim = sim();
        let records = Arc::new(Mutex::new(Vec::new()));
        let records_sink = Arc::clone(&records);
        sim.set_telemetry_sink(Box::new(move |record: &TelemetryRecord| {
            records_sink.lock().unwrap().push(record.to_owned());
        }));

        sim.tick(0.0);
        for _ in 0..30 {
            sim.tick(0.1);
        }

        let records = records.lock().unwrap();
        let no_cars = sim.race().cars_list.len();
        // samples at 0.1s, 1.1s and 2.1s
        assert_eq!(records.len(), 3 * no_cars);
        assert!(records.iter().all(|r| r.fuel <= 100.0 && r.lap >= 1));
    }

    #[test]
    fn restart_discards_overrides_and_reprimes() {
        let mut sim = sim();
        sim.tick(0.0);
        sim.tick(0.1);
        let id = sim.race().cars_list[0].id().to_owned();
        sim.update_car_from_db(&id, CarOverride::speed(150.0));

        sim.set_flag(FlagState::Red);
        sim.restart_race();

        assert!(sim.overrides().is_empty());
        assert!(!sim.clock_primed());
        assert!(sim.tick(0.1).is_empty());
        assert_eq!(sim.tick(0.1).first(), Some(&RaceEvent::RaceStart));
    }
}
