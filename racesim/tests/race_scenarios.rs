use approx::assert_abs_diff_eq;
use racesim::core::driver::DriverPars;
use racesim::core::environment::{EnvironmentMode, Weather};
use racesim::core::event::RaceEvent;
use racesim::core::flag::FlagState;
use racesim::core::overrides::CarOverride;
use racesim::core::race::{RacePars, SimConstants};
use racesim::core::simulation::Simulation;
use racesim::core::tireset::{TireCompound, TireConfig};
use racesim::core::track::{DrsZone, TrackPars};
use racesim::pre::defaults::default_sim_pars;
use racesim::pre::read_sim_pars::SimPars;
use rand::rngs::mock::StepRng;
use std::collections::HashMap;

fn driver(id: &str) -> DriverPars {
    DriverPars {
        id: id.to_owned(),
        name: id.to_uppercase(),
        team: "Test Team".to_owned(),
        color: "#3671C6".to_owned(),
        tricode: id.to_uppercase(),
        consistency: 1.0,
    }
}

fn two_car_pars(tot_no_laps: u32, tire_a: TireCompound) -> SimPars {
    let mut tires = HashMap::new();
    tires.insert("a".to_owned(), tire_a);

    SimPars {
        race_pars: RacePars {
            tot_no_laps,
            weather: Weather::Dry,
            environment_mode: EnvironmentMode::Fixed,
        },
        track_pars: TrackPars {
            name: "Test Ring".to_owned(),
            path: String::new(),
            length: 1000.0,
            drs_zones: vec![DrsZone {
                start: 0.0,
                end: 0.5,
            }],
            grid_spacing: 8.0,
        },
        drivers: vec![driver("a"), driver("b")],
        tires,
        sim_consts: SimConstants::default(),
        tire_config: TireConfig::default(),
    }
}

/// Generator whose draws all resolve to the lower end of their range, i.e. every chance hits.
fn low_draws() -> StepRng {
    StepRng::new(0, 0)
}

/// Generator whose draws all resolve to the upper end of their range, i.e. no chance hits.
fn high_draws() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

fn positions(sim: &Simulation<impl rand::Rng>) -> HashMap<String, u32> {
    sim.race()
        .cars_list
        .iter()
        .map(|car| (car.id().to_owned(), car.position))
        .collect()
}

#[test]
fn hard_tire_at_90_percent_pits() {
    let mut sim = Simulation::new(&two_car_pars(10, TireCompound::Hard), low_draws()).unwrap();
    {
        let car = sim.race_mut().get_car_mut("a").unwrap();
        car.tire_wear = 90.0;
        car.fuel = 50.0;
    }
    let distance_before = sim.race().get_car("a").unwrap().total_distance;

    sim.tick(0.0);
    let events = sim.tick(0.1);

    assert!(events.contains(&RaceEvent::PitStopStart {
        driver_id: "a".to_owned()
    }));
    let car = sim.race().get_car("a").unwrap();
    assert!(car.is_pitting);
    assert_eq!(car.pit_stops, 1);
    assert_eq!(car.speed, 0.0);
    assert_eq!(car.total_distance, distance_before);
    assert_eq!(sim.race().pit_time_remaining("a"), Some(2.0));

    // the car leaves the pits once the 2s standstill are over
    let mut exit_events = Vec::new();
    for _ in 0..30 {
        exit_events.extend(sim.tick(0.1));
        if !sim.race().get_car("a").unwrap().is_pitting {
            break;
        }
        assert_eq!(sim.race().get_car("a").unwrap().total_distance, distance_before);
    }

    assert!(exit_events.contains(&RaceEvent::PitStopEnd {
        driver_id: "a".to_owned()
    }));
    let car = sim.race().get_car("a").unwrap();
    assert!(!car.is_pitting);
    assert_eq!(car.tire_wear, 0.0);
    assert_eq!(car.fuel, 100.0);
    assert_eq!(car.pit_stops, 1);
    assert_eq!(car.tire, TireCompound::Hard);
    assert_eq!(car.total_distance, distance_before);
    assert_eq!(sim.race().pit_time_remaining("a"), None);
}

#[test]
fn safety_car_returns_to_green_after_60s() {
    let mut sim = Simulation::new(&two_car_pars(50, TireCompound::Medium), high_draws()).unwrap();
    sim.tick(0.0);
    sim.tick(0.5);

    assert_eq!(
        sim.set_flag(FlagState::SafetyCar),
        vec![RaceEvent::FlagChange {
            new_flag: FlagState::SafetyCar
        }]
    );
    assert_eq!(sim.race().flag_regime.sc_time_remaining(), Some(60.0));

    let positions_sc = positions(&sim);
    let mut events = Vec::new();
    for _ in 0..119 {
        let tick_events = sim.tick(0.5);
        assert!(!tick_events
            .iter()
            .any(|e| matches!(e, RaceEvent::Overtake { .. })));
        assert_eq!(positions(&sim), positions_sc);
        events.extend(tick_events);
    }
    assert_eq!(sim.race().flag_regime.flag(), FlagState::SafetyCar);

    for _ in 0..20 {
        events.extend(sim.tick(0.5));
    }

    let green_flags = events
        .iter()
        .filter(|e| {
            **e == RaceEvent::FlagChange {
                new_flag: FlagState::Green,
            }
        })
        .count();
    assert_eq!(green_flags, 1);
    assert_eq!(sim.race().flag_regime.flag(), FlagState::Green);
    assert_eq!(sim.race().flag_regime.sc_time_remaining(), None);
}

#[test]
fn faster_car_behind_overtakes_once() {
    let mut sim = Simulation::new(&two_car_pars(50, TireCompound::Medium), high_draws()).unwrap();
    sim.update_car_from_db("a", CarOverride::speed(200.0));
    sim.update_car_from_db("b", CarOverride::speed(320.0));
    sim.tick(0.0);

    let mut overtakes = Vec::new();
    let mut highlight_ticks = 0;

    for _ in 0..100 {
        let events = sim.tick(0.05);
        let tick_overtakes: Vec<RaceEvent> = events
            .into_iter()
            .filter(|e| matches!(e, RaceEvent::Overtake { .. }))
            .collect();

        let b = sim.race().get_car("b").unwrap();
        if tick_overtakes.is_empty() {
            assert!(!b.highlight);
        } else {
            assert!(b.highlight);
            assert_eq!(b.position, 1);
            highlight_ticks += 1;
        }
        assert!(!sim.race().get_car("a").unwrap().highlight);

        overtakes.extend(tick_overtakes);
    }

    assert_eq!(
        overtakes,
        vec![RaceEvent::Overtake {
            overtaking_id: "b".to_owned(),
            overtaken_id: "a".to_owned()
        }]
    );
    assert_eq!(highlight_ticks, 1);

    let leader = &sim.race().cars_list[0];
    assert_eq!(leader.id(), "b");
    assert_eq!(leader.interval, 0.0);
    assert!(!leader.drs_status);
}

#[test]
fn tire_override_resets_wear_immediately() {
    let mut sim = Simulation::new(&two_car_pars(50, TireCompound::Medium), high_draws()).unwrap();
    sim.race_mut().get_car_mut("a").unwrap().tire_wear = 40.0;

    sim.update_car_from_db("a", CarOverride::tire(TireCompound::Soft));

    let car = sim.race().get_car("a").unwrap();
    assert_eq!(car.tire, TireCompound::Soft);
    assert_eq!(car.tire_wear, 0.0);
    assert_eq!(
        sim.overrides().get("a"),
        Some(&CarOverride::tire(TireCompound::Soft))
    );
}

#[test]
fn finished_race_does_not_change() {
    let mut sim = Simulation::new(&two_car_pars(1, TireCompound::Medium), high_draws()).unwrap();
    sim.tick(0.0);

    let mut events = Vec::new();
    for _ in 0..1000 {
        events.extend(sim.tick(0.1));
        if sim.race().is_finished {
            break;
        }
    }
    assert!(sim.race().is_finished);
    assert_eq!(events.last(), Some(&RaceEvent::RaceFinish));
    assert_eq!(sim.race().flag_regime.flag(), FlagState::Checkered);

    let snapshot = sim.snapshot();
    for _ in 0..10 {
        assert!(sim.tick(0.1).is_empty());
    }
    assert!(sim.set_flag(FlagState::Green).is_empty());
    assert_eq!(sim.snapshot(), snapshot);
}

#[test]
fn red_flag_restart_keeps_laps_and_positions() {
    let mut sim = Simulation::new(&two_car_pars(50, TireCompound::Medium), high_draws()).unwrap();
    sim.tick(0.0);
    for _ in 0..200 {
        sim.tick(0.1);
    }

    sim.set_flag(FlagState::Red);
    let before = sim.snapshot();
    assert!(sim.tick(0.1).is_empty());
    assert_eq!(sim.snapshot(), before);

    sim.restart_race();
    for (car_before, car) in before.car_states.iter().zip(sim.race().cars_list.iter()) {
        assert_eq!(car_before.driver_id, car.id());
        assert_eq!(car_before.lap, car.lap);
        assert_eq!(car_before.position, car.position);
        assert_eq!(car_before.pit_stops, car.pit_stops);
        assert_eq!(car.progress, 0.0);
        assert_abs_diff_eq!(car.total_distance, (car.lap - 1) as f64 * 1000.0, epsilon = 1e-9);
    }
    assert_eq!(sim.race().flag_regime.flag(), FlagState::Green);

    // restart primes the clock again before the race resumes
    assert!(sim.tick(0.1).is_empty());
    assert_eq!(sim.tick(0.1).first(), Some(&RaceEvent::RaceStart));
}

/// Runs a full race with dynamic environment and checks the per-tick invariants of all cars.
#[test]
fn invariants_hold_over_a_whole_race() {
    let mut sim_pars = default_sim_pars();
    sim_pars.race_pars.tot_no_laps = 25;
    sim_pars.sim_consts.environment.weather_change_rate = 0.02;
    let mut sim = Simulation::with_seed(&sim_pars, 2024).unwrap();
    sim.tick(0.0);

    let mut no_ticks = 0;
    let mut no_pit_stops = 0;
    let mut pit_stops_at_entry: HashMap<String, u32> = HashMap::new();

    while !sim.race().is_finished && no_ticks < 100_000 {
        no_ticks += 1;

        // neutralize a part of the race
        if no_ticks == 1500 {
            sim.set_flag(FlagState::Yellow);
        } else if no_ticks == 1800 {
            sim.set_flag(FlagState::Green);
        }

        let before = sim.snapshot();
        let events = sim.tick(0.1);
        let after = sim.snapshot();

        let exited: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                RaceEvent::PitStopEnd { driver_id } => Some(driver_id.as_str()),
                _ => None,
            })
            .collect();

        for event in events.iter() {
            if let RaceEvent::PitStopStart { driver_id } = event {
                let car = after.get_car(driver_id).unwrap();
                pit_stops_at_entry.insert(driver_id.to_owned(), car.pit_stops);
                no_pit_stops += 1;
            }
        }

        for car in after.car_states.iter() {
            let car_before = before.get_car(&car.driver_id).unwrap();

            assert!(car.total_distance >= car_before.total_distance);
            assert!((0.0..=100.0).contains(&car.fuel));
            assert!((0.0..=100.0).contains(&car.tire_wear));
            assert!(car.speed >= 0.0 && car.speed <= 330.0);

            if exited.contains(&car.driver_id.as_str()) {
                assert_eq!(car.tire_wear, 0.0);
                assert_eq!(car.fuel, 100.0);
                assert!(!car.is_pitting);
                assert_eq!(Some(&car.pit_stops), pit_stops_at_entry.get(&car.driver_id));
            } else {
                assert!(car.tire_wear >= car_before.tire_wear);
                assert!(car.fuel <= car_before.fuel);
            }
        }

        let leader = &after.car_states[0];
        assert_eq!(leader.interval, 0.0);
        assert!(!leader.drs_status);

        let overtaking_allowed = !matches!(after.flag, FlagState::Yellow | FlagState::SafetyCar);
        for (i, car) in after.car_states.iter().enumerate() {
            assert_eq!(car.position, i as u32 + 1);
        }

        if overtaking_allowed {
            assert!(after
                .car_states
                .windows(2)
                .all(|w| w[0].total_distance >= w[1].total_distance));
        } else {
            assert!(!events.iter().any(|e| matches!(e, RaceEvent::Overtake { .. })));
            for car in after.car_states.iter() {
                assert_eq!(car.position, before.get_car(&car.driver_id).unwrap().position);
                assert!(!car.drs_status);
            }
        }
    }

    assert!(sim.race().is_finished);
    assert!(no_pit_stops > 0);

    let result = sim.race().get_race_result();
    assert_eq!(result.classification.len(), 20);
    assert_eq!(result.winner().map(|c| c.laps), Some(25));
}
