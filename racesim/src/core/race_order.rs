use crate::core::car::Car;
use crate::core::environment::Weather;
use crate::core::event::RaceEvent;
use crate::core::flag::FlagState;
use crate::core::race::SimConstants;
use crate::core::track::Track;
use helpers::general::{argsort, SortOrder};
use std::collections::HashMap;

/// Rank of a car at the start of a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub id: String,
    pub total_distance: f64,
    pub position: u32,
}

pub fn snapshot_ranks(cars: &[Car]) -> Vec<RankEntry> {
    cars.iter()
        .map(|car| RankEntry {
            id: car.id().to_owned(),
            total_distance: car.total_distance,
            position: car.position,
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct OrderContext<'a> {
    pub track: &'a Track,
    pub weather: Weather,
    pub flag: FlagState,
    pub overtaking_allowed: bool,
    pub sim_consts: &'a SimConstants,
}

/// resolve_order brings the cars list (ordered by position) up to date after all cars moved in
/// the current tick and returns the overtakes that happened.
///
/// If overtaking is allowed, the cars are ranked by race distance. Otherwise the positions stay
/// frozen and every car is held behind the car ahead of it.
pub fn resolve_order(cars: &mut Vec<Car>, prev_ranks: &[RankEntry], ctx: &OrderContext) -> Vec<RaceEvent> {
    for car in cars.iter_mut() {
        car.highlight = false;
    }

    let events = if ctx.overtaking_allowed {
        rank_by_distance(cars, prev_ranks)
    } else {
        hold_positions(cars, prev_ranks, ctx);
        Vec::new()
    };

    calc_intervals(cars, ctx.sim_consts.min_interval_speed);
    update_drs(cars, ctx);

    events
}

fn rank_by_distance(cars: &mut Vec<Car>, prev_ranks: &[RankEntry]) -> Vec<RaceEvent> {
    let total_distances: Vec<f64> = cars.iter().map(|car| car.total_distance).collect();
    let idxs_sorted = argsort(&total_distances, SortOrder::Descending);

    let mut slots: Vec<Option<Car>> = cars.drain(..).map(Some).collect();
    for idx in idxs_sorted {
        if let Some(car) = slots[idx].take() {
            cars.push(car);
        }
    }

    let prev_positions: HashMap<&str, u32> = prev_ranks
        .iter()
        .map(|entry| (entry.id.as_str(), entry.position))
        .collect();

    let mut events = Vec::new();

    for i in 0..cars.len() {
        let position = i as u32 + 1;
        cars[i].position = position;

        let improved = prev_positions
            .get(cars[i].id())
            .map_or(false, |&prev_position| position < prev_position);

        if improved && i + 1 < cars.len() {
            cars[i].highlight = true;
            events.push(RaceEvent::Overtake {
                overtaking_id: cars[i].id().to_owned(),
                overtaken_id: cars[i + 1].id().to_owned(),
            });
        }
    }

    events
}

/// hold_positions pulls every car back to at least `min_gap` behind the car ahead, but never
/// behind its own distance at the start of the tick.
fn hold_positions(cars: &mut [Car], prev_ranks: &[RankEntry], ctx: &OrderContext) {
    let start_distances: HashMap<&str, f64> = prev_ranks
        .iter()
        .map(|entry| (entry.id.as_str(), entry.total_distance))
        .collect();

    for i in 1..cars.len() {
        let max_distance = cars[i - 1].total_distance - ctx.sim_consts.min_gap;
        let car = &mut cars[i];

        if car.total_distance > max_distance {
            let start_distance = start_distances
                .get(car.id())
                .copied()
                .unwrap_or(car.total_distance);
            let target = max_distance.max(start_distance).min(car.total_distance);
            car.set_total_distance(target, ctx.track);
        }
    }
}

/// Intervals are calculated with the speed of the car ahead, which is floored to avoid huge
/// values behind slow or standing cars.
fn calc_intervals(cars: &mut [Car], min_interval_speed: f64) {
    for i in 0..cars.len() {
        if i == 0 {
            cars[i].interval = 0.0;
            continue;
        }

        let gap = (cars[i - 1].total_distance - cars[i].total_distance).max(0.0);
        let speed_ahead = cars[i - 1].speed.max(min_interval_speed) / 3.6;
        cars[i].interval = gap / speed_ahead;
    }
}

fn update_drs(cars: &mut [Car], ctx: &OrderContext) {
    let drs_conditions = ctx.overtaking_allowed
        && !ctx.weather.is_rain()
        && matches!(ctx.flag, FlagState::Green);

    for (i, car) in cars.iter_mut().enumerate() {
        car.drs_status = drs_conditions
            && i > 0
            && car.interval < ctx.sim_consts.drs_interval
            && ctx.track.is_in_drs_zone(car.lap_frac());
    }
}
