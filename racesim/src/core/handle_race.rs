use crate::core::event::RaceEvent;
use crate::core::simulation::Simulation;
use crate::interfaces::mirror_interface::{RaceState, MAX_SNAPSHOT_FREQUENCY};
use crate::interfaces::telemetry::TelemetryRecord;
use crate::post::race_result::RaceResult;
use crate::post::telemetry_csv::TelemetryCsvWriter;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::{Receiver, Sender};
use log::{debug, warn};
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Safety limit of simulated race time per lap.
const MAX_RACETIME_PER_LAP: f64 = 600.0;

/// handle_race creates and simulates a race on the basis of the inserted parameters, and returns
/// the results for post-processing.
///
/// If a sender is inserted, the race is simulated in real-time and snapshots of the race are sent
/// at most `MAX_SNAPSHOT_FREQUENCY` times per second. If a telemetry path is inserted, the
/// telemetry of all cars is written to that CSV file.
#[allow(clippy::too_many_arguments)]
pub fn handle_race(
    sim_pars: &SimPars,
    seed: u64,
    timestep_size: f64,
    print_debug: bool,
    tx: Option<&Sender<RaceState>>,
    realtime_factor: f64,
    telemetry_path: Option<&Path>,
) -> anyhow::Result<RaceResult> {
    let mut sim = Simulation::with_seed(sim_pars, seed).context("Failed to set up the race!")?;

    // telemetry is collected through a channel and written outside of the simulation
    let mut telemetry = match telemetry_path {
        Some(path) => {
            let (telemetry_tx, telemetry_rx) = flume::unbounded::<TelemetryRecord>();
            sim.set_telemetry_sink(Box::new(move |record: &TelemetryRecord| {
                // the receiver lives until the race is finished
                let _ = telemetry_tx.send(record.to_owned());
            }));
            Some((TelemetryCsvWriter::create(path)?, telemetry_rx))
        }
        None => None,
    };

    let max_racetime = MAX_RACETIME_PER_LAP * sim_pars.race_pars.tot_no_laps as f64;

    // prime the clock
    sim.tick(0.0);

    // check if sender was inserted -> in that case use real-time simulation
    match tx {
        None => {
            let mut t_race_update_print = 0.0;
            let mut last_printed_lap = 0u32;

            while !sim.race().is_finished && sim.race().cur_racetime < max_racetime {
                let events = sim.tick(timestep_size);

                if print_debug {
                    print_events(sim.race().cur_racetime, &events);
                }
                if print_debug && sim.race().cur_racetime > t_race_update_print + 9.9999 {
                    println!(
                        "INFO: Simulating... Current race time is {:.3}s, current lap is {}",
                        sim.race().cur_racetime,
                        sim.race().cur_lap
                    );
                    t_race_update_print = sim.race().cur_racetime;
                }
                if print_debug && sim.race().cur_lap > last_printed_lap {
                    println!("INFO: Leader started lap {}", sim.race().cur_lap);
                    last_printed_lap = sim.race().cur_lap;
                }

                if let Some((writer, rx)) = telemetry.as_mut() {
                    write_telemetry(writer, rx)?;
                }
            }
        }
        Some(tx) => {
            let mut t_race_update_snapshot = f64::NEG_INFINITY;

            while !sim.race().is_finished && sim.race().cur_racetime < max_racetime {
                let t_start = Instant::now();
                let events = sim.tick(timestep_size);

                for event in events.iter() {
                    debug!("{:.3}s: {}", sim.race().cur_racetime, event);
                }

                if sim.race().cur_racetime
                    > t_race_update_snapshot + 1.0 / MAX_SNAPSHOT_FREQUENCY - 0.001
                {
                    tx.send(sim.snapshot())
                        .context("Failed to send race state to the consumer!")?;
                    t_race_update_snapshot = sim.race().cur_racetime;
                }

                if let Some((writer, rx)) = telemetry.as_mut() {
                    write_telemetry(writer, rx)?;
                }

                // sleep until time step is finished in real-time as well (calculation in ms)
                let t_sleep = (timestep_size * 1000.0 / realtime_factor) as i64
                    - t_start.elapsed().as_millis() as i64;

                if t_sleep > 0 {
                    sleep(Duration::from_millis(t_sleep as u64));
                } else {
                    warn!("Could not keep up with real-time!")
                }
            }

            // after real-time loop finishes, send final state once
            tx.send(sim.snapshot())
                .context("Failed to send final race state to the consumer!")?;
        }
    }

    if !sim.race().is_finished {
        warn!(
            "Race was stopped after {:.0}s without reaching the finish",
            sim.race().cur_racetime
        );
    }

    if let Some((mut writer, rx)) = telemetry {
        write_telemetry(&mut writer, &rx)?;
        let no_records = writer.finish()?;
        if print_debug {
            println!("DEBUG: Wrote {} telemetry records", no_records);
        }
    }

    // return race result
    Ok(sim.race().get_race_result())
}

fn write_telemetry(
    writer: &mut TelemetryCsvWriter,
    rx: &Receiver<TelemetryRecord>,
) -> anyhow::Result<()> {
    for record in rx.try_iter() {
        writer.write(&record)?;
    }
    Ok(())
}

fn print_events(racetime: f64, events: &[RaceEvent]) {
    for event in events.iter() {
        match event {
            RaceEvent::Overtake { .. } => debug!("{:.3}s: {}", racetime, event),
            _ => println!("DEBUG: {:.3}s: {}", racetime, event),
        }
    }
}
