use anyhow::Context;
use clap::Parser;
use log::info;
use racesim::interfaces::mirror_interface::RaceState;
use racesim::post::race_result::RaceResult;
use racesim::pre::defaults::default_sim_pars;
use racesim::pre::read_sim_pars::{read_sim_pars, SimPars};
use racesim::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::collections::HashMap;
use std::thread;
use std::time::Instant;

fn print_leaderboard(race_state: &RaceState) {
    println!(
        "INFO: Lap {}/{} | {} | {} flag | {} ({:.0}% wet)",
        race_state.cur_lap.min(race_state.tot_no_laps),
        race_state.tot_no_laps,
        race_state.track_name,
        race_state.flag,
        race_state.weather,
        race_state.wetness
    );

    for car in race_state.car_states.iter().take(5) {
        println!(
            "      P{:<2} {} {:>7.3}s {:>5.1}km/h {:12} {:5.1}%{}{}",
            car.position,
            car.tricode,
            car.interval,
            car.speed,
            car.tire.to_string(),
            car.tire_wear,
            if car.drs_status { " DRS" } else { "" },
            if car.is_pitting { " PIT" } else { "" }
        );
    }
}

fn run_batch(sim_pars: &SimPars, sim_opts: &SimOpts) -> anyhow::Result<()> {
    println!(
        "INFO: Running {} simulations in parallel...",
        sim_opts.no_sim_runs
    );
    let t_start = Instant::now();

    let results: Vec<RaceResult> = (0..sim_opts.no_sim_runs)
        .into_par_iter()
        .map(|i| {
            racesim::core::handle_race::handle_race(
                sim_pars,
                sim_opts.seed + i as u64,
                sim_opts.timestep_size,
                false,
                None,
                1.0,
                None,
            )
        })
        .collect::<anyhow::Result<Vec<RaceResult>>>()?;

    println!(
        "INFO: Execution time: {}ms (average {:.1}ms per race)",
        t_start.elapsed().as_millis(),
        t_start.elapsed().as_millis() as f64 / sim_opts.no_sim_runs as f64
    );

    let mut wins: HashMap<String, u32> = HashMap::new();
    for result in results.iter() {
        if let Some(winner) = result.winner() {
            *wins.entry(winner.tricode.to_owned()).or_insert(0) += 1;
        }
    }

    let mut wins: Vec<(String, u32)> = wins.into_iter().collect();
    wins.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!("RESULT: Wins over {} races", results.len());
    for (tricode, no_wins) in wins.iter() {
        println!(
            "{:>6}, {:4}, {:5.1}%",
            tricode,
            no_wins,
            *no_wins as f64 / results.len() as f64 * 100.0
        );
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    if !(0.001..=1.0).contains(&sim_opts.timestep_size) {
        anyhow::bail!(
            "Timestep size must be in the range [0.001, 1.0]s, but is {}s!",
            sim_opts.timestep_size
        );
    }

    // get simulation parameters
    let sim_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        println!("INFO: Reading simulation parameters from {:?}", parfile_path);
        read_sim_pars(parfile_path)?
    } else {
        println!("INFO: No parameter file provided, using the built-in race");
        default_sim_pars()
    };

    // print race details
    println!(
        "INFO: Simulating {} laps of {} with {} drivers and a time step size of {:.3}s",
        sim_pars.race_pars.tot_no_laps,
        sim_pars.track_pars.name,
        sim_pars.drivers.len(),
        sim_opts.timestep_size
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.realtime && sim_opts.no_sim_runs > 1 {
        return run_batch(&sim_pars, &sim_opts);
    }

    let race_result = if !sim_opts.realtime {
        let t_start = Instant::now();

        let race_result = racesim::core::handle_race::handle_race(
            &sim_pars,
            sim_opts.seed,
            sim_opts.timestep_size,
            sim_opts.debug,
            None,
            1.0,
            sim_opts.telemetry_path.as_deref(),
        )?;

        println!("INFO: Execution time: {}ms", t_start.elapsed().as_millis());
        race_result
    } else {
        println!("INFO: Starting real-time simulation...");
        info!("Real-time factor {:.1}", sim_opts.realtime_factor);

        // simulator runs in its own thread and sends race snapshots
        let (tx, rx) = flume::unbounded();
        let sim_opts_thread = sim_opts.clone();
        let sim_pars_thread = sim_pars.clone();

        let sim_handle = thread::spawn(move || {
            racesim::core::handle_race::handle_race(
                &sim_pars_thread,
                sim_opts_thread.seed,
                sim_opts_thread.timestep_size,
                false,
                Some(&tx),
                sim_opts_thread.realtime_factor,
                sim_opts_thread.telemetry_path.as_deref(),
            )
        });

        // print leaderboard once per simulated second
        let mut t_last_print = f64::NEG_INFINITY;
        for race_state in rx.iter() {
            if race_state.race_time >= t_last_print + 1.0 || race_state.is_finished {
                print_leaderboard(&race_state);
                t_last_print = race_state.race_time;
            }
        }

        sim_handle
            .join()
            .map_err(|_| anyhow::anyhow!("Simulation thread panicked!"))?
            .context("Real-time simulation failed!")?
    };

    // POST-PROCESSING -----------------------------------------------------------------------------
    race_result.print_result();

    if let Some(result_path) = &sim_opts.result_path {
        race_result.write_to_file(result_path)?;
        println!("INFO: Result written to {:?}", result_path);
    }
    if let Some(telemetry_path) = &sim_opts.telemetry_path {
        println!("INFO: Telemetry written to {:?}", telemetry_path);
    }

    Ok(())
}
