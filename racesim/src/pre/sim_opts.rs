use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "racesim",
    about = "A tick-driven circuit race simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing (only for non-realtime mode)
    #[clap(short, long)]
    pub debug: bool,

    /// Activate real-time mode - race is simulated in real-time and a live leaderboard is printed
    #[clap(short, long)]
    pub realtime: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs (only for non-realtime mode, runs are executed in parallel)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file (OPTIONAL: if not set, the built-in race is used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set real-time factor (only relevant in real-time mode)
    #[clap(short = 'f', long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set simulation timestep size in seconds, should be in the range [0.001, 1.0]
    #[clap(short, long, default_value = "0.1")]
    pub timestep_size: f64,

    /// Set seed of the random number generator (run i of a batch uses seed + i)
    #[clap(short, long, default_value = "0")]
    pub seed: u64,

    /// Set path of a CSV file the telemetry is written to (only for single runs)
    #[clap(long)]
    pub telemetry_path: Option<PathBuf>,

    /// Set path of a JSON file the race result is written to (only for single runs)
    #[clap(long)]
    pub result_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_short_flags() {
        let opts = SimOpts::parse_from(&["racesim"]);
        assert!(!opts.debug && !opts.realtime);
        assert_eq!(opts.no_sim_runs, 1);
        assert_eq!(opts.timestep_size, 0.1);
        assert_eq!(opts.seed, 0);

        let opts = SimOpts::parse_from(&["racesim", "-d", "-n", "8", "-s", "7", "-f", "4.0"]);
        assert!(opts.debug);
        assert_eq!(opts.no_sim_runs, 8);
        assert_eq!(opts.seed, 7);
        assert_eq!(opts.realtime_factor, 4.0);
    }
}
