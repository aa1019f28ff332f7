pub mod core {
    pub mod car;
    pub mod driver;
    pub mod environment;
    pub mod event;
    pub mod flag;
    pub mod handle_race;
    pub mod overrides;
    pub mod pit_stop;
    pub mod race;
    pub mod race_order;
    pub mod simulation;
    pub mod tireset;
    pub mod track;
}
pub mod error;
pub mod interfaces {
    pub mod mirror_interface;
    pub mod strategy;
    pub mod telemetry;
}
pub mod post {
    pub mod race_result;
    pub mod telemetry_csv;
}
pub mod pre {
    pub mod defaults;
    pub mod read_sim_pars;
    pub mod sim_opts;
}
