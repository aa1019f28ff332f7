use crate::core::driver::DriverPars;
use crate::core::environment::{EnvironmentMode, Weather};
use crate::core::race::{RacePars, SimConstants};
use crate::core::tireset::{TireCompound, TireConfig};
use crate::core::track::{DrsZone, TrackPars};
use crate::pre::read_sim_pars::SimPars;

pub const DEFAULT_TOT_NO_LAPS: u32 = 50;

// id, name, team, color, consistency
const DEFAULT_ROSTER: [(&str, &str, &str, &str, f64); 20] = [
    ("ver", "Max Verstappen", "Red Bull Racing", "#3671C6", 0.97),
    ("per", "Sergio Pérez", "Red Bull Racing", "#3671C6", 0.90),
    ("ham", "Lewis Hamilton", "Mercedes", "#6CD3BF", 0.96),
    ("rus", "George Russell", "Mercedes", "#6CD3BF", 0.93),
    ("lec", "Charles Leclerc", "Ferrari", "#F91536", 0.94),
    ("sai", "Carlos Sainz", "Ferrari", "#F91536", 0.93),
    ("nor", "Lando Norris", "McLaren", "#F58020", 0.95),
    ("pia", "Oscar Piastri", "McLaren", "#F58020", 0.92),
    ("alo", "Fernando Alonso", "Aston Martin", "#358C75", 0.95),
    ("str", "Lance Stroll", "Aston Martin", "#358C75", 0.86),
    ("oco", "Esteban Ocon", "Alpine", "#2293D1", 0.89),
    ("gas", "Pierre Gasly", "Alpine", "#2293D1", 0.89),
    ("alb", "Alexander Albon", "Williams", "#37BEDD", 0.90),
    ("sar", "Logan Sargeant", "Williams", "#37BEDD", 0.82),
    ("tsu", "Yuki Tsunoda", "RB", "#6692FF", 0.88),
    ("ric", "Daniel Ricciardo", "RB", "#6692FF", 0.87),
    ("bot", "Valtteri Bottas", "Sauber", "#52E252", 0.88),
    ("zho", "Guanyu Zhou", "Sauber", "#52E252", 0.85),
    ("mag", "Kevin Magnussen", "Haas", "#B6BABD", 0.86),
    ("hul", "Nico Hülkenberg", "Haas", "#B6BABD", 0.88),
];

pub fn default_track_pars() -> TrackPars {
    TrackPars {
        name: "Circuit de la Vision".to_owned(),
        path: "M 100,200 A 80,80 0 0 1 180,120 L 420,120 A 80,80 0 0 1 500,200 L 500,300 \
               A 80,80 0 0 1 420,380 L 180,380 A 80,80 0 0 1 100,300 Z"
            .to_owned(),
        length: 1570.0,
        drs_zones: vec![
            DrsZone {
                start: 0.10,
                end: 0.35,
            },
            DrsZone {
                start: 0.60,
                end: 0.85,
            },
        ],
        grid_spacing: 8.0,
    }
}

pub fn default_drivers() -> Vec<DriverPars> {
    DEFAULT_ROSTER
        .iter()
        .map(|&(id, name, team, color, consistency)| DriverPars {
            id: id.to_owned(),
            name: name.to_owned(),
            team: team.to_owned(),
            color: color.to_owned(),
            tricode: id.to_uppercase(),
            consistency,
        })
        .collect()
}

/// default_sim_pars returns the built-in race: 20 drivers on medium tires, 50 laps of the
/// Circuit de la Vision in dry conditions.
pub fn default_sim_pars() -> SimPars {
    let drivers = default_drivers();
    let tires = drivers
        .iter()
        .map(|driver| (driver.id.to_owned(), TireCompound::Medium))
        .collect();

    SimPars {
        race_pars: RacePars {
            tot_no_laps: DEFAULT_TOT_NO_LAPS,
            weather: Weather::Dry,
            environment_mode: EnvironmentMode::Dynamic,
        },
        track_pars: default_track_pars(),
        drivers,
        tires,
        sim_consts: SimConstants::default(),
        tire_config: TireConfig::default(),
    }
}
