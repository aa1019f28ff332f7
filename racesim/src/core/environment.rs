use crate::core::event::RaceEvent;
use helpers::general::{draw_chance, draw_index, draw_uniform};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Weather {
    Dry,
    #[serde(rename = "Light Rain")]
    LightRain,
    #[serde(rename = "Heavy Rain")]
    HeavyRain,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::Dry, Weather::LightRain, Weather::HeavyRain];

    /// (%) Track wetness the weather drives towards.
    pub fn wetness_target(&self) -> f64 {
        match self {
            Weather::Dry => 0.0,
            Weather::LightRain => 40.0,
            Weather::HeavyRain => 80.0,
        }
    }

    pub fn is_rain(&self) -> bool {
        !matches!(self, Weather::Dry)
    }
}

impl Default for Weather {
    fn default() -> Self {
        Weather::Dry
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Weather::Dry => "Dry",
            Weather::LightRain => "Light Rain",
            Weather::HeavyRain => "Heavy Rain",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum TrackCondition {
    Dry,
    Damp,
    Wet,
    #[serde(rename = "Very Wet")]
    VeryWet,
}

impl TrackCondition {
    pub fn from_wetness(wetness: f64) -> TrackCondition {
        if wetness < 10.0 {
            TrackCondition::Dry
        } else if wetness < 40.0 {
            TrackCondition::Damp
        } else if wetness < 80.0 {
            TrackCondition::Wet
        } else {
            TrackCondition::VeryWet
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum WindDirection {
    Headwind,
    Tailwind,
    Crosswind,
}

impl WindDirection {
    pub const ALL: [WindDirection; 3] = [
        WindDirection::Headwind,
        WindDirection::Tailwind,
        WindDirection::Crosswind,
    ];
}

/// Dynamic: weather, wind and wetness evolve randomly during the race.
/// Fixed: weather stays as set up, wetness follows it instantly and wind is a function of weather.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    Dynamic,
    Fixed,
}

impl Default for EnvironmentMode {
    fn default() -> Self {
        EnvironmentMode::Dynamic
    }
}

/// * `weather_change_rate` - (1/s) Probability per second of drawing a new weather
/// * `wind_interval` - (s) Range for the time until the wind changes
/// * `wind_speed_max` - (km/h) Maximum wind speed
/// * `wetting_rate` - (%/s) Maximum increase of track wetness
/// * `drying_rate` - (%/s) Maximum decrease of track wetness
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnvironmentPars {
    pub weather_change_rate: f64,
    pub wind_interval: [f64; 2],
    pub wind_speed_max: f64,
    pub wetting_rate: f64,
    pub drying_rate: f64,
}

impl Default for EnvironmentPars {
    fn default() -> Self {
        EnvironmentPars {
            weather_change_rate: 0.0025,
            wind_interval: [15.0, 45.0],
            wind_speed_max: 30.0,
            wetting_rate: 1.0,
            drying_rate: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    pub mode: EnvironmentMode,
    pub weather: Weather,
    /// (%) Track wetness in [0, 100].
    pub wetness: f64,
    pub track_condition: TrackCondition,
    /// (km/h)
    pub wind_speed: f64,
    pub wind_direction: WindDirection,
    t_next_wind_change: f64,
    pars: EnvironmentPars,
}

impl Environment {
    pub fn new(mode: EnvironmentMode, weather: Weather, pars: EnvironmentPars) -> Environment {
        let wetness = weather.wetness_target();
        let (wind_speed, wind_direction) = Environment::wind_for_weather(weather);

        Environment {
            mode,
            weather,
            wetness,
            track_condition: TrackCondition::from_wetness(wetness),
            wind_speed,
            wind_direction,
            t_next_wind_change: pars.wind_interval[0],
            pars,
        }
    }

    /// Wind used in fixed mode and as the initial wind in dynamic mode.
    pub fn wind_for_weather(weather: Weather) -> (f64, WindDirection) {
        match weather {
            Weather::Dry => (8.0, WindDirection::Crosswind),
            Weather::LightRain => (15.0, WindDirection::Headwind),
            Weather::HeavyRain => (25.0, WindDirection::Headwind),
        }
    }

    /// update advances weather, wind and wetness by `dt` seconds. Returns a `WeatherChange` event
    /// if the weather changed.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> Option<RaceEvent> {
        match self.mode {
            EnvironmentMode::Fixed => {
                self.wetness = self.weather.wetness_target();
                self.track_condition = TrackCondition::from_wetness(self.wetness);
                None
            }
            EnvironmentMode::Dynamic => {
                let mut event = None;

                if draw_chance(rng, self.pars.weather_change_rate * dt) {
                    let new_weather = Weather::ALL[draw_index(rng, Weather::ALL.len())];

                    if new_weather != self.weather {
                        info!("Weather changes from {} to {}", self.weather, new_weather);
                        self.weather = new_weather;
                        event = Some(RaceEvent::WeatherChange { new_weather });
                    }
                }

                self.t_next_wind_change -= dt;
                if self.t_next_wind_change <= 0.0 {
                    self.wind_speed = draw_uniform(rng, 0.0, self.pars.wind_speed_max);
                    self.wind_direction = WindDirection::ALL[draw_index(rng, WindDirection::ALL.len())];
                    self.t_next_wind_change =
                        draw_uniform(rng, self.pars.wind_interval[0], self.pars.wind_interval[1]);
                }

                self.update_wetness(dt);
                event
            }
        }
    }

    /// Moves the wetness towards the weather's target with bounded rates.
    fn update_wetness(&mut self, dt: f64) {
        let target = self.weather.wetness_target();

        if self.wetness < target {
            self.wetness = (self.wetness + self.pars.wetting_rate * dt).min(target);
        } else if self.wetness > target {
            self.wetness = (self.wetness - self.pars.drying_rate * dt).max(target);
        }

        self.wetness = self.wetness.clamp(0.0, 100.0);
        self.track_condition = TrackCondition::from_wetness(self.wetness);
    }

    /// (km/h) Speed change caused by the wind.
    pub fn wind_effect(&self) -> f64 {
        match self.wind_direction {
            WindDirection::Tailwind => 0.10 * self.wind_speed,
            WindDirection::Headwind => -0.15 * self.wind_speed,
            WindDirection::Crosswind => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn condition_buckets() {
        assert_eq!(TrackCondition::from_wetness(0.0), TrackCondition::Dry);
        assert_eq!(TrackCondition::from_wetness(9.9), TrackCondition::Dry);
        assert_eq!(TrackCondition::from_wetness(10.0), TrackCondition::Damp);
        assert_eq!(TrackCondition::from_wetness(40.0), TrackCondition::Wet);
        assert_eq!(TrackCondition::from_wetness(80.0), TrackCondition::VeryWet);
    }

    #[test]
    fn fixed_mode_never_changes_weather() {
        let mut env = Environment::new(EnvironmentMode::Fixed, Weather::LightRain, Default::default());
        let mut rng = StepRng::new(0, 0);

        for _ in 0..1000 {
            assert!(env.update(1.0, &mut rng).is_none());
        }
        assert_eq!(env.weather, Weather::LightRain);
        assert_eq!(env.wetness, 40.0);
        assert_eq!(env.track_condition, TrackCondition::Wet);
        assert_eq!(env.wind_direction, WindDirection::Headwind);
    }

    #[test]
    fn wetness_moves_with_bounded_rate() {
        let mut env = Environment::new(EnvironmentMode::Dynamic, Weather::Dry, Default::default());
        // never draws a weather change
        let mut rng = StepRng::new(u64::MAX, 0);
        env.weather = Weather::HeavyRain;

        env.update(1.0, &mut rng);
        assert_eq!(env.wetness, 1.0);

        for _ in 0..200 {
            env.update(1.0, &mut rng);
        }
        assert_eq!(env.wetness, 80.0);
        assert_eq!(env.track_condition, TrackCondition::VeryWet);

        env.weather = Weather::Dry;
        env.update(2.0, &mut rng);
        assert_eq!(env.wetness, 79.0);
    }

    #[test]
    fn weather_change_emits_event() {
        let mut env = Environment::new(EnvironmentMode::Dynamic, Weather::Dry, Default::default());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut changes = 0;

        for _ in 0..20_000 {
            if let Some(RaceEvent::WeatherChange { new_weather }) = env.update(1.0, &mut rng) {
                assert_eq!(new_weather, env.weather);
                changes += 1;
            }
        }
        assert!(changes > 0);
        assert!(env.wind_speed >= 0.0 && env.wind_speed <= 30.0);
    }

    #[test]
    fn wind_effect_is_asymmetric() {
        let mut env = Environment::new(EnvironmentMode::Fixed, Weather::Dry, Default::default());
        env.wind_speed = 20.0;
        env.wind_direction = WindDirection::Tailwind;
        assert!((env.wind_effect() - 2.0).abs() < 1e-12);
        env.wind_direction = WindDirection::Headwind;
        assert!((env.wind_effect() + 3.0).abs() < 1e-12);
        env.wind_direction = WindDirection::Crosswind;
        assert_eq!(env.wind_effect(), 0.0);
    }
}
