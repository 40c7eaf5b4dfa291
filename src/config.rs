use crate::shared::{Distance, Mode};

/// Every physics and search constant in one injectable record.
///
/// The defaults describe a dense urban network; test suites perturb
/// individual fields instead of patching globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Walking speed in m/s (~5 km/h).
    pub walk_speed: f64,
    /// Average bus speed in m/s (~30 km/h).
    pub bus_speed: f64,
    /// Average metro speed in m/s (~60 km/h).
    pub metro_speed: f64,
    /// Average microbus speed in m/s (~40 km/h).
    pub microbus_speed: f64,
    /// Upper bound on any edge's effective speed, in m/s. The A*
    /// heuristic divides by this value; it must dominate every mode
    /// speed or the heuristic stops being admissible.
    pub max_speed: f64,
    /// Seconds added when a path hops between two different vehicle trips.
    pub transfer_penalty: f64,
    /// Seconds a vehicle spends at each stop, folded into edge weights.
    pub stop_dwell: f64,
    /// Longest acceptable walking leg between two stops.
    pub max_walk_distance: Distance,
    /// Mode-filtered nearest-stop lookups fall back to any stop when no
    /// matching stop lies within this radius.
    pub mode_fallback_radius: Distance,
    /// Escalating boarding/alighting search radii, tried in order until
    /// both candidate sets are non-empty.
    pub search_radii: [Distance; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            walk_speed: 1.4,
            bus_speed: 8.33,
            metro_speed: 16.67,
            microbus_speed: 11.11,
            max_speed: 25.0,
            transfer_penalty: 60.0,
            stop_dwell: 30.0,
            max_walk_distance: Distance::meters(1_500.0),
            mode_fallback_radius: Distance::meters(5_000.0),
            search_radii: [
                Distance::meters(1_500.0),
                Distance::meters(2_500.0),
                Distance::meters(4_000.0),
                Distance::meters(6_000.0),
            ],
        }
    }
}

impl Config {
    /// In-vehicle cruise speed for a mode; walking resolves to walk speed.
    pub fn speed_of(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Metro => self.metro_speed,
            Mode::Bus => self.bus_speed,
            Mode::Microbus => self.microbus_speed,
            Mode::Walk => self.walk_speed,
        }
    }
}

#[test]
fn default_speeds_below_heuristic_bound() {
    let config = Config::default();
    for mode in [Mode::Metro, Mode::Bus, Mode::Microbus, Mode::Walk] {
        assert!(config.speed_of(mode) <= config.max_speed);
    }
}
