use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    feed::{self, Feed},
    shared::Mode,
};

/// Agency-to-mode classification rules, injected at build time.
///
/// Rules are matched in insertion order, exact id first and then as a
/// prefix; unmatched agencies fall back to the default mode (bus).
#[derive(Debug, Clone)]
pub struct AgencyModes {
    rules: Vec<(String, Mode)>,
    fallback: Mode,
}

impl Default for AgencyModes {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Mode::Bus,
        }
    }
}

impl AgencyModes {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rule(mut self, agency_id: impl Into<String>, mode: Mode) -> Self {
        self.rules.push((agency_id.into(), mode));
        self
    }

    pub fn with_fallback(mut self, mode: Mode) -> Self {
        self.fallback = mode;
        self
    }

    pub fn resolve(&self, agency_id: &str) -> Mode {
        for (rule, mode) in &self.rules {
            if agency_id == rule {
                return *mode;
            }
        }
        for (rule, mode) in &self.rules {
            if agency_id.starts_with(rule.as_str()) {
                return *mode;
            }
        }
        self.fallback
    }
}

/// Read-only lookup tables over the parsed feed: which mode a route runs
/// under, and which route a trip belongs to. Populated once, then shared
/// freely between concurrent searches.
#[derive(Debug, Clone, Default)]
pub struct FeedIndex {
    route_modes: HashMap<Arc<str>, Mode>,
    trip_routes: HashMap<Arc<str>, Arc<str>>,
}

impl FeedIndex {
    pub fn new() -> Self {
        Default::default()
    }

    /// Streams the `routes` and `trips` tables out of the feed.
    pub fn from_feed(feed: &mut Feed, agencies: &AgencyModes) -> Result<Self, feed::Error> {
        let mut index = Self::new();
        feed.stream_routes(|route| {
            let mode = agencies.resolve(route.agency_id.as_deref().unwrap_or(""));
            index.insert_route(&route.route_id, mode);
        })?;
        debug!("Indexed {} routes", index.route_modes.len());
        feed.stream_trips(|trip| {
            index.insert_trip(&trip.trip_id, &trip.route_id);
        })?;
        debug!("Indexed {} trips", index.trip_routes.len());
        Ok(index)
    }

    pub fn insert_route(&mut self, route_id: &str, mode: Mode) {
        self.route_modes.insert(route_id.into(), mode);
    }

    pub fn insert_trip(&mut self, trip_id: &str, route_id: &str) {
        self.trip_routes.insert(trip_id.into(), route_id.into());
    }

    pub fn mode_of_route(&self, route_id: &str) -> Option<Mode> {
        self.route_modes.get(route_id).copied()
    }

    /// Resolves a trip to its mode through the trip->route mapping.
    /// `None` when either mapping is missing; callers decide the fallback.
    pub fn mode_of_trip(&self, trip_id: &str) -> Option<Mode> {
        let route_id = self.trip_routes.get(trip_id)?;
        self.route_modes.get(route_id).copied()
    }

    pub fn route_count(&self) -> usize {
        self.route_modes.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trip_routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cairo_agencies() -> AgencyModes {
        AgencyModes::new()
            .with_rule("M_CAI-METRO", Mode::Metro)
            .with_rule("MB_CAI_BUS", Mode::Microbus)
            .with_rule("B1_CAI_BUS", Mode::Bus)
    }

    #[test]
    fn agency_exact_match() {
        let agencies = cairo_agencies();
        assert_eq!(agencies.resolve("M_CAI-METRO"), Mode::Metro);
        assert_eq!(agencies.resolve("MB_CAI_BUS"), Mode::Microbus);
        assert_eq!(agencies.resolve("B1_CAI_BUS"), Mode::Bus);
    }

    #[test]
    fn agency_prefix_match() {
        let agencies = AgencyModes::new().with_rule("M_", Mode::Metro);
        assert_eq!(agencies.resolve("M_CAI-METRO"), Mode::Metro);
    }

    #[test]
    fn agency_unknown_falls_back_to_bus() {
        let agencies = cairo_agencies();
        assert_eq!(agencies.resolve("SOMETHING_ELSE"), Mode::Bus);
        assert_eq!(agencies.resolve(""), Mode::Bus);
    }

    #[test]
    fn trip_resolution_chains_through_route() {
        let mut index = FeedIndex::new();
        index.insert_route("R1", Mode::Metro);
        index.insert_trip("T1", "R1");
        index.insert_trip("T2", "R-missing");

        assert_eq!(index.mode_of_trip("T1"), Some(Mode::Metro));
        assert_eq!(index.mode_of_trip("T2"), None);
        assert_eq!(index.mode_of_trip("T-missing"), None);
    }
}
