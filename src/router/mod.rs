use std::collections::{BinaryHeap, HashMap};

use rayon::prelude::*;
use tracing::{debug, trace};

mod itinerary;
mod state;
pub use itinerary::*;
use state::SearchState;

use crate::{
    config::Config,
    feed::FeedIndex,
    graph::{NodeId, StopGraph, TripTag},
    shared::{Coordinate, Distance, ModeMask},
};

/// The four labelled variants every query is answered with, in response
/// order.
const QUERY_MASKS: [(ModeMask, &str); 4] = [
    (ModeMask::BUS.with_walk(), "bus_only"),
    (ModeMask::METRO.with_walk(), "metro_only"),
    (ModeMask::MICROBUS.with_walk(), "microbus_only"),
    (ModeMask::ANY.with_walk(), "optimal"),
];

/// Multi-source / multi-target A* over a [`StopGraph`].
///
/// A router borrows the immutable graph and feed index; every call to
/// [`search`](Router::search) owns its frontier and per-node scratch
/// arrays, so one router may serve any number of concurrent searches.
///
/// # Search shape
/// Boarding candidates are every stop within walking range of the origin
/// and alighting candidates every stop within range of the destination,
/// discovered at escalating radii. The search seeds all boarding stops at
/// their walk-in cost and runs until the frontier drains, tracking the
/// best `g + walk-out` total over the alighting set. A direct
/// origin-to-destination walk competes with transit whenever the crow-fly
/// distance allows it.
pub struct Router<'a> {
    graph: &'a StopGraph,
    index: &'a FeedIndex,
    config: Config,
    cancel: Option<&'a (dyn Fn() -> bool + Sync)>,
}

impl<'a> Router<'a> {
    pub fn new(graph: &'a StopGraph, index: &'a FeedIndex) -> Self {
        Self {
            graph,
            index,
            config: Config::default(),
            cancel: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Installs a cooperative cancellation probe, checked once per queue
    /// pop. A cancelled search reports "no journey".
    pub fn with_cancel(mut self, cancel: &'a (dyn Fn() -> bool + Sync)) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Answers one query with the four standard variants (`bus_only`,
    /// `metro_only`, `microbus_only`, `optimal`). The searches are
    /// independent and run in parallel.
    pub fn route_options(&self, origin: Coordinate, destination: Coordinate) -> Vec<RouteResult> {
        QUERY_MASKS
            .par_iter()
            .map(|(mask, label)| self.search(origin, destination, *mask, label))
            .collect()
    }

    /// Minimum-expected-time journey from `origin` to `destination` using
    /// only edges allowed by `mask`. Never fails: bad input, an empty
    /// graph, or an unreachable destination all come back as a result
    /// with `found() == false`.
    pub fn search(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mask: ModeMask,
        label: &str,
    ) -> RouteResult {
        if !origin.is_valid() || !destination.is_valid() {
            return RouteResult::not_found(label);
        }

        let assembler = JourneyAssembler::new(self.graph, self.index, &self.config);
        let crow_fly = origin.distance(&destination);
        let direct_walkable =
            crow_fly.as_meters() <= 2.0 * self.config.max_walk_distance.as_meters();

        let (boarding, alighting) = self.candidate_sets(&origin, &destination, mask);
        if boarding.is_empty() || alighting.is_empty() {
            return if direct_walkable {
                assembler.direct_walk(label, origin, destination)
            } else {
                RouteResult::not_found(label)
            };
        }

        // Per-search scratch; released on return.
        let n = self.graph.len();
        let mut g_score = vec![f64::INFINITY; n];
        let mut parents: Vec<Option<NodeId>> = vec![None; n];
        let mut arrival_tags = vec![TripTag::Walk; n];
        let mut queue: BinaryHeap<SearchState> = BinaryHeap::new();

        let alight_walk: HashMap<NodeId, f64> = alighting
            .into_iter()
            .map(|(node, distance)| (node, distance.travel_seconds(self.config.walk_speed)))
            .collect();

        for (node, distance) in boarding {
            let g = distance.travel_seconds(self.config.walk_speed);
            if g < g_score[node as usize] {
                g_score[node as usize] = g;
                queue.push(SearchState {
                    node,
                    g_score: g,
                    f_score: g + self.heuristic(node, &destination),
                    arrival: TripTag::Walk,
                });
            }
        }

        // Best complete journey so far; the direct walk competes from the
        // start. `best_end = None` means the direct walk is winning.
        let mut best_total = if direct_walkable {
            crow_fly.travel_seconds(self.config.walk_speed)
        } else {
            f64::INFINITY
        };
        let mut best_end: Option<NodeId> = None;

        while let Some(state) = queue.pop() {
            if self.cancel.is_some_and(|cancelled| cancelled()) {
                debug!("Search '{label}' cancelled");
                return RouteResult::not_found(label);
            }
            if state.g_score > g_score[state.node as usize] {
                continue; // superseded entry
            }
            if state.g_score >= best_total {
                continue; // cannot improve on the best complete journey
            }

            if let Some(walk_out) = alight_walk.get(&state.node) {
                let total = state.g_score + walk_out;
                if total < best_total {
                    best_total = total;
                    best_end = Some(state.node);
                }
            }

            for edge in &self.graph.stop(state.node).edges {
                if !mask.contains(edge.mode) {
                    continue;
                }
                let mut cost = edge.weight;
                // Hopping between two distinct vehicle trips costs a
                // transfer; walking legs on either side never do.
                if let (TripTag::Trip(arrived), TripTag::Trip(next)) = (&state.arrival, &edge.trip)
                    && arrived != next
                {
                    cost += self.config.transfer_penalty;
                }

                let tentative = state.g_score + cost;
                if tentative < g_score[edge.to as usize] {
                    g_score[edge.to as usize] = tentative;
                    parents[edge.to as usize] = Some(state.node);
                    arrival_tags[edge.to as usize] = edge.trip.clone();
                    queue.push(SearchState {
                        node: edge.to,
                        g_score: tentative,
                        f_score: tentative + self.heuristic(edge.to, &destination),
                        arrival: edge.trip.clone(),
                    });
                }
            }
        }

        match best_end {
            Some(end) => assembler.assemble(
                label,
                origin,
                destination,
                &parents,
                &arrival_tags,
                end,
                best_total,
            ),
            None if best_total.is_finite() => assembler.direct_walk(label, origin, destination),
            None => RouteResult::not_found(label),
        }
    }

    /// Optimistic remaining seconds: crow-fly distance at the network's
    /// speed ceiling. Admissible as long as no mode outruns
    /// `config.max_speed`.
    fn heuristic(&self, node: NodeId, destination: &Coordinate) -> f64 {
        self.graph
            .stop(node)
            .coordinate
            .distance(destination)
            .travel_seconds(self.config.max_speed)
    }

    /// Boarding and alighting candidates at the first escalation radius
    /// where both sets are populated.
    #[allow(clippy::type_complexity)]
    fn candidate_sets(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
        mask: ModeMask,
    ) -> (Vec<(NodeId, Distance)>, Vec<(NodeId, Distance)>) {
        for radius in self.config.search_radii {
            let boarding = self.graph.radius_query_in_modes(origin, radius, mask);
            let alighting = self.graph.radius_query_in_modes(destination, radius, mask);
            if !boarding.is_empty() && !alighting.is_empty() {
                trace!(
                    "Radius {} m: {} boarding / {} alighting candidates",
                    radius.as_meters(),
                    boarding.len(),
                    alighting.len()
                );
                return (boarding, alighting);
            }
        }
        (Vec::new(), Vec::new())
    }
}
