use std::{collections::HashMap, sync::Arc};

mod builder;
mod grid;
pub use builder::*;
use grid::SpatialGrid;

use crate::{
    config::Config,
    shared::{Coordinate, Distance, Mode, ModeMask},
};

/// Dense stop index, contiguous `[0, N)` and stable for the life of the
/// graph.
pub type NodeId = u32;

/// The trip a graph edge belongs to: a scheduled vehicle trip, or the
/// walking sentinel for transfer edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripTag {
    Walk,
    Trip(Arc<str>),
}

impl TripTag {
    pub fn is_walk(&self) -> bool {
        matches!(self, TripTag::Walk)
    }
}

/// Directed edge. Weight is expected travel seconds; for transit edges the
/// tag resolves through the feed index to the same mode stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: NodeId,
    pub weight: f64,
    pub trip: TripTag,
    pub mode: Mode,
}

/// A stop and its outgoing adjacency.
///
/// `modes` is the set of transit modes whose trips visit this stop,
/// accumulated while edges are added. It drives mode-filtered stop
/// lookups; id-prefix conventions are deliberately not consulted.
#[derive(Debug, Clone)]
pub struct Stop {
    pub index: NodeId,
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub coordinate: Coordinate,
    pub modes: ModeMask,
    pub edges: Vec<Edge>,
}

/// Directed graph of stops with mode-tagged edges and a spatial grid for
/// radius lookups. Mutated only by [`GraphBuilder`]; read-only afterwards,
/// so any number of searches may share it without synchronization.
#[derive(Debug, Clone)]
pub struct StopGraph {
    stops: Vec<Stop>,
    lookup: HashMap<Arc<str>, NodeId>,
    grid: SpatialGrid,
}

impl StopGraph {
    pub fn new(config: &Config) -> Self {
        Self {
            stops: Vec::new(),
            lookup: HashMap::new(),
            grid: SpatialGrid::new(config.max_walk_distance),
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stop(&self, node: NodeId) -> &Stop {
        &self.stops[node as usize]
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn node_by_id(&self, external_id: &str) -> Option<NodeId> {
        self.lookup.get(external_id).copied()
    }

    /// Registers a stop and returns its node index. Idempotent on the
    /// external id: a repeated id returns the existing node untouched.
    pub fn add_stop(&mut self, external_id: &str, name: &str, coordinate: Coordinate) -> NodeId {
        if let Some(existing) = self.lookup.get(external_id) {
            return *existing;
        }
        let index = self.stops.len() as NodeId;
        let id: Arc<str> = external_id.into();
        self.stops.push(Stop {
            index,
            id: id.clone(),
            name: name.into(),
            coordinate,
            modes: ModeMask::NONE,
            edges: Vec::new(),
        });
        self.lookup.insert(id, index);
        self.grid.insert(index, &coordinate);
        index
    }

    /// Appends a directed edge. Parallel edges between the same pair are
    /// legal (distinct trips produce them). Transit edges also record
    /// their mode on both endpoints' eligibility sets.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: f64, trip: TripTag, mode: Mode) {
        if from as usize >= self.stops.len() || to as usize >= self.stops.len() {
            return;
        }
        if mode != Mode::Walk {
            self.stops[from as usize].modes |= mode;
            self.stops[to as usize].modes |= mode;
        }
        self.stops[from as usize].edges.push(Edge {
            to,
            weight,
            trip,
            mode,
        });
    }

    /// Closest stop by great-circle distance. `None` only on an empty
    /// graph.
    pub fn nearest(&self, coordinate: &Coordinate) -> Option<NodeId> {
        self.stops
            .iter()
            .min_by(|a, b| {
                let da = a.coordinate.distance(coordinate).as_meters();
                let db = b.coordinate.distance(coordinate).as_meters();
                da.total_cmp(&db)
            })
            .map(|stop| stop.index)
    }

    /// Closest stop served by any mode in `mask`. When no such stop lies
    /// within `fallback_radius`, degrades to the unrestricted
    /// [`nearest`](Self::nearest) lookup.
    pub fn nearest_in_modes(
        &self,
        coordinate: &Coordinate,
        mask: ModeMask,
        fallback_radius: Distance,
    ) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for stop in &self.stops {
            if !stop.modes.intersects(mask) {
                continue;
            }
            let distance = stop.coordinate.distance(coordinate).as_meters();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((stop.index, distance));
            }
        }
        match best {
            Some((node, distance)) if distance <= fallback_radius.as_meters() => Some(node),
            _ => self.nearest(coordinate),
        }
    }

    /// Every stop within `radius` meters, with exact distances. Order is
    /// the grid sweep order; callers must not rely on it.
    pub fn radius_query(
        &self,
        coordinate: &Coordinate,
        radius: Distance,
    ) -> Vec<(NodeId, Distance)> {
        self.grid
            .candidates(coordinate, radius)
            .into_iter()
            .filter_map(|node| {
                let distance = self.stops[node as usize].coordinate.distance(coordinate);
                (distance <= radius).then_some((node, distance))
            })
            .collect()
    }

    /// [`radius_query`](Self::radius_query) restricted to stops usable by
    /// the given modes.
    pub fn radius_query_in_modes(
        &self,
        coordinate: &Coordinate,
        radius: Distance,
        mask: ModeMask,
    ) -> Vec<(NodeId, Distance)> {
        self.radius_query(coordinate, radius)
            .into_iter()
            .filter(|(node, _)| self.stops[*node as usize].modes.intersects(mask))
            .collect()
    }
}
