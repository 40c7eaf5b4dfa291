use std::{sync::Arc, time::Instant};

use tracing::{debug, warn};

use crate::{
    config::Config,
    feed::{self, Feed, FeedIndex},
    graph::{NodeId, StopGraph, TripTag},
    shared::{Coordinate, Mode},
};

/// One-shot compiler from feed rows to an immutable [`StopGraph`].
///
/// Stops register as graph nodes immediately; stop-time rows are buffered
/// and compiled into edges by [`finish`](GraphBuilder::finish): transit
/// edges from consecutive stops of each trip, then walking transfer edges
/// between stops within walking range.
pub struct GraphBuilder<'a> {
    config: &'a Config,
    index: &'a FeedIndex,
    graph: StopGraph,
    stop_times: Vec<StopTimeEntry>,
}

struct StopTimeEntry {
    trip_id: String,
    stop_id: String,
    sequence: u32,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(index: &'a FeedIndex, config: &'a Config) -> Self {
        Self {
            config,
            index,
            graph: StopGraph::new(config),
            stop_times: Vec::new(),
        }
    }

    /// Streams the `stops` and `stop_times` tables straight out of the
    /// loader and compiles them.
    pub fn from_feed(
        feed: &mut Feed,
        index: &'a FeedIndex,
        config: &'a Config,
    ) -> Result<StopGraph, feed::Error> {
        let mut builder = Self::new(index, config);
        feed.stream_stops(|stop| {
            builder.add_stop(
                &stop.stop_id,
                &stop.stop_name,
                Coordinate::new(stop.latitude, stop.longitude),
            );
        })?;
        feed.stream_stop_times(|stop_time| {
            builder.add_stop_time(&stop_time.trip_id, &stop_time.stop_id, stop_time.stop_sequence);
        })?;
        Ok(builder.finish())
    }

    pub fn add_stop(&mut self, stop_id: &str, name: &str, coordinate: Coordinate) -> NodeId {
        self.graph.add_stop(stop_id, name, coordinate)
    }

    pub fn add_stop_time(&mut self, trip_id: &str, stop_id: &str, sequence: u32) {
        self.stop_times.push(StopTimeEntry {
            trip_id: trip_id.to_owned(),
            stop_id: stop_id.to_owned(),
            sequence,
        });
    }

    pub fn finish(mut self) -> StopGraph {
        let now = Instant::now();
        debug!("Compiling graph from {} stops", self.graph.len());
        self.build_transit_edges();
        self.build_walking_edges();
        debug!("Graph compilation took {:?}", now.elapsed());
        self.graph
    }

    fn build_transit_edges(&mut self) {
        // Rows pointing at unknown stops drop out before pairing, so a
        // trip chains across them instead of losing a whole edge.
        let graph = &self.graph;
        self.stop_times
            .retain(|entry| graph.node_by_id(&entry.stop_id).is_some());

        // Stable sort keeps equal (trip, sequence) pairs in input order,
        // so rebuilding from the same rows yields the same edge list.
        self.stop_times
            .sort_by(|a, b| (a.trip_id.as_str(), a.sequence).cmp(&(b.trip_id.as_str(), b.sequence)));

        let mut edge_count: usize = 0;
        let mut unresolved: usize = 0;
        let mut trip_tag: Option<(Arc<str>, Mode)> = None;

        for i in 1..self.stop_times.len() {
            let (prev, curr) = (&self.stop_times[i - 1], &self.stop_times[i]);
            if prev.trip_id != curr.trip_id {
                trip_tag = None;
                continue;
            }

            let (Some(from), Some(to)) = (
                self.graph.node_by_id(&prev.stop_id),
                self.graph.node_by_id(&curr.stop_id),
            ) else {
                continue;
            };

            let (tag, mode) = trip_tag
                .get_or_insert_with(|| {
                    let mode = match self.index.mode_of_trip(&curr.trip_id) {
                        Some(mode) => mode,
                        None => {
                            unresolved += 1;
                            Mode::Bus
                        }
                    };
                    (curr.trip_id.as_str().into(), mode)
                })
                .clone();

            let distance = self
                .graph
                .stop(from)
                .coordinate
                .distance(&self.graph.stop(to).coordinate);
            let weight = distance.travel_seconds(self.config.speed_of(mode)) + self.config.stop_dwell;

            self.graph
                .add_edge(from, to, weight, TripTag::Trip(tag.clone()), mode);
            edge_count += 1;

            // Microbus corridors run both ways; mirror the edge so the
            // sparse microbus network stays traversable.
            if mode == Mode::Microbus {
                self.graph.add_edge(to, from, weight, TripTag::Trip(tag), mode);
                edge_count += 1;
            }
        }

        if unresolved > 0 {
            warn!("{unresolved} trips had no route/mode mapping, treated as bus");
        }
        debug!("Created {edge_count} transit edges");
    }

    fn build_walking_edges(&mut self) {
        let max_walk = self.config.max_walk_distance;
        let mut transfer_count: usize = 0;

        for from in 0..self.graph.len() as NodeId {
            let coordinate = self.graph.stop(from).coordinate;
            // Each unordered pair is visited once, from its lower node.
            let neighbors: Vec<_> = self
                .graph
                .radius_query(&coordinate, max_walk)
                .into_iter()
                .filter(|(to, distance)| *to > from && distance.as_meters() > 0.0)
                .collect();

            for (to, distance) in neighbors {
                let weight = distance.travel_seconds(self.config.walk_speed);
                self.graph
                    .add_edge(from, to, weight, TripTag::Walk, Mode::Walk);
                self.graph
                    .add_edge(to, from, weight, TripTag::Walk, Mode::Walk);
                transfer_count += 1;
            }
        }

        debug!(
            "Created {transfer_count} walking transfer pairs (max {} m)",
            max_walk.as_meters()
        );
    }
}
