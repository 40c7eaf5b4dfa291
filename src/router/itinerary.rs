use serde::{
    Serialize,
    ser::{SerializeStruct, Serializer},
};

use crate::{
    config::Config,
    feed::FeedIndex,
    graph::{NodeId, StopGraph, TripTag},
    shared::{Coordinate, Distance, Mode},
};

/// A named point on the journey polyline: a stop, or one of the query
/// endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Place {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl Place {
    pub fn new(coordinate: Coordinate, name: impl Into<String>) -> Self {
        Self {
            lat: coordinate.latitude,
            lon: coordinate.longitude,
            name: name.into(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// How a segment is travelled. `Unknown` covers transit edges whose trip
/// never resolved through the feed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMethod {
    Walking,
    Bus,
    Metro,
    Microbus,
    Unknown,
}

impl From<Mode> for TravelMethod {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Metro => TravelMethod::Metro,
            Mode::Bus => TravelMethod::Bus,
            Mode::Microbus => TravelMethod::Microbus,
            Mode::Walk => TravelMethod::Walking,
        }
    }
}

impl TravelMethod {
    pub fn label(&self) -> &'static str {
        match self {
            TravelMethod::Walking => "walking",
            TravelMethod::Bus => "bus",
            TravelMethod::Metro => "metro",
            TravelMethod::Microbus => "microbus",
            TravelMethod::Unknown => "unknown",
        }
    }

    /// Cruise speed used for per-segment duration estimates. Unresolved
    /// methods fall back to walking pace.
    fn speed(&self, config: &Config) -> f64 {
        match self {
            TravelMethod::Bus => config.bus_speed,
            TravelMethod::Metro => config.metro_speed,
            TravelMethod::Microbus => config.microbus_speed,
            TravelMethod::Walking | TravelMethod::Unknown => config.walk_speed,
        }
    }
}

/// One user-visible leg of a journey.
///
/// `distance` is the straight-line length between the endpoints and
/// `duration` that distance at the method's cruise speed. Dwell times and
/// transfer penalties live in the journey's `total_duration`, not here,
/// so the segment durations do not sum to the total.
#[derive(Debug, Clone)]
pub struct RouteSegment {
    pub start: Place,
    pub end: Place,
    pub method: TravelMethod,
    pub num_stops: u32,
    pub distance: Distance,
    pub duration: f64,
}

impl RouteSegment {
    pub(crate) fn new(
        start: Place,
        end: Place,
        method: TravelMethod,
        num_stops: u32,
        config: &Config,
    ) -> Self {
        let distance = start.coordinate().distance(&end.coordinate());
        let duration = if distance.as_meters() > 0.0 {
            distance.travel_seconds(method.speed(config))
        } else {
            0.0
        };
        Self {
            start,
            end,
            method,
            num_stops,
            distance,
            duration,
        }
    }
}

impl Serialize for RouteSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RouteSegment", 6)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.serialize_field("method", &self.method)?;
        state.serialize_field("num_stops", &self.num_stops)?;
        state.serialize_field("distance_meters", &(self.distance.as_meters().round() as u64))?;
        state.serialize_field("duration_seconds", &(self.duration.round() as u64))?;
        state.end()
    }
}

/// A complete answer to one mode-masked query. `total_duration` is
/// positive infinity when no journey exists.
#[derive(Debug, Clone)]
pub struct RouteResult {
    pub label: String,
    pub total_duration: f64,
    pub segments: Vec<RouteSegment>,
}

impl RouteResult {
    /// The in-band "no journey" value: infinite duration, no segments.
    pub fn not_found(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            total_duration: f64::INFINITY,
            segments: Vec::new(),
        }
    }

    pub fn found(&self) -> bool {
        self.total_duration.is_finite()
    }

    pub fn total_duration_seconds(&self) -> Option<u64> {
        self.found().then(|| self.total_duration.round() as u64)
    }

    /// `"M min S sec"` rendering of the rounded total.
    pub fn formatted_duration(&self) -> Option<String> {
        self.total_duration_seconds()
            .map(|total| format!("{} min {} sec", total / 60, total % 60))
    }

    /// Sum of straight-line segment lengths.
    pub fn total_distance(&self) -> Distance {
        self.segments
            .iter()
            .fold(Distance::default(), |acc, segment| acc + segment.distance)
    }
}

impl Serialize for RouteResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RouteResult", 7)?;
        state.serialize_field("type", &self.label)?;
        state.serialize_field("found", &self.found())?;
        state.serialize_field("total_duration_seconds", &self.total_duration_seconds())?;
        state.serialize_field("total_duration_formatted", &self.formatted_duration())?;
        state.serialize_field("total_segments", &self.segments.len())?;
        state.serialize_field("segments", &self.segments)?;
        state.serialize_field("total_distance_meters", &self.total_distance().as_meters())?;
        state.end()
    }
}

/// Collapses a raw node path into user-visible segments: the walk from
/// the origin, transit runs grouped by trip, walks between transfers, and
/// the walk to the destination. Split out of the search loop so the
/// reconstruction rules are testable on hand-built parent arrays.
pub struct JourneyAssembler<'a> {
    graph: &'a StopGraph,
    index: &'a FeedIndex,
    config: &'a Config,
}

impl<'a> JourneyAssembler<'a> {
    pub fn new(graph: &'a StopGraph, index: &'a FeedIndex, config: &'a Config) -> Self {
        Self {
            graph,
            index,
            config,
        }
    }

    /// The degenerate one-segment journey: walk straight there.
    pub fn direct_walk(
        &self,
        label: &str,
        origin: Coordinate,
        destination: Coordinate,
    ) -> RouteResult {
        let segment = RouteSegment::new(
            Place::new(origin, "Origin"),
            Place::new(destination, "Destination"),
            TravelMethod::Walking,
            0,
            self.config,
        );
        RouteResult {
            label: label.to_owned(),
            total_duration: segment.duration,
            segments: vec![segment],
        }
    }

    /// Rebuilds the journey that ends at `end` from the search's parent
    /// and arrival-tag arrays.
    ///
    /// The leading walk segment is emitted even at zero length so every
    /// journey has the same walk/transit/walk structure.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        &self,
        label: &str,
        origin: Coordinate,
        destination: Coordinate,
        parents: &[Option<NodeId>],
        arrival_tags: &[TripTag],
        end: NodeId,
        total_duration: f64,
    ) -> RouteResult {
        let mut path = vec![end];
        let mut current = end;
        while let Some(parent) = parents[current as usize] {
            path.push(parent);
            current = parent;
        }
        path.reverse();

        let mut segments = Vec::new();
        segments.push(RouteSegment::new(
            Place::new(origin, "Origin"),
            self.stop_place(path[0]),
            TravelMethod::Walking,
            0,
            self.config,
        ));

        // Each maximal run of nodes sharing an arrival tag becomes one
        // segment; the tag on a node describes the edge that reached it.
        let mut group_start = 0;
        for i in 1..path.len() {
            let tag = &arrival_tags[path[i] as usize];
            let is_last = i == path.len() - 1;
            if is_last || arrival_tags[path[i + 1] as usize] != *tag {
                let method = self.method_of(tag);
                let num_stops = if method == TravelMethod::Walking {
                    0
                } else {
                    (i - group_start) as u32
                };
                segments.push(RouteSegment::new(
                    self.stop_place(path[group_start]),
                    self.stop_place(path[i]),
                    method,
                    num_stops,
                    self.config,
                ));
                group_start = i;
            }
        }

        segments.push(RouteSegment::new(
            self.stop_place(end),
            Place::new(destination, "Destination"),
            TravelMethod::Walking,
            0,
            self.config,
        ));

        RouteResult {
            label: label.to_owned(),
            total_duration,
            segments,
        }
    }

    fn stop_place(&self, node: NodeId) -> Place {
        let stop = self.graph.stop(node);
        Place::new(stop.coordinate, stop.name.as_ref())
    }

    fn method_of(&self, tag: &TripTag) -> TravelMethod {
        match tag {
            TripTag::Walk => TravelMethod::Walking,
            TripTag::Trip(trip_id) => self
                .index
                .mode_of_trip(trip_id)
                .map(Into::into)
                .unwrap_or(TravelMethod::Unknown),
        }
    }
}
