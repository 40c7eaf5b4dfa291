//! Multimodal urban transit routing engine.
//!
//! Compiles a static schedule feed (stops, routes, trips, stop sequences)
//! into a mode-tagged stop graph with walking transfer edges, then answers
//! point-to-point queries with up to four alternative journeys (bus-only,
//! metro-only, microbus-only, and a mode-agnostic optimal) via multi-source
//! A* with transfer penalties.
//!
//! ```no_run
//! use mishwar::prelude::*;
//!
//! # fn main() -> Result<(), mishwar::feed::Error> {
//! let agencies = AgencyModes::new()
//!     .with_rule("M_CAI-METRO", Mode::Metro)
//!     .with_rule("MB_CAI_BUS", Mode::Microbus);
//! let config = Config::default();
//!
//! let mut feed = Feed::default().from_dir("data/gtfs")?;
//! let index = FeedIndex::from_feed(&mut feed, &agencies)?;
//! let graph = GraphBuilder::from_feed(&mut feed, &index, &config)?;
//!
//! let router = Router::new(&graph, &index).with_config(config);
//! let routes = router.route_options(
//!     Coordinate::new(30.0444, 31.2357),
//!     Coordinate::new(30.0626, 31.2497),
//! );
//! assert_eq!(routes.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod feed;
pub mod graph;
pub mod router;
pub mod shared;

pub mod prelude {
    pub use crate::{
        config::Config,
        feed::{AgencyModes, Feed, FeedIndex},
        graph::{GraphBuilder, NodeId, StopGraph, TripTag},
        router::{JourneyAssembler, Place, RouteResult, RouteSegment, Router, TravelMethod},
        shared::{Coordinate, Distance, Mode, ModeMask},
    };
}
