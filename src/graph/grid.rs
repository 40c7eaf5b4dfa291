use std::collections::HashMap;

use crate::{
    graph::NodeId,
    shared::geo::{Coordinate, Distance, LATITUDE_DISTANCE, LONGITUDE_DISTANCE},
};

/// Uniform-cell 2-D hash of stop positions.
///
/// Cell coordinates are derived from fixed meters-per-degree factors, so a
/// cell spans `cell_size` meters north-south but shrinks east-west by
/// `cos(latitude)`. [`candidates`](SpatialGrid::candidates) widens its
/// sweep accordingly; callers always get a superset of the stops inside
/// the query disk and filter by exact distance.
///
/// The `(i32, i32)` key keeps distinct cells distinct over the whole
/// coordinate range; no pairing arithmetic that could collide.
#[derive(Debug, Clone)]
pub(crate) struct SpatialGrid {
    cells: HashMap<(i32, i32), Vec<NodeId>>,
    cell_size: f64,
}

impl SpatialGrid {
    pub fn new(cell_size: Distance) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size: cell_size.as_meters(),
        }
    }

    pub fn insert(&mut self, node: NodeId, coordinate: &Coordinate) {
        let cell = self.cell(coordinate);
        self.cells.entry(cell).or_default().push(node);
    }

    fn cell(&self, coordinate: &Coordinate) -> (i32, i32) {
        let x = (coordinate.longitude * LONGITUDE_DISTANCE / self.cell_size).floor() as i32;
        let y = (coordinate.latitude * LATITUDE_DISTANCE / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Every node whose cell intersects the disk around `center`. Sweep
    /// order is fixed (row-major over the neighborhood, insertion order
    /// within a cell), which keeps downstream edge generation
    /// reproducible.
    pub fn candidates(&self, center: &Coordinate, radius: Distance) -> Vec<NodeId> {
        let (cx, cy) = self.cell(center);
        let radius = radius.as_meters();

        // East-west cells cover cell_size * cos(lat) real meters.
        let shrink = center.latitude.to_radians().cos().abs().max(0.05);
        let reach_x = (radius / (self.cell_size * shrink)).ceil() as i32;
        let reach_y = (radius / self.cell_size).ceil() as i32;

        let mut nodes = Vec::new();
        for dy in -reach_y..=reach_y {
            for dx in -reach_x..=reach_x {
                if let Some(cell) = self.cells.get(&(cx + dx, cy + dy)) {
                    nodes.extend_from_slice(cell);
                }
            }
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_stops(stops: &[Coordinate]) -> SpatialGrid {
        let mut grid = SpatialGrid::new(Distance::meters(1_500.0));
        for (i, coordinate) in stops.iter().enumerate() {
            grid.insert(i as NodeId, coordinate);
        }
        grid
    }

    /// Deterministic scatter of coordinates around a center point.
    fn scatter(center: Coordinate, count: usize, spread_deg: f64) -> Vec<Coordinate> {
        let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..count)
            .map(|_| {
                Coordinate::new(
                    center.latitude + (next() - 0.5) * spread_deg,
                    center.longitude + (next() - 0.5) * spread_deg,
                )
            })
            .collect()
    }

    #[test]
    fn candidates_cover_query_disk() {
        let center = Coordinate::new(30.05, 31.25);
        let stops = scatter(center, 300, 0.12);
        let grid = grid_with_stops(&stops);

        for radius in [200.0, 750.0, 1_500.0, 4_000.0, 6_000.0] {
            let radius = Distance::meters(radius);
            let candidates = grid.candidates(&center, radius);
            for (i, coordinate) in stops.iter().enumerate() {
                if center.distance(coordinate) <= radius {
                    assert!(
                        candidates.contains(&(i as NodeId)),
                        "stop {i} inside {:.0} m disk missing from sweep",
                        radius.as_meters()
                    );
                }
            }
        }
    }

    #[test]
    fn candidates_stable_order() {
        let center = Coordinate::new(30.05, 31.25);
        let stops = scatter(center, 100, 0.05);
        let grid = grid_with_stops(&stops);
        let a = grid.candidates(&center, Distance::meters(1_500.0));
        let b = grid.candidates(&center, Distance::meters(1_500.0));
        assert_eq!(a, b);
    }

    #[test]
    fn negative_coordinates_bucket_cleanly() {
        let center = Coordinate::new(-33.45, -70.66);
        let stops = scatter(center, 150, 0.08);
        let grid = grid_with_stops(&stops);
        let radius = Distance::meters(1_500.0);
        let candidates = grid.candidates(&center, radius);
        for (i, coordinate) in stops.iter().enumerate() {
            if center.distance(coordinate) <= radius {
                assert!(candidates.contains(&(i as NodeId)));
            }
        }
    }
}
