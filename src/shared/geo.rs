use std::{
    cmp,
    fmt::Display,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used for all great-circle math.
pub(crate) const EARTH_RADIUS: f64 = 6_371_000.0;

/// Meters spanned by one degree of longitude at the equator.
pub(crate) const LONGITUDE_DISTANCE: f64 = 111_320.0;
/// Meters spanned by one degree of latitude.
pub(crate) const LATITUDE_DISTANCE: f64 = 110_540.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

impl Sub for Distance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Distance {
    pub const fn meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }

    /// Seconds needed to cover this distance at `speed` meters per second.
    pub fn travel_seconds(&self, speed: f64) -> f64 {
        self.0 / speed
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance via the haversine formula.
    ///
    /// The `atan2(sqrt(a), sqrt(1 - a))` form stays numerically stable for
    /// distances down to a few meters.
    pub fn distance(&self, coord: &Self) -> Distance {
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::meters(EARTH_RADIUS * c)
    }

    /// A coordinate is usable when both components are finite and inside
    /// the WGS84 value range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

#[test]
fn distance_paris_london() {
    let coord_a = Coordinate::new(48.85800943005911, 2.3514350059357927);
    let coord_b = Coordinate::new(51.5052389927712, -0.12495407345099824);
    let d = coord_a.distance(&coord_b);
    assert!((d.as_kilometers() - 343.0).abs() < 2.0);
}

#[test]
fn distance_small_scale() {
    // Two points ~15.6 m apart along a meridian.
    let coord_a = Coordinate::new(30.0000, 31.2000);
    let coord_b = Coordinate::new(30.00014, 31.2000);
    let d = coord_a.distance(&coord_b);
    assert!((d.as_meters() - 15.57).abs() < 0.1);
}

#[test]
fn distance_zero() {
    let coord = Coordinate::new(30.05, 31.25);
    assert_eq!(coord.distance(&coord).as_meters(), 0.0);
}

#[test]
fn distance_symmetric() {
    let coord_a = Coordinate::new(30.0444, 31.2357);
    let coord_b = Coordinate::new(30.0626, 31.2497);
    let ab = coord_a.distance(&coord_b);
    let ba = coord_b.distance(&coord_a);
    assert!((ab.as_meters() - ba.as_meters()).abs() < 1e-9);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::meters(1000.0);
    let dist_b = Distance::kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::meters(1000.0);
    let dist_b = Distance::kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn coordinate_validity() {
    assert!(Coordinate::new(30.0, 31.0).is_valid());
    assert!(!Coordinate::new(f64::NAN, 31.0).is_valid());
    assert!(!Coordinate::new(91.0, 31.0).is_valid());
    assert!(!Coordinate::new(30.0, 181.0).is_valid());
}
