use csv::StringRecord;
use serde::Deserialize;

/// One row of the `routes` table. Only the identity and agency columns are
/// load-bearing; the rest is carried for display purposes.
#[derive(Deserialize, Debug, Clone)]
pub struct RouteRow {
    pub route_id: String,
    #[serde(default)]
    pub agency_id: Option<String>,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_type: Option<i32>,
}

/// One row of the `trips` table.
#[derive(Deserialize, Debug, Clone)]
pub struct TripRow {
    pub route_id: String,
    #[serde(default)]
    pub service_id: Option<String>,
    pub trip_id: String,
}

/// One row of the `stop_times` table. Arrival/departure columns are
/// ignored: edge weights come from the physics model, not the timetable.
#[derive(Deserialize, Debug, Clone)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// One row of the `stops` table.
///
/// Stops are decoded positionally because feed dialects disagree on where
/// the position lives: standard feeds put lat/lon at columns 4-5 (after
/// `stop_code` and `stop_desc`), trimmed feeds at columns 2-3.
#[derive(Debug, Clone)]
pub struct StopRow {
    pub stop_id: String,
    pub stop_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StopRow {
    pub fn from_record(record: &StringRecord) -> Option<Self> {
        if record.len() < 4 {
            return None;
        }
        let stop_id = record.get(0)?.trim();
        let stop_name = record.get(1)?.trim();
        if stop_id.is_empty() {
            return None;
        }
        let (latitude, longitude) = Self::position(record)?;
        Some(Self {
            stop_id: stop_id.to_owned(),
            stop_name: stop_name.to_owned(),
            latitude,
            longitude,
        })
    }

    fn position(record: &StringRecord) -> Option<(f64, f64)> {
        if record.len() >= 6
            && let Some(position) = Self::parse_pair(record, 4, 5)
        {
            return Some(position);
        }
        Self::parse_pair(record, 2, 3)
    }

    fn parse_pair(record: &StringRecord, lat_idx: usize, lon_idx: usize) -> Option<(f64, f64)> {
        let latitude: f64 = record.get(lat_idx)?.trim().parse().ok()?;
        let longitude: f64 = record.get(lon_idx)?.trim().parse().ok()?;
        Some((latitude, longitude))
    }
}
