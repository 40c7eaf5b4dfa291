use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;
use zip::ZipArchive;

mod index;
pub mod models;
pub use index::*;
pub use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
}

/// Table file names inside the feed. Both `.txt` (standard) and `.csv`
/// siblings are accepted; the configured name is tried first.
pub struct FeedConfig {
    pub routes_file: String,
    pub trips_file: String,
    pub stops_file: String,
    pub stop_times_file: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            routes_file: "routes.txt".into(),
            trips_file: "trips.txt".into(),
            stops_file: "stops.txt".into(),
            stop_times_file: "stop_times.txt".into(),
        }
    }
}

#[derive(Default)]
enum Storage {
    #[default]
    None,
    Zip(ZipArchive<File>),
    Dir(PathBuf),
}

/// Streaming access to a schedule feed stored as a directory of CSV
/// tables or a zip archive of the same.
#[derive(Default)]
pub struct Feed {
    config: FeedConfig,
    storage: Storage,
}

impl Feed {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            storage: Storage::None,
        }
    }

    pub fn from_zip<P: AsRef<Path>>(mut self, path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        self.storage = Storage::Zip(ZipArchive::new(file)?);
        Ok(self)
    }

    pub fn from_dir<P: AsRef<Path>>(mut self, path: P) -> Result<Self, Error> {
        self.storage = Storage::Dir(path.as_ref().to_path_buf());
        Ok(self)
    }

    pub fn stream_routes<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnMut(RouteRow),
    {
        let name = self.config.routes_file.clone();
        self.stream_typed(&name, f)
    }

    pub fn stream_trips<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnMut(TripRow),
    {
        let name = self.config.trips_file.clone();
        self.stream_typed(&name, f)
    }

    pub fn stream_stop_times<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnMut(StopTimeRow),
    {
        let name = self.config.stop_times_file.clone();
        self.stream_typed(&name, f)
    }

    /// Stops are decoded positionally (see [`StopRow`]); rows without a
    /// usable position are dropped.
    pub fn stream_stops<F>(&mut self, mut f: F) -> Result<(), Error>
    where
        F: FnMut(StopRow),
    {
        let name = self.config.stops_file.clone();
        let reader = self.open(&name)?;
        let mut reader = csv::Reader::from_reader(reader);
        for record in reader.records() {
            let record = record?;
            if let Some(row) = StopRow::from_record(&record) {
                f(row);
            }
        }
        Ok(())
    }

    fn stream_typed<T, F>(&mut self, name: &str, f: F) -> Result<(), Error>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        let reader = self.open(name)?;
        let mut reader = csv::Reader::from_reader(reader);
        reader.deserialize().filter_map(|row| row.ok()).for_each(f);
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<Box<dyn Read + '_>, Error> {
        let fallback = swap_extension(name);
        match &mut self.storage {
            Storage::None => Err(Error::FileNotFound(name.to_owned())),
            Storage::Zip(archive) => {
                let index = archive
                    .index_for_name(name)
                    .or_else(|| fallback.as_deref().and_then(|n| archive.index_for_name(n)))
                    .ok_or_else(|| Error::FileNotFound(name.to_owned()))?;
                Ok(Box::new(archive.by_index(index)?))
            }
            Storage::Dir(dir) => {
                let mut path = dir.join(name);
                if !path.is_file()
                    && let Some(other) = &fallback
                {
                    path = dir.join(other);
                }
                if !path.is_file() {
                    return Err(Error::FileNotFound(name.to_owned()));
                }
                Ok(Box::new(File::open(path)?))
            }
        }
    }
}

/// `routes.txt` <-> `routes.csv`; feeds in the wild ship either.
fn swap_extension(name: &str) -> Option<String> {
    name.strip_suffix(".txt")
        .map(|stem| format!("{stem}.csv"))
        .or_else(|| name.strip_suffix(".csv").map(|stem| format!("{stem}.txt")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_swap() {
        assert_eq!(swap_extension("stops.txt").as_deref(), Some("stops.csv"));
        assert_eq!(swap_extension("stops.csv").as_deref(), Some("stops.txt"));
        assert_eq!(swap_extension("stops.dat"), None);
    }

    #[test]
    fn empty_storage_reports_missing_file() {
        let mut feed = Feed::default();
        let result = feed.stream_stops(|_| {});
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
