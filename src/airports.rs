// Station name to airport code lookup, backed by the airline's station list

use serde::Deserialize;
use std::{collections::HashMap, fs::File, io::BufReader, io::Read, path::Path};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid station list: {0}")]
    Parse(#[from] serde_json::Error),
}

pub trait AirportCodes: Send + Sync + 'static {
    // None when the station name is not in the dataset
    fn code_for(&self, station_name: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationList {
    air_stations: Vec<Station>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Station {
    id: String,
    station_name: String,
}

#[derive(Debug, Default, Clone)]
pub struct StationDirectory {
    codes: HashMap<String, String>,
}

impl StationDirectory {
    // Reads {"airStations": [{"id": "DAL", "stationName": "Dallas (Love Field), TX"}]}
    pub fn from_json<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let list: StationList = serde_json::from_reader(reader)?;
        let mut codes = HashMap::with_capacity(list.air_stations.len());

        for station in list.air_stations {
            codes.entry(station.station_name).or_insert(station.id);
        }

        debug!("Loaded {} airport stations", codes.len());
        Ok(Self { codes })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let file = File::open(path)?;
        Self::from_json(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl AirportCodes for StationDirectory {
    fn code_for(&self, station_name: &str) -> Option<String> {
        self.codes.get(station_name).cloned()
    }
}
