use std::{fs::File, path::Path};

use csv::Reader;

use crate::route::{self, RouteStopRecord, RouteTable, Stop};

impl RouteTable {
    /// Loads the route-stop CSV artifact from disk.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self, route::Error> {
        let file = File::open(path)?;
        let mut rdr = Reader::from_reader(file);
        let mut stops: Vec<Stop> = Vec::new();
        for result in rdr.deserialize() {
            let record: RouteStopRecord = result?;
            stops.push(record.into());
        }
        Self::from_stops(stops)
    }
}
