//! Airport coordinates.
//!
//! The database is a JSON object keyed by airport code:
//!
//! ```json
//! { "EGLL": { "icao": "EGLL", "name": "London Heathrow", "lat": 51.4706, "lon": -0.461941 } }
//! ```
//!
//! Only `lat` and `lon` are read; any other fields are ignored.
//!
//! A database of major airports is compiled into the binary. A file given in
//! the configuration replaces it.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Name reported for the compiled-in database.
pub const BUNDLED_NAME: &str = "<bundled airports.json>";

const BUNDLED: &str = include_str!("../assets/airports.json");

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, north positive.
    pub lat: f64,
    /// Longitude, east positive.
    pub lon: f64,
}

/// Airport code to position lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirportDb {
    airports: HashMap<String, GeoPoint>,
}

impl AirportDb {
    /// Load the database from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AirportDb`] if the file cannot be read or is not a JSON
    /// object of airports with `lat`/`lon` fields.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::airport_db(path, e.to_string()))?;
        let db = Self::from_json(&text).map_err(|e| Error::airport_db(path, e.to_string()))?;
        info!(path = %path.display(), airports = db.len(), "airport database loaded");
        Ok(db)
    }

    /// The compiled-in database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AirportDb`] if the bundled JSON does not parse.
    pub fn bundled() -> Result<Self> {
        let db = Self::from_json(BUNDLED)
            .map_err(|e| Error::airport_db(BUNDLED_NAME, e.to_string()))?;
        debug!(airports = db.len(), "bundled airport database loaded");
        Ok(db)
    }

    /// Load `path` if given, the bundled database otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AirportDb`] if the selected database cannot be loaded.
    pub fn load_or_bundled(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    /// Parse the database from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text does not have the expected shape.
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let airports: HashMap<String, GeoPoint> = serde_json::from_str(text)?;
        Ok(Self { airports })
    }

    /// Position of `code`, if known. Codes are matched exactly.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<GeoPoint> {
        self.airports.get(code).copied()
    }

    /// Number of airports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// True when the database holds no airports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

impl FromIterator<(String, GeoPoint)> for AirportDb {
    fn from_iter<I: IntoIterator<Item = (String, GeoPoint)>>(iter: I) -> Self {
        Self {
            airports: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "EGLL": {"icao": "EGLL", "iata": "LHR", "name": "Heathrow", "elevation": 83, "lat": 51.4706, "lon": -0.461941},
        "LFPG": {"lat": 49.0097, "lon": 2.5479}
    }"#;

    #[test]
    fn test_parse_ignores_extra_fields() {
        let db = AirportDb::from_json(SAMPLE).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(
            db.lookup("EGLL"),
            Some(GeoPoint {
                lat: 51.4706,
                lon: -0.461941
            })
        );
        assert!(db.lookup("KJFK").is_none());
        assert!(db.lookup("egll").is_none());
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        assert!(AirportDb::from_json(r#"{"EGLL": {"name": "Heathrow"}}"#).is_err());
        assert!(AirportDb::from_json("[]").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airports.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let db = AirportDb::load(&path).unwrap();
        assert!(db.lookup("LFPG").is_some());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            AirportDb::load(&missing),
            Err(Error::AirportDb { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        let err = AirportDb::load(&broken).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_bundled_database() {
        let db = AirportDb::bundled().unwrap();
        assert!(db.len() > 100);
        let heathrow = db.lookup("EGLL").unwrap();
        assert!((heathrow.lat - 51.47).abs() < 0.01);
        assert!((heathrow.lon + 0.46).abs() < 0.01);
        assert!(db.lookup("LFPG").is_some());
        assert!(db.lookup("KJFK").is_some());
    }

    #[test]
    fn test_bundled_coordinates_in_range() {
        let text = BUNDLED;
        let raw: HashMap<String, GeoPoint> = serde_json::from_str(text).unwrap();
        for (code, point) in raw {
            assert_eq!(code.len(), 4, "{code}");
            assert!((-90.0..=90.0).contains(&point.lat), "{code}");
            assert!((-180.0..=180.0).contains(&point.lon), "{code}");
        }
    }

    #[test]
    fn test_file_replaces_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airports.json");
        std::fs::write(&path, r#"{"ZZZZ": {"lat": 1.0, "lon": 2.0}}"#).unwrap();

        let db = AirportDb::load_or_bundled(Some(&path)).unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.lookup("EGLL").is_none());

        let db = AirportDb::load_or_bundled(None).unwrap();
        assert!(db.lookup("EGLL").is_some());
    }

    #[test]
    fn test_from_iterator() {
        let db: AirportDb = [("EDDF".to_string(), GeoPoint { lat: 50.03, lon: 8.57 })]
            .into_iter()
            .collect();
        assert!(!db.is_empty());
        assert!(db.lookup("EDDF").is_some());
    }
}
