//! Airports and routes flown.
//!
//! [`MapData::build`] collects the unique airports and routes of the flights
//! matching a [`MapFilter`]. [`MapData::primitives`] resolves them against the
//! airport database into points and lines, which [`render_png`] rasterizes.

mod render;

pub use render::{render_png, DEFAULT_HEIGHT, DEFAULT_WIDTH};

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::airports::{AirportDb, GeoPoint};
use crate::record::FlightRecord;
use crate::totals::TotalsRecord;

/// Which flights contribute to the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFilter {
    /// Keep flights whose date contains this text. Empty keeps all.
    pub date: String,
    /// Collect routes as well as airports.
    pub include_routes: bool,
}

impl Default for MapFilter {
    fn default() -> Self {
        Self {
            date: String::new(),
            include_routes: true,
        }
    }
}

impl MapFilter {
    /// True when `record` passes the date filter.
    #[must_use]
    pub fn matches(&self, record: &FlightRecord) -> bool {
        self.date.is_empty() || record.date.contains(&self.date)
    }
}

/// A directed leg between two airports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route {
    /// Departure code.
    pub from: String,
    /// Arrival code.
    pub to: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Unique airports and routes of the selected flights, plus their totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    /// Airport codes visited.
    pub airports: HashSet<String>,
    /// Routes flown.
    pub routes: HashSet<Route>,
    /// Totals of the selected flights.
    pub totals: TotalsRecord,
}

/// Drawing primitives in geographic coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapPrimitives {
    /// Airport markers.
    pub markers: Vec<GeoPoint>,
    /// Route lines.
    pub lines: Vec<(GeoPoint, GeoPoint)>,
}

impl MapPrimitives {
    /// True when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.lines.is_empty()
    }
}

impl MapData {
    /// Aggregate `records` that pass `filter`.
    pub fn build<'a, I>(records: I, filter: &MapFilter) -> Self
    where
        I: IntoIterator<Item = &'a FlightRecord>,
    {
        let mut data = Self::default();
        for record in records.into_iter().filter(|r| filter.matches(r)) {
            let from = &record.departure.place;
            let to = &record.arrival.place;
            data.airports.insert(from.clone());
            data.airports.insert(to.clone());
            if filter.include_routes && from != to {
                data.routes.insert(Route {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
            data.totals = data.totals.fold(record);
        }
        debug!(
            airports = data.airports.len(),
            routes = data.routes.len(),
            "map data collected"
        );
        data
    }

    /// Resolve airports and routes to coordinates. Codes missing from `db`
    /// are skipped.
    #[must_use]
    pub fn primitives(&self, db: &AirportDb) -> MapPrimitives {
        let mut markers = Vec::with_capacity(self.airports.len());
        for code in &self.airports {
            match db.lookup(code) {
                Some(point) => markers.push(point),
                None => debug!(code = %code, "airport not in database, marker skipped"),
            }
        }

        let mut lines = Vec::with_capacity(self.routes.len());
        for route in &self.routes {
            match (db.lookup(&route.from), db.lookup(&route.to)) {
                (Some(from), Some(to)) => lines.push((from, to)),
                _ => debug!(route = %route, "route endpoint not in database, line skipped"),
            }
        }

        MapPrimitives { markers, lines }
    }
}
