//! `logbook` - Export a pilot flight log to an EASA logbook
//!
//! This library reads flight rows from a spreadsheet, paginates them into a
//! PDF logbook with per-page and running totals, and renders a map of the
//! airports and routes flown.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod airports;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod font;
pub mod layout;
pub mod logging;
pub mod map;
pub mod paginate;
pub mod record;
pub mod render;
pub mod source;
pub mod time;
pub mod totals;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use paginate::{paginate, PageSink, PaginationSummary};
pub use record::FlightRecord;
pub use time::Duration;
pub use totals::TotalsRecord;
