//! Export pipelines.
//!
//! Each pipeline reads the source once, builds its output fully in memory and
//! writes the file only after everything succeeded.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::airports::AirportDb;
use crate::config::{LogbookConfig, MapConfig};
use crate::error::{Error, Result};
use crate::map::{render_png, MapData, MapFilter};
use crate::paginate::{paginate, PageBreaks, PageSettings, PaginationSummary, DEFAULT_PAGE_CAPACITY};
use crate::record::{parse_rows, FlightRecord, Landings};
use crate::render::{LogbookWriter, PdfCanvas};
use crate::source::SourceReader;
use crate::time::Duration;

const PDF_TITLE: &str = "Pilot Logbook";

/// Fetch and decode every row of `source`.
///
/// # Errors
///
/// Returns the source error, or the first malformed row.
pub fn load_records(source: &dyn SourceReader) -> Result<Vec<FlightRecord>> {
    info!(source = %source.describe(), "reading flights");
    let rows = source.fetch_rows()?;
    let records = parse_rows(&rows)?;
    info!(records = records.len(), "flights decoded");
    Ok(records)
}

/// Render `records` as a logbook PDF.
///
/// With `reverse` set the records are written last row first, which turns a
/// newest-on-top sheet into chronological order.
///
/// # Errors
///
/// Returns [`Error::Render`] if the PDF cannot be produced.
pub fn render_logbook(
    records: &[FlightRecord],
    options: &LogbookConfig,
) -> Result<(Vec<u8>, PaginationSummary)> {
    let settings = PageSettings {
        capacity: DEFAULT_PAGE_CAPACITY,
        owner: options.owner.clone(),
    };
    let breaks = PageBreaks::new(options.page_breaks.clone());
    let mut writer = LogbookWriter::new(PdfCanvas::new(PDF_TITLE)?);

    let summary = if options.reverse {
        paginate(records.iter().rev(), &settings, breaks, &mut writer)?
    } else {
        paginate(records, &settings, breaks, &mut writer)?
    };
    let bytes = writer.finish()?;
    Ok((bytes, summary))
}

/// Write `bytes` to `path`.
///
/// # Errors
///
/// Returns [`Error::OutputWrite`] if the file cannot be written.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|source| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "output written");
    Ok(())
}

/// Result of a PDF export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// File written.
    pub output: PathBuf,
    /// Page statistics.
    pub summary: PaginationSummary,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Logbook has been exported to {}",
            self.output.display()
        )?;
        write!(
            f,
            "Flights: {}, pages: {} ({} logbook pages), total time: {}",
            self.summary.records,
            self.summary.physical_pages,
            self.summary.logbook_pages,
            self.summary.grand_total.times.total.render_for_totals()
        )
    }
}

/// Read `source` and write the PDF logbook to `options.output`.
///
/// # Errors
///
/// Returns any source, decoding, render or write error. Nothing is written
/// on failure.
pub fn export_pdf(source: &dyn SourceReader, options: &LogbookConfig) -> Result<ExportReport> {
    let records = load_records(source)?;
    let (bytes, summary) = render_logbook(&records, options)?;
    write_output(&options.output, &bytes)?;
    info!(
        pages = summary.physical_pages,
        separators = summary.separators,
        "logbook exported"
    );
    Ok(ExportReport {
        output: options.output.clone(),
        summary,
    })
}

/// Console summary of a rendered map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapReport {
    /// File written.
    pub output: PathBuf,
    /// Unique airports in the selected flights.
    pub airports: usize,
    /// Unique routes in the selected flights.
    pub routes: usize,
    /// Total flight time of the selected flights.
    pub total_time: Duration,
    /// Landings of the selected flights.
    pub landings: Landings,
}

impl fmt::Display for MapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Airports: {}", self.airports)?;
        writeln!(f, "Routes: {}", self.routes)?;
        writeln!(f, "Total time: {}", self.total_time.render_for_totals())?;
        writeln!(
            f,
            "Landings: {} day, {} night",
            self.landings.day, self.landings.night
        )?;
        write!(f, "Map has been saved to {}", self.output.display())
    }
}

/// Build the map of `records` and return the PNG bytes with its report.
///
/// # Errors
///
/// Returns [`Error::Render`] if the image cannot be produced.
pub fn render_map(
    records: &[FlightRecord],
    db: &AirportDb,
    options: &MapConfig,
) -> Result<(Vec<u8>, MapReport)> {
    let filter = MapFilter {
        date: options.filter_date.clone(),
        include_routes: !options.no_routes,
    };
    let data = MapData::build(records, &filter);
    let primitives = data.primitives(db);
    let png = render_png(&primitives, options.width, options.height)?;

    let report = MapReport {
        output: options.output.clone(),
        airports: data.airports.len(),
        routes: data.routes.len(),
        total_time: data.totals.times.total,
        landings: data.totals.landings,
    };
    Ok((png, report))
}

/// Read `source`, load the airport database (the bundled one unless a file
/// is configured) and write the map PNG.
///
/// # Errors
///
/// Returns any source, database, render or write error. Nothing is written
/// on failure.
pub fn export_map(source: &dyn SourceReader, options: &MapConfig) -> Result<MapReport> {
    let db = AirportDb::load_or_bundled(options.airports_db.as_deref())?;
    let records = load_records(source)?;
    let (png, report) = render_map(&records, &db, options)?;
    write_output(&options.output, &png)?;
    info!(airports = report.airports, routes = report.routes, "map exported");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_row;
    use crate::record::SourceRow;

    /// In-memory source.
    struct StaticSource(Vec<SourceRow>);

    impl SourceReader for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        fn fetch_rows(&self) -> Result<Vec<SourceRow>> {
            if self.0.is_empty() {
                return Err(Error::source_empty("static"));
            }
            Ok(self.0.clone())
        }
    }

    fn rows(n: usize) -> Vec<SourceRow> {
        (1..=n).map(sample_row).collect()
    }

    const AIRPORTS: &str = r#"{
        "EGLL": {"lat": 51.47, "lon": -0.46},
        "LFPG": {"lat": 49.01, "lon": 2.55}
    }"#;

    #[test]
    fn test_load_records() {
        let records = load_records(&StaticSource(rows(3))).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].departure.place, "EGLL");
    }

    #[test]
    fn test_load_records_malformed() {
        let mut bad = rows(2);
        bad[1].cells.truncate(4);
        let err = load_records(&StaticSource(bad)).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { row: 2, .. }));
    }

    #[test]
    fn test_render_logbook_summary() {
        let records = load_records(&StaticSource(rows(30))).unwrap();
        let options = LogbookConfig {
            page_breaks: vec![1],
            ..LogbookConfig::default()
        };
        let (bytes, summary) = render_logbook(&records, &options).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(summary.records, 30);
        assert_eq!(summary.logbook_pages, 2);
        assert_eq!(summary.physical_pages, 3);
        // 30 flights of 1:15 each.
        assert_eq!(summary.grand_total.times.total, Duration::from_hm(37, 30));
    }

    #[test]
    fn test_export_pdf_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = LogbookConfig {
            output: dir.path().join("logbook.pdf"),
            ..LogbookConfig::default()
        };
        let report = export_pdf(&StaticSource(rows(2)), &options).unwrap();

        let written = std::fs::read(&options.output).unwrap();
        assert!(written.starts_with(b"%PDF"));
        assert_eq!(report.summary.records, 2);
        assert!(report.to_string().contains("logbook.pdf"));
    }

    #[test]
    fn test_failed_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = LogbookConfig {
            output: dir.path().join("logbook.pdf"),
            ..LogbookConfig::default()
        };
        assert!(export_pdf(&StaticSource(Vec::new()), &options).is_err());
        assert!(!options.output.exists());
    }

    #[test]
    fn test_write_output_error() {
        let err = write_output(Path::new("/nonexistent/dir/out.pdf"), b"x").unwrap_err();
        assert!(matches!(err, Error::OutputWrite { .. }));
    }

    #[test]
    fn test_render_map_report() {
        let records = load_records(&StaticSource(rows(2))).unwrap();
        let db = AirportDb::from_json(AIRPORTS).unwrap();
        let options = MapConfig {
            width: 200,
            height: 100,
            ..MapConfig::default()
        };
        let (png, report) = render_map(&records, &db, &options).unwrap();

        assert!(!png.is_empty());
        assert_eq!(report.airports, 2);
        assert_eq!(report.routes, 1);
        assert_eq!(report.total_time, Duration::from_hm(2, 30));
        assert_eq!(report.landings, Landings { day: 2, night: 0 });

        let text = report.to_string();
        assert!(text.contains("Airports: 2"));
        assert!(text.contains("Routes: 1"));
        assert!(text.contains("Total time: 2:30"));
        assert!(text.contains("Landings: 2 day, 0 night"));
    }

    #[test]
    fn test_export_map_requires_database() {
        let dir = tempfile::tempdir().unwrap();
        let options = MapConfig {
            airports_db: Some(dir.path().join("missing.json")),
            output: dir.path().join("map.png"),
            ..MapConfig::default()
        };
        let err = export_map(&StaticSource(rows(1)), &options).unwrap_err();
        assert!(matches!(err, Error::AirportDb { .. }));
        assert!(!options.output.exists());
    }

    #[test]
    fn test_export_map_with_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let options = MapConfig {
            output: dir.path().join("map.png"),
            width: 160,
            height: 90,
            ..MapConfig::default()
        };
        assert!(options.airports_db.is_none());

        let report = export_map(&StaticSource(rows(2)), &options).unwrap();
        assert!(options.output.exists());
        assert_eq!(report.airports, 2);
        assert_eq!(report.routes, 1);
    }

    #[test]
    fn test_export_map_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("airports.json");
        std::fs::write(&db_path, AIRPORTS).unwrap();
        let options = MapConfig {
            airports_db: Some(db_path),
            output: dir.path().join("map.png"),
            width: 120,
            height: 80,
            ..MapConfig::default()
        };
        export_map(&StaticSource(rows(1)), &options).unwrap();
        assert!(options.output.exists());
    }
}
