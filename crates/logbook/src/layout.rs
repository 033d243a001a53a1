//! EASA logbook page geometry.
//!
//! Every function here is pure: it turns header labels, a flight record or a
//! set of totals into [`DrawCell`] commands positioned on an A4 landscape page.
//! Coordinates are millimetres from the top-left corner of the page. The
//! canvas flips them if its own origin differs.

use crate::font::{self, Weight};
use crate::paginate::Footer;
use crate::record::FlightRecord;
use crate::totals::TotalsRecord;

/// A4 landscape width.
pub const PAGE_WIDTH: f32 = 297.0;
/// A4 landscape height.
pub const PAGE_HEIGHT: f32 = 210.0;
/// Distance from the left page edge to the table.
pub const LEFT_MARGIN: f32 = 10.0;
/// Top edge of the first header row.
pub const HEADER_TOP: f32 = 29.0;
/// Height of one body row.
pub const BODY_ROW_HEIGHT: f32 = 5.0;
/// Height of one footer line.
pub const FOOTER_ROW_HEIGHT: f32 = 6.0;

const HEADER1_HEIGHT: f32 = 5.0;
const HEADER2_HEIGHT: f32 = 12.0;
const HEADER3_HEIGHT: f32 = 4.0;
const PAGE_LABEL_HEIGHT: f32 = 10.0;

/// Top edge of the first body row.
pub const BODY_TOP: f32 = HEADER_TOP + HEADER1_HEIGHT + HEADER2_HEIGHT;

/// Width of the whole table. Every row sums to it.
pub const TABLE_WIDTH: f32 = 275.92;

/// Column numbers row.
pub const HEADER1_WIDTHS: [f32; 12] = [
    12.2, 16.5, 16.5, 22.9, 33.6, 11.2, 22.86, 16.76, 22.4, 44.8, 22.4, 33.8,
];

/// Column titles row.
pub const HEADER2_WIDTHS: [f32; 13] = [
    12.2, 16.5, 16.5, 22.9, 22.4, 11.2, 11.2, 22.86, 16.76, 22.4, 44.8, 22.4, 33.8,
];

/// Sub-titles row; also the body columns.
pub const BODY_WIDTHS: [f32; 23] = [
    12.2, 8.25, 8.25, 8.25, 8.25, 10.0, 12.9, 11.2, 11.2, 11.2, 11.2, 22.86, 8.38, 8.38, 11.2,
    11.2, 11.2, 11.2, 11.2, 11.2, 11.2, 11.2, 33.8,
];

/// Footer columns.
pub const FOOTER_WIDTHS: [f32; 18] = [
    20.45, 47.65, 11.2, 11.2, 11.2, 11.2, 22.86, 8.38, 8.38, 11.2, 11.2, 11.2, 11.2, 11.2, 11.2,
    11.2, 11.2, 33.8,
];

const HEADER1_LABELS: [&str; 12] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"];

const HEADER2_LABELS: [&str; 13] = [
    "DATE",
    "DEPARTURE",
    "ARRIVAL",
    "AIRCRAFT",
    "SINGLE PILOT TIME",
    "MULTI PILOT TIME",
    "TOTAL TIME",
    "PIC NAME",
    "LANDINGS",
    "OPERATIONAL CONDITION TIME",
    "PILOT FUNCTION TIME",
    "FSTD SESSION",
    "REMARKS AND ENDORSMENTS",
];

const HEADER3_LABELS: [&str; 23] = [
    "", "Place", "Time", "Place", "Time", "Type", "Reg", "SE", "ME", "", "", "", "Day", "Night",
    "Night", "IFR", "PIC", "COP", "DUAL", "INSTR", "Type", "Time", "",
];

const CERTIFICATION: &str = "I certify that the entries in this log are true.";

const HEADER_FONT_SIZE: f32 = 6.0;
const BODY_FONT_SIZE: f32 = 6.0;
const FOOTER_FONT_SIZE: f32 = 6.0;
const CERTIFICATION_FONT_SIZE: f32 = 5.0;
const PAGE_LABEL_FONT_SIZE: f32 = 7.0;

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 0.352_778;

/// Which edges of a cell get a border line.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    /// Left edge.
    pub left: bool,
    /// Top edge.
    pub top: bool,
    /// Right edge.
    pub right: bool,
    /// Bottom edge.
    pub bottom: bool,
}

impl Border {
    /// All four edges.
    pub const ALL: Self = Self::new(true, true, true, true);
    /// No edges.
    pub const NONE: Self = Self::new(false, false, false, false);
    /// Left, top and right: opens a bracketed block.
    pub const LTR: Self = Self::new(true, true, true, false);
    /// Left and right: continues a bracketed block.
    pub const LR: Self = Self::new(true, false, true, false);
    /// Left, bottom and right: closes a bracketed block.
    pub const LBR: Self = Self::new(true, false, true, true);

    const fn new(left: bool, top: bool, right: bool, bottom: bool) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// True when every edge is drawn.
    #[must_use]
    pub fn is_full(self) -> bool {
        self == Self::ALL
    }
}

/// Background fill of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// Header and footer grey.
    Header,
    /// Alternate body row grey.
    Row,
}

impl Shade {
    /// Grey level, 0 to 255.
    #[must_use]
    pub fn grey(self) -> u8 {
        match self {
            Self::Header => 217,
            Self::Row => 228,
        }
    }
}

/// Horizontal text placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Flush left with a small inset.
    Left,
    /// Centred.
    Center,
}

/// A positioned, optionally bordered and filled text box.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCell {
    /// Left edge in mm.
    pub x: f32,
    /// Top edge in mm.
    pub y: f32,
    /// Width in mm.
    pub width: f32,
    /// Height in mm.
    pub height: f32,
    /// Text, wrapped by the canvas to the cell width.
    pub text: String,
    /// Edges to stroke.
    pub border: Border,
    /// Background, if any.
    pub fill: Option<Shade>,
    /// Horizontal alignment.
    pub align: Align,
    /// Bold face.
    pub bold: bool,
    /// Font size in points.
    pub font_size: f32,
}

impl DrawCell {
    fn new(x: f32, y: f32, width: f32, height: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            text: text.into(),
            border: Border::ALL,
            fill: None,
            align: Align::Center,
            bold: false,
            font_size: BODY_FONT_SIZE,
        }
    }

    fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    fn fill(mut self, fill: Option<Shade>) -> Self {
        self.fill = fill;
        self
    }

    fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Face the text is set in.
    #[must_use]
    pub fn weight(&self) -> Weight {
        Weight::from_bold(self.bold)
    }
}

/// Left edges of consecutive columns starting at the margin.
fn column_offsets<const N: usize>(widths: &[f32; N]) -> [f32; N] {
    let mut offsets = [0.0; N];
    let mut x = LEFT_MARGIN;
    for (offset, width) in offsets.iter_mut().zip(widths) {
        *offset = x;
        x += width;
    }
    offsets
}

/// Lay `texts` out as one row of cells across `widths`.
fn row<const N: usize>(
    widths: &[f32; N],
    y: f32,
    height: f32,
    texts: [String; N],
) -> impl Iterator<Item = DrawCell> {
    let offsets = column_offsets(widths);
    let widths = *widths;
    texts
        .into_iter()
        .enumerate()
        .map(move |(i, text)| DrawCell::new(offsets[i], y, widths[i], height, text))
}

/// The three header rows.
///
/// The title row is drawn as a filled frame plus a separate text box over its
/// upper part, so the sub-title boxes of the third row can overlap its lower
/// part without hiding the titles.
#[must_use]
pub fn header_cells() -> Vec<DrawCell> {
    let mut cells = Vec::with_capacity(12 + 26 + 23);

    cells.extend(
        row(&HEADER1_WIDTHS, HEADER_TOP, HEADER1_HEIGHT, HEADER1_LABELS.map(String::from))
            .map(|c| c.fill(Some(Shade::Header)).bold().font_size(HEADER_FONT_SIZE)),
    );

    let titles_top = HEADER_TOP + HEADER1_HEIGHT;
    let subtitles_top = titles_top + HEADER2_HEIGHT - HEADER3_HEIGHT;
    for cell in row(&HEADER2_WIDTHS, titles_top, HEADER2_HEIGHT, HEADER2_LABELS.map(String::from)) {
        let frame = DrawCell {
            text: String::new(),
            ..cell.clone()
        }
        .fill(Some(Shade::Header));
        let title = DrawCell {
            height: HEADER2_HEIGHT - HEADER3_HEIGHT,
            ..cell
        }
        .border(Border::NONE)
        .bold()
        .font_size(HEADER_FONT_SIZE);
        cells.push(frame);
        cells.push(title);
    }

    cells.extend(
        row(&BODY_WIDTHS, subtitles_top, HEADER3_HEIGHT, HEADER3_LABELS.map(String::from))
            .filter(|c| !c.text.is_empty())
            .map(|c| c.fill(Some(Shade::Header)).bold().font_size(HEADER_FONT_SIZE)),
    );

    cells
}

fn count_for_body(count: u32) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

/// One body row at `y`. `None` draws an empty row.
#[must_use]
pub fn body_cells(record: Option<&FlightRecord>, shaded: bool, y: f32) -> Vec<DrawCell> {
    let texts: [String; 23] = match record {
        Some(r) => [
            r.date.clone(),
            r.departure.place.clone(),
            r.departure.time.clone(),
            r.arrival.place.clone(),
            r.arrival.time.clone(),
            r.aircraft.model.clone(),
            r.aircraft.registration.clone(),
            r.times.single_pilot.render_for_body(),
            r.times.multi_pilot.render_for_body(),
            r.times.multi_crew.render_for_body(),
            r.times.total.render_for_body(),
            r.pic_name.clone(),
            count_for_body(r.landings.day),
            count_for_body(r.landings.night),
            r.times.night.render_for_body(),
            r.times.instrument.render_for_body(),
            r.times.pic.render_for_body(),
            r.times.copilot.render_for_body(),
            r.times.dual.render_for_body(),
            r.times.instructor.render_for_body(),
            r.sim.name.clone(),
            r.sim.time.render_for_body(),
            r.remarks.clone(),
        ],
        None => Default::default(),
    };

    let fill = shaded.then_some(Shade::Row);
    row(&BODY_WIDTHS, y, BODY_ROW_HEIGHT, texts)
        .enumerate()
        .map(|(i, cell)| {
            // PIC name and remarks read better flush left.
            let align = if i == 11 || i == 22 {
                Align::Left
            } else {
                Align::Center
            };
            cell.fill(fill).align(align)
        })
        .collect()
}

/// The three footer lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterLine {
    /// Sum of this page.
    ThisPage,
    /// Sum of all earlier pages.
    PreviousPages,
    /// Grand total.
    Total,
}

impl FooterLine {
    /// Lines in drawing order.
    pub const ALL: [Self; 3] = [Self::ThisPage, Self::PreviousPages, Self::Total];

    /// Printed label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ThisPage => "TOTAL THIS PAGE",
            Self::PreviousPages => "TOTAL FROM PREVIOUS PAGES",
            Self::Total => "TOTAL TIME",
        }
    }

    /// Border of the outer columns that merges the lines into one block.
    #[must_use]
    pub fn bracket(self) -> Border {
        match self {
            Self::ThisPage => Border::LTR,
            Self::PreviousPages => Border::LR,
            Self::Total => Border::LBR,
        }
    }
}

/// One footer line at `y`.
#[must_use]
pub fn footer_cells(line: FooterLine, totals: &TotalsRecord, owner: &str, y: f32) -> Vec<DrawCell> {
    let t = &totals.times;
    let last = match line {
        FooterLine::ThisPage => CERTIFICATION.to_string(),
        FooterLine::PreviousPages => String::new(),
        FooterLine::Total => owner.to_string(),
    };
    let texts: [String; 18] = [
        String::new(),
        line.label().to_string(),
        t.single_pilot.render_for_totals(),
        t.multi_pilot.render_for_totals(),
        t.multi_crew.render_for_totals(),
        t.total.render_for_totals(),
        String::new(),
        totals.landings.day.to_string(),
        totals.landings.night.to_string(),
        t.night.render_for_totals(),
        t.instrument.render_for_totals(),
        t.pic.render_for_totals(),
        t.copilot.render_for_totals(),
        t.dual.render_for_totals(),
        t.instructor.render_for_totals(),
        String::new(),
        totals.sim_time.render_for_totals(),
        last,
    ];

    row(&FOOTER_WIDTHS, y, FOOTER_ROW_HEIGHT, texts)
        .enumerate()
        .map(|(i, cell)| {
            let cell = cell.fill(Some(Shade::Header));
            match i {
                0 => cell.border(line.bracket()),
                17 => cell
                    .border(line.bracket())
                    .font_size(CERTIFICATION_FONT_SIZE),
                _ => cell.bold().font_size(FOOTER_FONT_SIZE),
            }
        })
        .collect()
}

/// All three footer lines, starting at `y`.
#[must_use]
pub fn footer_block(footer: &Footer<'_>, y: f32) -> Vec<DrawCell> {
    let totals = [footer.page, footer.previous, footer.grand];
    FooterLine::ALL
        .into_iter()
        .zip(totals)
        .zip((0u8..).map(|i| y + f32::from(i) * FOOTER_ROW_HEIGHT))
        .flat_map(|((line, totals), y)| footer_cells(line, totals, footer.owner, y))
        .collect()
}

/// Height taken by [`footer_block`].
pub const FOOTER_HEIGHT: f32 = 3.0 * FOOTER_ROW_HEIGHT;

/// The `page N` label. `y` is the bottom of the footer.
#[must_use]
pub fn page_label(number: u32, y: f32) -> DrawCell {
    DrawCell::new(
        LEFT_MARGIN,
        y - 1.0,
        TABLE_WIDTH,
        PAGE_LABEL_HEIGHT,
        format!("page {number}"),
    )
    .border(Border::NONE)
    .align(Align::Left)
    .font_size(PAGE_LABEL_FONT_SIZE)
}

/// Width in mm of `text` set at `font_size` points.
#[must_use]
pub fn text_width(text: &str, font_size: f32, weight: Weight) -> f32 {
    font::text_width(text, font_size, weight)
}

/// Greedy word wrap to `width` mm. A single word wider than the box stays on
/// its own line.
#[must_use]
pub fn wrap_text(text: &str, width: f32, font_size: f32, weight: Weight) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_width(&candidate, font_size, weight) <= width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
