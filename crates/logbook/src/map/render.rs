//! PNG rendering of map primitives.
//!
//! Points are projected with Web Mercator and the bounding box of everything
//! drawn is fitted into the image with a margin. There is no background map.

use std::f64::consts::PI;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::prelude::*;
use tracing::{debug, warn};

use super::MapPrimitives;
use crate::airports::GeoPoint;
use crate::error::{Error, Result};

/// Default image width in pixels.
pub const DEFAULT_WIDTH: u32 = 1920;
/// Default image height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1080;

const MARGIN: f64 = 60.0;
const MARKER_RADIUS: i32 = 8;
const ROUTE_WIDTH: u32 = 2;
/// Smallest projected span fitted to the canvas, about 0.3 degrees.
const MIN_SPAN: f64 = 0.001;
/// Mercator is undefined at the poles.
const MAX_LATITUDE: f64 = 85.051_129;

/// Project to Web Mercator, both axes in `0..1`, y growing southwards.
fn lon_to_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

fn lat_to_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

/// Maps geographic points to pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    min_x: f64,
    min_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    /// Fit the projected bounding box of `points` into `width` x `height`.
    fn fit<'a>(points: impl Iterator<Item = &'a GeoPoint>, width: u32, height: u32) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            let (x, y) = (lon_to_x(p.lon), lat_to_y(p.lat));
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if !min_x.is_finite() {
            (min_x, max_x, min_y, max_y) = (0.0, 1.0, 0.0, 1.0);
        }

        // Widen degenerate boxes around their centre.
        let span_x = (max_x - min_x).max(MIN_SPAN);
        let span_y = (max_y - min_y).max(MIN_SPAN);
        min_x = (min_x + max_x) / 2.0 - span_x / 2.0;
        min_y = (min_y + max_y) / 2.0 - span_y / 2.0;

        let usable_w = (f64::from(width) - 2.0 * MARGIN).max(1.0);
        let usable_h = (f64::from(height) - 2.0 * MARGIN).max(1.0);
        let scale = (usable_w / span_x).min(usable_h / span_y);

        Self {
            min_x,
            min_y,
            scale,
            offset_x: (f64::from(width) - span_x * scale) / 2.0,
            offset_y: (f64::from(height) - span_y * scale) / 2.0,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn pixel(&self, p: GeoPoint) -> (i32, i32) {
        let x = self.offset_x + (lon_to_x(p.lon) - self.min_x) * self.scale;
        let y = self.offset_y + (lat_to_y(p.lat) - self.min_y) * self.scale;
        (x.round() as i32, y.round() as i32)
    }
}

fn draw_error(err: impl std::fmt::Display) -> Error {
    Error::render(format!("map drawing failed: {err}"))
}

/// Rasterize `primitives` to a PNG image of `width` x `height` pixels.
///
/// Routes are drawn first in black, airports on top as red markers.
///
/// # Errors
///
/// Returns [`Error::Render`] if the size is zero or drawing or encoding fails.
pub fn render_png(primitives: &MapPrimitives, width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::render(format!("invalid map size {width}x{height}")));
    }
    if primitives.is_empty() {
        warn!("no known airports to draw, map will be blank");
    }

    let viewport = Viewport::fit(
        primitives
            .markers
            .iter()
            .chain(primitives.lines.iter().flat_map(|(a, b)| [a, b])),
        width,
        height,
    );
    debug!(?viewport, width, height, "map viewport");

    let pixels = usize::try_from(u64::from(width) * u64::from(height) * 3)
        .map_err(|_| Error::render("map too large"))?;
    let mut buffer = vec![0u8; pixels];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        for (from, to) in &primitives.lines {
            let path = PathElement::new(
                vec![viewport.pixel(*from), viewport.pixel(*to)],
                BLACK.stroke_width(ROUTE_WIDTH),
            );
            root.draw(&path).map_err(draw_error)?;
        }

        for marker in &primitives.markers {
            let at = viewport.pixel(*marker);
            root.draw(&Circle::new(at, MARKER_RADIUS, RED.filled()))
                .map_err(draw_error)?;
            root.draw(&Circle::new(at, MARKER_RADIUS, BLACK.stroke_width(1)))
                .map_err(draw_error)?;
        }

        root.present().map_err(draw_error)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&buffer, width, height, ColorType::Rgb8)
        .map_err(|e| Error::render(format!("PNG encoding failed: {e}")))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn heathrow() -> GeoPoint {
        GeoPoint {
            lat: 51.47,
            lon: -0.46,
        }
    }

    fn paris() -> GeoPoint {
        GeoPoint {
            lat: 49.01,
            lon: 2.55,
        }
    }

    #[test]
    fn test_mercator_projection() {
        assert!((lon_to_x(0.0) - 0.5).abs() < 1e-12);
        assert!((lat_to_y(0.0) - 0.5).abs() < 1e-12);
        assert!(lat_to_y(60.0) < lat_to_y(10.0));
        assert!(lat_to_y(90.0).is_finite());
    }

    #[test]
    fn test_viewport_keeps_points_inside_margin() {
        let points = [heathrow(), paris()];
        let viewport = Viewport::fit(points.iter(), 800, 600);

        for p in points {
            let (x, y) = viewport.pixel(p);
            assert!((60..=740).contains(&x), "x = {x}");
            assert!((60..=540).contains(&y), "y = {y}");
        }
        // North is up.
        assert!(viewport.pixel(heathrow()).1 < viewport.pixel(paris()).1);
    }

    #[test]
    fn test_single_point_is_centred() {
        let viewport = Viewport::fit([heathrow()].iter(), 800, 600);
        assert_eq!(viewport.pixel(heathrow()), (400, 300));
    }

    #[test]
    fn test_render_png() {
        let primitives = MapPrimitives {
            markers: vec![heathrow(), paris()],
            lines: vec![(heathrow(), paris())],
        };
        let png = render_png(&primitives, 320, 200).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));

        let image = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (320, 200));

        let viewport = Viewport::fit(
            primitives.markers.iter().chain([heathrow(), paris()].iter()),
            320,
            200,
        );
        let (x, y) = viewport.pixel(paris());
        let pixel = image.get_pixel(u32::try_from(x).unwrap(), u32::try_from(y).unwrap());
        assert_eq!(pixel.0, [255, 0, 0]);
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_render_blank_map() {
        let png = render_png(&MapPrimitives::default(), 64, 32).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(render_png(&MapPrimitives::default(), 0, 10).is_err());
    }
}
