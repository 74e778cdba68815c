//! Contour extraction: raster image to an ordered, normalized polygon.
//!
//! The extractor decodes the image, thresholds it to a binary
//! foreground/background mask (near-white or fully transparent pixels are
//! background), traces region boundaries with Suzuki-Abe border following,
//! keeps the largest outer contour by area, simplifies it with
//! Douglas-Peucker, and normalizes pixel coordinates into `[0, 1]`.
//!
//! Aspect ratio is not preserved here; aspect correction happens in
//! projection, which knows the target radius.

use geo::{algorithm::simplify::Simplify, Coord, LineString};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use log::{debug, info};

use crate::{NormalizedPoint, NormalizedPolygon, PipelineError};

/// Configuration for contour extraction.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Pixels with luminance at or above this are treated as background.
    /// Default: 240 (near-white).
    pub background_luminance_threshold: u8,

    /// Pixels with alpha at or below this are treated as background.
    /// Default: 10.
    pub alpha_threshold: u8,

    /// Tolerance for Douglas-Peucker simplification, in pixels.
    /// Smaller values preserve more detail. Default: 2.0
    pub simplification_tolerance: f64,

    /// Maximum points after simplification. Caps downstream routing cost:
    /// one provider request per polygon leg. Default: 60
    pub max_points: usize,

    /// Minimum boundary pixels for a contour to be considered a shape.
    /// Filters out specks. Default: 8
    pub min_contour_pixels: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            background_luminance_threshold: 240,
            alpha_threshold: 10,
            simplification_tolerance: 2.0,
            max_points: 60,
            min_contour_pixels: 8,
        }
    }
}

/// Extract the dominant shape outline from encoded image bytes.
///
/// Accepts any raster format the `image` crate can decode. Returns
/// [`PipelineError::Extraction`] when the bytes cannot be decoded or no
/// closed contour of sufficient size is found (blank or fully transparent
/// image).
pub fn extract_shape(
    image_bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<NormalizedPolygon, PipelineError> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| PipelineError::Extraction(format!("image decode failed: {}", e)))?;
    extract_shape_from_image(&decoded, config)
}

/// Extract the dominant shape outline from a decoded image.
///
/// Same contract as [`extract_shape`], for callers that already hold a
/// [`DynamicImage`].
pub fn extract_shape_from_image(
    image: &DynamicImage,
    config: &ExtractionConfig,
) -> Result<NormalizedPolygon, PipelineError> {
    let mask = binarize(image, config);
    let (width, height) = (mask.width(), mask.height());

    // Suzuki-Abe border following over the foreground mask
    let contours = find_contours::<u32>(&mask);

    // Only the largest outer region is used; smaller islands are
    // discarded without error.
    let boundary = contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .filter(|c| c.points.len() >= config.min_contour_pixels)
        .max_by(|a, b| {
            let area_a = polygon_area(&a.points).abs();
            let area_b = polygon_area(&b.points).abs();
            area_a.total_cmp(&area_b)
        })
        .ok_or_else(|| {
            PipelineError::Extraction("no foreground contour found in image".to_string())
        })?;

    let raw_count = boundary.points.len();

    // Douglas-Peucker decimation of near-collinear boundary pixels
    let coords: Vec<Coord> = boundary
        .points
        .iter()
        .map(|p| Coord {
            x: f64::from(p.x),
            y: f64::from(p.y),
        })
        .collect();
    let line = LineString::new(coords);
    let simplified = line.simplify(&config.simplification_tolerance);

    // Cap point count with uniform sampling; every leg costs a routing call
    let final_coords: Vec<Coord> = if simplified.0.len() > config.max_points {
        let step = simplified.0.len() as f64 / config.max_points as f64;
        (0..config.max_points)
            .map(|i| simplified.0[(i as f64 * step) as usize])
            .collect()
    } else {
        simplified.0
    };

    if final_coords.len() < 3 {
        return Err(PipelineError::Extraction(format!(
            "contour degenerated to {} points after simplification",
            final_coords.len()
        )));
    }

    debug!(
        "contour: {} boundary pixels -> {} simplified points",
        raw_count,
        final_coords.len()
    );

    let points: Vec<NormalizedPoint> = final_coords
        .iter()
        .map(|c| NormalizedPoint::new(c.x / f64::from(width), c.y / f64::from(height)))
        .collect();

    let polygon = NormalizedPolygon::new(points, true)?;

    info!(
        "extracted shape: {} points from {}x{} image",
        polygon.len(),
        width,
        height
    );

    Ok(polygon)
}

/// Threshold an image to a binary foreground mask.
///
/// Foreground = opaque enough AND dark enough. White pixels are 0 in the
/// mask's background sense, so `find_contours` traces the dark shape.
fn binarize(image: &DynamicImage, config: &ExtractionConfig) -> GrayImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut mask = GrayImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        // Rec. 601 luma
        let luminance =
            (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) as u8;

        let foreground =
            a > config.alpha_threshold && luminance < config.background_luminance_threshold;
        if foreground {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Signed area via the shoelace formula over integer boundary pixels.
/// Positive = counter-clockwise, negative = clockwise.
fn polygon_area(points: &[imageproc::point::Point<u32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            let (xi, yi) = (f64::from(points[i].x), f64::from(points[i].y));
            let (xj, yj) = (f64::from(points[j].x), f64::from(points[j].y));
            xi * yj - xj * yi
        })
        .sum::<f64>()
        / 2.0
}
