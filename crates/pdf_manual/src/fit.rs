//! Aspect-preserving fit-to-box scaling for raster images.

use crate::error::{Error, Result};

/// Dimensions of an image after it has been scaled into a bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
    /// Scaled width, never larger than the requested maximum width.
    pub width: f64,
    /// Scaled height, never larger than the requested maximum height.
    pub height: f64,
    /// Uniform factor applied to both source dimensions.
    pub scale: f64,
}

/// Scales `source_width × source_height` uniformly so it fits inside `max_width × max_height`.
///
/// The smaller of the two axis ratios is used, so the image touches the box on
/// at least one axis and never exceeds it on either. Images smaller than the
/// box are scaled up. Non-positive or non-finite dimensions are rejected with
/// [`Error::InvalidImage`].
pub fn fit(source_width: f64, source_height: f64, max_width: f64, max_height: f64) -> Result<FitResult> {
    if !is_positive(source_width) || !is_positive(source_height) {
        return Err(Error::InvalidImage {
            width: source_width,
            height: source_height,
        });
    }
    if !is_positive(max_width) || !is_positive(max_height) {
        return Err(Error::InvalidImage {
            width: max_width,
            height: max_height,
        });
    }

    let scale = (max_width / source_width).min(max_height / source_height);
    Ok(FitResult {
        width: (source_width * scale).min(max_width),
        height: (source_height * scale).min(max_height),
        scale,
    })
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn assert_fits(source: (f64, f64), max: (f64, f64)) {
        let result = fit(source.0, source.1, max.0, max.1).expect("valid dimensions");
        assert!(result.width <= max.0 + TOLERANCE, "{result:?} exceeds {max:?}");
        assert!(result.height <= max.1 + TOLERANCE, "{result:?} exceeds {max:?}");
        let expected_ratio = source.0 / source.1;
        let ratio = result.width / result.height;
        assert!(
            (ratio - expected_ratio).abs() <= expected_ratio * 1e-9,
            "aspect ratio drifted: {ratio} vs {expected_ratio}"
        );
        assert!(
            (result.width - max.0).abs() < TOLERANCE || (result.height - max.1).abs() < TOLERANCE,
            "result should touch the box on one axis: {result:?}"
        );
    }

    #[test]
    fn wide_screenshot_is_width_bound() {
        let result = fit(1920.0, 1080.0, 165.1, 114.3).unwrap();
        assert!((result.width - 165.1).abs() < TOLERANCE);
        assert!(result.height < 114.3);
    }

    #[test]
    fn tall_screenshot_is_height_bound() {
        let result = fit(400.0, 1200.0, 165.1, 114.3).unwrap();
        assert!((result.height - 114.3).abs() < TOLERANCE);
        assert!((result.width - 38.1).abs() < 1e-6);
    }

    #[test]
    fn small_images_scale_up() {
        let result = fit(10.0, 5.0, 100.0, 100.0).unwrap();
        assert!((result.scale - 10.0).abs() < TOLERANCE);
        assert!((result.width - 100.0).abs() < TOLERANCE);
        assert!((result.height - 50.0).abs() < TOLERANCE);
    }

    #[test]
    fn preserves_aspect_ratio_across_shapes() {
        let sources = [(1.0, 1.0), (3.0, 7.0), (1366.0, 768.0), (0.5, 2000.0), (9999.0, 1.0)];
        let boxes = [(1.0, 1.0), (165.1, 114.3), (20.0, 300.0), (0.25, 0.5)];
        for source in sources {
            for max in boxes {
                assert_fits(source, max);
            }
        }
    }

    #[test]
    fn rejects_degenerate_sources() {
        for (w, h) in [(0.0, 10.0), (10.0, 0.0), (-4.0, 3.0), (f64::NAN, 1.0), (f64::INFINITY, 1.0)] {
            let err = fit(w, h, 100.0, 100.0).unwrap_err();
            assert!(matches!(err, Error::InvalidImage { .. }), "{w}x{h}");
        }
    }

    #[test]
    fn rejects_degenerate_boxes() {
        let err = fit(10.0, 10.0, 0.0, 100.0).unwrap_err();
        assert!(matches!(err, Error::InvalidImage { .. }));
    }
}
