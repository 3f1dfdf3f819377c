use crate::error::MediaError;

/// Compute a display size for `src` that fits inside `max` while keeping the
/// source aspect ratio. A single uniform ratio `min(max_w/src_w, max_h/src_h)`
/// is applied to both axes, so sources smaller than the bounds are scaled up.
///
/// Pure function; fails only for non-positive dimensions.
pub fn fit(
    src_width: u32,
    src_height: u32,
    max_width: u32,
    max_height: u32,
) -> Result<(u32, u32), MediaError> {
    if src_width == 0 || src_height == 0 {
        return Err(MediaError::InvalidDimension {
            width: src_width as i64,
            height: src_height as i64,
        });
    }
    if max_width == 0 || max_height == 0 {
        return Err(MediaError::InvalidDimension {
            width: max_width as i64,
            height: max_height as i64,
        });
    }

    let ratio = (max_width as f64 / src_width as f64).min(max_height as f64 / src_height as f64);
    let width = (src_width as f64 * ratio).round() as u32;
    let height = (src_height as f64 * ratio).round() as u32;

    // Rounding never pushes past the bound by more than one unit; clamp so the
    // contract `w <= max_w && h <= max_h` holds exactly.
    Ok((width.min(max_width).max(1), height.min(max_height).max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_fits_width() {
        assert_eq!(fit(400, 300, 600, 600).unwrap(), (600, 450));
    }

    #[test]
    fn portrait_fits_height() {
        assert_eq!(fit(300, 400, 600, 600).unwrap(), (450, 600));
    }

    #[test]
    fn exact_fit_is_identity() {
        assert_eq!(fit(800, 800, 800, 800).unwrap(), (800, 800));
    }

    #[test]
    fn small_sources_are_upscaled() {
        assert_eq!(fit(100, 50, 800, 800).unwrap(), (800, 400));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            fit(0, 300, 600, 600),
            Err(MediaError::InvalidDimension { .. })
        ));
        assert!(matches!(
            fit(400, 300, 600, 0),
            Err(MediaError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn aspect_ratio_is_preserved_within_tolerance() {
        let cases = [
            (400u32, 300u32, 600u32, 600u32),
            (1920, 1080, 800, 800),
            (333, 777, 640, 480),
            (4032, 3024, 800, 800),
        ];
        for (w, h, max_w, max_h) in cases {
            let (fw, fh) = fit(w, h, max_w, max_h).unwrap();
            assert!(fw <= max_w && fh <= max_h, "{fw}x{fh} exceeds {max_w}x{max_h}");
            let src_ratio = w as f64 / h as f64;
            let out_ratio = fw as f64 / fh as f64;
            // Rounding to whole pixels distorts extreme ratios slightly.
            assert!(
                (src_ratio - out_ratio).abs() / src_ratio < 0.02,
                "ratio drifted: {src_ratio} -> {out_ratio}"
            );
        }
    }
}
