use geo::Viewport;
use thiserror::Error;

use crate::config::FilterConfig;

/// Why a viewport cannot be loaded.
///
/// Precondition rejections are surfaced to the UI so it can guide the user;
/// the fetch is simply not attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Unsuitable {
    #[error("viewport area {area:.0} deg² exceeds the {max:.0} deg² limit; zoom in to load data")]
    AreaTooLarge { area: f64, max: f64 },
    #[error("zoom {zoom} is below the minimum of {min} for this layer")]
    ZoomTooLow { zoom: u8, min: u8 },
}

/// Pure suitability predicate: a function of area and zoom only.
///
/// Must be re-evaluated on every candidate fetch, not just at layer
/// activation: a viewport that becomes suitable after a zoom-in has to
/// trigger a fetch even if none happened while it was unsuitable.
pub fn check_suitable(viewport: &Viewport, cfg: &FilterConfig) -> Result<(), Unsuitable> {
    let area = viewport.area_deg2();
    if area > cfg.area_max_deg2 {
        return Err(Unsuitable::AreaTooLarge {
            area,
            max: cfg.area_max_deg2,
        });
    }
    if viewport.zoom < cfg.zoom_min {
        return Err(Unsuitable::ZoomTooLow {
            zoom: viewport.zoom,
            min: cfg.zoom_min,
        });
    }
    Ok(())
}

/// Whether `new` differs enough from the last-loaded viewport to reload.
///
/// A zoom jump of `zoom_delta_reload` or more always reloads; otherwise the
/// pan must have moved more than `drift_fraction_reload` of the visible span
/// in either axis. The asymmetry is deliberate: LOD changes are discrete and
/// must re-trigger, while slow panning should not cause fetch storms.
pub fn significant_change(new: &Viewport, last: &Viewport, cfg: &FilterConfig) -> bool {
    let zoom_delta = new.zoom.abs_diff(last.zoom);
    if zoom_delta >= cfg.zoom_delta_reload {
        return true;
    }

    let (lat, lng) = new.bounds.drift_fraction(&last.bounds);
    lat > cfg.drift_fraction_reload || lng > cfg.drift_fraction_reload
}

#[cfg(test)]
mod tests {
    use super::{Unsuitable, check_suitable, significant_change};
    use crate::config::FilterConfig;
    use geo::{GeoBounds, Viewport};

    fn viewport(north: f64, south: f64, east: f64, west: f64, zoom: u8) -> Viewport {
        Viewport::new(GeoBounds::new(north, south, east, west), zoom)
    }

    #[test]
    fn continental_views_are_rejected_by_area() {
        // 60,000 deg² at zoom 8 is well past the area limit.
        let v = viewport(100.0, -100.0, 150.0, -150.0, 8);
        assert_eq!(v.area_deg2(), 60_000.0);
        let err = check_suitable(&v, &FilterConfig::default()).unwrap_err();
        assert!(matches!(err, Unsuitable::AreaTooLarge { .. }));
    }

    #[test]
    fn low_zoom_is_rejected_even_for_small_areas() {
        let v = viewport(1.0, 0.0, 1.0, 0.0, 4);
        let err = check_suitable(&v, &FilterConfig::default()).unwrap_err();
        assert_eq!(err, Unsuitable::ZoomTooLow { zoom: 4, min: 6 });
    }

    #[test]
    fn zooming_in_from_unsuitable_moves_toward_suitable() {
        let cfg = FilterConfig::default();
        let v = viewport(1.0, 0.0, 1.0, 0.0, 4);
        assert!(check_suitable(&v, &cfg).is_err());
        let zoomed = Viewport::new(v.bounds, 6);
        assert!(check_suitable(&zoomed, &cfg).is_ok());
    }

    #[test]
    fn zoom_jump_of_two_reloads_with_identical_bounds() {
        let cfg = FilterConfig::default();
        let last = viewport(20.0, 10.0, 80.0, 70.0, 9);
        let new = viewport(20.0, 10.0, 80.0, 70.0, 11);
        assert!(significant_change(&new, &last, &cfg));
    }

    #[test]
    fn small_pan_is_not_significant() {
        let cfg = FilterConfig::default();
        let last = viewport(20.0, 10.0, 80.0, 70.0, 9);
        // Both lat edges moved 1 degree over a 10-degree span: fraction 0.2.
        let new = viewport(21.0, 11.0, 80.0, 70.0, 9);
        assert!(!significant_change(&new, &last, &cfg));
    }

    #[test]
    fn pan_past_half_the_span_is_significant() {
        let cfg = FilterConfig::default();
        let last = viewport(20.0, 10.0, 80.0, 70.0, 9);
        let new = viewport(23.0, 13.0, 80.0, 70.0, 9);
        assert!(significant_change(&new, &last, &cfg));
    }

    #[test]
    fn longitude_drift_counts_symmetrically() {
        let cfg = FilterConfig::default();
        let last = viewport(20.0, 10.0, 80.0, 70.0, 9);
        let new = viewport(20.0, 10.0, 86.0, 76.0, 9);
        assert!(significant_change(&new, &last, &cfg));
    }
}
