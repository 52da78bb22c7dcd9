use crate::bounds::{GeoBounds, LatLng};

/// Named level-of-detail bands over the zoom range.
///
/// Bands are ordered, non-overlapping and exhaustive; see `lod_bucket`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LodBand {
    Continental,
    Country,
    Region,
    Regional,
    City,
    Detailed,
}

impl LodBand {
    pub fn label(&self) -> &'static str {
        match self {
            LodBand::Continental => "continental",
            LodBand::Country => "country",
            LodBand::Region => "region",
            LodBand::Regional => "regional",
            LodBand::City => "city",
            LodBand::Detailed => "detailed",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LodBucket {
    pub band: LodBand,
    /// Side length of the n×n sampling grid for point datasets.
    pub grid_resolution: u8,
}

/// Maps zoom to its LOD band and grid granularity.
///
/// Monotonicity contract: increasing zoom never decreases the band or the
/// grid resolution (covered by a test below).
pub fn lod_bucket(zoom: u8) -> LodBucket {
    let (band, grid_resolution) = match zoom {
        0..=3 => (LodBand::Continental, 2),
        4..=5 => (LodBand::Country, 2),
        6..=7 => (LodBand::Region, 3),
        8..=9 => (LodBand::Regional, 4),
        10..=12 => (LodBand::City, 5),
        _ => (LodBand::Detailed, 6),
    };
    LodBucket {
        band,
        grid_resolution,
    }
}

/// Cell-center sampling grid: `n × n` points evenly covering `bounds`.
///
/// Points are emitted row-major from the south-west corner, so output order
/// is deterministic for a given input.
pub fn grid_points(bounds: &GeoBounds, n: u8) -> Vec<LatLng> {
    let n = n.max(1) as usize;
    let lat_step = bounds.lat_span() / n as f64;
    let lng_step = bounds.lng_span() / n as f64;

    let mut out = Vec::with_capacity(n * n);
    for row in 0..n {
        let lat = bounds.south + lat_step * (row as f64 + 0.5);
        for col in 0..n {
            let lng = bounds.west + lng_step * (col as f64 + 0.5);
            out.push(LatLng::new(lat, lng));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{LodBand, grid_points, lod_bucket};
    use crate::bounds::GeoBounds;

    #[test]
    fn bands_partition_the_zoom_range() {
        assert_eq!(lod_bucket(0).band, LodBand::Continental);
        assert_eq!(lod_bucket(5).band, LodBand::Country);
        assert_eq!(lod_bucket(7).band, LodBand::Region);
        assert_eq!(lod_bucket(9).band, LodBand::Regional);
        assert_eq!(lod_bucket(12).band, LodBand::City);
        assert_eq!(lod_bucket(18).band, LodBand::Detailed);
    }

    #[test]
    fn grid_resolution_is_monotonic_in_zoom() {
        for z in 0..=21u8 {
            let a = lod_bucket(z);
            let b = lod_bucket(z + 1);
            assert!(b.grid_resolution >= a.grid_resolution, "zoom {z}");
            assert!(b.band >= a.band, "zoom {z}");
        }
    }

    #[test]
    fn grid_covers_bounds_interior() {
        let b = GeoBounds::new(4.0, 0.0, 4.0, 0.0);
        let pts = grid_points(&b, 4);
        assert_eq!(pts.len(), 16);
        assert!(pts.iter().all(|p| b.contains(*p)));
        // Row-major from the south-west: first point is the SW cell center.
        assert_eq!(pts[0].lat, 0.5);
        assert_eq!(pts[0].lng, 0.5);
        assert_eq!(pts[15].lat, 3.5);
        assert_eq!(pts[15].lng, 3.5);
    }
}
