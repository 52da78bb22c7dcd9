use std::collections::BTreeMap;

use crate::feature::{Feature, FeatureData, FeatureId, FeatureKind, Geometry};

/// The single rendering surface shared by every overlay.
///
/// Ownership contract:
/// - The store exclusively owns all features; layers refer to them by kind.
/// - Clearing one kind never touches features of another kind.
///
/// Atomicity contract:
/// - `replace_kind` performs clear-then-insert as one mutation with a single
///   epoch bump, so a partial state (old removed, new not yet inserted) is
///   never observable through the epoch.
#[derive(Debug, Default)]
pub struct FeatureStore {
    next_id: u64,
    epoch: u64,
    features: BTreeMap<FeatureId, Feature>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped once per store mutation.
    ///
    /// Click bindings attach to an epoch; a mismatch marks them stale.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    /// Features of one kind in ascending id (insertion) order.
    pub fn by_kind(&self, kind: FeatureKind) -> Vec<&Feature> {
        self.features.values().filter(|f| f.kind() == kind).collect()
    }

    pub fn count_kind(&self, kind: FeatureKind) -> usize {
        self.features.values().filter(|f| f.kind() == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Atomically replaces all features of `kind` with `batch`.
    ///
    /// Items whose payload carries a different kind are skipped; the kind tag
    /// in the data is authoritative. Returns the number inserted.
    pub fn replace_kind(&mut self, kind: FeatureKind, batch: Vec<(Geometry, FeatureData)>) -> usize {
        self.features.retain(|_, f| f.kind() != kind);

        let mut inserted = 0;
        for (geometry, data) in batch {
            if data.kind() != kind {
                continue;
            }
            let id = FeatureId(self.next_id);
            self.next_id += 1;
            self.features.insert(id, Feature { id, geometry, data });
            inserted += 1;
        }

        self.epoch += 1;
        inserted
    }

    /// Removes exactly the features tagged `kind`.
    pub fn clear_kind(&mut self, kind: FeatureKind) -> usize {
        self.clear_kinds(&[kind])
    }

    /// Removes several kinds as one mutation (one epoch bump).
    pub fn clear_kinds(&mut self, kinds: &[FeatureKind]) -> usize {
        let before = self.features.len();
        self.features.retain(|_, f| !kinds.contains(&f.kind()));
        let removed = before - self.features.len();
        if removed > 0 {
            self.epoch += 1;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureStore;
    use crate::feature::{FeatureData, FeatureKind, Geometry, PollutantBreakdown};
    use geo::LatLng;

    fn solar_site(score: f64) -> (Geometry, FeatureData) {
        (
            Geometry::Point {
                at: LatLng::new(0.0, 0.0),
            },
            FeatureData::SolarSite {
                score: Some(score),
                area_hectares: 1.0,
                capacity_mw: 0.4,
                annual_generation_mwh: 600.0,
                co2_offset_tons: 300.0,
            },
        )
    }

    fn hotspot(score: f64) -> (Geometry, FeatureData) {
        (
            Geometry::Point {
                at: LatLng::new(1.0, 1.0),
            },
            FeatureData::Hotspot {
                score: Some(score),
                area_km2: Some(0.5),
                from_cache: false,
            },
        )
    }

    #[test]
    fn replace_kind_is_one_epoch_bump() {
        let mut store = FeatureStore::new();
        let e0 = store.epoch();
        let n = store.replace_kind(FeatureKind::SolarSite, vec![solar_site(80.0), solar_site(60.0)]);
        assert_eq!(n, 2);
        assert_eq!(store.epoch(), e0 + 1);
        assert_eq!(store.count_kind(FeatureKind::SolarSite), 2);
    }

    #[test]
    fn replace_kind_supersedes_previous_batch() {
        let mut store = FeatureStore::new();
        store.replace_kind(FeatureKind::SolarSite, vec![solar_site(80.0)]);
        store.replace_kind(FeatureKind::SolarSite, vec![solar_site(55.0), solar_site(90.0)]);
        let sites = store.by_kind(FeatureKind::SolarSite);
        assert_eq!(sites.len(), 2);
    }

    #[test]
    fn clearing_one_kind_leaves_others_untouched() {
        let mut store = FeatureStore::new();
        store.replace_kind(FeatureKind::SolarSite, vec![solar_site(80.0)]);
        store.replace_kind(FeatureKind::Hotspot, vec![hotspot(70.0), hotspot(40.0)]);

        let removed = store.clear_kind(FeatureKind::Hotspot);
        assert_eq!(removed, 2);
        assert_eq!(store.count_kind(FeatureKind::Hotspot), 0);
        assert_eq!(store.count_kind(FeatureKind::SolarSite), 1);
    }

    #[test]
    fn mismatched_payload_kind_is_skipped() {
        let mut store = FeatureStore::new();
        let n = store.replace_kind(FeatureKind::Hotspot, vec![solar_site(80.0)]);
        assert_eq!(n, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn air_quality_batch_round_trips() {
        let mut store = FeatureStore::new();
        let batch = vec![(
            Geometry::Point {
                at: LatLng::new(24.0, 74.0),
            },
            FeatureData::AirQualityPoint {
                aqi: None,
                breakdown: PollutantBreakdown::default(),
            },
        )];
        store.replace_kind(FeatureKind::AirQualityPoint, batch);
        let pts = store.by_kind(FeatureKind::AirQualityPoint);
        assert_eq!(pts.len(), 1);
        assert_eq!(pts[0].kind(), FeatureKind::AirQualityPoint);
    }
}
