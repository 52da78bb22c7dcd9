use std::collections::BTreeSet;

use features::FeatureKind;
use serde::{Deserialize, Serialize};
use streaming::SourceId;

/// Every togglable layer in the dashboard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    Satellite,
    PopulationDensity,
    AirQuality,
    VacantLand,
    ServiceGaps,
    SolarPotential,
}

impl LayerId {
    pub const ALL: [LayerId; 6] = [
        LayerId::Satellite,
        LayerId::PopulationDensity,
        LayerId::AirQuality,
        LayerId::VacantLand,
        LayerId::ServiceGaps,
        LayerId::SolarPotential,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Satellite => "satellite",
            LayerId::PopulationDensity => "population_density",
            LayerId::AirQuality => "air_quality",
            LayerId::VacantLand => "vacant_land",
            LayerId::ServiceGaps => "service_gaps",
            LayerId::SolarPotential => "solar_potential",
        }
    }

    /// Tile-style layers (satellite, choropleth, AQI grid) are mutually
    /// exclusive; the analytical overlays combine freely.
    pub fn category(&self) -> LayerCategory {
        match self {
            LayerId::Satellite | LayerId::PopulationDensity | LayerId::AirQuality => {
                LayerCategory::ExclusiveBase
            }
            _ => LayerCategory::IndependentOverlay,
        }
    }

    /// Feature kind this layer owns in the store, if it draws vectors.
    pub fn feature_kind(&self) -> Option<FeatureKind> {
        match self {
            LayerId::Satellite => None,
            LayerId::PopulationDensity => Some(FeatureKind::DensityCell),
            LayerId::AirQuality => Some(FeatureKind::AirQualityPoint),
            LayerId::VacantLand => Some(FeatureKind::Hotspot),
            LayerId::ServiceGaps => Some(FeatureKind::ServiceGap),
            LayerId::SolarPotential => Some(FeatureKind::SolarSite),
        }
    }

    /// Data source feeding this layer, if any. Satellite is raster-only and
    /// fetches nothing through the scheduler.
    pub fn source(&self) -> Option<SourceId> {
        match self {
            LayerId::Satellite => None,
            LayerId::PopulationDensity => Some(SourceId::Density),
            LayerId::AirQuality => Some(SourceId::AirQuality),
            LayerId::VacantLand => Some(SourceId::VacantLand),
            LayerId::ServiceGaps => Some(SourceId::ServiceGaps),
            LayerId::SolarPotential => Some(SourceId::Solar),
        }
    }

    /// Whether activation requires a committed area of interest.
    pub fn requires_aoi(&self) -> bool {
        matches!(self, LayerId::VacantLand | LayerId::ServiceGaps)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerCategory {
    /// At most one active; activating one deactivates the other.
    ExclusiveBase,
    /// Freely combinable with the base and with each other.
    IndependentOverlay,
}

/// What changed when a layer was toggled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub activated: bool,
    /// Base layer that was implicitly deactivated, if any.
    pub displaced: Option<LayerId>,
}

/// Active-layer bookkeeping.
///
/// Holds no fetch or feature state; it only answers "what is active" and
/// enforces base exclusivity.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    base: Option<LayerId>,
    overlays: BTreeSet<LayerId>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRegistry {
    /// Starts with the satellite base active, overlays all off.
    pub fn new() -> Self {
        Self {
            base: Some(LayerId::Satellite),
            overlays: BTreeSet::new(),
        }
    }

    pub fn is_active(&self, layer: LayerId) -> bool {
        match layer.category() {
            LayerCategory::ExclusiveBase => self.base == Some(layer),
            LayerCategory::IndependentOverlay => self.overlays.contains(&layer),
        }
    }

    pub fn active_base(&self) -> Option<LayerId> {
        self.base
    }

    pub fn active_overlays(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.overlays.iter().copied()
    }

    /// Flips the layer and returns what happened.
    ///
    /// Toggling an inactive base displaces the current base; toggling the
    /// active base turns it off and leaves no base active.
    pub fn toggle(&mut self, layer: LayerId) -> ToggleOutcome {
        match layer.category() {
            LayerCategory::ExclusiveBase => {
                if self.base == Some(layer) {
                    self.base = None;
                    ToggleOutcome {
                        activated: false,
                        displaced: None,
                    }
                } else {
                    let displaced = self.base.replace(layer);
                    ToggleOutcome {
                        activated: true,
                        displaced,
                    }
                }
            }
            LayerCategory::IndependentOverlay => {
                if self.overlays.remove(&layer) {
                    ToggleOutcome {
                        activated: false,
                        displaced: None,
                    }
                } else {
                    self.overlays.insert(layer);
                    ToggleOutcome {
                        activated: true,
                        displaced: None,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerId, LayerRegistry};

    #[test]
    fn base_layers_are_mutually_exclusive() {
        let mut reg = LayerRegistry::new();
        assert!(reg.is_active(LayerId::Satellite));

        let outcome = reg.toggle(LayerId::PopulationDensity);
        assert!(outcome.activated);
        assert_eq!(outcome.displaced, Some(LayerId::Satellite));
        assert!(reg.is_active(LayerId::PopulationDensity));
        assert!(!reg.is_active(LayerId::Satellite));
    }

    #[test]
    fn toggling_the_active_base_off_leaves_none() {
        let mut reg = LayerRegistry::new();
        let outcome = reg.toggle(LayerId::Satellite);
        assert!(!outcome.activated);
        assert_eq!(reg.active_base(), None);
    }

    #[test]
    fn overlays_stack_independently() {
        let mut reg = LayerRegistry::new();
        reg.toggle(LayerId::VacantLand);
        reg.toggle(LayerId::SolarPotential);
        assert!(reg.is_active(LayerId::VacantLand));
        assert!(reg.is_active(LayerId::SolarPotential));
        assert!(reg.is_active(LayerId::Satellite));

        reg.toggle(LayerId::VacantLand);
        assert!(!reg.is_active(LayerId::VacantLand));
        assert!(reg.is_active(LayerId::SolarPotential));
    }

    #[test]
    fn air_quality_is_a_base_layer() {
        let mut reg = LayerRegistry::new();
        let outcome = reg.toggle(LayerId::AirQuality);
        assert_eq!(outcome.displaced, Some(LayerId::Satellite));
        assert!(reg.is_active(LayerId::AirQuality));
    }

    #[test]
    fn aoi_layers_are_flagged() {
        assert!(LayerId::VacantLand.requires_aoi());
        assert!(LayerId::ServiceGaps.requires_aoi());
        assert!(!LayerId::SolarPotential.requires_aoi());
        assert!(!LayerId::AirQuality.requires_aoi());
    }
}
