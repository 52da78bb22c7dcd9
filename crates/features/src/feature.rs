use geo::LatLng;
use serde::{Deserialize, Serialize};

/// Identifies one feature in the store.
///
/// Small, copyable handle; ids are allocated by the store and never reused
/// within a session.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct FeatureId(pub u64);

/// The dataset/analysis a feature belongs to.
///
/// The kind is immutable once a feature is created; layers clear features by
/// kind, never individually.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    DensityCell,
    AirQualityPoint,
    Hotspot,
    ServiceGap,
    SolarSite,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::DensityCell,
        FeatureKind::AirQualityPoint,
        FeatureKind::Hotspot,
        FeatureKind::ServiceGap,
        FeatureKind::SolarSite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::DensityCell => "density_cell",
            FeatureKind::AirQualityPoint => "air_quality_point",
            FeatureKind::Hotspot => "hotspot",
            FeatureKind::ServiceGap => "service_gap",
            FeatureKind::SolarSite => "solar_site",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Polygon { ring: Vec<LatLng> },
    Point { at: LatLng },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Parks,
    Food,
    Healthcare,
    Transport,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Parks,
        ServiceType::Food,
        ServiceType::Healthcare,
        ServiceType::Transport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Parks => "parks",
            ServiceType::Food => "food",
            ServiceType::Healthcare => "healthcare",
            ServiceType::Transport => "transport",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedLevel {
    Low,
    Medium,
    High,
}

impl NeedLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedLevel::Low => "low",
            NeedLevel::Medium => "medium",
            NeedLevel::High => "high",
        }
    }
}

/// Raw pollutant concentrations in µg/m³, as delivered upstream.
///
/// Every field is optional; missing pollutants simply contribute no AQI
/// sub-index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantBreakdown {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub ozone: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub carbon_monoxide: Option<f64>,
}

/// Per-kind feature payload.
///
/// A tagged union with fixed field sets instead of a key/value property bag;
/// style and click resolution pattern-match on the tag. Optional fields model
/// data the upstream analyses legitimately omit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureData {
    DensityCell {
        population: f64,
        lod_label: String,
    },
    AirQualityPoint {
        aqi: Option<u16>,
        breakdown: PollutantBreakdown,
    },
    Hotspot {
        score: Option<f64>,
        area_km2: Option<f64>,
        from_cache: bool,
    },
    ServiceGap {
        service: ServiceType,
        need: NeedLevel,
        distance_km: f64,
        area_km2: f64,
        recommendation: String,
    },
    SolarSite {
        score: Option<f64>,
        area_hectares: f64,
        capacity_mw: f64,
        annual_generation_mwh: f64,
        co2_offset_tons: f64,
    },
}

impl FeatureData {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureData::DensityCell { .. } => FeatureKind::DensityCell,
            FeatureData::AirQualityPoint { .. } => FeatureKind::AirQualityPoint,
            FeatureData::Hotspot { .. } => FeatureKind::Hotspot,
            FeatureData::ServiceGap { .. } => FeatureKind::ServiceGap,
            FeatureData::SolarSite { .. } => FeatureKind::SolarSite,
        }
    }
}

/// One renderable item on the shared surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub data: FeatureData,
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureData, FeatureKind, PollutantBreakdown};

    #[test]
    fn data_reports_its_kind() {
        let d = FeatureData::AirQualityPoint {
            aqi: Some(42),
            breakdown: PollutantBreakdown::default(),
        };
        assert_eq!(d.kind(), FeatureKind::AirQualityPoint);
        assert_eq!(d.kind().as_str(), "air_quality_point");
    }
}
