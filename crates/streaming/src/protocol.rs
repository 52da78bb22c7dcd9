//! Wire formats for the upstream analysis services.
//!
//! These mirror the JSON the services actually emit, separately from the
//! internal feature model: rings arrive as `[lng, lat]` pairs (GeoJSON axis
//! order) and numeric fields the analyses may omit stay optional here.

use std::collections::BTreeMap;

use features::PollutantBreakdown;
use geo::LatLng;
use serde::{Deserialize, Serialize};

/// `[lng, lat]` position as transmitted; converted to [`LatLng`] at the
/// normalization boundary.
pub type WirePosition = [f64; 2];

pub fn ring_to_latlngs(ring: &[WirePosition]) -> Vec<LatLng> {
    ring.iter().map(|p| LatLng::new(p[1], p[0])).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityCellWire {
    pub ring: Vec<WirePosition>,
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityResponse {
    pub features: Vec<DensityCellWire>,
    /// Human-readable resolution label for the detail level served, e.g.
    /// "City".
    pub lod_label: String,
}

/// One grid location's air-quality reading.
///
/// The service may deliver a precomputed index, only the raw pollutant
/// concentrations, or nothing at all for locations it has no coverage for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySample {
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(flatten)]
    pub breakdown: PollutantBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPolygonWire {
    pub ring: Vec<WirePosition>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub area_km2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacantLandResponse {
    pub polygons: Vec<ScoredPolygonWire>,
    /// Whether the analysis was served from the upstream's result cache.
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceGapWire {
    pub ring: Vec<WirePosition>,
    pub need: String,
    pub distance_km: f64,
    pub area_km2: f64,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummaryWire {
    pub gap_count: usize,
    pub worst_distance_km: f64,
}

/// Gap analysis response, keyed by service name ("parks", "food", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceGapsResponse {
    pub gaps: BTreeMap<String, Vec<ServiceGapWire>>,
    #[serde(default)]
    pub summaries: BTreeMap<String, ServiceSummaryWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarPolygonWire {
    pub ring: Vec<WirePosition>,
    #[serde(default)]
    pub score: Option<f64>,
    pub area_hectares: f64,
    pub capacity_mw: f64,
    pub annual_generation_mwh: f64,
    pub co2_offset_tons: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolarSummaryWire {
    pub site_count: usize,
    pub total_capacity_mw: f64,
    #[serde(default)]
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarResponse {
    pub sites: Vec<SolarPolygonWire>,
    #[serde(default)]
    pub summary: SolarSummaryWire,
}
