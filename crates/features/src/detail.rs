use serde::Serialize;

use crate::feature::{Feature, FeatureData};

/// Content for the shared detail popup.
///
/// Built per click from the feature's tagged payload. `degraded` marks a
/// payload assembled without an expected optional property (e.g. a missing
/// score); the popup still renders a valid view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPayload {
    pub title: String,
    pub lines: Vec<String>,
    pub degraded: bool,
}

/// Total function from feature to popup content; never fails.
pub fn build_detail(feature: &Feature) -> DetailPayload {
    match &feature.data {
        FeatureData::DensityCell {
            population,
            lod_label,
        } => DetailPayload {
            title: "Population density".to_string(),
            lines: vec![
                format!("Population: {population:.0}"),
                format!("Detail level: {lod_label}"),
            ],
            degraded: false,
        },
        FeatureData::AirQualityPoint { aqi, breakdown } => {
            let mut lines = Vec::new();
            let degraded = aqi.is_none();
            match aqi {
                Some(value) => lines.push(format!("AQI: {value}")),
                None => lines.push("AQI: no data at this location".to_string()),
            }
            if let Some(pm) = breakdown.pm2_5 {
                lines.push(format!("PM2.5: {pm:.1} µg/m³"));
            }
            if let Some(pm) = breakdown.pm10 {
                lines.push(format!("PM10: {pm:.1} µg/m³"));
            }
            if let Some(o3) = breakdown.ozone {
                lines.push(format!("Ozone: {o3:.1} µg/m³"));
            }
            if let Some(no2) = breakdown.nitrogen_dioxide {
                lines.push(format!("NO₂: {no2:.1} µg/m³"));
            }
            DetailPayload {
                title: "Air quality".to_string(),
                lines,
                degraded,
            }
        }
        FeatureData::Hotspot {
            score,
            area_km2,
            from_cache,
        } => {
            let mut lines = Vec::new();
            let degraded = score.is_none();
            match score {
                Some(s) => lines.push(format!("Hotspot score: {s:.0} / 100")),
                None => lines.push("Hotspot score unavailable".to_string()),
            }
            if let Some(a) = area_km2 {
                lines.push(format!("Area: {a:.2} km²"));
            }
            if *from_cache {
                lines.push("Served from cached analysis".to_string());
            }
            DetailPayload {
                title: "Vacant land hotspot".to_string(),
                lines,
                degraded,
            }
        }
        FeatureData::ServiceGap {
            service,
            need,
            distance_km,
            area_km2,
            recommendation,
        } => DetailPayload {
            title: format!("Service gap: {}", service.as_str()),
            lines: vec![
                format!("Need level: {}", need.as_str()),
                format!("Nearest {}: {distance_km:.1} km", service.as_str()),
                format!("Affected area: {area_km2:.1} km²"),
                recommendation.clone(),
            ],
            degraded: false,
        },
        FeatureData::SolarSite {
            score,
            area_hectares,
            capacity_mw,
            annual_generation_mwh,
            co2_offset_tons,
        } => {
            let mut lines = Vec::new();
            let degraded = score.is_none();
            match score {
                Some(s) => lines.push(format!("Solar suitability: {s:.0} / 100")),
                None => lines.push("Solar suitability unavailable".to_string()),
            }
            lines.push(format!("Suitable area: {area_hectares:.1} ha"));
            lines.push(format!("Estimated capacity: {capacity_mw:.2} MW"));
            lines.push(format!("Annual generation: {annual_generation_mwh:.0} MWh"));
            lines.push(format!("CO₂ offset: {co2_offset_tons:.0} t/year"));
            DetailPayload {
                title: "Solar potential site".to_string(),
                lines,
                degraded,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::build_detail;
    use crate::feature::{Feature, FeatureData, FeatureId, Geometry, PollutantBreakdown};
    use geo::LatLng;

    fn feature(data: FeatureData) -> Feature {
        Feature {
            id: FeatureId(1),
            geometry: Geometry::Point {
                at: LatLng::new(0.0, 0.0),
            },
            data,
        }
    }

    #[test]
    fn missing_score_yields_degraded_but_valid_view() {
        let payload = build_detail(&feature(FeatureData::Hotspot {
            score: None,
            area_km2: Some(1.2),
            from_cache: false,
        }));
        assert!(payload.degraded);
        assert!(payload.lines[0].contains("unavailable"));
        assert!(payload.lines.iter().any(|l| l.contains("km²")));
    }

    #[test]
    fn solar_detail_includes_energy_estimates() {
        let payload = build_detail(&feature(FeatureData::SolarSite {
            score: Some(83.0),
            area_hectares: 12.5,
            capacity_mw: 5.0,
            annual_generation_mwh: 9_600.0,
            co2_offset_tons: 4_800.0,
        }));
        assert!(!payload.degraded);
        assert!(payload.lines.iter().any(|l| l.contains("MW")));
        assert!(payload.lines.iter().any(|l| l.contains("MWh")));
    }

    #[test]
    fn unavailable_air_quality_still_renders() {
        let payload = build_detail(&feature(FeatureData::AirQualityPoint {
            aqi: None,
            breakdown: PollutantBreakdown::default(),
        }));
        assert!(payload.degraded);
        assert_eq!(payload.title, "Air quality");
        assert!(!payload.lines.is_empty());
    }
}
