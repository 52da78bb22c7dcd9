//! Wire payload → feature batch conversion.
//!
//! Runs after staleness checks, immediately before the store swap. Unknown
//! service names and malformed need levels are tolerated rather than failing
//! the batch.

use features::{FeatureData, Geometry, NeedLevel, ServiceType};
use streaming::{
    AirQualitySample, CompositeError, CompositeSummary, DensityResponse, PointOutcome,
    ServiceGapsResponse, SolarResponse, VacantLandResponse, overall_aqi, ring_to_latlngs,
};

pub type FeatureBatch = Vec<(Geometry, FeatureData)>;

pub fn density_batch(resp: &DensityResponse) -> FeatureBatch {
    resp.features
        .iter()
        .map(|cell| {
            (
                Geometry::Polygon {
                    ring: ring_to_latlngs(&cell.ring),
                },
                FeatureData::DensityCell {
                    population: cell.population,
                    lod_label: resp.lod_label.clone(),
                },
            )
        })
        .collect()
}

/// Folds the grid outcomes and builds one point feature per location that
/// returned data. When the sample has no precomputed index, the AQI is
/// derived from the pollutant breakdown.
pub fn air_quality_batch(
    points: Vec<PointOutcome<AirQualitySample>>,
) -> Result<(FeatureBatch, CompositeSummary), CompositeError> {
    let (samples, summary) = streaming::aggregate(points)?;
    let batch = samples
        .into_iter()
        .map(|(at, sample)| {
            let aqi = match sample.aqi {
                Some(v) if v.is_finite() && v >= 0.0 => Some(v.round() as u16),
                _ => overall_aqi(&sample.breakdown),
            };
            (
                Geometry::Point { at },
                FeatureData::AirQualityPoint {
                    aqi,
                    breakdown: sample.breakdown,
                },
            )
        })
        .collect();
    Ok((batch, summary))
}

pub fn vacant_land_batch(resp: &VacantLandResponse) -> FeatureBatch {
    resp.polygons
        .iter()
        .map(|p| {
            (
                Geometry::Polygon {
                    ring: ring_to_latlngs(&p.ring),
                },
                FeatureData::Hotspot {
                    score: p.score,
                    area_km2: p.area_km2,
                    from_cache: resp.cached,
                },
            )
        })
        .collect()
}

fn parse_service(name: &str) -> Option<ServiceType> {
    ServiceType::ALL.into_iter().find(|s| s.as_str() == name)
}

fn parse_need(name: &str) -> NeedLevel {
    match name {
        "low" => NeedLevel::Low,
        "high" => NeedLevel::High,
        _ => NeedLevel::Medium,
    }
}

/// Flattens the per-service gap map. Entries under unrecognized service names
/// are dropped.
pub fn service_gaps_batch(resp: &ServiceGapsResponse) -> FeatureBatch {
    let mut batch = Vec::new();
    for (name, gaps) in &resp.gaps {
        let Some(service) = parse_service(name) else {
            continue;
        };
        for gap in gaps {
            batch.push((
                Geometry::Polygon {
                    ring: ring_to_latlngs(&gap.ring),
                },
                FeatureData::ServiceGap {
                    service,
                    need: parse_need(&gap.need),
                    distance_km: gap.distance_km,
                    area_km2: gap.area_km2,
                    recommendation: gap.recommendation.clone(),
                },
            ));
        }
    }
    batch
}

pub fn solar_batch(resp: &SolarResponse) -> FeatureBatch {
    resp.sites
        .iter()
        .map(|site| {
            (
                Geometry::Polygon {
                    ring: ring_to_latlngs(&site.ring),
                },
                FeatureData::SolarSite {
                    score: site.score,
                    area_hectares: site.area_hectares,
                    capacity_mw: site.capacity_mw,
                    annual_generation_mwh: site.annual_generation_mwh,
                    co2_offset_tons: site.co2_offset_tons,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{air_quality_batch, service_gaps_batch};
    use features::{FeatureData, NeedLevel, PollutantBreakdown, ServiceType};
    use geo::LatLng;
    use streaming::{AirQualitySample, PointOutcome, ServiceGapWire, ServiceGapsResponse};

    #[test]
    fn aqi_is_derived_when_the_index_is_missing() {
        let points = vec![PointOutcome {
            at: LatLng::new(0.0, 0.0),
            sample: Some(AirQualitySample {
                aqi: None,
                breakdown: PollutantBreakdown {
                    pm2_5: Some(12.0),
                    ..Default::default()
                },
            }),
        }];
        let (batch, summary) = air_quality_batch(points).unwrap();
        assert_eq!(summary.succeeded, 1);
        match &batch[0].1 {
            FeatureData::AirQualityPoint { aqi, .. } => assert_eq!(*aqi, Some(50)),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn unknown_service_names_are_dropped() {
        let mut resp = ServiceGapsResponse::default();
        let gap = ServiceGapWire {
            ring: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
            need: "weird".to_string(),
            distance_km: 3.0,
            area_km2: 1.0,
            recommendation: String::new(),
        };
        resp.gaps.insert("parks".to_string(), vec![gap.clone()]);
        resp.gaps.insert("libraries".to_string(), vec![gap]);

        let batch = service_gaps_batch(&resp);
        assert_eq!(batch.len(), 1);
        match &batch[0].1 {
            FeatureData::ServiceGap { service, need, .. } => {
                assert_eq!(*service, ServiceType::Parks);
                // Unrecognized need level falls back to medium.
                assert_eq!(*need, NeedLevel::Medium);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
