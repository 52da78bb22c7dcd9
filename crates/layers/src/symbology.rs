//! Feature styling.
//!
//! Paint is derived from feature data at render time; nothing in the store
//! carries style. Colors are CSS hex strings for the web renderer.

use features::{Feature, FeatureData, NeedLevel, ServiceType};
use serde::{Deserialize, Serialize};
use streaming::AqiCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paint {
    pub fill: &'static str,
    pub stroke: &'static str,
    /// Fill opacity in [0, 100].
    pub opacity: u8,
    /// Marker icon name, for kinds that render one.
    pub icon: Option<&'static str>,
}

const fn paint(fill: &'static str, stroke: &'static str, opacity: u8) -> Paint {
    Paint {
        fill,
        stroke,
        opacity,
        icon: None,
    }
}

/// Neutral paint for features whose scoring data is missing.
pub const UNSCORED: Paint = paint("#9e9e9e", "#616161", 35);

/// Qualitative band for 0–100 analysis scores.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 70.0 {
            ScoreBand::VeryGood
        } else if score >= 60.0 {
            ScoreBand::Good
        } else if score >= 50.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::VeryGood => "Very Good",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
        }
    }

    pub fn paint(&self) -> Paint {
        match self {
            ScoreBand::Excellent => paint("#1b5e20", "#0d3b11", 55),
            ScoreBand::VeryGood => paint("#4caf50", "#2e7d32", 50),
            ScoreBand::Good => paint("#cddc39", "#9e9d24", 45),
            ScoreBand::Fair => paint("#ff9800", "#ef6c00", 45),
            ScoreBand::Poor => paint("#e53935", "#b71c1c", 40),
        }
    }
}

/// Standard EPA AQI category colors.
pub fn aqi_paint(category: AqiCategory) -> Paint {
    match category {
        AqiCategory::Good => paint("#00e400", "#009900", 60),
        AqiCategory::Moderate => paint("#ffff00", "#b2b200", 60),
        AqiCategory::UnhealthyForSensitive => paint("#ff7e00", "#b25800", 60),
        AqiCategory::Unhealthy => paint("#ff0000", "#b20000", 60),
        AqiCategory::VeryUnhealthy => paint("#8f3f97", "#642c69", 60),
        AqiCategory::Hazardous => paint("#7e0023", "#580018", 60),
    }
}

fn service_icon(service: ServiceType) -> &'static str {
    match service {
        ServiceType::Parks => "tree",
        ServiceType::Food => "shopping-basket",
        ServiceType::Healthcare => "hospital",
        ServiceType::Transport => "bus",
    }
}

fn need_paint(need: NeedLevel) -> Paint {
    match need {
        NeedLevel::Low => paint("#fff176", "#c8b900", 35),
        NeedLevel::Medium => paint("#ffb74d", "#c88719", 45),
        NeedLevel::High => paint("#e57373", "#af4448", 55),
    }
}

fn density_paint(population: f64) -> Paint {
    // Band edges follow the choropleth legend, people per cell.
    if population >= 50_000.0 {
        paint("#4a148c", "#2d0a54", 65)
    } else if population >= 10_000.0 {
        paint("#7b1fa2", "#4a148c", 55)
    } else if population >= 1_000.0 {
        paint("#ab47bc", "#7b1fa2", 45)
    } else if population >= 100.0 {
        paint("#ce93d8", "#ab47bc", 35)
    } else {
        paint("#f3e5f5", "#ce93d8", 20)
    }
}

/// Style for one stored feature. Total over every feature kind; missing
/// scores fall back to [`UNSCORED`] rather than failing.
pub fn paint_for(feature: &Feature) -> Paint {
    match &feature.data {
        FeatureData::DensityCell { population, .. } => density_paint(*population),
        FeatureData::AirQualityPoint { aqi, .. } => match aqi {
            Some(aqi) => aqi_paint(AqiCategory::from_aqi(*aqi)),
            None => UNSCORED,
        },
        FeatureData::Hotspot { score, .. } | FeatureData::SolarSite { score, .. } => match score {
            Some(score) => ScoreBand::from_score(*score).paint(),
            None => UNSCORED,
        },
        FeatureData::ServiceGap { service, need, .. } => Paint {
            icon: Some(service_icon(*service)),
            ..need_paint(*need)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreBand, UNSCORED, paint_for};
    use features::{Feature, FeatureData, FeatureId, Geometry, PollutantBreakdown};
    use geo::LatLng;

    fn hotspot(score: Option<f64>) -> Feature {
        Feature {
            id: FeatureId(1),
            geometry: Geometry::Point {
                at: LatLng::new(0.0, 0.0),
            },
            data: FeatureData::Hotspot {
                score,
                area_km2: Some(1.0),
                from_cache: false,
            },
        }
    }

    #[test]
    fn score_bands_match_the_legend() {
        // Scores 85, 62, 41 fall into three distinct bands.
        assert_eq!(ScoreBand::from_score(85.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(62.0), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(41.0), ScoreBand::Poor);
        assert_eq!(ScoreBand::from_score(80.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(79.9), ScoreBand::VeryGood);
    }

    #[test]
    fn differently_scored_hotspots_get_distinct_paint() {
        let a = paint_for(&hotspot(Some(85.0)));
        let b = paint_for(&hotspot(Some(62.0)));
        let c = paint_for(&hotspot(Some(41.0)));
        assert_ne!(a.fill, b.fill);
        assert_ne!(b.fill, c.fill);
        assert_ne!(a.fill, c.fill);
    }

    #[test]
    fn unscored_features_render_neutral() {
        assert_eq!(paint_for(&hotspot(None)), UNSCORED);
    }

    #[test]
    fn service_gaps_carry_a_per_service_icon() {
        let f = Feature {
            id: FeatureId(3),
            geometry: Geometry::Point {
                at: LatLng::new(0.0, 0.0),
            },
            data: FeatureData::ServiceGap {
                service: features::ServiceType::Healthcare,
                need: features::NeedLevel::High,
                distance_km: 2.0,
                area_km2: 0.4,
                recommendation: String::new(),
            },
        };
        let p = paint_for(&f);
        assert_eq!(p.icon, Some("hospital"));
        // Polygon kinds render without icons.
        assert_eq!(paint_for(&hotspot(Some(70.0))).icon, None);
    }

    #[test]
    fn missing_aqi_renders_neutral() {
        let f = Feature {
            id: FeatureId(2),
            geometry: Geometry::Point {
                at: LatLng::new(0.0, 0.0),
            },
            data: FeatureData::AirQualityPoint {
                aqi: None,
                breakdown: PollutantBreakdown::default(),
            },
        };
        assert_eq!(paint_for(&f), UNSCORED);
    }
}
