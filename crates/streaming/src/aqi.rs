//! EPA AQI computation from raw pollutant concentrations.
//!
//! Used when an upstream air-quality sample carries the pollutant breakdown
//! but no precomputed index. Sub-indices are interpolated over the EPA
//! breakpoint tables; the overall AQI is the maximum sub-index.

use features::PollutantBreakdown;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pollutant {
    Pm25,
    Pm10,
    Ozone8h,
    No2_1h,
    So2_1h,
    Co8h,
}

struct Breakpoint {
    c_low: f64,
    c_high: f64,
    i_low: f64,
    i_high: f64,
}

const fn bp(c_low: f64, c_high: f64, i_low: f64, i_high: f64) -> Breakpoint {
    Breakpoint {
        c_low,
        c_high,
        i_low,
        i_high,
    }
}

// Concentration units: µg/m³ for PM, ppb for gases, ppm for CO.
const PM2_5: [Breakpoint; 6] = [
    bp(0.0, 12.0, 0.0, 50.0),
    bp(12.1, 35.4, 51.0, 100.0),
    bp(35.5, 55.4, 101.0, 150.0),
    bp(55.5, 150.4, 151.0, 200.0),
    bp(150.5, 250.4, 201.0, 300.0),
    bp(250.5, 500.4, 301.0, 500.0),
];
const PM10: [Breakpoint; 6] = [
    bp(0.0, 54.0, 0.0, 50.0),
    bp(55.0, 154.0, 51.0, 100.0),
    bp(155.0, 254.0, 101.0, 150.0),
    bp(255.0, 354.0, 151.0, 200.0),
    bp(355.0, 424.0, 201.0, 300.0),
    bp(425.0, 604.0, 301.0, 500.0),
];
const OZONE_8H: [Breakpoint; 6] = [
    bp(0.0, 54.0, 0.0, 50.0),
    bp(55.0, 70.0, 51.0, 100.0),
    bp(71.0, 85.0, 101.0, 150.0),
    bp(86.0, 105.0, 151.0, 200.0),
    bp(106.0, 200.0, 201.0, 300.0),
    bp(201.0, 604.0, 301.0, 500.0),
];
const NO2_1H: [Breakpoint; 6] = [
    bp(0.0, 53.0, 0.0, 50.0),
    bp(54.0, 100.0, 51.0, 100.0),
    bp(101.0, 360.0, 101.0, 150.0),
    bp(361.0, 649.0, 151.0, 200.0),
    bp(650.0, 1249.0, 201.0, 300.0),
    bp(1250.0, 2049.0, 301.0, 500.0),
];
const SO2_1H: [Breakpoint; 6] = [
    bp(0.0, 35.0, 0.0, 50.0),
    bp(36.0, 75.0, 51.0, 100.0),
    bp(76.0, 185.0, 101.0, 150.0),
    bp(186.0, 304.0, 151.0, 200.0),
    bp(305.0, 604.0, 201.0, 300.0),
    bp(605.0, 1004.0, 301.0, 500.0),
];
const CO_8H: [Breakpoint; 6] = [
    bp(0.0, 4.4, 0.0, 50.0),
    bp(4.5, 9.4, 51.0, 100.0),
    bp(9.5, 12.4, 101.0, 150.0),
    bp(12.5, 15.4, 151.0, 200.0),
    bp(15.5, 30.4, 201.0, 300.0),
    bp(30.5, 50.4, 301.0, 500.0),
];

// µg/m³ → ppb (ppm for CO) at standard conditions.
const OZONE_UGM3_TO_PPB: f64 = 0.5;
const NO2_UGM3_TO_PPB: f64 = 0.532;
const SO2_UGM3_TO_PPB: f64 = 0.382;
const CO_UGM3_TO_PPM: f64 = 0.000_873;

impl Pollutant {
    fn breakpoints(&self) -> &'static [Breakpoint; 6] {
        match self {
            Pollutant::Pm25 => &PM2_5,
            Pollutant::Pm10 => &PM10,
            Pollutant::Ozone8h => &OZONE_8H,
            Pollutant::No2_1h => &NO2_1H,
            Pollutant::So2_1h => &SO2_1H,
            Pollutant::Co8h => &CO_8H,
        }
    }

    /// EPA truncation rule: PM2.5 and CO to one decimal, the rest to
    /// integers.
    fn truncate(&self, concentration: f64) -> f64 {
        match self {
            Pollutant::Pm25 | Pollutant::Co8h => (concentration * 10.0).floor() / 10.0,
            _ => concentration.floor(),
        }
    }
}

/// Sub-index for one pollutant, or `None` for NaN/out-of-range input.
pub fn sub_index(pollutant: Pollutant, concentration: f64) -> Option<f64> {
    if !concentration.is_finite() {
        return None;
    }
    let c = pollutant.truncate(concentration);
    for b in pollutant.breakpoints() {
        if c >= b.c_low && c <= b.c_high {
            let frac = (b.i_high - b.i_low) / (b.c_high - b.c_low);
            return Some(frac * (c - b.c_low) + b.i_low);
        }
    }
    None
}

/// Overall AQI: the maximum sub-index across available pollutants.
///
/// Gas concentrations arrive in µg/m³ and are converted to the table units
/// first. Returns `None` when no pollutant yields a sub-index.
pub fn overall_aqi(breakdown: &PollutantBreakdown) -> Option<u16> {
    let candidates = [
        breakdown.pm2_5.and_then(|c| sub_index(Pollutant::Pm25, c)),
        breakdown.pm10.and_then(|c| sub_index(Pollutant::Pm10, c)),
        breakdown
            .ozone
            .and_then(|c| sub_index(Pollutant::Ozone8h, c * OZONE_UGM3_TO_PPB)),
        breakdown
            .nitrogen_dioxide
            .and_then(|c| sub_index(Pollutant::No2_1h, c * NO2_UGM3_TO_PPB)),
        breakdown
            .sulphur_dioxide
            .and_then(|c| sub_index(Pollutant::So2_1h, c * SO2_UGM3_TO_PPB)),
        breakdown
            .carbon_monoxide
            .and_then(|c| sub_index(Pollutant::Co8h, c * CO_UGM3_TO_PPM)),
    ];

    candidates
        .into_iter()
        .flatten()
        .fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        })
        .map(|v| v.round() as u16)
}

/// The six EPA AQI categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitive,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AqiCategory, Pollutant, overall_aqi, sub_index};
    use features::PollutantBreakdown;

    #[test]
    fn pm25_band_edges() {
        assert_eq!(sub_index(Pollutant::Pm25, 12.0), Some(50.0));
        assert_eq!(sub_index(Pollutant::Pm25, 35.4), Some(100.0));
        assert_eq!(sub_index(Pollutant::Pm25, 0.0), Some(0.0));
    }

    #[test]
    fn truncation_follows_epa_rules() {
        // 12.08 truncates to 12.0 (one decimal), landing in the first band.
        assert_eq!(sub_index(Pollutant::Pm25, 12.08), Some(50.0));
        // PM10 truncates to integer: 54.9 → 54.
        assert_eq!(sub_index(Pollutant::Pm10, 54.9), Some(50.0));
    }

    #[test]
    fn out_of_range_or_nan_yields_none() {
        assert_eq!(sub_index(Pollutant::Pm25, 9_999.0), None);
        assert_eq!(sub_index(Pollutant::Pm25, f64::NAN), None);
    }

    #[test]
    fn overall_is_the_max_sub_index() {
        let breakdown = PollutantBreakdown {
            pm2_5: Some(10.0),  // sub-index ~41
            pm10: Some(120.0),  // sub-index ~83
            ..Default::default()
        };
        let aqi = overall_aqi(&breakdown).unwrap();
        assert!(aqi > 50 && aqi <= 100, "got {aqi}");
    }

    #[test]
    fn empty_breakdown_has_no_aqi() {
        assert_eq!(overall_aqi(&PollutantBreakdown::default()), None);
    }

    #[test]
    fn six_categories_cover_the_scale() {
        assert_eq!(AqiCategory::from_aqi(42), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(75), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(125), AqiCategory::UnhealthyForSensitive);
        assert_eq!(AqiCategory::from_aqi(180), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(250), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(400), AqiCategory::Hazardous);
    }
}
