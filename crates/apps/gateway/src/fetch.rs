//! Executes fetch requests against the upstream analysis services.
//!
//! The manager decides *what* to fetch; this module only moves bytes and
//! decodes them. Long-running AOI analyses get a wider timeout than the
//! viewport queries.

use std::time::Duration;

use futures_util::future::join_all;
use geo::{GeoBounds, LatLng};
use streaming::{
    AirQualitySample, DensityResponse, FetchError, FetchOutcome, FetchRequest, PointOutcome,
    ServiceGapsResponse, SolarResponse, SourcePayload, VacantLandResponse,
};
use tracing::warn;

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

fn transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            secs: ANALYSIS_TIMEOUT.as_secs(),
        }
    } else {
        FetchError::Transport {
            message: err.to_string(),
        }
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(FetchError::Upstream {
            status: status.as_u16(),
            message,
        });
    }
    resp.json::<T>().await.map_err(transport)
}

fn bounds_query(bounds: &GeoBounds) -> [(&'static str, String); 4] {
    [
        ("north", bounds.north.to_string()),
        ("south", bounds.south.to_string()),
        ("east", bounds.east.to_string()),
        ("west", bounds.west.to_string()),
    ]
}

async fn density(
    client: &reqwest::Client,
    upstream: &str,
    bounds: &GeoBounds,
    zoom: u8,
) -> Result<SourcePayload, FetchError> {
    let resp = client
        .get(format!("{upstream}/density"))
        .query(&bounds_query(bounds))
        .query(&[("zoom", zoom.to_string())])
        .send()
        .await
        .map_err(transport)?;
    Ok(SourcePayload::Density(decode::<DensityResponse>(resp).await?))
}

async fn density_default(
    client: &reqwest::Client,
    upstream: &str,
) -> Result<SourcePayload, FetchError> {
    let resp = client
        .get(format!("{upstream}/density/default"))
        .send()
        .await
        .map_err(transport)?;
    Ok(SourcePayload::Density(decode::<DensityResponse>(resp).await?))
}

/// One sub-request per grid point. A failed or empty point becomes an
/// unavailable outcome; the composite itself only fails if every point does.
async fn air_quality_grid(
    client: &reqwest::Client,
    upstream: &str,
    points: &[LatLng],
    date: &str,
) -> Result<SourcePayload, FetchError> {
    let queries = points.iter().map(|p| async move {
        let result = client
            .get(format!("{upstream}/air_quality"))
            .query(&[
                ("lat", p.lat.to_string()),
                ("lng", p.lng.to_string()),
                ("date", date.to_string()),
            ])
            .send()
            .await;
        let sample = match result {
            Ok(resp) => match decode::<AirQualitySample>(resp).await {
                Ok(sample) => Some(sample),
                Err(err) => {
                    warn!(lat = p.lat, lng = p.lng, %err, "air quality point failed");
                    None
                }
            },
            Err(err) => {
                warn!(lat = p.lat, lng = p.lng, %err, "air quality point unreachable");
                None
            }
        };
        PointOutcome { at: *p, sample }
    });
    let outcomes = join_all(queries).await;
    Ok(SourcePayload::AirQuality(outcomes))
}

async fn vacant_land(
    client: &reqwest::Client,
    upstream: &str,
    aoi: &geo::AoiRing,
) -> Result<SourcePayload, FetchError> {
    let ring: Vec<[f64; 2]> = aoi.points().iter().map(|p| [p.lng, p.lat]).collect();
    let resp = client
        .post(format!("{upstream}/analysis/vacant_land"))
        .timeout(ANALYSIS_TIMEOUT)
        .json(&serde_json::json!({ "ring": ring }))
        .send()
        .await
        .map_err(transport)?;
    Ok(SourcePayload::VacantLand(
        decode::<VacantLandResponse>(resp).await?,
    ))
}

async fn service_gaps(
    client: &reqwest::Client,
    upstream: &str,
    bounds: &GeoBounds,
    service_types: &[features::ServiceType],
    grid_resolution_km: f64,
) -> Result<SourcePayload, FetchError> {
    let resp = client
        .post(format!("{upstream}/analysis/service_gaps"))
        .timeout(ANALYSIS_TIMEOUT)
        .json(&serde_json::json!({
            "north": bounds.north,
            "south": bounds.south,
            "east": bounds.east,
            "west": bounds.west,
            "service_types": service_types,
            "grid_resolution_km": grid_resolution_km,
        }))
        .send()
        .await
        .map_err(transport)?;
    Ok(SourcePayload::ServiceGaps(
        decode::<ServiceGapsResponse>(resp).await?,
    ))
}

async fn solar(
    client: &reqwest::Client,
    upstream: &str,
    bounds: &GeoBounds,
) -> Result<SourcePayload, FetchError> {
    let resp = client
        .get(format!("{upstream}/solar"))
        .query(&bounds_query(bounds))
        .send()
        .await
        .map_err(transport)?;
    Ok(SourcePayload::Solar(decode::<SolarResponse>(resp).await?))
}

/// Performs one request end to end, always producing an outcome the manager
/// can apply or discard.
pub async fn execute(
    client: &reqwest::Client,
    upstream: &str,
    request: FetchRequest,
) -> FetchOutcome {
    let result = match &request {
        FetchRequest::Density { bounds, zoom, .. } => {
            density(client, upstream, bounds, *zoom).await
        }
        FetchRequest::DensityDefaultRegion { .. } => density_default(client, upstream).await,
        FetchRequest::AirQualityGrid { points, date, .. } => {
            air_quality_grid(client, upstream, points, date).await
        }
        FetchRequest::VacantLand { aoi, .. } => vacant_land(client, upstream, aoi).await,
        FetchRequest::ServiceGaps {
            bounds,
            service_types,
            grid_resolution_km,
            ..
        } => service_gaps(client, upstream, bounds, service_types, *grid_resolution_km).await,
        FetchRequest::Solar { bounds, .. } => solar(client, upstream, bounds).await,
    };
    match result {
        Ok(payload) => FetchOutcome::ok(&request, payload),
        Err(err) => FetchOutcome::err(&request, err),
    }
}
