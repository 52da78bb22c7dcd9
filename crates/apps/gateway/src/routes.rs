use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use features::FeatureId;
use geo::{AoiKind, GeoBounds, LatLng, Viewport};
use layers::{paint_for, LayerId, Paint};
use overlay::{CommandError, MapClick, OverlayManager, OverlayParams};
use runtime::Millis;
use serde::{Deserialize, Serialize};
use serde_json::json;
use streaming::FetchRequest;
use tracing::info;

use crate::fetch;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<Mutex<OverlayManager>>,
    pub http: reqwest::Client,
    pub upstream: Arc<str>,
    pub started: Instant,
}

impl AppState {
    pub fn now(&self) -> Millis {
        Millis(self.started.elapsed().as_millis() as u64)
    }
}

/// Sends each request to the upstream and feeds the outcome back into the
/// manager. The lock is never held across the network call.
pub fn dispatch(state: &AppState, requests: Vec<FetchRequest>) {
    for request in requests {
        let state = state.clone();
        tokio::spawn(async move {
            let outcome = fetch::execute(&state.http, &state.upstream, request).await;
            let now = state.now();
            state
                .manager
                .lock()
                .expect("manager lock poisoned")
                .complete(outcome, now);
        });
    }
}

pub async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

#[derive(Debug, Deserialize)]
pub struct ViewportBody {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
    zoom: u8,
}

pub async fn post_viewport(
    State(state): State<AppState>,
    Json(body): Json<ViewportBody>,
) -> Response {
    let viewport = Viewport::new(
        GeoBounds::new(body.north, body.south, body.east, body.west),
        body.zoom,
    );
    let now = state.now();
    state
        .manager
        .lock()
        .expect("manager lock poisoned")
        .on_viewport(viewport, now);
    Json(json!({ "ok": true })).into_response()
}

#[derive(Debug, Serialize)]
struct ToggleBody {
    layer: LayerId,
    activated: bool,
    displaced: Option<LayerId>,
    requests_issued: usize,
}

pub async fn toggle_layer(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Response {
    let Some(layer) = LayerId::ALL.into_iter().find(|l| l.as_str() == id) else {
        return (StatusCode::NOT_FOUND, format!("unknown layer: {id}")).into_response();
    };
    let now = state.now();
    let report = {
        let mut manager = state.manager.lock().expect("manager lock poisoned");
        manager.toggle_layer(layer, now)
    };
    match report {
        Ok(report) => {
            let body = ToggleBody {
                layer,
                activated: report.activated,
                displaced: report.displaced,
                requests_issued: report.requests.len(),
            };
            dispatch(&state, report.requests);
            Json(body).into_response()
        }
        Err(err @ CommandError::NeedsAoi { .. }) => {
            (StatusCode::CONFLICT, err.to_string()).into_response()
        }
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct AoiBeginBody {
    kind: AoiKind,
}

pub async fn aoi_begin(State(state): State<AppState>, Json(body): Json<AoiBeginBody>) -> Response {
    state
        .manager
        .lock()
        .expect("manager lock poisoned")
        .begin_aoi(body.kind);
    Json(json!({ "ok": true })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct PointBody {
    lat: f64,
    lng: f64,
}

pub async fn aoi_point(State(state): State<AppState>, Json(body): Json<PointBody>) -> Response {
    let consumed = {
        let mut manager = state.manager.lock().expect("manager lock poisoned");
        manager.map_click(LatLng::new(body.lat, body.lng)) == MapClick::ConsumedByAoi
    };
    Json(json!({ "consumed": consumed })).into_response()
}

pub async fn aoi_commit(State(state): State<AppState>) -> Response {
    let now = state.now();
    let result = {
        let mut manager = state.manager.lock().expect("manager lock poisoned");
        manager.commit_aoi(now)
    };
    match result {
        Ok(requests) => {
            let issued = requests.len();
            dispatch(&state, requests);
            Json(json!({ "ok": true, "requests_issued": issued })).into_response()
        }
        Err(err) => (StatusCode::CONFLICT, err.to_string()).into_response(),
    }
}

pub async fn aoi_clear(State(state): State<AppState>) -> Response {
    let now = state.now();
    let released = state
        .manager
        .lock()
        .expect("manager lock poisoned")
        .clear_aoi(now);
    Json(json!({ "released": released })).into_response()
}

#[derive(Debug, Serialize)]
struct FeatureView {
    id: u64,
    kind: &'static str,
    geometry: features::Geometry,
    data: features::FeatureData,
    paint: Paint,
}

pub async fn get_features(State(state): State<AppState>) -> Response {
    let manager = state.manager.lock().expect("manager lock poisoned");
    let store = manager.store();
    let views: Vec<FeatureView> = store
        .iter()
        .map(|f| FeatureView {
            id: f.id.0,
            kind: f.kind().as_str(),
            geometry: f.geometry.clone(),
            data: f.data.clone(),
            paint: paint_for(f),
        })
        .collect();
    Json(json!({ "epoch": store.epoch(), "features": views })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ClickBody {
    id: u64,
}

pub async fn post_click(State(state): State<AppState>, Json(body): Json<ClickBody>) -> Response {
    let payload = state
        .manager
        .lock()
        .expect("manager lock poisoned")
        .click(FeatureId(body.id));
    match payload {
        Some(payload) => Json(payload).into_response(),
        None => (StatusCode::NOT_FOUND, "no such feature").into_response(),
    }
}

pub async fn get_status(State(state): State<AppState>) -> Response {
    let status = state
        .manager
        .lock()
        .expect("manager lock poisoned")
        .status();
    Json(status).into_response()
}

pub async fn drain_notices(State(state): State<AppState>) -> Response {
    let notices: Vec<String> = state
        .manager
        .lock()
        .expect("manager lock poisoned")
        .drain_notices()
        .iter()
        .map(|n| n.to_string())
        .collect();
    Json(notices).into_response()
}

pub async fn set_params(
    State(state): State<AppState>,
    Json(params): Json<OverlayParams>,
) -> Response {
    info!(date = %params.date, "query parameters updated");
    state
        .manager
        .lock()
        .expect("manager lock poisoned")
        .set_params(params);
    Json(json!({ "ok": true })).into_response()
}
