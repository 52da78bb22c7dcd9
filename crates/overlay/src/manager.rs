use std::collections::BTreeMap;

use features::{
    AoiCapture, AoiPhase, ClickRouter, DetailPayload, FeatureId, FeatureKind, FeatureStore,
};
use geo::{AoiKind, GeoBounds, LatLng, Viewport, grid_points, lod_bucket};
use layers::{LayerId, LayerRegistry};
use runtime::{Millis, TraceLog};
use serde::Serialize;
use streaming::{
    CompositeError, Completion, FetchOutcome, FetchRequest, FetchTicket, Poll, Seq, SourceId,
    SourcePayload, SourceScheduler, check_suitable,
};
use tracing::{debug, info};

use crate::error::CommandError;
use crate::normalize::{
    FeatureBatch, air_quality_batch, density_batch, service_gaps_batch, solar_batch,
    vacant_land_batch,
};
use crate::notice::Notice;
use crate::params::OverlayParams;

const TRACE_CAPACITY: usize = 64;

/// What a layer toggle did, including any fetches it kicked off.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleReport {
    pub activated: bool,
    pub displaced: Option<LayerId>,
    pub requests: Vec<FetchRequest>,
}

/// Whether a raw map click was taken by the AOI tool.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapClick {
    ConsumedByAoi,
    Ignored,
}

/// Serializable view of the manager for status endpoints and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub base: Option<LayerId>,
    pub overlays: Vec<LayerId>,
    pub aoi: AoiPhase,
    pub epoch: u64,
    pub loading: Vec<SourceId>,
    pub feature_counts: BTreeMap<&'static str, usize>,
    pub notices: Vec<String>,
}

/// The orchestrator behind the dashboard map.
///
/// Sans-IO driving contract:
/// - `on_viewport` for every map movement event,
/// - `tick` with the current clock, collecting [`FetchRequest`]s to execute,
/// - `complete` with each finished request's outcome.
///
/// All staleness, debounce and gating decisions happen here; the host
/// transport only moves bytes.
#[derive(Debug)]
pub struct OverlayManager {
    registry: LayerRegistry,
    store: FeatureStore,
    router: ClickRouter,
    aoi: AoiCapture,
    schedulers: BTreeMap<SourceId, SourceScheduler>,
    params: OverlayParams,
    notices: Vec<Notice>,
    trace: TraceLog,
    viewport: Option<Viewport>,
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_for(source: SourceId) -> FeatureKind {
    match source {
        SourceId::Density => FeatureKind::DensityCell,
        SourceId::AirQuality => FeatureKind::AirQualityPoint,
        SourceId::VacantLand => FeatureKind::Hotspot,
        SourceId::ServiceGaps => FeatureKind::ServiceGap,
        SourceId::Solar => FeatureKind::SolarSite,
    }
}

/// Bookkeeping viewport for fetches issued without any map movement yet.
fn world_viewport() -> Viewport {
    Viewport::new(GeoBounds::new(90.0, -90.0, 180.0, -180.0), 0)
}

impl OverlayManager {
    pub fn new() -> Self {
        let schedulers = SourceId::ALL
            .into_iter()
            .map(|s| (s, SourceScheduler::new(s)))
            .collect();
        Self {
            registry: LayerRegistry::new(),
            store: FeatureStore::new(),
            router: ClickRouter::new(),
            aoi: AoiCapture::new(),
            schedulers,
            params: OverlayParams::default(),
            notices: Vec::new(),
            trace: TraceLog::new(TRACE_CAPACITY),
            viewport: None,
        }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn params(&self) -> &OverlayParams {
        &self.params
    }

    /// Takes effect when the next request is built; triggers nothing itself.
    pub fn set_params(&mut self, params: OverlayParams) {
        self.params = params;
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Records a map movement and restarts the debounce of every active
    /// viewport-scoped source. The fetch decision itself is deferred to
    /// `tick`.
    pub fn on_viewport(&mut self, viewport: Viewport, now: Millis) {
        self.viewport = Some(viewport);
        for layer in self.active_layers() {
            let Some(source) = layer.source() else {
                continue;
            };
            if !source.is_viewport_scoped() {
                continue;
            }
            if let Some(sched) = self.schedulers.get_mut(&source) {
                sched.note_viewport(viewport, now);
            }
        }
    }

    /// Advances the clock; returns the requests that became due.
    pub fn tick(&mut self, now: Millis) -> Vec<FetchRequest> {
        let mut out = Vec::new();
        for source in SourceId::ALL {
            let polled = match self.schedulers.get_mut(&source) {
                Some(sched) => sched.poll(now),
                None => None,
            };
            match polled {
                Some(Poll::Issue(ticket)) => {
                    if let Some(req) = self.build_viewport_request(&ticket) {
                        if let Some(sched) = self.schedulers.get_mut(&source) {
                            sched.mark_in_flight(ticket.seq);
                        }
                        self.trace
                            .record(now, "fetch", format!("{} issued", source.as_str()));
                        out.push(req);
                    }
                }
                Some(Poll::Rejected(reason)) => {
                    self.notices.push(Notice::Gated { source, reason });
                }
                Some(Poll::Unchanged) | None => {}
            }
        }
        out
    }

    /// Toggles a layer; activation may issue an immediate fetch.
    ///
    /// Activating an AOI-scoped analysis without a committed area is rejected
    /// without changing any state.
    pub fn toggle_layer(
        &mut self,
        layer: LayerId,
        now: Millis,
    ) -> Result<ToggleReport, CommandError> {
        let activating = !self.registry.is_active(layer);
        if activating && layer.requires_aoi() && self.aoi.current().is_none() {
            return Err(CommandError::NeedsAoi { layer });
        }

        let outcome = self.registry.toggle(layer);
        if let Some(displaced) = outcome.displaced {
            self.deactivate(displaced, now);
        }

        let mut requests = Vec::new();
        if outcome.activated {
            if let Some(req) = self.activate_fetch(layer, now) {
                requests.push(req);
            }
        } else {
            self.deactivate(layer, now);
        }

        info!(
            layer = layer.as_str(),
            activated = outcome.activated,
            "layer toggled"
        );
        self.trace.record(
            now,
            "layer",
            format!(
                "{} {}",
                layer.as_str(),
                if outcome.activated { "on" } else { "off" }
            ),
        );
        Ok(ToggleReport {
            activated: outcome.activated,
            displaced: outcome.displaced,
            requests,
        })
    }

    pub fn begin_aoi(&mut self, kind: AoiKind) {
        self.aoi.begin(kind);
    }

    pub fn aoi_phase(&self) -> AoiPhase {
        self.aoi.phase()
    }

    pub fn current_aoi(&self) -> Option<&geo::AoiRing> {
        self.aoi.current()
    }

    /// Completes the drawn shape and reruns every active AOI-scoped analysis
    /// against the new area.
    pub fn commit_aoi(&mut self, now: Millis) -> Result<Vec<FetchRequest>, CommandError> {
        self.aoi.complete()?;
        self.trace.record(now, "aoi", "committed");

        let mut requests = Vec::new();
        for layer in LayerId::ALL {
            if !layer.requires_aoi() || !self.registry.is_active(layer) {
                continue;
            }
            let Some(source) = layer.source() else {
                continue;
            };
            if let Some(req) = self.issue_aoi(source, now) {
                requests.push(req);
            }
        }
        Ok(requests)
    }

    /// Releases the committed area. Analysis results keyed to it (vacant
    /// land, service gaps, solar) are removed, not hidden, and any in-flight
    /// results will be discarded on arrival; the layers themselves stay
    /// active, empty until the next commit or viewport event.
    pub fn clear_aoi(&mut self, now: Millis) -> bool {
        let released = self.aoi.clear();
        if released {
            let removed = self.store.clear_kinds(&[
                FeatureKind::Hotspot,
                FeatureKind::ServiceGap,
                FeatureKind::SolarSite,
            ]);
            if removed > 0 {
                self.router.rebind(&self.store);
            }
            for source in [
                SourceId::VacantLand,
                SourceId::ServiceGaps,
                SourceId::Solar,
            ] {
                if let Some(sched) = self.schedulers.get_mut(&source) {
                    sched.invalidate();
                }
            }
            self.trace.record(now, "aoi", "cleared");
        }
        released
    }

    /// Raw map click. While a shape is being drawn the AOI tool is the sole
    /// consumer; otherwise the click is left for feature hit-testing.
    pub fn map_click(&mut self, at: LatLng) -> MapClick {
        if self.aoi.is_drawing() {
            // Cannot fail: is_drawing was just checked.
            let _ = self.aoi.add_point(at);
            MapClick::ConsumedByAoi
        } else {
            MapClick::Ignored
        }
    }

    /// Feature click, routed through the epoch-checked binding. Suspended
    /// while an AOI shape is being drawn: the drawing tool owns clicks.
    pub fn click(&self, id: FeatureId) -> Option<DetailPayload> {
        if self.aoi.is_drawing() {
            return None;
        }
        self.router.dispatch(&self.store, id)
    }

    /// Feeds back one finished request. Stale completions (superseded
    /// sequence, invalidated source) are discarded without touching the
    /// store.
    pub fn complete(&mut self, outcome: FetchOutcome, now: Millis) {
        let source = outcome.source;
        let seq = outcome.seq;
        match outcome.result {
            Ok(payload) => {
                if payload.source() != source {
                    debug!(source = source.as_str(), "payload/source mismatch dropped");
                    return;
                }
                // Normalize before settling the scheduler: a grid with no
                // usable data must land as a failed load, not as an empty
                // success that clears prior features and advances the memo.
                match build_batch(payload) {
                    Ok((batch, unavailable)) => {
                        self.apply_batch(source, seq, batch, unavailable, now)
                    }
                    Err(err) => self.apply_failure(source, seq, err.to_string(), now),
                }
            }
            Err(err) => self.apply_failure(source, seq, err.to_string(), now),
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        let feature_counts = FeatureKind::ALL
            .into_iter()
            .map(|k| (k.as_str(), self.store.count_kind(k)))
            .filter(|(_, n)| *n > 0)
            .collect();
        StatusSnapshot {
            base: self.registry.active_base(),
            overlays: self.registry.active_overlays().collect(),
            aoi: self.aoi.phase(),
            epoch: self.store.epoch(),
            loading: self
                .schedulers
                .values()
                .filter(|s| s.is_loading())
                .map(|s| s.source())
                .collect(),
            feature_counts,
            notices: self.notices.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn active_layers(&self) -> Vec<LayerId> {
        self.registry
            .active_base()
            .into_iter()
            .chain(self.registry.active_overlays())
            .collect()
    }

    fn deactivate(&mut self, layer: LayerId, _now: Millis) {
        if let Some(kind) = layer.feature_kind() {
            if self.store.clear_kind(kind) > 0 {
                self.router.rebind(&self.store);
            }
        }
        if let Some(source) = layer.source() {
            if let Some(sched) = self.schedulers.get_mut(&source) {
                sched.invalidate();
            }
        }
    }

    /// First fetch on activation: immediate, bypassing the debounce.
    fn activate_fetch(&mut self, layer: LayerId, now: Millis) -> Option<FetchRequest> {
        let source = layer.source()?;
        if !source.is_viewport_scoped() {
            return self.issue_aoi(source, now);
        }

        let filter = self.schedulers.get(&source)?.config().filter;
        match self.viewport {
            Some(vp) => match check_suitable(&vp, &filter) {
                Ok(()) => {
                    let ticket = self.schedulers.get_mut(&source)?.issue_now(vp, now);
                    let req = self.build_viewport_request(&ticket);
                    if let Some(sched) = self.schedulers.get_mut(&source) {
                        sched.mark_in_flight(ticket.seq);
                    }
                    req
                }
                Err(reason) => {
                    self.notices.push(Notice::Gated { source, reason });
                    // Density degrades to the upstream's default region so the
                    // layer is not blank; the other sources wait for a
                    // suitable viewport.
                    if source == SourceId::Density {
                        self.issue_default_region(vp, now)
                    } else {
                        None
                    }
                }
            },
            None => {
                if source == SourceId::Density {
                    self.issue_default_region(world_viewport(), now)
                } else {
                    None
                }
            }
        }
    }

    fn issue_default_region(&mut self, vp: Viewport, now: Millis) -> Option<FetchRequest> {
        let sched = self.schedulers.get_mut(&SourceId::Density)?;
        let ticket = sched.issue_now(vp, now);
        sched.mark_in_flight(ticket.seq);
        Some(FetchRequest::DensityDefaultRegion { seq: ticket.seq })
    }

    /// Builds the wire request for a viewport-scoped ticket; `None` for
    /// AOI-scoped sources, which never receive viewport tickets.
    fn build_viewport_request(&self, ticket: &FetchTicket) -> Option<FetchRequest> {
        let bounds = ticket.viewport.bounds;
        let zoom = ticket.viewport.zoom;
        match ticket.source {
            SourceId::Density => Some(FetchRequest::Density {
                seq: ticket.seq,
                bounds,
                zoom,
            }),
            SourceId::AirQuality => {
                let bucket = lod_bucket(zoom);
                Some(FetchRequest::AirQualityGrid {
                    seq: ticket.seq,
                    points: grid_points(&bounds, bucket.grid_resolution),
                    date: self.params.date.clone(),
                    grid_resolution: bucket.grid_resolution,
                })
            }
            SourceId::Solar => Some(FetchRequest::Solar {
                seq: ticket.seq,
                bounds,
            }),
            SourceId::VacantLand | SourceId::ServiceGaps => None,
        }
    }

    fn issue_aoi(&mut self, source: SourceId, now: Millis) -> Option<FetchRequest> {
        let ring = self.aoi.current()?.clone();
        let zoom = self.viewport.map(|v| v.zoom).unwrap_or(0);
        let vp = Viewport::new(ring.bounding_box(), zoom);

        let sched = self.schedulers.get_mut(&source)?;
        let ticket = sched.issue_now(vp, now);
        sched.mark_in_flight(ticket.seq);

        self.trace
            .record(now, "fetch", format!("{} issued", source.as_str()));
        match source {
            SourceId::VacantLand => Some(FetchRequest::VacantLand {
                seq: ticket.seq,
                aoi: ring,
            }),
            SourceId::ServiceGaps => Some(FetchRequest::ServiceGaps {
                seq: ticket.seq,
                bounds: ring.bounding_box(),
                service_types: self.params.service_types.clone(),
                grid_resolution_km: self.params.grid_resolution_km,
            }),
            _ => None,
        }
    }

    /// Marks the task settled on its scheduler; false means the completion
    /// was stale and must not touch the store.
    fn settle(&mut self, source: SourceId, seq: Seq, now: Millis, success: bool) -> bool {
        let applied = match self.schedulers.get_mut(&source) {
            Some(sched) if success => sched.complete_success(seq, now),
            Some(sched) => sched.complete_failure(seq),
            None => Completion::Discarded,
        };
        if applied != Completion::Applied {
            debug!(
                source = source.as_str(),
                seq = seq.0,
                "stale completion dropped"
            );
            return false;
        }
        true
    }

    fn apply_batch(
        &mut self,
        source: SourceId,
        seq: Seq,
        batch: FeatureBatch,
        unavailable: Option<usize>,
        now: Millis,
    ) {
        if !self.settle(source, seq, now, true) {
            return;
        }
        if let Some(unavailable) = unavailable {
            self.notices.push(Notice::PartialData {
                source,
                unavailable,
            });
        }

        let kind = kind_for(source);
        let inserted = self.store.replace_kind(kind, batch);
        self.router.rebind(&self.store);
        if inserted == 0 {
            self.notices.push(Notice::NoData { source });
        }

        info!(source = source.as_str(), inserted, "features applied");
        self.trace.record(
            now,
            "fetch",
            format!("{} applied {inserted} features", source.as_str()),
        );
    }

    fn apply_failure(&mut self, source: SourceId, seq: Seq, message: String, now: Millis) {
        // Prior features stay visible; the memo is untouched so the next
        // qualifying event retries.
        if !self.settle(source, seq, now, false) {
            return;
        }
        self.notices.push(Notice::FetchFailed { source, message });
        self.trace
            .record(now, "fetch", format!("{} failed", source.as_str()));
    }
}

/// Converts a payload into an insertable batch plus the count of grid
/// locations without data. `Err` means the load carried no usable data at
/// all.
fn build_batch(payload: SourcePayload) -> Result<(FeatureBatch, Option<usize>), CompositeError> {
    match payload {
        SourcePayload::Density(resp) => Ok((density_batch(&resp), None)),
        SourcePayload::AirQuality(points) => {
            let (batch, summary) = air_quality_batch(points)?;
            Ok((batch, (summary.unavailable > 0).then_some(summary.unavailable)))
        }
        SourcePayload::VacantLand(resp) => Ok((vacant_land_batch(&resp), None)),
        SourcePayload::ServiceGaps(resp) => Ok((service_gaps_batch(&resp), None)),
        SourcePayload::Solar(resp) => Ok((solar_batch(&resp), None)),
    }
}
