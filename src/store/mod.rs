//! The passes store: bulk loads, writes, and live reconciliation.
//!
//! One store instance owns one held pass collection, the active date range,
//! and at most one live subscription. All mutation funnels through this
//! module, so observers always see either the pre- or post-change collection.

pub mod reconciler;
pub mod subscription;

pub use reconciler::PassEvent;
pub use subscription::LiveSubscription;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use parking_lot::{Mutex, RwLock};

use crate::api::{PassesApi, WriteResponse};
use crate::error::{Error, Errors, Result};
use crate::models::date_range::{DateRange, DateRangePreset, DateRangeSelector};
use crate::models::pass::{AggregatedView, Pass};
use crate::models::wire::{self, PassEventWire};
use crate::services::aggregation;

/// Outcome of a pass write: the saved record, or the backend's validation
/// errors for a rejected (422) submission.
pub type SaveResult = std::result::Result<Pass, Errors>;

struct StoreState {
    /// `None` until the first successful load, and between a load starting
    /// and finishing
    passes: Option<Vec<Pass>>,
    loading: bool,
    error: Option<Arc<Error>>,
    selector: DateRangeSelector,
    /// Squadron loaded by the most recent bulk load, for window refreshes
    last_squadron: Option<String>,
    /// Squadron-wide rate as reported by the server, distinct from the
    /// window-local rate in [`AggregatedView`]
    squadron_boarding_rate: Option<f64>,
    squadron_unknown_pass_count: Option<i64>,
}

pub(crate) struct StoreInner {
    state: RwLock<StoreState>,
    subscription: Mutex<Option<LiveSubscription>>,
    /// Bumped on every range change and reset; a bulk load whose snapshot no
    /// longer matches discards its response instead of applying stale data
    generation: AtomicU64,
}

impl StoreInner {
    /// Apply one pushed event payload. Malformed payloads are logged and
    /// dropped; the held collection is never partially updated.
    pub(crate) fn apply_event_payload(&self, payload: &str) {
        let event: PassEventWire = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed pass event");
                return;
            }
        };

        let mut state = self.state.write();

        if let Some(squadron) = &event.squadron {
            state.squadron_boarding_rate = squadron.boarding_rate;
            state.squadron_unknown_pass_count = squadron.unknown_pass_count;
        }

        let range = state.selector.range();
        let Some(passes) = state.passes.as_mut() else {
            // No collection loaded yet; nothing to reconcile against
            return;
        };

        match PassEvent::classify(&event, passes) {
            Ok(resolved) => reconciler::apply(passes, resolved, &range),
            Err(err) => tracing::warn!(error = %err, "dropping undecodable pass event"),
        }
    }
}

/// Client-side store for a squadron's passes.
///
/// Cheap to clone; clones share the same held collection and subscription.
pub struct PassesStore<A> {
    api: Arc<A>,
    inner: Arc<StoreInner>,
}

impl<A> Clone for PassesStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: PassesApi> PassesStore<A> {
    /// New store with the default window (last 4 weeks from now).
    pub fn new(api: A) -> Self {
        Self::with_now(api, Utc::now())
    }

    /// New store with the default window resolved against an explicit `now`.
    pub fn with_now(api: A, now: DateTime<Utc>) -> Self {
        Self {
            api: Arc::new(api),
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState {
                    passes: None,
                    loading: false,
                    error: None,
                    selector: DateRangeSelector::new(now),
                    last_squadron: None,
                    squadron_boarding_rate: None,
                    squadron_unknown_pass_count: None,
                }),
                subscription: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the held collection, `None` until a load succeeds.
    pub fn passes(&self) -> Option<Vec<Pass>> {
        self.inner.state.read().passes.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.state.read().loading
    }

    pub fn error(&self) -> Option<Arc<Error>> {
        self.inner.state.read().error.clone()
    }

    /// Loaded: a collection is held, no load in flight, no recorded error.
    pub fn loaded(&self) -> bool {
        let state = self.inner.state.read();
        state.passes.is_some() && !state.loading && state.error.is_none()
    }

    /// The window loaded successfully but holds no passes. Distinct from
    /// "still loading" and from "load failed".
    pub fn no_passes(&self) -> bool {
        let state = self.inner.state.read();
        matches!(&state.passes, Some(passes) if passes.is_empty())
    }

    pub fn range(&self) -> DateRange {
        self.inner.state.read().selector.range()
    }

    /// Replace the active window. A rejected range leaves the previous one
    /// active. Callers re-trigger a load for the new window; an in-flight
    /// load for the old window will discard its response on completion.
    pub fn set_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        let mut state = self.inner.state.write();
        state.selector.set_range(start, end)?;
        self.inner.generation.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    /// Replace the active window from a preset, resolved against now.
    pub fn apply_preset(&self, preset: DateRangePreset) {
        self.apply_preset_at(preset, Utc::now());
    }

    /// Preset application with an explicit `now`.
    pub fn apply_preset_at(&self, preset: DateRangePreset, now: DateTime<Utc>) {
        let mut state = self.inner.state.write();
        state.selector.apply_preset(preset, now);
        self.inner.generation.fetch_add(1, AtomicOrdering::SeqCst);
    }

    /// Project the held collection into the greenie-board view.
    pub fn aggregated(&self) -> AggregatedView {
        match &self.inner.state.read().passes {
            Some(passes) => AggregatedView::project(passes),
            None => AggregatedView::default(),
        }
    }

    pub fn passes_for_pilot(&self, pilot: &str) -> Vec<Pass> {
        match &self.inner.state.read().passes {
            Some(passes) => passes
                .iter()
                .filter(|p| p.pilot.as_deref() == Some(pilot))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn pilot_names(&self) -> HashSet<String> {
        match &self.inner.state.read().passes {
            Some(passes) => aggregation::pilot_names(passes),
            None => HashSet::new(),
        }
    }

    /// Squadron-wide boarding rate as last reported by the server.
    pub fn squadron_boarding_rate(&self) -> Option<f64> {
        self.inner.state.read().squadron_boarding_rate
    }

    pub fn unknown_pass_count(&self) -> Option<i64> {
        self.inner.state.read().squadron_unknown_pass_count
    }

    /// Feed one push-event payload directly, for callers that dispatch their
    /// own channel instead of attaching a stream.
    pub fn handle_event(&self, payload: &str) {
        self.inner.apply_event_payload(payload);
    }

    /// Bulk-load the squadron's passes for the active window.
    ///
    /// At most one load runs at a time; a call while another is in flight is
    /// a no-op. Failures are recorded on the store (see [`Self::error`]), not
    /// returned, and the loading flag is always cleared. Any previous live
    /// subscription is closed.
    pub async fn load_passes(&self, squadron: &str) {
        self.load_inner(squadron, None, true).await;
    }

    /// Same as [`Self::load_passes`], attaching a push-event source for the
    /// loaded window. The previous subscription, if any, is replaced.
    pub async fn load_passes_with_events<S>(&self, squadron: &str, events: S)
    where
        S: Stream<Item = String> + Send + 'static,
    {
        self.load_inner(squadron, Some(events.boxed()), true).await;
    }

    async fn load_inner(
        &self,
        squadron: &str,
        events: Option<BoxStream<'static, String>>,
        replace_subscription: bool,
    ) {
        let (range, generation) = {
            let mut state = self.inner.state.write();
            if state.loading {
                return;
            }
            state.loading = true;
            state.error = None;
            state.passes = None;
            state.last_squadron = Some(squadron.to_string());
            (
                state.selector.range(),
                self.inner.generation.load(AtomicOrdering::SeqCst),
            )
        };

        if replace_subscription {
            let mut slot = self.inner.subscription.lock();
            // Dropping the previous handle stops its pump
            *slot = events.map(|stream| LiveSubscription::spawn(self.inner.clone(), stream));
        }

        let outcome = match self.api.list_passes(squadron, &range).await {
            Ok(payload) => payload
                .passes
                .iter()
                .map(wire::decode)
                .collect::<Result<Vec<Pass>>>()
                .map(|passes| (passes, payload.boarding_rate)),
            Err(err) => Err(err),
        };

        let mut state = self.inner.state.write();
        state.loading = false;

        if self.inner.generation.load(AtomicOrdering::SeqCst) != generation {
            tracing::debug!(squadron, "discarding pass load for a superseded window");
            return;
        }

        match outcome {
            Ok((passes, boarding_rate)) => {
                tracing::debug!(squadron, count = passes.len(), "loaded passes");
                state.passes = Some(passes);
                state.squadron_boarding_rate = boarding_rate;
            }
            Err(err) => {
                tracing::warn!(squadron, error = %err, "pass load failed");
                state.error = Some(Arc::new(err));
            }
        }
    }

    /// Refetch the current window for the last-loaded squadron, keeping the
    /// live subscription as is.
    async fn refresh(&self) {
        let squadron = self.inner.state.read().last_squadron.clone();
        if let Some(squadron) = squadron {
            self.load_inner(&squadron, None, false).await;
        }
    }

    /// Create a pass. The server assigns the id; the held collection picks
    /// the new pass up via the push channel.
    pub async fn create_pass(&self, pass: &Pass) -> Result<SaveResult> {
        match self.api.create_pass(&wire::encode_new(pass)).await? {
            WriteResponse::Saved(saved) => Ok(Ok(wire::decode(&saved)?)),
            WriteResponse::Invalid(errors) => Ok(Err(errors)),
        }
    }

    /// Update a pass. On success the held record with the same id, if any,
    /// is replaced with the server's version.
    pub async fn update_pass(&self, pass: &Pass) -> Result<SaveResult> {
        match self.api.update_pass(pass.id, &wire::encode(pass)).await? {
            WriteResponse::Saved(saved) => {
                let updated = wire::decode(&saved)?;
                let mut state = self.inner.state.write();
                if let Some(passes) = state.passes.as_mut() {
                    if let Some(slot) = passes.iter_mut().find(|p| p.id == updated.id) {
                        *slot = updated.clone();
                    }
                }
                Ok(Ok(updated))
            }
            WriteResponse::Invalid(errors) => Ok(Err(errors)),
        }
    }

    /// Delete a pass, returning the destroyed record, then refresh the held
    /// window.
    pub async fn delete_pass(&self, id: i64) -> Result<Pass> {
        let deleted = wire::decode(&self.api.delete_pass(id).await?)?;
        self.refresh().await;
        Ok(deleted)
    }

    /// Delete every unattributed pass, then refresh the held window.
    pub async fn delete_all_unknown(&self) -> Result<()> {
        self.api.delete_unknown_passes().await?;
        self.refresh().await;
        Ok(())
    }

    /// Locally remap a pilot name across the held collection. No network.
    pub fn rename_pilot(&self, old_name: &str, new_name: &str) {
        let mut state = self.inner.state.write();
        if let Some(passes) = state.passes.as_mut() {
            for pass in passes.iter_mut() {
                if pass.pilot.as_deref() == Some(old_name) {
                    pass.pilot = Some(new_name.to_string());
                }
            }
        }
    }

    /// Drop the held collection and close the live subscription. The active
    /// range is kept; an in-flight load will discard its response.
    pub fn reset(&self) {
        self.inner.generation.fetch_add(1, AtomicOrdering::SeqCst);
        self.inner.subscription.lock().take();

        let mut state = self.inner.state.write();
        state.passes = None;
        state.error = None;
        state.loading = false;
        state.last_squadron = None;
        state.squadron_boarding_rate = None;
        state.squadron_unknown_pass_count = None;
    }
}
