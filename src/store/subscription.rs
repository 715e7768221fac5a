//! Live-update subscription handle.
//!
//! The store owns at most one subscription at a time: opened when a load
//! attaches an event source, replaced on the next load, closed on reset.
//! The event source itself is opaque to this crate; anything yielding JSON
//! payload strings works.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;

use super::StoreInner;

/// Handle to the task pumping push events into the store. Dropping the
/// handle stops the pump.
#[derive(Debug)]
pub struct LiveSubscription {
    handle: JoinHandle<()>,
}

impl LiveSubscription {
    pub(crate) fn spawn<S>(inner: Arc<StoreInner>, events: S) -> Self
    where
        S: Stream<Item = String> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            futures::pin_mut!(events);
            while let Some(payload) = events.next().await {
                inner.apply_event_payload(&payload);
            }
            tracing::debug!("pass event stream ended");
        });
        Self { handle }
    }

    /// Stop receiving events. Equivalent to dropping the handle.
    pub fn close(self) {}
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
