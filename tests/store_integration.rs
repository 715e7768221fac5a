//! End-to-end store behavior against a scripted backend and a live event
//! stream.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use greenie_core::api::{PassesApi, PassesPayload, WriteResponse};
use greenie_core::models::wire::PassWire;
use greenie_core::{DateRange, Error, Grade, PassesStore, Result};

fn wire_pass(id: i64, pilot: Option<&str>, time: &str, trap: Option<bool>) -> PassWire {
    PassWire {
        id: Some(id),
        pilot: pilot.map(str::to_string),
        time: time.to_string(),
        ship_name: Some("CVN-72".to_string()),
        aircraft_type: Some("FA-18C".to_string()),
        grade: Some(Grade::Ok),
        score: Some("4.0".to_string()),
        trap,
        wire: Some(3),
        notes: None,
    }
}

fn event_json(id: i64, pilot: Option<&str>, time: &str, destroyed: bool) -> String {
    let pilot = match pilot {
        Some(name) => format!("\"{}\"", name),
        None => "null".to_string(),
    };
    format!(
        r#"{{"id": {}, "pilot": {}, "time": "{}", "ship_name": null,
            "aircraft_type": null, "grade": "fair", "score": "3.0",
            "trap": true, "wire": 2, "notes": null, "destroyed?": {}}}"#,
        id, pilot, time, destroyed
    )
}

struct ScriptedApi {
    list_responses: Mutex<VecDeque<Result<PassesPayload>>>,
}

impl ScriptedApi {
    fn new(responses: Vec<Result<PassesPayload>>) -> Self {
        Self {
            list_responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl PassesApi for ScriptedApi {
    async fn list_passes(&self, _squadron: &str, _range: &DateRange) -> Result<PassesPayload> {
        self.list_responses.lock().pop_front().unwrap_or(Ok(PassesPayload {
            passes: vec![],
            boarding_rate: None,
        }))
    }

    async fn create_pass(&self, pass: &PassWire) -> Result<WriteResponse> {
        let mut saved = pass.clone();
        saved.id = Some(500);
        Ok(WriteResponse::Saved(saved))
    }

    async fn update_pass(&self, id: i64, pass: &PassWire) -> Result<WriteResponse> {
        let mut saved = pass.clone();
        saved.id = Some(id);
        Ok(WriteResponse::Saved(saved))
    }

    async fn delete_pass(&self, id: i64) -> Result<PassWire> {
        Ok(wire_pass(id, None, "2020-01-10T12:00:00Z", None))
    }

    async fn delete_unknown_passes(&self) -> Result<()> {
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    "2020-01-20T15:00:00Z".parse().unwrap()
}

fn january_store(api: ScriptedApi) -> PassesStore<ScriptedApi> {
    let store = PassesStore::with_now(api, now());
    store
        .set_range(
            "2020-01-01T00:00:00Z".parse().unwrap(),
            "2020-01-31T23:59:59.999Z".parse().unwrap(),
        )
        .unwrap();
    store
}

/// Poll until the predicate holds or a timeout elapses. Push events are
/// pumped on a background task, so assertions after a send must wait.
async fn eventually<F: Fn() -> bool>(predicate: F) -> bool {
    for _ in 0..100 {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    predicate()
}

#[tokio::test]
async fn push_create_inside_window_appears_in_view() {
    let api = ScriptedApi::new(vec![Ok(PassesPayload {
        passes: vec![wire_pass(1, Some("Ace"), "2020-01-10T12:00:00Z", Some(true))],
        boarding_rate: Some(1.0),
    })]);
    let store = january_store(api);

    let (tx, rx) = futures::channel::mpsc::unbounded();
    store.load_passes_with_events("vfa-103", rx).await;
    assert_eq!(store.passes().unwrap().len(), 1);

    tx.unbounded_send(event_json(2, Some("Buzz"), "2020-01-15T09:00:00Z", false))
        .unwrap();

    assert!(eventually(|| store.passes().map(|p| p.len()) == Some(2)).await);
    let view = store.aggregated();
    assert_eq!(view.passes_by_pilot.len(), 2);
    assert!(store.pilot_names().contains("Buzz"));
}

#[tokio::test]
async fn push_create_outside_window_is_ignored() {
    let api = ScriptedApi::new(vec![Ok(PassesPayload {
        passes: vec![wire_pass(1, Some("Ace"), "2020-01-10T12:00:00Z", Some(true))],
        boarding_rate: None,
    })]);
    let store = january_store(api);

    let (tx, rx) = futures::channel::mpsc::unbounded();
    store.load_passes_with_events("vfa-103", rx).await;

    tx.unbounded_send(event_json(2, Some("Buzz"), "2020-03-01T09:00:00Z", false))
        .unwrap();
    // Give the pump time to (not) apply it
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(store.passes().unwrap().len(), 1);
}

#[tokio::test]
async fn push_update_moving_pass_out_of_window_removes_it() {
    let api = ScriptedApi::new(vec![Ok(PassesPayload {
        passes: vec![
            wire_pass(5, Some("Ace"), "2020-01-10T12:00:00Z", Some(true)),
            wire_pass(6, Some("Ace"), "2020-01-12T12:00:00Z", Some(false)),
        ],
        boarding_rate: None,
    })]);
    let store = january_store(api);

    let (tx, rx) = futures::channel::mpsc::unbounded();
    store.load_passes_with_events("vfa-103", rx).await;
    assert_eq!(store.passes().unwrap().len(), 2);

    // Pass 5 edited to February, outside the active January window
    tx.unbounded_send(event_json(5, Some("Ace"), "2020-02-15T12:00:00Z", false))
        .unwrap();

    assert!(
        eventually(|| {
            store
                .passes()
                .map(|p| p.iter().all(|pass| pass.id != 5))
                .unwrap_or(false)
        })
        .await
    );
    assert_eq!(store.passes().unwrap().len(), 1);
}

#[tokio::test]
async fn push_delete_removes_pass_and_absent_delete_is_noop() {
    let api = ScriptedApi::new(vec![Ok(PassesPayload {
        passes: vec![wire_pass(1, Some("Ace"), "2020-01-10T12:00:00Z", Some(true))],
        boarding_rate: None,
    })]);
    let store = january_store(api);

    let (tx, rx) = futures::channel::mpsc::unbounded();
    store.load_passes_with_events("vfa-103", rx).await;

    // Deleting an id that was never held changes nothing
    tx.unbounded_send(event_json(99, None, "2020-01-11T12:00:00Z", true))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(store.passes().unwrap().len(), 1);

    tx.unbounded_send(event_json(1, Some("Ace"), "2020-01-10T12:00:00Z", true))
        .unwrap();
    assert!(eventually(|| store.no_passes()).await);
}

#[tokio::test]
async fn reload_replaces_subscription() {
    let api = ScriptedApi::new(vec![
        Ok(PassesPayload {
            passes: vec![],
            boarding_rate: None,
        }),
        Ok(PassesPayload {
            passes: vec![],
            boarding_rate: None,
        }),
    ]);
    let store = january_store(api);

    let (old_tx, old_rx) = futures::channel::mpsc::unbounded::<String>();
    store.load_passes_with_events("vfa-103", old_rx).await;

    let (_new_tx, new_rx) = futures::channel::mpsc::unbounded::<String>();
    store.load_passes_with_events("vfa-103", new_rx).await;

    // The old pump is gone; its channel closes once the receiver is dropped
    assert!(
        eventually(|| old_tx
            .unbounded_send(event_json(1, None, "2020-01-10T12:00:00Z", false))
            .is_err())
        .await
    );
}

#[tokio::test]
async fn reset_drops_collection_and_stops_reconciliation() {
    let api = ScriptedApi::new(vec![Ok(PassesPayload {
        passes: vec![wire_pass(1, Some("Ace"), "2020-01-10T12:00:00Z", Some(true))],
        boarding_rate: None,
    })]);
    let store = january_store(api);

    let (tx, rx) = futures::channel::mpsc::unbounded();
    store.load_passes_with_events("vfa-103", rx).await;
    store.reset();

    assert!(store.passes().is_none());
    // Either the send fails (pump stopped) or the event lands on a null
    // collection; state must not resurrect in both cases
    let _ = tx.unbounded_send(event_json(2, Some("Buzz"), "2020-01-15T09:00:00Z", false));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(store.passes().is_none());
}

#[tokio::test]
async fn load_error_state_then_successful_retry() {
    let api = ScriptedApi::new(vec![
        Err(Error::Http { status: 503 }),
        Ok(PassesPayload {
            passes: vec![],
            boarding_rate: Some(0.5),
        }),
    ]);
    let store = january_store(api);

    store.load_passes("vfa-103").await;
    assert_eq!(
        store.error().unwrap().to_string(),
        "Invalid HTTP response: 503"
    );
    assert!(!store.loaded());

    store.load_passes("vfa-103").await;
    assert!(store.error().is_none());
    assert!(store.loaded());
    assert_eq!(store.squadron_boarding_rate(), Some(0.5));
}

#[tokio::test]
async fn example_scenario_boarding_rate_and_grouping() {
    let api = ScriptedApi::new(vec![Ok(PassesPayload {
        passes: vec![
            wire_pass(1, Some("A"), "2020-01-10T12:00:00Z", Some(true)),
            wire_pass(2, Some("A"), "2020-01-09T12:00:00Z", Some(false)),
            wire_pass(3, None, "2020-01-08T12:00:00Z", None),
        ],
        boarding_rate: Some(0.5),
    })]);
    let store = january_store(api);
    store.load_passes("vfa-103").await;

    let view = store.aggregated();
    assert_eq!(view.boarding_rate, Some(0.5));
    assert_eq!(view.max_passes_for_pilot, 2);

    let buckets: Vec<(Option<&str>, Vec<i64>)> = view
        .passes_by_pilot
        .iter()
        .map(|b| {
            (
                b.pilot.as_deref(),
                b.passes.iter().map(|p| p.id).collect(),
            )
        })
        .collect();
    assert_eq!(
        buckets,
        vec![(Some("A"), vec![1, 2]), (None, vec![3])]
    );
}
