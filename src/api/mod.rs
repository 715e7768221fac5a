//! Backend API surface consumed by the store.
//!
//! The store talks to the backend through [`PassesApi`]; the HTTP
//! implementation lives in [`http`], and tests substitute scripted fakes.

pub mod http;

pub use http::HttpPassesApi;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Errors, Result};
use crate::models::date_range::DateRange;
use crate::models::wire::PassWire;

/// Bulk-load response for a squadron's passes within a window.
#[derive(Debug, Clone, Deserialize)]
pub struct PassesPayload {
    pub passes: Vec<PassWire>,
    /// Squadron-wide boarding rate, computed server-side
    #[serde(default)]
    pub boarding_rate: Option<f64>,
}

/// Outcome of a pass write on the wire: the saved record, or the validation
/// errors from a 422 response. Other failure statuses surface as [`crate::error::Error`].
#[derive(Debug, Clone)]
pub enum WriteResponse {
    Saved(PassWire),
    Invalid(Errors),
}

/// The backend operations this core depends on.
#[async_trait]
pub trait PassesApi: Send + Sync + 'static {
    /// `GET /squadrons/{squadron}/passes.json?start_date=&end_date=`
    async fn list_passes(&self, squadron: &str, range: &DateRange) -> Result<PassesPayload>;

    /// `POST /squadron/passes.json`
    async fn create_pass(&self, pass: &PassWire) -> Result<WriteResponse>;

    /// `PUT /squadron/passes/{id}.json`
    async fn update_pass(&self, id: i64, pass: &PassWire) -> Result<WriteResponse>;

    /// `DELETE /squadron/passes/{id}.json`; returns the destroyed record
    async fn delete_pass(&self, id: i64) -> Result<PassWire>;

    /// `DELETE /squadron/passes/unknown.json`
    async fn delete_unknown_passes(&self) -> Result<()>;
}
