//! # Greenie Board Core
//!
//! Client core for virtual-squadron greenie boards: typed carrier-landing
//! pass records, the active date window and its presets, pure aggregation of
//! passes into the board view, and live reconciliation of server-pushed
//! pass changes.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: typed pass records, wire-format conversion, date ranges
//! - [`services`]: pure aggregation of a pass collection into the board view
//! - [`store`]: the passes store — bulk loads, writes, live updates
//! - [`api`]: the backend interface and its HTTP implementation
//!
//! The store owns all held state; aggregation is a projection over whatever
//! the store currently holds and keeps no state of its own. Push events are
//! applied against the active window without refetching.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::GreenieConfig;
pub use error::{Error, Errors, Result};
pub use models::date_range::{DateRange, DateRangePreset, DateRangeSelector};
pub use models::pass::{AggregatedView, Grade, Pass, PilotBucket};
pub use store::{PassesStore, SaveResult};
