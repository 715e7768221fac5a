//! Service layer: pure projections over the held pass collection.

pub mod aggregation;

pub use aggregation::{
    boarding_rate, group_by_pilot, group_by_pilot_with, max_passes_for_pilot, pilot_names,
};
