//! Classification and application of pushed pass-change events.
//!
//! Events arrive as wire payloads tagged with a `destroyed?` flag; whether a
//! non-destroy event is a create or an update depends on id-membership in the
//! currently held collection. Application respects the active date window: a
//! pass created or edited outside the window never enters (or leaves) the
//! held collection without a refetch.

use crate::error::{Error, Result};
use crate::models::date_range::DateRange;
use crate::models::pass::Pass;
use crate::models::wire::{self, PassEventWire};

/// A pushed pass change, resolved against the held collection.
#[derive(Debug, Clone, PartialEq)]
pub enum PassEvent {
    /// Id not previously held
    Created(Pass),
    /// Id already held; carries the full replacement record
    Updated(Pass),
    /// Pass destroyed on the server
    Deleted(i64),
}

impl PassEvent {
    /// Resolve a wire event into a tagged change.
    ///
    /// # Errors
    /// Returns `Error::Decode` when the payload cannot be parsed into a pass
    /// (or a destroy event carries no id). Callers drop the single event and
    /// keep the collection intact.
    pub fn classify(event: &PassEventWire, held: &[Pass]) -> Result<Self> {
        if event.destroyed {
            let id = event
                .pass
                .id
                .ok_or_else(|| Error::Decode("destroy event is missing an id".to_string()))?;
            return Ok(PassEvent::Deleted(id));
        }

        let pass = wire::decode(&event.pass)?;
        if held.iter().any(|p| p.id == pass.id) {
            Ok(PassEvent::Updated(pass))
        } else {
            Ok(PassEvent::Created(pass))
        }
    }
}

/// Apply a resolved event to the held collection.
///
/// Deletes of absent ids are no-ops. Updates whose new time falls outside the
/// active window remove the pass; creates outside the window are ignored.
pub fn apply(held: &mut Vec<Pass>, event: PassEvent, range: &DateRange) {
    match event {
        PassEvent::Deleted(id) => {
            held.retain(|p| p.id != id);
        }
        PassEvent::Updated(pass) => {
            held.retain(|p| p.id != pass.id);
            if range.contains(pass.time) {
                held.push(pass);
            }
        }
        PassEvent::Created(pass) => {
            if range.contains(pass.time) {
                held.push(pass);
            }
        }
    }
}
