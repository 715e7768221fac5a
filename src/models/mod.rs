pub mod date_range;
pub mod pass;
pub mod wire;

pub use date_range::*;
pub use pass::*;
pub use wire::{decode, encode, encode_new, PassEventWire, PassWire, SquadronWire};
