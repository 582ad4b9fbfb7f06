//! # nh-core — Core data model for the NetHeist economy engine
//!
//! Shared types used by every other crate in the workspace:
//!
//! - **Player**: identity plus mutable economic state (credits, gems, xp,
//!   inventory, equipment, timed buffs, period earnings)
//! - **Item**: tagged-union reward/equipment unit, one variant per kind
//! - **Level curve**: pure xp ↔ level mapping and the spin cost schedule
//! - **Expiry**: one predicate for every timestamp-gated state
//! - **Errors**: the `GameError` taxonomy surfaced to callers

pub mod error;
pub mod expiry;
pub mod item;
pub mod level;
pub mod player;

pub use error::*;
pub use expiry::*;
pub use item::*;
pub use level::*;
pub use player::*;
