//! # nh-slots — Slot machine engine
//!
//! Three weighted reels over five outcome categories, with two deliberate
//! distortions of the base distribution:
//!
//! - **Match boost**: when the first two reels agree, the third reel's
//!   category weight is forced up so triples land often enough to feel
//!   reachable (and forced *down* for the Zero-Day icon).
//! - **Legendary run**: a legendary first reel inflates the second reel's
//!   legendary weight to manufacture near-miss tension.
//!
//! [`SpinEngine`] draws reels and settles them into a [`SpinOutcome`]: a
//! pure delta (credits, xp, item, period earnings) that is applied to the
//! player record in a separate step, so a failed persist retries the apply
//! without redrawing the reels.

pub mod odds;
pub mod reel;
pub mod resolver;

pub use odds::{CategoryWeights, IconDef, OddsTable, OutcomeCategory, reward_pool};
pub use reel::{adjusted_weights, draw_reel};
pub use resolver::{SpinEngine, SpinOutcome, SpinResult};
