//! Reel draws with context-sensitive weight adjustment
//!
//! A reel is drawn in two stages: pick a category by cumulative weight over
//! a fixed walk order, then pick an icon from that category's pool by icon
//! weight. The category weights for reels 2 and 3 depend on what the earlier
//! reels showed.

use rand::Rng;

use crate::odds::{
    CategoryWeights, IconDef, OddsTable, OutcomeCategory, ZERO_DAY_ICON,
};

/// Forced third-reel weight for the matched category after two identical
/// symbols.
pub const MATCH_BOOST_WEIGHT: f64 = 60.0;

/// Triple Zero-Day stays essentially unreachable.
pub const ZERO_DAY_MATCH_WEIGHT: f64 = 0.05;

/// Second-reel legendary weight after a legendary first reel.
pub const LEGENDARY_RUN_WEIGHT: f64 = 15.0;

/// Money compensation paired with the legendary run boost.
const LEGENDARY_RUN_MONEY_WEIGHT: f64 = 32.0;

/// No category is ever reduced below this.
const MIN_CATEGORY_WEIGHT: f64 = 1.0;

/// Category weights for the next reel, given the reels already drawn.
///
/// - Two identical priors: the matched category is forced to
///   [`MATCH_BOOST_WEIGHT`] (or clamped to [`ZERO_DAY_MATCH_WEIGHT`] for
///   Zero-Day) and the boost delta is taken from the other four categories
///   in equal shares, each floored at 1.
/// - A single legendary prior: legendary rises to [`LEGENDARY_RUN_WEIGHT`]
///   with money trimmed to compensate; a Zero-Day prior instead pins
///   legendary near zero.
/// - Otherwise the base distribution applies.
pub fn adjusted_weights(previous: &[IconDef]) -> CategoryWeights {
    let mut weights = CategoryWeights::BASE;
    match previous {
        [a, b] if a.code == b.code => {
            let matched = a.category;
            // The delta is computed from the nominal boost even in the
            // Zero-Day case, matching how much the other categories give up.
            let reduction = MATCH_BOOST_WEIGHT - weights.get(matched);
            if matched == OutcomeCategory::Legendary && a.code == ZERO_DAY_ICON {
                weights.set(matched, ZERO_DAY_MATCH_WEIGHT);
            } else {
                weights.set(matched, MATCH_BOOST_WEIGHT);
            }
            let share = reduction / 4.0;
            for cat in OutcomeCategory::ALL {
                if cat != matched {
                    weights.set(cat, (weights.get(cat) - share).max(MIN_CATEGORY_WEIGHT));
                }
            }
        }
        [a] if a.category == OutcomeCategory::Legendary => {
            if a.code == ZERO_DAY_ICON {
                let current = weights.get(OutcomeCategory::Legendary);
                weights.set(
                    OutcomeCategory::Legendary,
                    current.min(ZERO_DAY_MATCH_WEIGHT),
                );
                weights.set(OutcomeCategory::Money, 35.0);
            } else {
                weights.set(OutcomeCategory::Legendary, LEGENDARY_RUN_WEIGHT);
                weights.set(OutcomeCategory::Money, LEGENDARY_RUN_MONEY_WEIGHT);
            }
        }
        _ => {}
    }
    weights
}

/// Draw one reel symbol given the reels already drawn.
pub fn draw_reel<R: Rng>(table: &OddsTable, previous: &[IconDef], rng: &mut R) -> IconDef {
    let weights = adjusted_weights(previous);
    let roll = rng.random::<f64>() * 100.0;
    let mut cumulative = 0.0;
    for (cat, weight) in weights.iter() {
        cumulative += weight;
        if roll <= cumulative {
            return pick_icon(table, cat, rng);
        }
    }
    // Adjusted weights can sum below 100; spill lands on common
    pick_icon(table, OutcomeCategory::Common, rng)
}

/// Weighted pick within one category's icon pool.
fn pick_icon<R: Rng>(table: &OddsTable, category: OutcomeCategory, rng: &mut R) -> IconDef {
    let pool: Vec<&IconDef> = table.pool(category).collect();
    let weights: Vec<f64> = pool.iter().map(|i| i.weight.max(0.0001)).collect();
    let total: f64 = weights.iter().sum();
    let mut roll = rng.random::<f64>() * total;
    for (icon, weight) in pool.iter().zip(&weights) {
        roll -= weight;
        if roll <= 0.0 {
            return **icon;
        }
    }
    *pool[pool.len() - 1]
}
