//! Reveal calculator
//!
//! Converts the defender's insight against the attacker's confuse into the
//! number of reservation slots shown to the defending side.
//!
//! ratio = max(1, insight) / max(1, confuse) * 100
//!
//! | ratio      | revealed                      |
//! |------------|-------------------------------|
//! | < 50       | 0                             |
//! | 50..100    | 0 or 1, linear in the band    |
//! | 100..300   | 1 or 2, linear in the band    |
//! | >= 300     | 4                             |
//!
//! The result is always clamped to `min(4, total_slots)`.

use rand::seq::index;
use rand::Rng;

use crate::core::config::MAX_RESERVATION_SLOTS;

pub fn insight_ratio(insight: u32, confuse: u32) -> f32 {
    insight.max(1) as f32 / confuse.max(1) as f32 * 100.0
}

/// Upper bound when `ratio` lands in `[start, end)`, with probability proportional
/// to how far into the band it is
fn linear_band(rng: &mut impl Rng, ratio: f32, start: f32, end: f32, lower: usize, upper: usize) -> usize {
    let t = (ratio - start) / (end - start);
    if rng.gen::<f32>() < t {
        upper
    } else {
        lower
    }
}

/// Number of publicly known slots for this turn
pub fn reveal(rng: &mut impl Rng, insight: u32, confuse: u32, total_slots: usize) -> usize {
    let cap = total_slots.min(MAX_RESERVATION_SLOTS);
    let ratio = insight_ratio(insight, confuse);

    let count = if ratio < 50.0 {
        0
    } else if ratio < 100.0 {
        linear_band(rng, ratio, 50.0, 100.0, 0, 1)
    } else if ratio < 300.0 {
        linear_band(rng, ratio, 100.0, 300.0, 1, 2)
    } else {
        MAX_RESERVATION_SLOTS
    };

    count.min(cap)
}

/// Reveal count with concealment applied: a concealed attacker shows nothing
pub fn reveal_against(
    rng: &mut impl Rng,
    insight: u32,
    confuse: u32,
    total_slots: usize,
    concealed: bool,
) -> usize {
    if concealed {
        return 0;
    }
    reveal(rng, insight, confuse, total_slots)
}

/// Pick `count` distinct slot indices in `0..total_slots`, uniformly at random
pub fn choose_visible_slots(rng: &mut impl Rng, count: usize, total_slots: usize) -> Vec<usize> {
    let amount = count.min(total_slots);
    let mut picked = index::sample(rng, total_slots, amount).into_vec();
    picked.sort_unstable();
    picked
}
