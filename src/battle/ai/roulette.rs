//! Weighted roulette selection

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick one option with probability proportional to its weight.
/// Falls back to a uniform pick when every weight is zero.
pub fn spin<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[(T, f32)]) -> Option<T> {
    if options.is_empty() {
        return None;
    }

    match WeightedIndex::new(options.iter().map(|(_, w)| w.max(0.0))) {
        Ok(dist) => Some(options[dist.sample(rng)].0),
        Err(_) => options.choose(rng).map(|(option, _)| *option),
    }
}
