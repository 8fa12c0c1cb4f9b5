//! Symbol population accounting and the balancing draw.
//!
//! Counts live in a dense vector indexed by language order, so every
//! weighted walk visits symbols in the same deterministic sequence. The
//! balancer favors under-represented symbols exponentially and gives zero
//! weight to any symbol visible in the excluded neighborhood, which is what
//! keeps adjacent tiles typeable without ambiguity.

use std::collections::HashSet;

use glyph_chase_core::{language::Language, sampling};
use rand::Rng;

/// Per-symbol instance counts, in language order.
#[derive(Clone, Debug)]
pub struct PopulationMap {
    counts: Vec<u32>,
}

impl PopulationMap {
    pub(crate) fn new(symbols: usize) -> Self {
        Self {
            counts: vec![0; symbols],
        }
    }

    /// Count of the symbol at the provided language index.
    #[must_use]
    pub fn count(&self, index: usize) -> u32 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Total number of language-symbol tiles on the grid.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub(crate) fn increment(&mut self, index: usize) {
        if let Some(count) = self.counts.get_mut(index) {
            *count = count.saturating_add(1);
        }
    }

    pub(crate) fn decrement(&mut self, index: usize) {
        if let Some(count) = self.counts.get_mut(index) {
            debug_assert!(*count > 0, "population count would go negative");
            *count = count.saturating_sub(1);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.counts.fill(0);
    }

    fn min_count(&self) -> u32 {
        self.counts.iter().copied().min().unwrap_or(0)
    }
}

/// Draws the language index of a fresh symbol for one tile.
///
/// Weight per symbol is `base^(lower - count)` where `lower` is the current
/// minimum count, or zero when the symbol appears in `excluded`. The draw
/// panics only when every weight is zero, which configuration validation
/// rules out (`alphabet > exclusion capacity`).
pub(crate) fn draw_balanced<R: Rng>(
    language: &Language,
    populations: &PopulationMap,
    excluded: &HashSet<char>,
    base: f64,
    rng: &mut R,
) -> usize {
    let lower = populations.min_count();
    let weights: Vec<f64> = language
        .glyphs()
        .enumerate()
        .map(|(index, glyph)| {
            if excluded.contains(&glyph) {
                0.0
            } else {
                base.powi(lower as i32 - populations.count(index) as i32)
            }
        })
        .collect();
    sampling::weighted_index(&weights, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn draws_never_land_on_excluded_symbols() {
        let language = Language::english_lower();
        let populations = PopulationMap::new(language.len());
        let excluded: HashSet<char> = "abcdefghijkl".chars().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..500 {
            let index = draw_balanced(&language, &populations, &excluded, 4.0, &mut rng);
            let glyph = language.glyph_at(index).expect("index in range");
            assert!(!excluded.contains(&glyph), "drew excluded glyph {glyph:?}");
        }
    }

    #[test]
    fn under_represented_symbols_are_favored() {
        let language = Language::english_lower();
        let mut populations = PopulationMap::new(language.len());
        // Every symbol except 'z' is already common.
        for index in 0..language.len() - 1 {
            for _ in 0..3 {
                populations.increment(index);
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let excluded = HashSet::new();
        let z = language.len() - 1;
        let hits = (0..2_000)
            .filter(|_| draw_balanced(&language, &populations, &excluded, 4.0, &mut rng) == z)
            .count();

        // 'z' outweighs each common symbol 64:1, so it wins ~72% of draws.
        assert!(
            hits > 1_200,
            "rare symbol drawn only {hits} times out of 2000"
        );
    }

    #[test]
    fn counts_track_paired_increments_and_decrements() {
        let mut populations = PopulationMap::new(3);
        populations.increment(1);
        populations.increment(1);
        populations.decrement(1);
        assert_eq!(populations.count(1), 1);
        assert_eq!(populations.total(), 1);
        populations.reset();
        assert_eq!(populations.total(), 0);
    }
}
