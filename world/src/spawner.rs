//! Round-target placement.
//!
//! Targets are drawn without replacement from unoccupied glyph tiles. The
//! weight surface is a mild bell around the grid center minus discouraging
//! bells around the player and the nommer, clamped at zero, so fresh
//! targets spread centrally without handing either forager easy pickings.

use glyph_chase_core::{sampling, Pair, TargetTuning};
use rand::Rng;

use crate::grid::Grid;

pub(crate) fn spawn_targets<R: Rng>(
    grid: &Grid,
    existing: &[Pair],
    player: Pair,
    nommer: Pair,
    tuning: &TargetTuning,
    deficit: usize,
    rng: &mut R,
) -> Vec<Pair> {
    if deficit == 0 {
        return Vec::new();
    }

    let width = grid.width();
    let center = Pair::new(width / 2, width / 2);
    let center_radius = tuning.center_radius_ratio * f64::from(width);
    let agent_radius = tuning.agent_radius_ratio * f64::from(width);

    let mut candidates: Vec<Pair> = grid
        .tiles()
        .filter(|tile| tile.symbol().is_glyph())
        .map(|tile| tile.pos())
        .filter(|pos| !existing.contains(pos))
        .collect();
    let mut weights: Vec<f64> = candidates
        .iter()
        .map(|&pos| {
            let pull = falloff(tuning.center_peak, (pos - center).norm(), center_radius);
            let crowding = falloff(tuning.agent_peak, (pos - player).norm(), agent_radius)
                + falloff(tuning.agent_peak, (pos - nommer).norm(), agent_radius);
            (tuning.weight_floor + pull - crowding).max(0.0)
        })
        .collect();

    let mut spawned = Vec::with_capacity(deficit);
    for _ in 0..deficit {
        if candidates.is_empty() {
            break;
        }
        let index = match sampling::try_weighted_index(&weights, rng) {
            Some(index) => index,
            // Zero-weight surface (tiny grids): fall back to a uniform draw.
            None => rng.gen_range(0..candidates.len()),
        };
        spawned.push(candidates.swap_remove(index));
        let _ = weights.swap_remove(index);
    }
    spawned
}

fn falloff(peak: f64, distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    peak * 2f64.powf(-(2.0 * distance / radius).powi(2))
}
