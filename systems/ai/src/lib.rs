#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure target-selection heuristics for the three enemies.
//!
//! Each function maps the observable agent geometry to a desired
//! destination; the world then funnels that intent through the shared
//! movement resolver. Nothing here mutates state or touches the grid, so
//! every heuristic is testable in isolation with a seeded generator.

use glyph_chase_core::{ChaserTuning, Pair, RunnerTuning};
use rand::Rng;

/// Reports whether two positions touch within one king move.
#[must_use]
pub fn adjacent(a: Pair, b: Pair) -> bool {
    (a - b).square_norm() <= 1
}

/// Destination for the chaser: the player, or a probabilistic miss.
///
/// `moves_per_tick` counts player moves since the previous chaser tick and
/// stands in for the player-speed to chaser-speed ratio. Fast players juke
/// the chaser more often, sending it to the newest trail tile instead.
#[must_use]
pub fn chaser_goal<R: Rng>(
    player: Pair,
    newest_trail: Option<Pair>,
    moves_per_tick: f64,
    tuning: &ChaserTuning,
    rng: &mut R,
) -> Pair {
    if let Some(trail_tile) = newest_trail {
        let weight = tuning.miss_base.powf(moves_per_tick - tuning.miss_pivot);
        // `weight / (1 + weight)` is NaN once the power overflows to
        // infinity; this form tends to 1.0 instead.
        let miss = (1.0 - 1.0 / (1.0 + weight)).clamp(0.0, 1.0);
        if rng.gen_bool(miss) {
            return trail_tile;
        }
    }
    player
}

/// Destination for the nommer: its nearest target, ignoring the third of
/// all targets closest to the player so the easy pickings stay contested.
#[must_use]
pub fn nommer_goal(nommer: Pair, player: Pair, targets: &[Pair]) -> Option<Pair> {
    if targets.is_empty() {
        return None;
    }

    let mut by_player_distance: Vec<Pair> = targets.to_vec();
    by_player_distance.sort_by_key(|&target| (dist_sq(target, player), target));

    let reserved = by_player_distance.len() / 3;
    let pool = if reserved < by_player_distance.len() {
        &by_player_distance[reserved..]
    } else {
        &by_player_distance[..]
    };

    pool.iter()
        .copied()
        .min_by_key(|&target| (dist_sq(target, nommer), target))
}

/// Destination for the runner, evading the player.
///
/// While the player is distant the runner roams: away from its rival
/// forager, toward the chaser, with a little jitter. When the player closes
/// in it flees to a corner chosen from the two farthest from the player,
/// biased further out by a magnitude that grows as the player gets closer.
#[must_use]
pub fn runner_goal<R: Rng>(
    runner: Pair,
    player: Pair,
    chaser: Pair,
    nommer: Pair,
    width: i32,
    tuning: &RunnerTuning,
    rng: &mut R,
) -> Pair {
    let player_distance = (runner - player).norm();
    if player_distance > f64::from(width) / 2.0 {
        let flee = (runner - nommer).ceil(tuning.flee_clamp);
        let ally = (chaser - runner).ceil(tuning.ally_clamp);
        return runner + flee + ally + Pair::random_within(tuning.jitter, rng);
    }

    let corner = escape_corner(runner, player, width);
    let magnitude = (tuning.corner_bias / player_distance.max(1.0)).round() as i32;
    corner + (corner - player).ceil(magnitude)
}

/// Picks the escape corner: the two corners nearest the player are
/// excluded, and the remainder is ranked by how much closer each sits to
/// the runner than to the player. Ties break row-major.
fn escape_corner(runner: Pair, player: Pair, width: i32) -> Pair {
    let edge = width - 1;
    let mut corners = [
        Pair::new(0, 0),
        Pair::new(edge, 0),
        Pair::new(0, edge),
        Pair::new(edge, edge),
    ];
    corners.sort_by_key(|&corner| (dist_sq(corner, player), corner));

    corners[2..]
        .iter()
        .copied()
        .min_by_key(|&corner| (dist_sq(corner, runner) - dist_sq(corner, player), corner))
        .unwrap_or(runner)
}

fn dist_sq(a: Pair, b: Pair) -> i64 {
    let delta = a - b;
    i64::from(delta.x()) * i64::from(delta.x()) + i64::from(delta.y()) * i64::from(delta.y())
}
