#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared single-step movement resolver.
//!
//! Every mover except the player funnels through [`resolve_step`]: given an
//! origin and a desired destination it produces a one-tile offset that leans
//! toward the destination, keeps motion mostly axis-aligned, and never lands
//! on an occupied tile. The only sanctioned overlap is the chaser stepping
//! onto the player, which the caller opts into per tick. Occupancy is
//! supplied as a closure so the resolver stays pure and owns no grid state.

use glyph_chase_core::{sampling, Pair};
use rand::Rng;

const ORTHOGONAL_OFFSETS: [Pair; 4] = [
    Pair::new(1, 0),
    Pair::new(0, -1),
    Pair::new(-1, 0),
    Pair::new(0, 1),
];

const DIAGONAL_OFFSETS: [Pair; 4] = [
    Pair::new(1, -1),
    Pair::new(-1, -1),
    Pair::new(-1, 1),
    Pair::new(1, 1),
];

/// Per-call context describing the mover's movement rules.
#[derive(Clone, Copy, Debug)]
pub struct StepContext {
    /// Whether diagonal steps are permitted at all.
    pub diagonals: bool,
    /// Whether landing on the player's tile is legal for this mover.
    pub may_touch_player: bool,
    /// The player's current position.
    pub player: Pair,
    /// Base of the `base^-distance` fallback weighting.
    pub fallback_base: f64,
}

/// Computes a single-step offset from `origin` toward `goal`.
///
/// `is_free` reports whether a tile is in bounds and holds a plain language
/// glyph; marker tiles and out-of-bounds positions must report `false`. The
/// returned offset has both components in `[-1, 1]` and is zero only when
/// the goal is already reached or every adjacent tile is occupied.
pub fn resolve_step<R, F>(
    origin: Pair,
    goal: Pair,
    ctx: &StepContext,
    is_free: &F,
    rng: &mut R,
) -> Pair
where
    R: Rng,
    F: Fn(Pair) -> bool,
{
    let delta = goal - origin;
    if delta == Pair::default() {
        return delta;
    }

    let dx = f64::from(delta.x().abs());
    let dy = f64::from(delta.y().abs());

    // Project onto the dominant axis with probability proportional to the
    // axis imbalance, so motion is mostly straight with occasional diagonals.
    let mut step = delta;
    if rng.gen_bool((dx - dy).abs() / (dx + dy)) {
        step = if dx >= dy {
            Pair::new(delta.x(), 0)
        } else {
            Pair::new(0, delta.y())
        };
    }
    step = step.ceil(1);

    if !ctx.diagonals && step.x() != 0 && step.y() != 0 {
        step = if rng.gen_bool(dx / (dx + dy)) {
            Pair::new(step.x(), 0)
        } else {
            Pair::new(0, step.y())
        };
    }

    let desired = origin + step;
    if desired == ctx.player && ctx.may_touch_player {
        return step;
    }
    if is_free(desired) {
        return step;
    }

    detour(origin, desired, ctx, is_free, rng)
}

/// Redirects a blocked step onto a free neighbor close to the intent.
fn detour<R, F>(origin: Pair, desired: Pair, ctx: &StepContext, is_free: &F, rng: &mut R) -> Pair
where
    R: Rng,
    F: Fn(Pair) -> bool,
{
    let mut candidates: Vec<Pair> = Vec::with_capacity(8);
    collect_free(origin, &ORTHOGONAL_OFFSETS, is_free, &mut candidates);
    if ctx.diagonals || candidates.is_empty() {
        collect_free(origin, &DIAGONAL_OFFSETS, is_free, &mut candidates);
    }
    if candidates.is_empty() {
        return Pair::default();
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|&candidate| ctx.fallback_base.powf(-(candidate - desired).norm()))
        .collect();
    let index = sampling::weighted_index(&weights, rng);
    candidates[index] - origin
}

fn collect_free<F>(origin: Pair, offsets: &[Pair], is_free: &F, out: &mut Vec<Pair>)
where
    F: Fn(Pair) -> bool,
{
    for &offset in offsets {
        let candidate = origin + offset;
        if is_free(candidate) {
            out.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_field(_: Pair) -> bool {
        true
    }

    fn context() -> StepContext {
        StepContext {
            diagonals: true,
            may_touch_player: false,
            player: Pair::new(-100, -100),
            fallback_base: 4.0,
        }
    }

    #[test]
    fn reaching_the_goal_yields_a_zero_step() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let origin = Pair::new(4, 4);
        let step = resolve_step(origin, origin, &context(), &open_field, &mut rng);
        assert_eq!(step, Pair::default());
    }

    #[test]
    fn axis_aligned_goals_produce_deterministic_steps() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            let step = resolve_step(
                Pair::new(3, 3),
                Pair::new(9, 3),
                &context(),
                &open_field,
                &mut rng,
            );
            assert_eq!(step, Pair::new(1, 0));
        }
    }

    #[test]
    fn steps_never_exceed_one_tile_and_never_retreat() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let origin = Pair::new(2, 8);
        let goal = Pair::new(7, 1);
        for _ in 0..200 {
            let step = resolve_step(origin, goal, &context(), &open_field, &mut rng);
            assert!(step.square_norm() == 1, "step {step:?} is not a single move");
            assert!(step.x() >= 0, "moved away from the goal on x: {step:?}");
            assert!(step.y() <= 0, "moved away from the goal on y: {step:?}");
        }
    }

    #[test]
    fn disabled_diagonals_force_orthogonal_steps() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let ctx = StepContext {
            diagonals: false,
            ..context()
        };
        for _ in 0..200 {
            let step = resolve_step(Pair::new(0, 0), Pair::new(5, 5), &ctx, &open_field, &mut rng);
            assert_eq!(step.linear_norm(), 1, "diagonal step {step:?} leaked through");
        }
    }

    #[test]
    fn chaser_may_land_on_the_player() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let player = Pair::new(5, 4);
        let ctx = StepContext {
            may_touch_player: true,
            player,
            ..context()
        };
        // Only the player's tile is reachable, and it reports occupied.
        let is_free = move |pos: Pair| pos != player;
        let step = resolve_step(Pair::new(4, 4), player, &ctx, &is_free, &mut rng);
        assert_eq!(Pair::new(4, 4) + step, player);
    }

    #[test]
    fn blocked_destination_detours_to_a_free_neighbor() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let origin = Pair::new(4, 4);
        let blocked = Pair::new(5, 4);
        let is_free = move |pos: Pair| pos != blocked;
        for _ in 0..100 {
            let step = resolve_step(origin, Pair::new(9, 4), &context(), &is_free, &mut rng);
            assert_ne!(origin + step, blocked);
            assert_eq!(step.square_norm(), 1);
        }
    }

    #[test]
    fn fully_enclosed_movers_stay_put() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let origin = Pair::new(4, 4);
        let is_free = move |pos: Pair| pos == origin;
        let step = resolve_step(origin, Pair::new(0, 0), &context(), &is_free, &mut rng);
        assert_eq!(step, Pair::default());
    }

    #[test]
    fn detours_favor_tiles_near_the_intended_landing() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let origin = Pair::new(4, 4);
        let blocked = Pair::new(5, 4);
        let near_intent = Pair::new(5, 3);
        let is_free = move |pos: Pair| pos != blocked;

        let mut near = 0u32;
        let mut far = 0u32;
        for _ in 0..2_000 {
            let step = resolve_step(origin, Pair::new(9, 4), &context(), &is_free, &mut rng);
            let landing = origin + step;
            if landing == near_intent || landing == Pair::new(5, 5) {
                near += 1;
            } else if landing.x() < origin.x() {
                far += 1;
            }
        }
        assert!(
            near > far * 2,
            "detour is not biased toward the intent: near {near}, far {far}"
        );
    }
}
