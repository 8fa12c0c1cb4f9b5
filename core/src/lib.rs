#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Glyph Chase engine.
//!
//! This crate defines the value types that connect the authoritative world,
//! the pure movement and enemy systems, and host adapters: the integer grid
//! vector [`Pair`], tile contents, agent identities, the typed-input
//! [`language::Language`] tables, and the [`GameConfig`] tuning surface that
//! a host supplies before a session starts. Configuration violations are the
//! only fatal error class and surface as [`ConfigError`] values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod language;

use language::Language;

/// Minimum grid width for which the balancing invariants hold.
///
/// Narrower grids cannot guarantee a non-empty weight table once the 5×5
/// anti-ambiguity exclusion is applied.
pub const MIN_WIDTH: u32 = 5;

/// Chebyshev radius of the anti-ambiguity exclusion ring around a tile.
pub const EXCLUSION_RADIUS: i32 = 2;

/// Greatest number of distinct glyphs the exclusion ring can contain.
///
/// A 5×5 neighborhood holds 24 tiles besides its origin, so any alphabet
/// strictly larger than this always leaves at least one assignable glyph.
pub const EXCLUSION_CAPACITY: usize = 24;

/// Position or offset in 2D grid space, expressed in whole tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    x: i32,
    y: i32,
}

impl Pair {
    /// Creates a new pair from explicit components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Reports whether both components lie in `[0, bound)`.
    #[must_use]
    pub const fn in_range(&self, bound: i32) -> bool {
        0 <= self.x && self.x < bound && 0 <= self.y && self.y < bound
    }

    /// Scales both components by a whole factor.
    #[must_use]
    pub const fn scale(&self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Scales both components by a float factor, rounding to nearest.
    #[must_use]
    pub fn scale_round(&self, factor: f64) -> Self {
        Self::new(
            (self.x as f64 * factor).round() as i32,
            (self.y as f64 * factor).round() as i32,
        )
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        f64::from(self.x * self.x + self.y * self.y).sqrt()
    }

    /// Chebyshev norm: the number of king moves spanned by the offset.
    #[must_use]
    pub fn square_norm(&self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    /// Manhattan norm.
    #[must_use]
    pub fn linear_norm(&self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    /// Clamps both components into `[-radius, radius]`.
    #[must_use]
    pub fn ceil(&self, radius: i32) -> Self {
        let radius = radius.max(0);
        Self::new(self.x.clamp(-radius, radius), self.y.clamp(-radius, radius))
    }

    /// Draws a uniform offset with both components in `[-bound, bound]`.
    #[must_use]
    pub fn random_within<R: rand::Rng>(bound: i32, rng: &mut R) -> Self {
        let bound = bound.max(0);
        Self::new(rng.gen_range(-bound..=bound), rng.gen_range(-bound..=bound))
    }
}

impl std::ops::Add for Pair {
    type Output = Pair;

    fn add(self, rhs: Pair) -> Pair {
        Pair::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Pair {
    type Output = Pair;

    fn sub(self, rhs: Pair) -> Pair {
        Pair::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Pair {
    type Output = Pair;

    fn neg(self) -> Pair {
        Pair::new(-self.x, -self.y)
    }
}

impl Ord for Pair {
    // Row-major ordering, matching the grid's memory layout.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Pair {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Identity of one of the four mobile agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// The typing player.
    Player,
    /// Pursuer that may catch the player and end the game.
    Chaser,
    /// Forager that consumes round targets and inflicts losses.
    Nommer,
    /// Evader that the player can tag to recover losses.
    Runner,
}

impl AgentKind {
    /// All agents in a fixed, deterministic order.
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Player,
        AgentKind::Chaser,
        AgentKind::Nommer,
        AgentKind::Runner,
    ];

    /// Single-character face a renderer may stamp onto an occupied tile.
    #[must_use]
    pub const fn face(&self) -> char {
        match self {
            AgentKind::Player => '@',
            AgentKind::Chaser => 'X',
            AgentKind::Nommer => 'N',
            AgentKind::Runner => 'R',
        }
    }
}

/// Content of one grid tile as observed by a renderer between host calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileSymbol {
    /// No symbol assigned yet; only occurs mid-reseed, never between calls.
    Blank,
    /// A population-counted language symbol.
    Glyph(char),
    /// The face of the agent currently occupying the tile. Never counted.
    Marker(AgentKind),
}

impl TileSymbol {
    /// Reports whether the tile holds a language symbol.
    #[must_use]
    pub const fn is_glyph(&self) -> bool {
        matches!(self, TileSymbol::Glyph(_))
    }

    /// The language symbol held by the tile, if any.
    #[must_use]
    pub const fn glyph(&self) -> Option<char> {
        match self {
            TileSymbol::Glyph(glyph) => Some(*glyph),
            _ => None,
        }
    }

    /// Reports whether the tile is occupied by an agent.
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(self, TileSymbol::Marker(_))
    }
}

/// Fatal configuration violations detected before a session starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid is too small for the exclusion ring to leave free glyphs.
    #[error("grid width {width} is below the minimum of {MIN_WIDTH}")]
    GridTooSmall {
        /// Width requested by the host.
        width: u32,
    },
    /// The alphabet cannot outnumber a fully distinct exclusion ring.
    #[error(
        "language holds {symbols} symbols but the exclusion neighborhood \
         can cover {EXCLUSION_CAPACITY}; the weighted draw could empty out"
    )]
    AlphabetTooSmall {
        /// Number of symbols defined by the language.
        symbols: usize,
    },
    /// A language must define at least one symbol.
    #[error("language defines no symbols")]
    EmptyLanguage,
    /// Every glyph must map to at least one keystroke.
    #[error("glyph {glyph:?} maps to an empty input code")]
    EmptyCode {
        /// Display glyph with the offending mapping.
        glyph: char,
    },
    /// The same display glyph appears twice in one language.
    #[error("glyph {glyph:?} is defined twice")]
    DuplicateGlyph {
        /// Display glyph defined more than once.
        glyph: char,
    },
    /// One input code is a prefix of another, making matching ambiguous.
    #[error("code {code:?} for {glyph:?} is a prefix of {other_code:?} for {other:?}")]
    CodePrefix {
        /// Glyph whose code is the shorter prefix.
        glyph: char,
        /// The prefix code.
        code: String,
        /// Glyph whose code extends the prefix.
        other: char,
        /// The longer code.
        other_code: String,
    },
}

/// Tuning for the shared single-step movement resolver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementTuning {
    /// Base of the `base^-distance` fallback weighting; larger values keep
    /// blocked movers closer to their intended landing.
    pub fallback_base: f64,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self { fallback_base: 4.0 }
    }
}

/// Tuning for round-target placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetTuning {
    /// Divisor of `width²` that fixes the target quota per round.
    pub thinness: f64,
    /// Flat weight granted to every eligible tile.
    pub weight_floor: f64,
    /// Peak of the mild falloff centered on the grid center.
    pub center_peak: f64,
    /// Peak of the discouraging falloffs centered on the player and nommer.
    pub agent_peak: f64,
    /// Radius of the center falloff as a fraction of the grid width.
    pub center_radius_ratio: f64,
    /// Radius of the agent falloffs as a fraction of the grid width.
    pub agent_radius_ratio: f64,
}

impl Default for TargetTuning {
    fn default() -> Self {
        Self {
            thinness: 36.0,
            weight_floor: 1.0,
            center_peak: 1.0,
            agent_peak: 2.0,
            center_radius_ratio: 1.0,
            agent_radius_ratio: 0.5,
        }
    }
}

/// Tuning for the adaptive trail-trimming threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrailTuning {
    /// Backtracking range granted regardless of progress.
    pub min_len: usize,
    /// How strongly each loss shortens the permitted trail.
    pub loss_weight: f64,
    /// Fractional power applied to net progress; sublinear growth.
    pub exponent: f64,
}

impl Default for TrailTuning {
    fn default() -> Self {
        Self {
            min_len: 4,
            loss_weight: 1.0,
            exponent: 0.6,
        }
    }
}

/// Tuning for the chaser's probabilistic miss model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChaserTuning {
    /// Player moves per chaser tick at which a miss becomes an even draw.
    pub miss_pivot: f64,
    /// Base of the exponential miss weighting.
    pub miss_base: f64,
}

impl Default for ChaserTuning {
    fn default() -> Self {
        Self {
            miss_pivot: 1.0,
            miss_base: 2.0,
        }
    }
}

/// Tuning for the runner's evasion vectors and corner bias.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunnerTuning {
    /// Per-axis clamp on the flee-from-nommer component.
    pub flee_clamp: i32,
    /// Per-axis clamp on the approach-chaser component.
    pub ally_clamp: i32,
    /// Per-axis bound of the uniform jitter added while roaming.
    pub jitter: i32,
    /// Numerator of the inverse-distance corner bias magnitude.
    pub corner_bias: f64,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            flee_clamp: 2,
            ally_clamp: 2,
            jitter: 1,
            corner_bias: 8.0,
        }
    }
}

/// Tuning for the enemy speed curve and heat response.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedTuning {
    /// Lower asymptote of the logistic curve, in tiles per second.
    pub low: f64,
    /// Upper asymptote of the logistic curve, in tiles per second.
    pub high: f64,
    /// Cumulative `score + losses` at the curve's steepest point.
    pub midpoint: f64,
    /// Progress units over which the curve doubles its odds.
    pub slope: f64,
    /// How strongly accumulated heat accelerates the nommer.
    pub heat_boost: f64,
}

impl Default for SpeedTuning {
    fn default() -> Self {
        Self {
            low: 1.2,
            high: 2.8,
            midpoint: 30.0,
            slope: 10.0,
            heat_boost: 0.25,
        }
    }
}

/// Aggregated host-supplied configuration for one game session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the square grid, in tiles.
    pub width: u32,
    /// Whether diagonal steps are permitted for every mover.
    pub diagonals: bool,
    /// Keystroke that triggers a backtrack instead of code matching.
    pub backtrack_key: char,
    /// Base of the `base^(lower - count)` population weighting.
    pub balance_base: f64,
    /// Movement resolver tuning shared by all enemies.
    pub movement: MovementTuning,
    /// Target spawning tuning.
    pub targets: TargetTuning,
    /// Trail trimming tuning.
    pub trail: TrailTuning,
    /// Chaser miss-model tuning.
    pub chaser: ChaserTuning,
    /// Runner evasion tuning.
    pub runner: RunnerTuning,
    /// Enemy speed curve tuning.
    pub speed: SpeedTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 20,
            diagonals: true,
            backtrack_key: ' ',
            balance_base: 4.0,
            movement: MovementTuning::default(),
            targets: TargetTuning::default(),
            trail: TrailTuning::default(),
            chaser: ChaserTuning::default(),
            runner: RunnerTuning::default(),
            speed: SpeedTuning::default(),
        }
    }
}

impl GameConfig {
    /// Number of targets a round keeps alive, derived from grid area.
    #[must_use]
    pub fn target_quota(&self) -> usize {
        let area = f64::from(self.width) * f64::from(self.width);
        ((area / self.targets.thinness).round() as usize).max(1)
    }

    /// Checks the configuration against the provided language.
    ///
    /// This is the single fatal gate of the engine: a session that passes it
    /// can never empty the balancer's weight table at runtime.
    pub fn validate(&self, language: &Language) -> Result<(), ConfigError> {
        if self.width < MIN_WIDTH {
            return Err(ConfigError::GridTooSmall { width: self.width });
        }
        if language.len() <= EXCLUSION_CAPACITY {
            return Err(ConfigError::AlphabetTooSmall {
                symbols: language.len(),
            });
        }
        Ok(())
    }
}

/// Deterministic cumulative weighted sampling.
pub mod sampling {
    use rand::Rng;

    /// Draws an index with probability proportional to its weight.
    ///
    /// Walks the table in order, subtracting weights from a uniform draw,
    /// and returns the first index whose weight exceeds the remainder.
    ///
    /// # Panics
    ///
    /// Panics when the table sums to zero or less; callers uphold this
    /// precondition through configuration-time validation.
    #[must_use]
    pub fn weighted_index<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
        try_weighted_index(weights, rng)
            .expect("weighted draw over a non-positive table; configuration validation was skipped")
    }

    /// Fallible variant returning `None` when no weight is positive.
    #[must_use]
    pub fn try_weighted_index<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
        let total: f64 = weights.iter().sum();
        if !(total > 0.0) {
            return None;
        }

        let mut draw = rng.gen_range(0.0..total);
        let mut last_positive = None;
        for (index, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            if draw < weight {
                return Some(index);
            }
            draw -= weight;
            last_positive = Some(index);
        }

        // Floating-point slack can exhaust the walk; the draw then belongs
        // to the final positive entry.
        last_positive
    }
}
