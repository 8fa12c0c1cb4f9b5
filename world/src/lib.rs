#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Glyph Chase.
//!
//! The [`Game`] owns the grid, the symbol populations, the four agents, and
//! the round lifecycle. A host drives it through discrete, serialized
//! calls: [`Game::handle_key`] per keystroke and one tick entry point per
//! enemy, each scheduled by the host at a cadence read from
//! [`query::enemy_speed`]. The renderer reads state through [`query`]
//! between calls; no observer mechanism exists inside the core.
//!
//! Call-ordering invariants the entry points uphold:
//! every mover vacates its tile (rebalancing it) strictly before its new
//! position is computed, and every population decrement pairs with exactly
//! one increment, so `sum(populations) + marker tiles == width²` whenever a
//! call returns.

use std::collections::HashSet;

use glyph_chase_core::{
    language::Language, AgentKind, ConfigError, GameConfig, Pair, TileSymbol, EXCLUSION_RADIUS,
};
use glyph_chase_system_ai as ai;
use glyph_chase_system_movement::{resolve_step, StepContext};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod grid;
mod population;
mod spawner;

pub use grid::{Grid, Tile};
pub use population::PopulationMap;

/// What one keystroke did, reported back to the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Whether the player changed position.
    pub moved: bool,
    /// Target tile consumed by this move, if any.
    pub consumed: Option<Pair>,
    /// Whether the move emptied the target set and started a new round.
    pub round_complete: bool,
    /// Targets spawned for the new round, for incremental highlighting.
    pub new_targets: Vec<Pair>,
}

/// The complete, authoritative state of one session.
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    language: Language,
    grid: Grid,
    populations: PopulationMap,
    player: Pair,
    chaser: Pair,
    nommer: Pair,
    runner: Pair,
    targets: Vec<Pair>,
    trail: Vec<Pair>,
    buffer: String,
    score: u32,
    losses: u32,
    level: u32,
    heat: f64,
    moves_since_chaser: u32,
    game_over: bool,
    rng: ChaCha8Rng,
}

impl Game {
    /// Builds a session from host configuration and a replay seed.
    ///
    /// This is the engine's only fatal gate: a configuration that passes
    /// validation can never empty a weighted draw mid-session.
    pub fn new(config: GameConfig, language: Language, seed: u64) -> Result<Self, ConfigError> {
        config.validate(&language)?;
        let mut game = Self {
            grid: Grid::new(config.width),
            populations: PopulationMap::new(language.len()),
            player: Pair::default(),
            chaser: Pair::default(),
            nommer: Pair::default(),
            runner: Pair::default(),
            targets: Vec::new(),
            trail: Vec::new(),
            buffer: String::new(),
            score: 0,
            losses: 0,
            level: 0,
            heat: 0.0,
            moves_since_chaser: 0,
            game_over: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            language,
        };
        game.reset();
        Ok(game)
    }

    /// Returns the session to a fresh first round.
    ///
    /// Re-zeroes every counter, folds agent-held tiles back into the
    /// population, reseeds all symbols, re-places the agents, and spawns
    /// the first round's targets.
    pub fn restart(&mut self) {
        self.reset();
    }

    /// Applies one keystroke: a backtrack trigger or a code fragment.
    ///
    /// Unmatchable input is ignored without error. After a chaser catch
    /// this is a no-op until [`Game::restart`].
    pub fn handle_key(&mut self, key: &str) -> RoundOutcome {
        if self.game_over || key.is_empty() {
            return RoundOutcome::default();
        }

        let mut chars = key.chars();
        if let (Some(first), None) = (chars.next(), chars.next()) {
            if first == self.config.backtrack_key {
                return self.backtrack();
            }
        }

        self.buffer.push_str(key);
        self.clamp_buffer();
        match self.match_adjacent() {
            Some(dest) => self.advance_player(dest, false),
            None => RoundOutcome::default(),
        }
    }

    /// Advances the chaser one step toward the player (or a missed juke).
    ///
    /// Returns `true` once the chaser has caught the player; from then on
    /// every entry point freezes until [`Game::restart`].
    pub fn tick_chaser(&mut self) -> bool {
        if self.game_over {
            return true;
        }

        let moves = f64::from(std::mem::take(&mut self.moves_since_chaser));
        let goal = ai::chaser_goal(
            self.player,
            self.trail.last().copied(),
            moves,
            &self.config.chaser,
            &mut self.rng,
        );
        let dest = self.move_enemy(AgentKind::Chaser, goal, true);
        if dest == self.player {
            self.game_over = true;
        }
        self.game_over
    }

    /// Advances the nommer one step; consuming a target inflicts a loss.
    ///
    /// Returns the targets spawned if the consumption completed the round,
    /// so the host can highlight them without a full redraw.
    pub fn tick_nommer(&mut self) -> Vec<Pair> {
        if self.game_over {
            return Vec::new();
        }

        self.heat = (self.heat - 1.0).max(0.0);
        let Some(goal) = ai::nommer_goal(self.nommer, self.player, &self.targets) else {
            return Vec::new();
        };
        let dest = self.move_enemy(AgentKind::Nommer, goal, false);

        if let Some(index) = self.targets.iter().position(|&target| target == dest) {
            let _ = self.targets.remove(index);
            self.losses = self.losses.saturating_add(1);
            if !self.trail.is_empty() {
                let _ = self.trail.remove(0);
            }
            self.heat = (self.heat - 1.0).max(0.0);
            if self.targets.is_empty() {
                self.level += 1;
                self.trail.clear();
                return self.refill_targets();
            }
        }
        Vec::new()
    }

    /// Advances the runner one evasive step.
    ///
    /// A player adjacent at tick start tags the runner, halving outstanding
    /// losses; if the runner is still cornered after its move it takes a
    /// second step to slip away.
    pub fn tick_runner(&mut self) {
        if self.game_over {
            return;
        }

        if ai::adjacent(self.runner, self.player) {
            self.losses /= 2;
        }

        let goal = self.runner_goal();
        let _ = self.move_enemy(AgentKind::Runner, goal, false);

        if ai::adjacent(self.runner, self.player) {
            let goal = self.runner_goal();
            let _ = self.move_enemy(AgentKind::Runner, goal, false);
        }
    }

    fn reset(&mut self) {
        self.game_over = false;
        self.score = 0;
        self.losses = 0;
        self.level = 0;
        self.heat = 0.0;
        self.moves_since_chaser = 0;
        self.buffer.clear();
        self.trail.clear();
        self.targets.clear();

        self.grid.clear();
        self.populations.reset();
        let width = self.grid.width();
        for y in 0..width {
            for x in 0..width {
                self.rebalance_tile(Pair::new(x, y));
            }
        }

        let center = width / 2;
        let edge = width - 1;
        self.player = Pair::new(center, center);
        self.chaser = Pair::new(0, 0);
        self.runner = Pair::new(edge, 0);
        self.nommer = Pair::new(edge, edge);
        for kind in AgentKind::ALL {
            self.occupy(self.agent_position(kind), kind);
        }

        let _ = self.refill_targets();
    }

    /// Assigns a fresh balanced symbol to the tile at `pos`.
    ///
    /// Decrements the outgoing glyph (if any) and increments the drawn
    /// one, so the population invariant is preserved across the call.
    fn rebalance_tile(&mut self, pos: Pair) {
        let outgoing = self.grid.tile_at(pos).and_then(|tile| tile.symbol().glyph());
        if let Some(glyph) = outgoing {
            if let Some(index) = self.language.index_of(glyph) {
                self.populations.decrement(index);
            }
        }

        let excluded: HashSet<char> = self
            .grid
            .neighborhood(pos, EXCLUSION_RADIUS)
            .iter()
            .filter_map(|tile| tile.symbol().glyph())
            .collect();
        let index = population::draw_balanced(
            &self.language,
            &self.populations,
            &excluded,
            self.config.balance_base,
            &mut self.rng,
        );
        self.populations.increment(index);
        if let Some(glyph) = self.language.glyph_at(index) {
            if let Some(tile) = self.grid.tile_at_mut(pos) {
                tile.set_symbol(TileSymbol::Glyph(glyph));
            }
        }
    }

    /// Stamps an agent marker onto `pos`, uncounting its glyph if present.
    fn occupy(&mut self, pos: Pair, kind: AgentKind) {
        let glyph = self.grid.tile_at(pos).and_then(|tile| tile.symbol().glyph());
        if let Some(glyph) = glyph {
            if let Some(index) = self.language.index_of(glyph) {
                self.populations.decrement(index);
            }
        }
        if let Some(tile) = self.grid.tile_at_mut(pos) {
            tile.set_symbol(TileSymbol::Marker(kind));
        }
    }

    fn agent_position(&self, kind: AgentKind) -> Pair {
        match kind {
            AgentKind::Player => self.player,
            AgentKind::Chaser => self.chaser,
            AgentKind::Nommer => self.nommer,
            AgentKind::Runner => self.runner,
        }
    }

    fn set_agent(&mut self, kind: AgentKind, pos: Pair) {
        match kind {
            AgentKind::Player => self.player = pos,
            AgentKind::Chaser => self.chaser = pos,
            AgentKind::Nommer => self.nommer = pos,
            AgentKind::Runner => self.runner = pos,
        }
    }

    /// Moves one enemy a single resolved step toward `goal`.
    ///
    /// The origin tile is vacated (and rebalanced) strictly before the step
    /// is computed, so the balancer never samples stale occupancy for the
    /// mover's own tile; a zero step restores the marker in place.
    fn move_enemy(&mut self, kind: AgentKind, goal: Pair, may_touch_player: bool) -> Pair {
        let origin = self.agent_position(kind);
        self.rebalance_tile(origin);

        let ctx = StepContext {
            diagonals: self.config.diagonals,
            may_touch_player,
            player: self.player,
            fallback_base: self.config.movement.fallback_base,
        };
        let step = {
            let grid = &self.grid;
            let is_free =
                |pos: Pair| grid.tile_at(pos).map_or(false, |tile| tile.symbol().is_glyph());
            resolve_step(origin, goal, &ctx, &is_free, &mut self.rng)
        };

        let dest = origin + step;
        if dest == origin {
            self.occupy(origin, kind);
            return origin;
        }
        self.occupy(dest, kind);
        self.set_agent(kind, dest);
        dest
    }

    fn runner_goal(&mut self) -> Pair {
        ai::runner_goal(
            self.runner,
            self.player,
            self.chaser,
            self.nommer,
            self.grid.width(),
            &self.config.runner,
            &mut self.rng,
        )
    }

    /// Finds the adjacent tile with the longest code ending the buffer.
    ///
    /// Codes of equal length that both end the same buffer are necessarily
    /// the same code, so the longest match is always unique even when a
    /// short vowel code is a suffix of a longer one.
    fn match_adjacent(&self) -> Option<Pair> {
        let mut matched: Option<(Pair, usize)> = None;
        for tile in self.grid.neighborhood(self.player, 1) {
            if !self.config.diagonals && (tile.pos() - self.player).linear_norm() != 1 {
                continue;
            }
            let Some(glyph) = tile.symbol().glyph() else {
                continue;
            };
            let Some(code) = self.language.code(glyph) else {
                continue;
            };
            if self.buffer.ends_with(code)
                && matched.map_or(true, |(_, held)| code.len() > held)
            {
                matched = Some((tile.pos(), code.len()));
            }
        }
        matched.map(|(pos, _)| pos)
    }

    fn clamp_buffer(&mut self) {
        let max = self.language.max_code_len();
        let len = self.buffer.chars().count();
        if len > max {
            self.buffer = self.buffer.chars().skip(len - max).collect();
        }
    }

    /// Relocates the player onto `dest` and settles every consequence:
    /// trail bookkeeping, target consumption, heat, round completion, and
    /// adaptive trail trimming.
    fn advance_player(&mut self, dest: Pair, via_backtrack: bool) -> RoundOutcome {
        let origin = self.player;
        if !via_backtrack {
            self.trail.push(origin);
        }
        self.rebalance_tile(origin);
        self.occupy(dest, AgentKind::Player);
        self.player = dest;
        self.trail.retain(|&pos| pos != dest);
        self.buffer.clear();
        self.moves_since_chaser = self.moves_since_chaser.saturating_add(1);

        let mut outcome = RoundOutcome {
            moved: true,
            ..RoundOutcome::default()
        };
        if let Some(index) = self.targets.iter().position(|&target| target == dest) {
            let _ = self.targets.remove(index);
            self.score = self.score.saturating_add(1);
            let quota = self.config.target_quota() as f64;
            self.heat = quota * (self.heat / quota + 1.0).sqrt();
            outcome.consumed = Some(dest);
            if self.targets.is_empty() {
                self.level += 1;
                self.trail.clear();
                outcome.round_complete = true;
                outcome.new_targets = self.refill_targets();
            }
        }

        self.trim_trail();
        outcome
    }

    fn backtrack(&mut self) -> RoundOutcome {
        let Some(&dest) = self.trail.last() else {
            return RoundOutcome::default();
        };
        // The trailed tile may meanwhile hold an enemy; backtracking waits.
        if self
            .grid
            .tile_at(dest)
            .map_or(true, |tile| !tile.symbol().is_glyph())
        {
            return RoundOutcome::default();
        }
        let _ = self.trail.pop();
        self.advance_player(dest, true)
    }

    fn trim_trail(&mut self) {
        let tuning = self.config.trail;
        let net = f64::from(self.score) - tuning.loss_weight * f64::from(self.losses);
        let limit = tuning.min_len + net.max(0.0).powf(tuning.exponent).floor() as usize;
        while self.trail.len() > limit {
            let _ = self.trail.remove(0);
        }
    }

    fn refill_targets(&mut self) -> Vec<Pair> {
        let deficit = self.config.target_quota().saturating_sub(self.targets.len());
        let spawned = spawner::spawn_targets(
            &self.grid,
            &self.targets,
            self.player,
            self.nommer,
            &self.config.targets,
            deficit,
            &mut self.rng,
        );
        self.targets.extend_from_slice(&spawned);
        spawned
    }
}

/// Read-only access to the session state, polled by hosts between calls.
pub mod query {
    use super::{ai, Game, PopulationMap};
    use glyph_chase_core::{language::Language, AgentKind, Pair, TileSymbol};

    /// Side length of the grid in tiles.
    #[must_use]
    pub fn width(game: &Game) -> i32 {
        game.grid.width()
    }

    /// Symbol shown on the tile at `pos`, or `None` outside bounds.
    #[must_use]
    pub fn symbol_at(game: &Game, pos: Pair) -> Option<TileSymbol> {
        game.grid.tile_at(pos).map(|tile| tile.symbol())
    }

    /// Targets consumed by the player so far.
    #[must_use]
    pub fn score(game: &Game) -> u32 {
        game.score
    }

    /// Targets conceded to the nommer, less runner-tag refunds.
    #[must_use]
    pub fn losses(game: &Game) -> u32 {
        game.losses
    }

    /// Completed rounds since the last restart.
    #[must_use]
    pub fn level(game: &Game) -> u32 {
        game.level
    }

    /// Transient nommer acceleration earned by recent player scores.
    #[must_use]
    pub fn heat(game: &Game) -> f64 {
        game.heat
    }

    /// Tiles the player must reach this round.
    #[must_use]
    pub fn targets(game: &Game) -> &[Pair] {
        &game.targets
    }

    /// Previously occupied tiles, oldest first.
    #[must_use]
    pub fn trail(game: &Game) -> &[Pair] {
        &game.trail
    }

    /// Keystrokes accumulated toward the next code match.
    #[must_use]
    pub fn pending_input(game: &Game) -> &str {
        &game.buffer
    }

    /// Current position of the requested agent.
    #[must_use]
    pub fn agent_position(game: &Game, kind: AgentKind) -> Pair {
        game.agent_position(kind)
    }

    /// Whether the chaser has caught the player.
    #[must_use]
    pub fn is_game_over(game: &Game) -> bool {
        game.game_over
    }

    /// The active input language table.
    #[must_use]
    pub fn language(game: &Game) -> &Language {
        &game.language
    }

    /// The symbol population counts, in language order.
    #[must_use]
    pub fn populations(game: &Game) -> &PopulationMap {
        &game.populations
    }

    /// Number of targets a round keeps alive.
    #[must_use]
    pub fn target_quota(game: &Game) -> usize {
        game.config.target_quota()
    }

    /// Reports whether the player currently touches the runner.
    #[must_use]
    pub fn runner_tagged(game: &Game) -> bool {
        ai::adjacent(game.runner, game.player)
    }

    /// Baseline enemy cadence in tiles per second.
    ///
    /// A logistic curve of cumulative `score + losses` asymptoting between
    /// the configured low and high rates, so enemies speed up with the game
    /// but taper off.
    #[must_use]
    pub fn enemy_speed(game: &Game) -> f64 {
        let tuning = game.config.speed;
        let progress = f64::from(game.score.saturating_add(game.losses));
        tuning.low
            + (tuning.high - tuning.low)
                / (1.0 + 2f64.powf(-(progress - tuning.midpoint) / tuning.slope))
    }

    /// Nommer cadence: the baseline scaled up by outstanding heat.
    #[must_use]
    pub fn nommer_speed(game: &Game) -> f64 {
        let boost = game.config.speed.heat_boost * game.heat / game.config.target_quota() as f64;
        enemy_speed(game) * (1.0 + boost)
    }
}
