use glyph_chase_core::{language::Language, AgentKind, GameConfig, Pair, TileSymbol};
use glyph_chase_world::{query, Game, RoundOutcome};

fn fresh_game(seed: u64) -> Game {
    Game::new(GameConfig::default(), Language::english_lower(), seed).expect("valid session")
}

/// The code of some glyph tile adjacent to the player.
fn adjacent_code(game: &Game) -> (Pair, String) {
    let player = query::agent_position(game, AgentKind::Player);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let pos = player + Pair::new(dx, dy);
            if let Some(TileSymbol::Glyph(glyph)) = query::symbol_at(game, pos) {
                let code = query::language(game)
                    .code(glyph)
                    .expect("builtin glyphs carry codes")
                    .to_owned();
                return (pos, code);
            }
        }
    }
    panic!("player fully walled in on a fresh grid");
}

#[test]
fn fresh_round_spawns_the_full_quota_clear_of_agents() {
    let game = fresh_game(21);
    let targets = query::targets(&game);

    assert_eq!(targets.len(), query::target_quota(&game));
    for kind in AgentKind::ALL {
        let pos = query::agent_position(&game, kind);
        assert!(!targets.contains(&pos), "target spawned under {kind:?}");
    }
    assert_eq!(query::score(&game), 0);
    assert_eq!(query::losses(&game), 0);
    assert_eq!(query::level(&game), 0);
    assert!(query::trail(&game).is_empty());
}

#[test]
fn typing_an_adjacent_code_moves_the_player_and_leaves_a_trail() {
    let mut game = fresh_game(22);
    let origin = query::agent_position(&game, AgentKind::Player);
    let (dest, code) = adjacent_code(&game);

    let mut outcome = RoundOutcome::default();
    for key in code.chars() {
        outcome = game.handle_key(&key.to_string());
    }

    assert!(outcome.moved, "completed code failed to move the player");
    assert_eq!(query::agent_position(&game, AgentKind::Player), dest);
    assert_eq!(query::trail(&game), &[origin]);
    assert!(query::pending_input(&game).is_empty());
    assert_eq!(
        query::symbol_at(&game, dest),
        Some(TileSymbol::Marker(AgentKind::Player))
    );
    assert!(
        query::symbol_at(&game, origin).map_or(false, |symbol| symbol.is_glyph()),
        "vacated tile was not reseeded"
    );
}

/// The adjacent glyph tile closest to `goal`, with its code.
fn step_toward(game: &Game, goal: Pair) -> (Pair, String) {
    let player = query::agent_position(game, AgentKind::Player);
    let mut best: Option<(Pair, char)> = None;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let pos = player + Pair::new(dx, dy);
            if let Some(TileSymbol::Glyph(glyph)) = query::symbol_at(game, pos) {
                if best.map_or(true, |(held, _)| {
                    (pos - goal).square_norm() < (held - goal).square_norm()
                }) {
                    best = Some((pos, glyph));
                }
            }
        }
    }
    let (pos, glyph) = best.expect("player fully walled in");
    let code = query::language(game)
        .code(glyph)
        .expect("builtin glyphs carry codes")
        .to_owned();
    (pos, code)
}

#[test]
fn consuming_a_target_scores_and_raises_heat() {
    let mut game = fresh_game(23);

    let mut consumed = None;
    for step in 0..2_000u32 {
        let player = query::agent_position(&game, AgentKind::Player);
        let goal = query::targets(&game)
            .iter()
            .copied()
            .min_by_key(|&target| ((target - player).square_norm(), target))
            .expect("round always keeps targets alive");
        let (dest, code) = step_toward(&game, goal);
        let was_target = query::targets(&game).contains(&dest);
        let mut outcome = RoundOutcome::default();
        for key in code.chars() {
            outcome = game.handle_key(&key.to_string());
        }
        assert!(outcome.moved, "step {step} failed to resolve");
        if was_target {
            consumed = outcome.consumed;
            break;
        }
    }

    let consumed = consumed.expect("never reached a target");
    assert_eq!(query::score(&game), 1);
    assert!(query::heat(&game) > 0.0);
    assert!(!query::targets(&game).contains(&consumed));
}

#[test]
fn backtrack_returns_along_the_trail() {
    let mut game = fresh_game(24);
    let origin = query::agent_position(&game, AgentKind::Player);
    let (dest, code) = adjacent_code(&game);
    for key in code.chars() {
        let _ = game.handle_key(&key.to_string());
    }
    assert_eq!(query::agent_position(&game, AgentKind::Player), dest);

    let outcome = game.handle_key(" ");
    assert!(outcome.moved, "backtrack refused a free trail tile");
    assert_eq!(query::agent_position(&game, AgentKind::Player), origin);
    assert!(query::trail(&game).is_empty());
}

#[test]
fn chaser_eventually_catches_a_stationary_player() {
    let mut game = fresh_game(25);

    let mut caught = false;
    for _ in 0..2_000u32 {
        if game.tick_chaser() {
            caught = true;
            break;
        }
    }
    assert!(caught, "chaser never closed on a stationary player");
    assert!(query::is_game_over(&game));

    // Frozen until restart.
    let outcome = game.handle_key("a");
    assert_eq!(outcome, RoundOutcome::default());
    assert!(game.tick_nommer().is_empty());

    game.restart();
    assert!(!query::is_game_over(&game));
}

#[test]
fn nommer_eventually_inflicts_a_loss() {
    let mut game = fresh_game(26);

    for _ in 0..5_000u32 {
        let _ = game.tick_nommer();
        if query::losses(&game) > 0 {
            break;
        }
    }
    assert!(query::losses(&game) > 0, "nommer never reached a target");
    assert!(query::targets(&game).len() <= query::target_quota(&game));
}

#[test]
fn runner_keeps_its_distance_over_time() {
    let mut game = fresh_game(27);
    let player = query::agent_position(&game, AgentKind::Player);

    for _ in 0..200u32 {
        game.tick_runner();
    }

    let runner = query::agent_position(&game, AgentKind::Runner);
    assert!(
        (runner - player).square_norm() > 1,
        "runner settled next to the player"
    );
}
