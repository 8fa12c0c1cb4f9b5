#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that drives a Glyph Chase session over stdin.
//!
//! Each input line counts as one beat of typing: its characters are fed to
//! the engine one by one, then the enemy clocks advance by one beat at the
//! cadence the engine reports. The grid is redrawn after every line.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use glyph_chase_core::{language::Language, AgentKind, GameConfig, Pair, TileSymbol};
use glyph_chase_world::{query, Game};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LanguageChoice {
    /// Lowercase English letters, one keystroke per tile.
    English,
    /// Hiragana tiles typed as Hepburn romanization.
    Hiragana,
    /// Katakana tiles typed as Hepburn romanization.
    Katakana,
}

impl LanguageChoice {
    fn build(self) -> Language {
        match self {
            Self::English => Language::english_lower(),
            Self::Hiragana => Language::hiragana(),
            Self::Katakana => Language::katakana(),
        }
    }
}

/// Typing-chase session in the terminal.
#[derive(Debug, Parser)]
#[command(name = "glyph-chase", version, about)]
struct Args {
    /// Side length of the square grid, in tiles.
    #[arg(long, default_value_t = 20)]
    width: u32,

    /// Symbol set drawn onto the tiles.
    #[arg(long, value_enum, default_value_t = LanguageChoice::English)]
    language: LanguageChoice,

    /// Replay seed; equal seeds and input replay identical sessions.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Restrict every mover to orthogonal steps.
    #[arg(long)]
    orthogonal: bool,

    /// Keystrokes to feed before reading stdin, for scripted runs.
    #[arg(long)]
    script: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GameConfig {
        width: args.width,
        diagonals: !args.orthogonal,
        ..GameConfig::default()
    };
    let mut game = Game::new(config, args.language.build(), args.seed)
        .context("configuration rejected")?;

    let mut clock = EnemyClock::default();
    if let Some(script) = &args.script {
        for key in script.chars() {
            feed_key(&mut game, key);
        }
        clock.advance(&mut game);
    }

    let stdout = io::stdout();
    draw(&game, &mut stdout.lock())?;

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        if line == ":q" {
            break;
        }
        if line == ":r" {
            game.restart();
            clock = EnemyClock::default();
            draw(&game, &mut stdout.lock())?;
            continue;
        }

        for key in line.chars() {
            feed_key(&mut game, key);
        }
        // An empty line is a deliberate backtrack press.
        if line.is_empty() {
            let _ = game.handle_key(" ");
        }
        clock.advance(&mut game);
        draw(&game, &mut stdout.lock())?;
    }

    Ok(())
}

fn feed_key(game: &mut Game, key: char) {
    let mut buffer = [0u8; 4];
    let _ = game.handle_key(key.encode_utf8(&mut buffer));
}

/// Fractional tick budgets for the enemies, filled one beat at a time.
#[derive(Debug, Default)]
struct EnemyClock {
    chaser: f64,
    nommer: f64,
    runner: f64,
}

impl EnemyClock {
    /// Advances all enemy clocks by one beat of typing.
    fn advance(&mut self, game: &mut Game) {
        self.chaser += query::enemy_speed(game);
        self.runner += query::enemy_speed(game);
        self.nommer += query::nommer_speed(game);

        while self.chaser >= 1.0 {
            self.chaser -= 1.0;
            if game.tick_chaser() {
                return;
            }
        }
        while self.runner >= 1.0 {
            self.runner -= 1.0;
            game.tick_runner();
        }
        while self.nommer >= 1.0 {
            self.nommer -= 1.0;
            let _ = game.tick_nommer();
        }
    }
}

fn draw(game: &Game, out: &mut impl Write) -> Result<()> {
    let width = query::width(game);
    let targets = query::targets(game);
    let trail = query::trail(game);

    for y in 0..width {
        for x in 0..width {
            let pos = Pair::new(x, y);
            let prefix = if targets.contains(&pos) {
                '*'
            } else if trail.contains(&pos) {
                '.'
            } else {
                ' '
            };
            let face = match query::symbol_at(game, pos) {
                Some(TileSymbol::Glyph(glyph)) => glyph,
                Some(TileSymbol::Marker(kind)) => kind.face(),
                Some(TileSymbol::Blank) | None => bail!("tile ({x}, {y}) missing"),
            };
            write!(out, "{prefix}{face}")?;
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "score {score}  losses {losses}  level {level}  heat {heat:.1}  pace {pace:.2}  input {input:?}",
        score = query::score(game),
        losses = query::losses(game),
        level = query::level(game),
        heat = query::heat(game),
        pace = query::enemy_speed(game),
        input = query::pending_input(game),
    )?;
    if query::runner_tagged(game) {
        writeln!(out, "runner tagged -- losses halve on its next tick")?;
    }
    if query::is_game_over(game) {
        let caught_at = query::agent_position(game, AgentKind::Player);
        writeln!(out, "caught at {caught_at:?} -- :r restarts, :q quits")?;
    }
    Ok(())
}
