//! `ws` - command-line driver for the Weiß Schwarz engine
//!
//! Plays single games with log output, or simulates many games in parallel.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use ws_engine::{
    core::PlayerId,
    game::{
        GameConfig, GameContext, GameEndReason, GameLoop, GameResult, OutputFormat,
        PlayerController, RandomController, VerbosityLevel, ZeroController,
    },
    loader::{demo_card_pool, CardDatabase, DeckList, DeckLoader, GameInitializer},
};

/// Controller type for each seat
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Always takes the first option, declines everything optional
    Zero,
    /// Uniformly random legal choices
    Random,
}

/// Verbosity level for game output (names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<VerbosityLevel>().map(VerbosityArg).map_err(|_| {
            format!("invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)")
        })
    }
}

#[derive(Parser)]
#[command(name = "ws")]
#[command(about = "Weiß Schwarz rules engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game and print its log
    Play {
        /// Deck list for player 1 (fallback deck when omitted)
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: Option<PathBuf>,

        /// Deck list for player 2 (fallback deck when omitted)
        #[arg(value_name = "PLAYER2_DECK")]
        deck2: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Seed for shuffles and random controllers
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v', default_value = "normal")]
        verbosity: VerbosityArg,

        #[arg(long, default_value_t = 100)]
        max_turns: u32,

        /// Emit log lines and the final result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Simulate many games in parallel and tally the winners
    Batch {
        #[arg(long, short = 'g', default_value_t = 100)]
        games: usize,

        /// Base seed; game i uses seed + i
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Deck list used by both players (fallback deck when omitted)
        #[arg(long, short = 'd')]
        deck: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        #[arg(long, default_value_t = 100)]
        max_turns: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let pool = demo_card_pool();

    match cli.command {
        Commands::Play {
            deck1,
            deck2,
            p1,
            p2,
            p1_name,
            p2_name,
            seed,
            verbosity,
            max_turns,
            json,
        } => {
            let deck1 = load_deck(&pool, deck1.as_deref())?;
            let deck2 = load_deck(&pool, deck2.as_deref())?;
            let seats = Seats {
                names: [p1_name, p2_name],
                controllers: [p1, p2],
            };
            let config = GameConfig {
                max_turns,
                seed,
                ..GameConfig::default()
            };
            let mut ctx = build_context(&pool, [&deck1, &deck2], &seats, config)?;
            if json {
                ctx.state.logger.set_output_format(OutputFormat::Json);
            }
            let result = GameLoop::new(&mut ctx)
                .with_verbosity(verbosity.0)
                .run_game()
                .context("game aborted")?;

            if json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                print_result(&ctx, &result);
            }
        }
        Commands::Batch {
            games,
            seed,
            deck,
            p1,
            p2,
            max_turns,
        } => run_batch(&pool, games, seed, deck.as_deref(), [p1, p2], max_turns)?,
    }

    Ok(())
}

struct Seats {
    names: [String; 2],
    controllers: [ControllerType; 2],
}

fn load_deck(pool: &CardDatabase, path: Option<&Path>) -> Result<DeckList> {
    match path {
        Some(path) => DeckLoader::load_from_file(path)
            .with_context(|| format!("failed to load deck {}", path.display())),
        None => Ok(DeckList::fallback(pool)),
    }
}

fn make_controller(kind: ControllerType, player: PlayerId, seed: u64) -> Box<dyn PlayerController> {
    match kind {
        ControllerType::Zero => Box::new(ZeroController::new(player)),
        ControllerType::Random => Box::new(RandomController::with_seed(player, seed)),
    }
}

fn build_context(
    pool: &CardDatabase,
    decks: [&DeckList; 2],
    seats: &Seats,
    config: GameConfig,
) -> Result<GameContext> {
    let seed = config.seed;
    let state = GameInitializer::new(pool).init_game(
        seats.names[0].clone(),
        decks[0],
        seats.names[1].clone(),
        decks[1],
        config,
    )?;
    let controllers = state
        .player_ids()
        .into_iter()
        .zip(seats.controllers)
        .enumerate()
        .map(|(i, (player, kind))| make_controller(kind, player, seed.wrapping_add(i as u64 + 1)))
        .collect();
    Ok(GameContext::new(state, controllers))
}

fn print_result(ctx: &GameContext, result: &GameResult) {
    let name = |p: PlayerId| {
        ctx.state
            .player(p)
            .map(|pl| pl.name.to_string())
            .unwrap_or_else(|_| p.to_string())
    };
    println!("\n=== Game Over ===");
    match result.winner {
        Some(winner) => println!("Winner: {}", name(winner)),
        None => println!("No winner"),
    }
    let reason = match result.end_reason {
        GameEndReason::DeckOut(p) => format!("{} could not draw", name(p)),
        GameEndReason::LevelFour(p) => format!("{} reached level 4", name(p)),
        GameEndReason::TurnLimit => "turn limit reached".to_string(),
    };
    println!("Turns played: {}", result.turns_played);
    println!("End reason: {reason}");
}

#[derive(Debug, Default)]
struct Tally {
    p1_wins: usize,
    p2_wins: usize,
    draws: usize,
    turns: u64,
}

fn run_batch(
    pool: &CardDatabase,
    games: usize,
    seed: u64,
    deck: Option<&Path>,
    controllers: [ControllerType; 2],
    max_turns: u32,
) -> Result<()> {
    let deck = load_deck(pool, deck)?;
    println!("Simulating {games} games (seed {seed})...");
    let start = std::time::Instant::now();

    let results: Vec<GameResult> = (0..games)
        .into_par_iter()
        .map(|i| -> Result<GameResult> {
            let seats = Seats {
                names: ["Player 1".to_string(), "Player 2".to_string()],
                controllers,
            };
            let config = GameConfig {
                max_turns,
                seed: seed.wrapping_add(i as u64),
                ..GameConfig::default()
            };
            let mut ctx = build_context(pool, [&deck, &deck], &seats, config)?;
            let result = GameLoop::new(&mut ctx)
                .with_verbosity(VerbosityLevel::Silent)
                .run_game()
                .with_context(|| format!("game {i} aborted"))?;
            Ok(result)
        })
        .collect::<Result<_>>()?;

    let p1 = PlayerId::new(0);
    let tally = results.iter().fold(Tally::default(), |mut tally, r| {
        match r.winner {
            Some(w) if w == p1 => tally.p1_wins += 1,
            Some(_) => tally.p2_wins += 1,
            None => tally.draws += 1,
        }
        tally.turns += r.turns_played as u64;
        tally
    });

    let elapsed = start.elapsed();
    println!("Player 1 wins: {}", tally.p1_wins);
    println!("Player 2 wins: {}", tally.p2_wins);
    println!("No winner:     {}", tally.draws);
    if games > 0 {
        println!("Avg turns:     {:.1}", tally.turns as f64 / games as f64);
        println!(
            "Elapsed:       {:.2?} ({:.1} games/sec)",
            elapsed,
            games as f64 / elapsed.as_secs_f64()
        );
    }
    Ok(())
}
