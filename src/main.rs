use anyhow::{Context, Result};
use clap::Parser;
use shenzhen_solitaire::{Board, CardId, ContainerId, GameConfig, Gesture, Stats, Suit};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Plays Shenzhen solitaire in the terminal.
#[derive(Parser)]
#[command(name = "shenzhen")]
#[command(version, long_about = None)]
struct Cli {
    /// Deal a specific game
    #[arg(short, long)]
    seed: Option<u64>,

    /// File holding win count and best time
    #[arg(long, value_name = "FILE", default_value = GameConfig::DEFAULT_STATS_PATH)]
    stats: PathBuf,
}

const HELP: &str = "c <card>  click card    t <t0|fl|f0|w0..>  click container\n\
                    d <b|g|r> collapse       m  valid moves   n  new game   q  quit";

enum Command {
    Gesture(Gesture),
    NewGame,
    Moves,
    Quit,
}

fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match (words.next()?, words.next()) {
        ("c", Some(id)) => Command::Gesture(Gesture::CardClicked(CardId(id.parse().ok()?))),
        ("t", Some(label)) => Command::Gesture(Gesture::ContainerClicked(ContainerId::parse(label)?)),
        ("d", Some(suit)) => {
            let suit = Suit::from_letter(suit.chars().next()?)?;
            Command::Gesture(Gesture::CollapseClicked(suit))
        }
        ("m", None) => Command::Moves,
        ("n", None) => Command::NewGame,
        ("q", None) => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GameConfig {
        seed: cli.seed,
        stats_path: cli.stats,
    };
    let mut stats = Stats::load(&config.stats_path)?;
    let mut board = Board::new(&config).context("failed to deal")?;
    let mut started = Instant::now();

    println!("{HELP}");
    println!("{board}");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse(&line) {
            Some(Command::Gesture(gesture)) => {
                let update = board.handle(gesture)?;
                if let Some(mv) = &update.applied {
                    println!("{}", mv.pretty_string(&board));
                }
                if update.won {
                    stats.record_win(started.elapsed());
                    stats.save(&config.stats_path)?;
                    println!(
                        "Solved! wins: {}  best: {}s",
                        stats.wins,
                        stats.best_time.unwrap_or_default()
                    );
                }
                println!("{}", update.snapshot);
            }
            Some(Command::Moves) => {
                for mv in board.valid_moves() {
                    println!("{}", mv.pretty_string(&board));
                }
            }
            Some(Command::NewGame) => {
                board.new_game()?;
                started = Instant::now();
                println!("{board}");
            }
            Some(Command::Quit) => break,
            None => println!("{HELP}"),
        }
        io::stdout().flush()?;
    }
    Ok(())
}
