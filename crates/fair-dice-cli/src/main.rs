//! Fair Dice console
//!
//! Plays the non-transitive dice game against the computer. Every random
//! decision is a commit-reveal exchange the user can audit from the printed
//! HMAC and key.

mod console;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use console::Console;
use fair_dice_core::{
    DiceGame, DiceSet, FairDiceError, FairRandom, HmacSha256Scheme, OsRandomSource,
    ProbabilityTable,
};
use std::io;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE_EXAMPLE: &str = "Example: fair-dice 2,2,4,4,9,9 1,1,6,6,8,8 3,3,5,5,7,7";

#[derive(Parser, Debug)]
#[command(
    name = "fair-dice",
    about = "Non-transitive dice game with provably fair rolls",
    after_help = USAGE_EXAMPLE
)]
struct Args {
    /// Dice as comma-separated integer faces, all with the same face count
    #[arg(allow_hyphen_values = true)]
    dice: Vec<String>,

    /// Print the win probability table and exit
    #[arg(long)]
    table: bool,

    /// Print the table as JSON (with --table)
    #[arg(long, requires = "table")]
    json: bool,

    /// Log filter, e.g. `info` or `fair_dice_core=debug`
    #[arg(long, env = "FAIR_DICE_LOG", default_value = "warn")]
    log_level: String,
}

fn init_tracing(filter: &str) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(filter).context("invalid log filter")?)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn run(args: Args) -> Result<()> {
    let dice = DiceSet::parse(args.dice.as_slice())?;
    debug!("Parsed {} dice with {} faces", dice.len(), dice.face_count());

    if args.table {
        let table = ProbabilityTable::build(dice.dice());
        if args.json {
            println!("{}", serde_json::to_string_pretty(&table)?);
        } else {
            print!("{}", render::probability_table(&table));
        }
        return Ok(());
    }

    let fair = FairRandom::new(OsRandomSource::new(), HmacSha256Scheme);
    let mut game = DiceGame::new(dice, fair)?;
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout(), game.table().clone());
    let report = game.play(&mut console)?;
    console.finish(&report)?;
    info!("Game finished: {}", report.outcome);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_tracing(&args.log_level) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<FairDiceError>() {
            Some(FairDiceError::Aborted) => {
                println!("Bye!");
                ExitCode::SUCCESS
            }
            Some(FairDiceError::InvalidArgument(_)) => {
                eprintln!("Error: {e}\n{USAGE_EXAMPLE}");
                ExitCode::FAILURE
            }
            _ => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}
