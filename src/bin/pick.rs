use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tilechain::{load_config, Agent, Board, SelectOutcome};

#[derive(Debug, Parser)]
#[command(name = "pick", about = "Run one chain decision on a board JSON file")]
struct Args {
    /// Board file: 5 rows of 4 integers, values <= 0 are empty
    board: PathBuf,

    /// Engine config JSON (missing file = defaults)
    #[arg(long, default_value = "tilechain.json")]
    config: PathBuf,

    /// Print the score breakdown of the chosen chain
    #[arg(long, default_value_t = false)]
    explain: bool,

    /// Use the best orthogonal pair when no chain exists
    #[arg(long, default_value_t = false)]
    fallback: bool,

    /// Persist the position store after deciding
    #[arg(long, default_value_t = false)]
    save: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;
    let text = fs::read_to_string(&args.board).map_err(|e| format!("read {}: {e}", args.board.display()))?;
    let board: Board = serde_json::from_str(&text).map_err(|e| format!("parse {}: {e}", args.board.display()))?;

    let mut agent = Agent::open(config);
    println!("{board}");
    let decision = agent.decide(&board);
    println!(
        "[pick] fingerprint={} profile=#{} order={:?} new_position={}",
        decision.fingerprint, decision.profile_index, decision.order, decision.new_position
    );
    if let Some(p) = decision.pressure {
        println!("[pick] pressure={p:.3}");
    }

    match &decision.outcome {
        SelectOutcome::Found(sel) => {
            println!(
                "[pick] chain {} score={:.1} evaluations={} fallback={}",
                sel.chain, sel.score, decision.stats.evaluations, decision.stats.fallback
            );
            if args.explain {
                println!("{:#?}", agent.evaluator().breakdown(&board, &sel.chain));
            }
            println!("{}", serde_json::to_string(&sel.chain)?);
        }
        other => {
            println!("[pick] no chain: {other:?}");
            if agent.is_game_lost(&board) {
                println!("[pick] board is lost");
            } else if args.fallback {
                match agent.fallback(&board) {
                    Some(sel) => {
                        println!("[pick] fallback pair {} score={:.1}", sel.chain, sel.score);
                        println!("{}", serde_json::to_string(&sel.chain)?);
                    }
                    None => println!("[pick] no fallback pair"),
                }
            }
        }
    }

    if args.save {
        agent.save()?;
    }
    Ok(())
}
