use std::time::{Duration, Instant};

use agent_2048::engine::Board;
use agent_2048::expectimax::{Expectimax, ExpectimaxConfig};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "agent-2048", about = "Self-play driver for the expectimax policy")]
struct Args {
    /// Seed for both the game RNG and the policy RNG; entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Search depth in plies.
    #[arg(long, default_value_t = 5)]
    depth: u32,

    /// Stop after this many moves (0 plays to game over).
    #[arg(long, default_value_t = 0)]
    max_moves: u64,

    /// Suppress per-move board printing; show a progress spinner instead.
    #[arg(long)]
    quiet: bool,

    /// Print a JSON run summary on exit.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    moves: u64,
    score: u32,
    highest_tile: u32,
    total_nodes: u64,
    peak_nodes: u64,
    elapsed_s: f32,
}

fn main() {
    let args = Args::parse();
    let cfg = ExpectimaxConfig { depth: args.depth };

    let (mut policy, mut rng) = match args.seed {
        Some(seed) => (
            Expectimax::with_config_and_seed(cfg, seed),
            StdRng::seed_from_u64(seed),
        ),
        None => (Expectimax::with_config(cfg), StdRng::from_entropy()),
    };

    let mut board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    if !args.quiet {
        println!("{}", board);
    }

    let pb = if args.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | {msg}")
                .expect("valid progress template"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let mut move_count = 0u64;
    let mut total_nodes = 0u64;

    while !board.is_game_over() {
        let Some(dir) = policy.best_move(board) else { break };
        board = board.make_move(dir, &mut rng).board;
        move_count += 1;
        total_nodes = total_nodes.saturating_add(policy.last_stats().nodes);

        if let Some(pb) = &pb {
            pb.set_message(format!(
                "moves: {} | score: {} | highest: {}",
                move_count,
                board.score(),
                board.highest_tile()
            ));
        } else {
            println!("move {}: {}", move_count, dir);
            println!("{}", board);
        }

        if args.max_moves != 0 && move_count >= args.max_moves {
            break;
        }
    }

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let summary = RunSummary {
        moves: move_count,
        score: board.score(),
        highest_tile: board.highest_tile(),
        total_nodes,
        peak_nodes: policy.last_stats().peak_nodes,
        elapsed_s: start.elapsed().as_secs_f32(),
    };

    if args.json {
        let line = serde_json::to_string(&summary).expect("serialize run summary");
        println!("{}", line);
    } else {
        println!(
            "Moves made: {}, Score: {}, Highest tile: {}, States considered: {}, Max states for a move: {}",
            summary.moves, summary.score, summary.highest_tile, summary.total_nodes, summary.peak_nodes
        );
    }
}
