mod random;
mod stats;

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cloakpath::{AStar, Backtracking, BacktrackingMode, BreadthFirst, CancellationToken, Grid, Heuristic, Location, PathFinder, Perception};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::SeedableRng,
};
use tracing::{info, warn};

use crate::random::random_grid;
use crate::stats::{Outcome, Stats};

/// Plan a stealthy route past two observers to the objective and out through the exit.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Six coordinates: start, observer 1, observer 2, objective, concealment, exit.
    /// For example "[0,0] [4,2] [2,7] [7,4] [0,8] [1,4]". A random grid is generated if omitted.
    #[arg(short, long, value_name = "COORDS")]
    coords: Option<String>,

    /// Seed for random grids
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Side length of the grid
    #[arg(long, default_value_t = 9)]
    size: usize,

    /// Watch radius of observer 1
    #[arg(long, default_value_t = 2)]
    strong_radius: usize,

    /// Watch radius of observer 2
    #[arg(long, default_value_t = 1)]
    weak_radius: usize,

    /// Perception radius of the agent, 1 or 2
    #[arg(short, long, default_value_t = 1)]
    perception: usize,

    /// Search strategy
    #[arg(long, value_enum, default_value = "astar")]
    strategy: Strategy,

    /// Distance estimate for A*
    #[arg(long, value_enum, default_value = "euclidean")]
    heuristic: HeuristicArg,

    /// Keep backtracking until the shortest path is found instead of stopping at the first one
    #[arg(long)]
    shortest: bool,

    /// Give up backtracking after this many seconds and keep the best route found so far
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Play this many random games with every strategy and print statistics instead
    #[arg(long, value_name = "GAMES", conflicts_with = "coords")]
    stats: Option<usize>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Strategy {
    /// Breadth-first search
    Bfs,
    /// A* search
    Astar,
    /// Exhaustive backtracking
    Backtracking,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum HeuristicArg {
    /// Straight-line distance
    Euclidean,
    /// King-move distance
    Chebyshev,
}

impl From<HeuristicArg> for Heuristic {
    fn from(value: HeuristicArg) -> Self {
        match value {
            HeuristicArg::Euclidean => Self::Euclidean,
            HeuristicArg::Chebyshev => Self::Chebyshev,
        }
    }
}

impl Args {
    fn finder(&self, strategy: Strategy) -> (Box<dyn PathFinder + Sync>, Option<CancellationToken>) {
        match strategy {
            Strategy::Bfs => (Box::new(BreadthFirst), None),
            Strategy::Astar => (Box::new(AStar::new(self.heuristic.into())), None),
            Strategy::Backtracking => {
                let mode = match self.shortest {
                    true => BacktrackingMode::Shortest,
                    false => BacktrackingMode::FirstSuccess,
                };
                let finder = Backtracking::new(mode);
                let token = finder.cancellation_token();
                (Box::new(finder), Some(token))
            }
        }
    }

    fn grid(&self, coords: [Location; 6]) -> Result<Grid> {
        let [start, observer1, observer2, objective, concealment, exit] = coords;
        Grid::new(self.size, self.strong_radius, self.weak_radius, start, observer1, observer2, objective, concealment, exit)
            .context("invalid grid")
    }
}

/// Parse exactly six `[row,col]` coordinates, separated by anything outside the brackets.
fn parse_coords(input: &str) -> Result<[Location; 6]> {
    let locations = input.split_inclusive(']')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.parse::<Location>().with_context(|| format!("bad coordinate `{piece}`")))
        .collect::<Result<Vec<_>>>()?;

    let count = locations.len();
    locations.try_into().map_err(|_| anyhow!("expected 6 coordinates, got {count}"))
}

/// Solve on a worker thread, cancelling `token` once `timeout` has passed.
///
/// Strategies without a token run to completion regardless.
fn run_with_timeout(grid: &Grid, perception: Perception, finder: &(dyn PathFinder + Sync), token: Option<&CancellationToken>, timeout: Duration) -> Result<Outcome> {
    thread::scope(|scope| {
        let (done, finished) = mpsc::channel();
        let worker = scope.spawn(move || {
            let result = cloakpath::solve(grid, perception, finder);
            // the receiver is gone only if we already timed out
            let _ = done.send(());
            result
        });

        if let Err(RecvTimeoutError::Timeout) = finished.recv_timeout(timeout) {
            match token {
                Some(token) => {
                    warn!(strategy = finder.name(), ?timeout, "timed out, keeping the best route so far");
                    token.cancel();
                }
                None => warn!(strategy = finder.name(), ?timeout, "timed out, but this strategy cannot be cancelled"),
            }
        }

        worker.join()
            .map(Outcome::from)
            .map_err(|_| anyhow!("search thread panicked"))
    })
}

fn play(args: &Args, grid: &Grid, perception: Perception) -> Result<()> {
    let (finder, token) = args.finder(args.strategy);
    println!("{grid}");

    let started = Instant::now();
    let outcome = run_with_timeout(grid, perception, finder.as_ref(), token.as_ref(), Duration::from_secs(args.timeout_secs))?;
    info!(elapsed = ?started.elapsed(), "search finished");

    match outcome {
        Outcome::Escaped(route) => {
            println!("{} escaped via {} in {} steps", finder.name(), route.scenario(), route.steps());
            let walked = route.legs().iter().flat_map(|leg| leg.path.iter().copied()).collect::<Vec<_>>();
            for leg in route.legs() {
                let cells = leg.path.iter().map(Location::to_string).collect::<Vec<_>>();
                println!("  to {}: {}", leg.target, cells.join(" "));
            }
            println!();
            print!("{}", grid.render_with_path(&walked));
        }
        Outcome::NoRoute => println!("{}: no route to the exit", finder.name()),
        Outcome::Captured(captured) => println!("{}: {captured}", finder.name()),
    }

    Ok(())
}

fn collect_stats(args: &Args, games: usize, perception: Perception) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let grids = (0..games)
        .map(|_| random_grid(&mut rng, args.size, (args.strong_radius, args.weak_radius)).map(|(grid, _)| grid))
        .collect::<Result<Vec<_>>>()?;

    for strategy in [Strategy::Bfs, Strategy::Astar, Strategy::Backtracking] {
        let mut stats = Stats::default();
        for grid in &grids {
            // a fresh token per game, a cancelled one would end every later search immediately
            let (finder, token) = args.finder(strategy);
            let started = Instant::now();
            let outcome = run_with_timeout(grid, perception, finder.as_ref(), token.as_ref(), Duration::from_secs(args.timeout_secs))?;
            stats.record(&outcome, started.elapsed());
        }

        println!("{:?}: {stats}", strategy);
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let perception = Perception::try_from(args.perception)?;

    if let Some(games) = args.stats {
        return collect_stats(&args, games, perception);
    }

    let grid = match &args.coords {
        Some(coords) => args.grid(parse_coords(coords)?)?,
        None => {
            let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
            let (grid, coords) = random_grid(&mut rng, args.size, (args.strong_radius, args.weak_radius))?;
            let coords = coords.iter().map(Location::to_string).collect::<Vec<_>>();
            println!("random grid from seed {}: {}", args.seed, coords.join(" "));
            grid
        }
    };

    play(&args, &grid, perception)
}
