use anyhow::Context;
use settings::{Settings, Solver};
use tracing_subscriber::EnvFilter;

use planner::pddl;
use planner::solvers::{self, heuristics, DEFAULT_MAX_DEPTH};

mod settings;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::new().context("Error reading configuration")?;

    let problem = pddl::load_pddl(&settings.domain_file, &settings.problem_file)
        .context("Error loading PDDL files")?;
    tracing::info!(
        "Loaded problem {} over domain {}",
        problem.name(),
        problem.domain().name()
    );

    match settings.solver {
        Solver::Graphplan => {
            let max_depth = settings.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
            match solvers::graph_plan(&problem, max_depth)? {
                Some(plan) => println!("{plan}"),
                None => println!("No plan exists."),
            }
        }
        Solver::Astar => {
            let heuristic = heuristics::goals_remaining(&problem)?;
            print_sequence(solvers::search_plan(&problem, heuristic)?);
        }
        Solver::Bfs => print_sequence(solvers::bfs_plan(&problem)?),
        Solver::Ff => {
            let plan = solvers::ff_plan(&problem)?;
            print_sequence(Some(plan));
        }
    }

    Ok(())
}

fn print_sequence(plan: Option<Vec<planner::GroundedAction>>) {
    match plan {
        Some(actions) => {
            for (i, action) in actions.iter().enumerate() {
                println!("{}: {action}", i + 1);
            }
        }
        None => println!("No plan exists."),
    }
}
