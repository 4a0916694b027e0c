use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub domain_file: String,
    pub problem_file: String,
    pub solver: Solver,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    Graphplan,
    Astar,
    Bfs,
    Ff,
}

impl Settings {
    /// Reads `planner.toml` from the working directory, or the file
    /// named by `PLANNER_CONFIG`.
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var("PLANNER_CONFIG").unwrap_or_else(|_| "planner.toml".to_string());
        let s = Config::builder().add_source(File::with_name(&path)).build()?;

        s.try_deserialize()
    }
}
