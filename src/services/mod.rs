pub mod exporter;
pub mod problem_fetcher;
pub mod solver;

pub use exporter::{ExportSink, JsonExporter};
pub use problem_fetcher::ProblemFetcher;
pub use solver::{PromptTemplate, Solver, SOLVE_FAILED_SENTINEL};
