pub mod assembler;
pub mod progress;
pub mod solve_ctx;

pub use assembler::assemble;
pub use progress::{milestone, ProgressReporter};
pub use solve_ctx::SolveCtx;
