//! Case generation workflow.
//!
//! One run: open a CRM session, fetch accounts, maybe tag one, generate
//! content, create the case. Batches repeat runs sequentially and never stop
//! on a failed run.

mod random;
mod runner;
mod types;

pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use runner::CaseWorkflow;
pub use types::{BatchReport, RunReport, RunResult, RunStatus, WorkflowError};
