//! soat-report
//!
//! Everything downstream of execution: the model-written explanation, the
//! Markdown report and a structural self-check of that report.
pub mod evaluate;
pub mod reasoner;
pub mod report;

pub use evaluate::{evaluate_report, Evaluation};
pub use reasoner::explain;
pub use report::{write_report, ReportInput};
