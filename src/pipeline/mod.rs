//! Processing stages of a watch run.
//!
//! - `detect`: per-URL change classification and hash verification
//! - `archive`: dated snapshot rotation for changed documents
//! - `diff` (+ `html_diff`, `pdf_diff`): dated diff artifact rendering
//! - `publish`: commit and push of produced artifacts
//! - `run`: the orchestrator sequencing one full run

pub mod archive;
pub mod detect;
pub mod diff;
pub mod html_diff;
pub mod pdf_diff;
pub mod publish;
pub mod run;

pub use detect::{ChangeDetector, Classification};
pub use diff::DiffGenerator;
pub use publish::{DiffPublisher, GitPublisher};
pub use run::run_watch;
