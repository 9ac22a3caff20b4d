//! ghwf - position-tracking AST for GitHub Actions workflow files
//!
//! ```no_run
//! use ghwf::{parse_str, ParseConfig};
//!
//! let source = std::fs::read_to_string(".github/workflows/ci.yaml").unwrap();
//! match parse_str(&source, &ParseConfig::default()) {
//!     Ok(workflow) => println!("{} jobs", workflow.jobs.len()),
//!     Err(diagnostics) => eprintln!("{}", diagnostics),
//! }
//! ```

pub mod ast;
pub mod builders;
pub mod config;
pub mod error;
pub mod parse;
pub mod yaml;

pub use ast::{Event, Exec, Job, Located, Pos, Runner, Step, Str, Workflow};
pub use builders::{JobBuilder, StepBuilder, WorkflowBuilder};
pub use config::ParseConfig;
pub use error::{BuildError, Diagnostics, FixSuggestion};
pub use parse::{parse_str, parse_workflow, WorkflowParser};
