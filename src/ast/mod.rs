//! AST Module - typed syntax tree of a GitHub Actions workflow
//!
//! Every scalar is a [`Located`] leaf carrying its source [`Pos`]. Optional
//! keys are `Option`, so an absent key never looks like an empty value.
//! Shapes that exclude each other are enums:
//! - [`Event`]: webhook, schedule, workflow_dispatch, repository_dispatch
//! - [`Exec`]: `run:` or `uses:`
//! - [`Runner`]: hosted or self-hosted
//! - [`PermissionsScope`]: blanket or per-scope
//!
//! The tree is built once by [`crate::parse`] (or [`crate::builders`]) and
//! only read afterwards.

mod container;
mod event;
mod exec;
mod job;
mod matrix;
mod permission;
mod pos;
mod runner;
mod settings;
mod step;
mod workflow;

pub use container::{Container, Credentials, Service};
pub use event::{
    DispatchInput, Event, RepositoryDispatchEvent, ScheduledEvent, WebhookEvent,
    WorkflowDispatchEvent, REPOSITORY_DISPATCH, SCHEDULE, WORKFLOW_DISPATCH,
};
pub use exec::{Exec, ExecAction, ExecKind, ExecRun, Input};
pub use job::{Job, Output};
pub use matrix::{Matrix, MatrixCombination, MatrixCombinations, MatrixRow, Strategy};
pub use permission::{PermKind, Permission, Permissions, PermissionsScope};
pub use pos::{Bool, Float, Int, Located, Pos, Str};
pub use runner::{GitHubHostedRunner, Runner, SelfHostedRunner, SELF_HOSTED_LABEL};
pub use settings::{Concurrency, Defaults, DefaultsRun, Env, EnvVar, Environment};
pub use step::Step;
pub use workflow::Workflow;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn tree_is_shareable_across_threads() {
        assert_send_sync::<Workflow>();
        assert_send_sync::<Job>();
        assert_send_sync::<Step>();
        assert_send_sync::<Event>();
    }
}
