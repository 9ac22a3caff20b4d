//! Builder patterns for programmatic workflow construction
//!
//! Mandatory fields are constructor arguments, so a built node is always
//! complete. Inserts into keyed collections fail with
//! [`BuildError::DuplicateKey`] when the key is already present, the same
//! error the parser reports for a repeated YAML key.

use rustc_hash::FxHashMap;

use crate::ast::{
    Bool, Concurrency, Container, Defaults, EnvVar, Environment, Event, Exec, ExecAction,
    ExecRun, Float, Input, Job, Output, Permissions, Pos, Runner, Service, Step, Str, Strategy,
    Workflow,
};
use crate::error::BuildError;

/// Insert `value` under `key` unless the key is taken
fn insert_unique<V>(
    map: &mut FxHashMap<String, V>,
    key: &Str,
    value: V,
    section: &str,
    first_pos: impl Fn(&V) -> Pos,
) -> Result<(), BuildError> {
    if let Some(existing) = map.get(key.as_str()) {
        return Err(BuildError::DuplicateKey {
            section: section.to_string(),
            key: key.value.clone(),
            first: first_pos(existing),
            pos: key.pos,
        });
    }
    map.insert(key.value.clone(), value);
    Ok(())
}

// ============================================================================
// WORKFLOW BUILDER
// ============================================================================

/// Fluent builder for [`Workflow`]
pub struct WorkflowBuilder {
    workflow: Workflow,
}

impl WorkflowBuilder {
    /// A workflow needs at least one trigger
    pub fn new(trigger: Event) -> Self {
        Self {
            workflow: Workflow {
                name: None,
                run_name: None,
                on: vec![trigger],
                permissions: None,
                env: Default::default(),
                defaults: None,
                concurrency: None,
                jobs: FxHashMap::default(),
            },
        }
    }

    pub fn name(mut self, name: Str) -> Self {
        self.workflow.name = Some(name);
        self
    }

    pub fn run_name(mut self, run_name: Str) -> Self {
        self.workflow.run_name = Some(run_name);
        self
    }

    /// Add a trigger after the existing ones
    pub fn on(mut self, trigger: Event) -> Self {
        self.workflow.on.push(trigger);
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.workflow.permissions = Some(permissions);
        self
    }

    pub fn env_var(mut self, name: Str, value: Str) -> Result<Self, BuildError> {
        insert_unique(
            &mut self.workflow.env,
            &name.clone(),
            EnvVar { name, value },
            "\"env\" section",
            |v| v.name.pos,
        )?;
        Ok(self)
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.workflow.defaults = Some(defaults);
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.workflow.concurrency = Some(concurrency);
        self
    }

    /// Add a job; its ID must be unused
    pub fn job(mut self, job: Job) -> Result<Self, BuildError> {
        let id = job.id.clone();
        insert_unique(&mut self.workflow.jobs, &id, job, "\"jobs\" section", |j| {
            j.id.pos
        })?;
        Ok(self)
    }

    /// Add a job using JobBuilder
    pub fn with_job<F>(self, id: Str, runs_on: Runner, f: F) -> Result<Self, BuildError>
    where
        F: FnOnce(JobBuilder) -> Result<JobBuilder, BuildError>,
    {
        let job = f(JobBuilder::new(id, runs_on))?.build();
        self.job(job)
    }

    pub fn build(self) -> Workflow {
        self.workflow
    }
}

// ============================================================================
// JOB BUILDER
// ============================================================================

/// Fluent builder for [`Job`]
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(id: Str, runs_on: Runner) -> Self {
        Self {
            job: Job {
                pos: id.pos,
                id,
                name: None,
                needs: Vec::new(),
                runs_on,
                permissions: None,
                environment: None,
                concurrency: None,
                outputs: FxHashMap::default(),
                env: Default::default(),
                defaults: None,
                if_cond: None,
                steps: Vec::new(),
                timeout_minutes: None,
                strategy: None,
                continue_on_error: None,
                container: None,
                services: FxHashMap::default(),
            },
        }
    }

    fn section(&self) -> String {
        format!("job \"{}\"", self.job.id)
    }

    pub fn name(mut self, name: Str) -> Self {
        self.job.name = Some(name);
        self
    }

    /// Depend on another job
    pub fn need(mut self, id: Str) -> Self {
        self.job.needs.push(id);
        self
    }

    pub fn if_cond(mut self, condition: Str) -> Self {
        self.job.if_cond = Some(condition);
        self
    }

    /// Append a step; steps run in insertion order
    pub fn step(mut self, step: Step) -> Self {
        self.job.steps.push(step);
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.job.permissions = Some(permissions);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.job.environment = Some(environment);
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.job.concurrency = Some(concurrency);
        self
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.job.defaults = Some(defaults);
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.job.strategy = Some(strategy);
        self
    }

    pub fn timeout_minutes(mut self, minutes: Float) -> Self {
        self.job.timeout_minutes = Some(minutes);
        self
    }

    pub fn continue_on_error(mut self, flag: Bool) -> Self {
        self.job.continue_on_error = Some(flag);
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.job.container = Some(container);
        self
    }

    pub fn output(mut self, name: Str, value: Str) -> Result<Self, BuildError> {
        let section = format!("\"outputs\" of {}", self.section());
        insert_unique(
            &mut self.job.outputs,
            &name.clone(),
            Output { name, value },
            &section,
            |o| o.name.pos,
        )?;
        Ok(self)
    }

    pub fn env_var(mut self, name: Str, value: Str) -> Result<Self, BuildError> {
        let section = format!("\"env\" of {}", self.section());
        insert_unique(
            &mut self.job.env,
            &name.clone(),
            EnvVar { name, value },
            &section,
            |v| v.name.pos,
        )?;
        Ok(self)
    }

    pub fn service(mut self, service: Service) -> Result<Self, BuildError> {
        let section = format!("\"services\" of {}", self.section());
        let name = service.name.clone();
        insert_unique(&mut self.job.services, &name, service, &section, |s| {
            s.name.pos
        })?;
        Ok(self)
    }

    pub fn build(self) -> Job {
        self.job
    }
}

// ============================================================================
// STEP BUILDER
// ============================================================================

/// Fluent builder for [`Step`]
///
/// The exec variant is chosen by the constructor. Setters that only apply to
/// the other variant fail with [`BuildError::MutuallyExclusive`].
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    /// Step running a shell script
    pub fn run(script: Str, pos: Pos) -> Self {
        Self {
            step: Step::new(Exec::Run(ExecRun::new(script)), pos),
        }
    }

    /// Step invoking an action
    pub fn uses(action: Str, pos: Pos) -> Self {
        Self {
            step: Step::new(Exec::Action(ExecAction::new(action)), pos),
        }
    }

    fn conflict(&self, key: &str, pos: Pos) -> BuildError {
        let (first, section) = match &self.step.exec {
            Exec::Run(_) => ("\"run\"", "run step"),
            Exec::Action(_) => ("\"uses\"", "action step"),
        };
        BuildError::MutuallyExclusive {
            section: section.to_string(),
            first: first.to_string(),
            second: format!("\"{}\"", key),
            pos,
        }
    }

    pub fn id(mut self, id: Str) -> Self {
        self.step.id = Some(id);
        self
    }

    pub fn name(mut self, name: Str) -> Self {
        self.step.name = Some(name);
        self
    }

    pub fn if_cond(mut self, condition: Str) -> Self {
        self.step.if_cond = Some(condition);
        self
    }

    pub fn continue_on_error(mut self, flag: Bool) -> Self {
        self.step.continue_on_error = Some(flag);
        self
    }

    pub fn timeout_minutes(mut self, minutes: Float) -> Self {
        self.step.timeout_minutes = Some(minutes);
        self
    }

    pub fn env_var(mut self, name: Str, value: Str) -> Result<Self, BuildError> {
        insert_unique(
            &mut self.step.env,
            &name.clone(),
            EnvVar { name, value },
            "\"env\" of step",
            |v| v.name.pos,
        )?;
        Ok(self)
    }

    pub fn shell(mut self, shell: Str) -> Result<Self, BuildError> {
        match &mut self.step.exec {
            Exec::Run(run) => run.shell = Some(shell),
            _ => return Err(self.conflict("shell", shell.pos)),
        }
        Ok(self)
    }

    pub fn working_directory(mut self, dir: Str) -> Result<Self, BuildError> {
        match &mut self.step.exec {
            Exec::Run(run) => run.working_directory = Some(dir),
            _ => return Err(self.conflict("working-directory", dir.pos)),
        }
        Ok(self)
    }

    /// Add a `with:` input to an action step
    pub fn input(mut self, name: Str, value: Str) -> Result<Self, BuildError> {
        match &mut self.step.exec {
            Exec::Action(action) => insert_unique(
                &mut action.inputs,
                &name.clone(),
                Input { name, value },
                "\"with\" of step",
                |i| i.name.pos,
            )?,
            _ => return Err(self.conflict("with", name.pos)),
        }
        Ok(self)
    }

    pub fn build(self) -> Step {
        self.step
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExecKind, GitHubHostedRunner, WebhookEvent};
    use crate::error::FixSuggestion;

    fn s(v: &str, line: usize) -> Str {
        Str::new(v.to_string(), Pos::new(line, 1))
    }

    fn push() -> Event {
        Event::Webhook(WebhookEvent::new(s("push", 1), Pos::new(1, 1)))
    }

    fn ubuntu() -> Runner {
        Runner::GitHubHosted(GitHubHostedRunner {
            label: s("ubuntu-latest", 1),
            pos: Pos::new(1, 1),
        })
    }

    #[test]
    fn test_workflow_builder() {
        let workflow = WorkflowBuilder::new(push())
            .name(s("CI", 1))
            .env_var(s("RUST_LOG", 2), s("debug", 2))
            .unwrap()
            .with_job(s("build", 3), ubuntu(), |job| {
                Ok(job
                    .step(StepBuilder::uses(s("actions/checkout@v4", 4), Pos::new(4, 1)).build())
                    .step(StepBuilder::run(s("cargo build", 5), Pos::new(5, 1)).build()))
            })
            .unwrap()
            .build();

        assert_eq!(workflow.name.clone().unwrap(), "CI");
        assert_eq!(workflow.on[0].name(), "push");
        assert_eq!(workflow.env["RUST_LOG"].value, "debug");
        let build = workflow.job("build").unwrap();
        let kinds: Vec<ExecKind> = build.steps.iter().map(Step::kind).collect();
        assert_eq!(kinds, [ExecKind::Action, ExecKind::Run]);
    }

    #[test]
    fn test_duplicate_job_id() {
        let first = JobBuilder::new(s("build", 3), ubuntu()).build();
        let second = JobBuilder::new(s("build", 9), ubuntu()).build();
        let err = WorkflowBuilder::new(push())
            .job(first)
            .unwrap()
            .job(second)
            .err()
            .unwrap();
        assert_eq!(err.code(), "GHWF-004");
        assert_eq!(err.pos().line, 9);
        match err {
            BuildError::DuplicateKey { first, .. } => assert_eq!(first.line, 3),
            other => panic!("expected duplicate key, got {:?}", other),
        }
    }

    #[test]
    fn test_job_builder_keyed_inserts() {
        let job = JobBuilder::new(s("deploy", 1), ubuntu())
            .need(s("build", 2))
            .output(s("url", 3), s("${{ steps.d.outputs.url }}", 3))
            .unwrap()
            .env_var(s("MODE", 4), s("prod", 4))
            .unwrap()
            .build();
        assert_eq!(job.needs_ids().collect::<Vec<_>>(), ["build"]);
        assert_eq!(job.outputs["url"].value, "${{ steps.d.outputs.url }}");

        let err = JobBuilder::new(s("deploy", 1), ubuntu())
            .env_var(s("MODE", 4), s("a", 4))
            .unwrap()
            .env_var(s("MODE", 5), s("b", 5))
            .err()
            .unwrap();
        assert!(err.to_string().contains("job \"deploy\""));
        assert!(err.fix_suggestion().is_some());
    }

    #[test]
    fn test_step_builder_exclusivity() {
        let step = StepBuilder::run(s("make", 1), Pos::new(1, 1))
            .shell(s("bash", 2))
            .unwrap()
            .working_directory(s("src", 3))
            .unwrap()
            .build();
        let run = step.exec.as_run().unwrap();
        assert_eq!(run.shell.as_ref().unwrap(), "bash");

        let err = StepBuilder::run(s("make", 1), Pos::new(1, 1))
            .input(s("token", 2), s("x", 2))
            .err()
            .unwrap();
        assert_eq!(err.code(), "GHWF-002");

        let err = StepBuilder::uses(s("actions/cache@v4", 1), Pos::new(1, 1))
            .shell(s("bash", 2))
            .err()
            .unwrap();
        assert_eq!(err.code(), "GHWF-002");
        assert_eq!(err.pos().line, 2);
    }

    #[test]
    fn test_step_builder_inputs() {
        let step = StepBuilder::uses(s("actions/cache@v4", 1), Pos::new(1, 1))
            .input(s("path", 2), s("target", 2))
            .unwrap()
            .id(s("cache", 3))
            .build();
        let action = step.exec.as_action().unwrap();
        assert_eq!(action.input("path").unwrap().value, "target");
        assert!(step.if_cond.is_none());

        let err = StepBuilder::uses(s("actions/cache@v4", 1), Pos::new(1, 1))
            .input(s("path", 2), s("a", 2))
            .unwrap()
            .input(s("path", 3), s("b", 3))
            .err()
            .unwrap();
        assert_eq!(err.code(), "GHWF-004");
    }
}
