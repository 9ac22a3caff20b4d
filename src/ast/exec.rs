//! What a step executes: a shell script or an action

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::pos::Str;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecKind {
    Action,
    Run,
}

/// Execution of a step, exactly one of `run:` or `uses:`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Exec {
    Run(ExecRun),
    Action(ExecAction),
}

impl Exec {
    pub fn kind(&self) -> ExecKind {
        match self {
            Exec::Run(_) => ExecKind::Run,
            Exec::Action(_) => ExecKind::Action,
        }
    }

    pub fn as_run(&self) -> Option<&ExecRun> {
        match self {
            Exec::Run(r) => Some(r),
            Exec::Action(_) => None,
        }
    }

    pub fn as_action(&self) -> Option<&ExecAction> {
        match self {
            Exec::Action(a) => Some(a),
            Exec::Run(_) => None,
        }
    }
}

/// `run:` step
#[derive(Debug, Clone, Serialize)]
pub struct ExecRun {
    pub run: Str,
    pub shell: Option<Str>,
    pub working_directory: Option<Str>,
}

impl ExecRun {
    pub fn new(run: Str) -> Self {
        Self {
            run,
            shell: None,
            working_directory: None,
        }
    }
}

/// One `with:` entry
#[derive(Debug, Clone, Serialize)]
pub struct Input {
    pub name: Str,
    pub value: Str,
}

/// `uses:` step
#[derive(Debug, Clone, Serialize)]
pub struct ExecAction {
    pub uses: Str,
    /// `with:` entries, keyed by exact (case-sensitive) name
    pub inputs: FxHashMap<String, Input>,
    /// `with.entrypoint`, container actions only
    pub entrypoint: Option<Str>,
    /// `with.args`, container actions only
    pub args: Option<Str>,
}

impl ExecAction {
    pub fn new(uses: Str) -> Self {
        Self {
            uses,
            inputs: FxHashMap::default(),
            entrypoint: None,
            args: None,
        }
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.get(name)
    }

    /// True for `docker://` references
    pub fn is_docker(&self) -> bool {
        self.uses.as_str().starts_with("docker://")
    }

    /// True for `./path` references inside the repository
    pub fn is_local(&self) -> bool {
        self.uses.as_str().starts_with("./")
    }
}
