//! Blocks shared by workflows and jobs: env, defaults, concurrency, environment

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::pos::{Bool, Pos, Str};

/// One `env:` entry
#[derive(Debug, Clone, Serialize)]
pub struct EnvVar {
    pub name: Str,
    pub value: Str,
}

/// `env:` mapping keyed by exact variable name
pub type Env = FxHashMap<String, EnvVar>;

/// `defaults.run:`
#[derive(Debug, Clone, Serialize)]
pub struct DefaultsRun {
    pub shell: Option<Str>,
    pub working_directory: Option<Str>,
    pub pos: Pos,
}

/// `defaults:`
#[derive(Debug, Clone, Serialize)]
pub struct Defaults {
    pub run: Option<DefaultsRun>,
    pub pos: Pos,
}

/// `concurrency:`, either `concurrency: group` or the mapping form
#[derive(Debug, Clone, Serialize)]
pub struct Concurrency {
    pub group: Str,
    pub cancel_in_progress: Option<Bool>,
    pub pos: Pos,
}

/// `environment:` deployment target of a job
#[derive(Debug, Clone, Serialize)]
pub struct Environment {
    pub name: Str,
    /// `url:`, mapped to `environment_url` in the deployments API
    pub url: Option<Str>,
    pub pos: Pos,
}
