//! `jobs.<id>`

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::container::{Container, Service};
use super::matrix::Strategy;
use super::permission::Permissions;
use super::pos::{Bool, Float, Pos, Str};
use super::runner::Runner;
use super::settings::{Concurrency, Defaults, Env, Environment};
use super::step::Step;

/// One `outputs:` entry
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    pub name: Str,
    pub value: Str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Map key under `jobs:`
    pub id: Str,
    pub name: Option<Str>,
    /// Job IDs this job waits for, in source order
    pub needs: Vec<Str>,
    pub runs_on: Runner,
    pub permissions: Option<Permissions>,
    pub environment: Option<Environment>,
    pub concurrency: Option<Concurrency>,
    pub outputs: FxHashMap<String, Output>,
    pub env: Env,
    pub defaults: Option<Defaults>,
    /// `if:` as a raw expression string
    pub if_cond: Option<Str>,
    /// Execution order
    pub steps: Vec<Step>,
    pub timeout_minutes: Option<Float>,
    pub strategy: Option<Strategy>,
    pub continue_on_error: Option<Bool>,
    pub container: Option<Container>,
    pub services: FxHashMap<String, Service>,
    pub pos: Pos,
}

impl Job {
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps
            .iter()
            .find(|s| s.id.as_ref().is_some_and(|sid| sid.as_str() == id))
    }

    pub fn needs_ids(&self) -> impl Iterator<Item = &str> {
        self.needs.iter().map(Str::as_str)
    }
}
