//! Workflow root

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::event::Event;
use super::job::Job;
use super::permission::Permissions;
use super::pos::Str;
use super::settings::{Concurrency, Defaults, Env};

#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    pub name: Option<Str>,
    /// `run-name:` shown for each run
    pub run_name: Option<Str>,
    /// Triggers in source order
    pub on: Vec<Event>,
    pub permissions: Option<Permissions>,
    pub env: Env,
    pub defaults: Option<Defaults>,
    pub concurrency: Option<Concurrency>,
    /// Job ID to job
    pub jobs: FxHashMap<String, Job>,
}

impl Workflow {
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Triggers whose canonical name is `name`
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.on.iter().filter(move |e| e.name() == name)
    }

    /// Job IDs sorted by the position of their key, i.e. in source order
    pub fn job_ids_in_source_order(&self) -> Vec<&str> {
        let mut jobs: Vec<&Job> = self.jobs.values().collect();
        jobs.sort_by_key(|j| j.id.pos);
        jobs.into_iter().map(|j| j.id.as_str()).collect()
    }

    pub fn step_count(&self) -> usize {
        self.jobs.values().map(|j| j.steps.len()).sum()
    }
}
