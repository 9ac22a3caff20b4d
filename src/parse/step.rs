//! `steps:` of a job

use rustc_hash::FxHashMap;

use super::{Entry, WorkflowParser};
use crate::ast::{Exec, ExecAction, ExecRun, Input, Step, Str};
use crate::error::BuildError;
use crate::yaml::YamlNode;

const STEP_KEYS: &[&str] = &[
    "id",
    "if",
    "name",
    "run",
    "uses",
    "with",
    "shell",
    "working-directory",
    "env",
    "continue-on-error",
    "timeout-minutes",
];

impl WorkflowParser<'_> {
    pub(super) fn steps(&mut self, node: &YamlNode, section: &str) -> Option<Vec<Step>> {
        let what = format!("\"steps\" in {}", section);
        let Some(items) = node.as_sequence() else {
            self.shape(node, &what, "a sequence of steps");
            return None;
        };
        let steps = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.step(item, &format!("step {} of {}", i + 1, section)))
            .collect();
        Some(steps)
    }

    fn step(&mut self, node: &YamlNode, section: &str) -> Option<Step> {
        let entries = self.unique_entries(node, section)?;

        let mut id = None;
        let mut if_cond = None;
        let mut name = None;
        let mut run: Option<(Str, Str)> = None;
        let mut uses: Option<(Str, Str)> = None;
        let mut with: Option<(Str, &YamlNode)> = None;
        let mut shell: Option<(Str, Str)> = None;
        let mut working_directory: Option<(Str, Str)> = None;
        let mut env = None;
        let mut continue_on_error = None;
        let mut timeout_minutes = None;

        for entry in &entries {
            let value = entry.value;
            let what = format!("\"{}\" in {}", entry.key, section);
            let key = || entry.key.clone();
            match entry.key.as_str() {
                "id" => id = self.string(value, &what),
                "if" => if_cond = self.string(value, &what),
                "name" => name = self.string(value, &what),
                "run" => run = self.string(value, &what).map(|v| (key(), v)),
                "uses" => uses = self.string(value, &what).map(|v| (key(), v)),
                "with" => with = Some((key(), value)),
                "shell" => shell = self.string(value, &what).map(|v| (key(), v)),
                "working-directory" => {
                    working_directory = self.string(value, &what).map(|v| (key(), v))
                }
                "env" => env = self.env(value, &what),
                "continue-on-error" => continue_on_error = self.boolean(value, &what),
                "timeout-minutes" => timeout_minutes = self.float(value, &what),
                _ => self.unexpected(&entry.key, section, STEP_KEYS),
            }
        }

        let exec = match (run, uses) {
            (Some((run_key, _)), Some((uses_key, _))) => {
                let (first, second) = if run_key.pos < uses_key.pos {
                    (run_key, uses_key)
                } else {
                    (uses_key, run_key)
                };
                self.exclusive(section, &first, &second);
                None
            }
            (Some((run_key, run)), None) => {
                if let Some((with_key, _)) = &with {
                    self.exclusive(section, &run_key, with_key);
                }
                let mut exec = ExecRun::new(run);
                exec.shell = shell.map(|(_, v)| v);
                exec.working_directory = working_directory.map(|(_, v)| v);
                Some(Exec::Run(exec))
            }
            (None, Some((uses_key, uses))) => {
                for (key, _) in [&shell, &working_directory].into_iter().flatten() {
                    self.exclusive(section, &uses_key, key);
                }
                let mut exec = ExecAction::new(uses);
                if let Some((_, with)) = with {
                    self.action_inputs(&mut exec, with, section);
                }
                Some(Exec::Action(exec))
            }
            (None, None) => {
                if !has_any(&entries, &["run", "uses"]) {
                    self.missing("run or uses", section, node.pos);
                }
                None
            }
        };

        let mut step = Step::new(exec?, node.pos);
        step.id = id;
        step.if_cond = if_cond;
        step.name = name;
        step.env = env.unwrap_or_default();
        step.continue_on_error = continue_on_error;
        step.timeout_minutes = timeout_minutes;
        Some(step)
    }

    /// Report `second` as conflicting with the earlier `first`
    fn exclusive(&mut self, section: &str, first: &Str, second: &Str) {
        self.error(BuildError::MutuallyExclusive {
            section: section.to_string(),
            first: format!("\"{}\"", first),
            second: format!("\"{}\"", second),
            pos: second.pos,
        });
    }

    /// `with:` of an action step; `entrypoint` and `args` are lifted out
    fn action_inputs(&mut self, exec: &mut ExecAction, node: &YamlNode, section: &str) {
        let what = format!("\"with\" in {}", section);
        let Some(entries) = self.unique_entries(node, &what) else {
            return;
        };
        let mut inputs = FxHashMap::default();
        for entry in entries {
            let of = format!("input \"{}\" in {}", entry.key, section);
            let Some(value) = self.string(entry.value, &of) else {
                continue;
            };
            match entry.key.as_str() {
                "entrypoint" => exec.entrypoint = Some(value),
                "args" => exec.args = Some(value),
                _ => {
                    inputs.insert(
                        entry.key.value.clone(),
                        Input {
                            name: entry.key,
                            value,
                        },
                    );
                }
            }
        }
        exec.inputs = inputs;
    }
}

fn has_any(entries: &[Entry<'_>], keys: &[&str]) -> bool {
    entries.iter().any(|e| keys.contains(&e.key.as_str()))
}
