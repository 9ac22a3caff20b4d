//! AST construction from decoded YAML nodes
//!
//! [`WorkflowParser`] walks a [`YamlNode`] tree depth-first and builds the
//! typed [`Workflow`]. Errors are collected and walking continues, so one
//! document yields every diagnostic at once. A tree is returned only when no
//! error was seen; otherwise the caller gets the full error list and nothing
//! else.
//!
//! Submodules extend the parser per section:
//! - `event`: the `on:` section
//! - `job`: jobs, runners, containers, strategy
//! - `step`: steps and their exec

mod event;
mod job;
mod step;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::{
    Bool, Concurrency, Defaults, DefaultsRun, Env, EnvVar, Float, Int, PermKind, Permission,
    Permissions, Pos, Str, Workflow,
};
use crate::config::ParseConfig;
use crate::error::{BuildError, Diagnostics};
use crate::yaml::{self, NodeKind, YamlNode};

const WORKFLOW_KEYS: &[&str] = &[
    "name",
    "run-name",
    "on",
    "permissions",
    "env",
    "defaults",
    "concurrency",
    "jobs",
];

/// Decode `source` and construct its workflow
pub fn parse_str(source: &str, config: &ParseConfig) -> Result<Workflow, Diagnostics> {
    let root = yaml::decode(source)?;
    parse_workflow(&root, config)
}

/// Construct a workflow from a decoded document
pub fn parse_workflow(root: &YamlNode, config: &ParseConfig) -> Result<Workflow, Diagnostics> {
    WorkflowParser::new(config).parse(root)
}

/// A mapping entry with a scalar key
pub(crate) struct Entry<'n> {
    pub key: Str,
    pub value: &'n YamlNode,
}

pub struct WorkflowParser<'c> {
    config: &'c ParseConfig,
    diagnostics: Diagnostics,
    /// Errors seen, including those dropped by the error budget
    seen: usize,
}

impl<'c> WorkflowParser<'c> {
    pub fn new(config: &'c ParseConfig) -> Self {
        Self {
            config,
            diagnostics: Diagnostics::new(),
            seen: 0,
        }
    }

    pub fn parse(mut self, root: &YamlNode) -> Result<Workflow, Diagnostics> {
        let workflow = self.workflow(root);
        match workflow {
            Some(w) if self.seen == 0 => {
                debug!(
                    events = w.on.len(),
                    jobs = w.jobs.len(),
                    steps = w.step_count(),
                    "workflow constructed"
                );
                Ok(w)
            }
            _ => {
                debug!(errors = self.seen, "workflow construction failed");
                self.diagnostics.sort();
                Err(self.diagnostics)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Error recording
    // ─────────────────────────────────────────────────────────────

    fn error(&mut self, error: BuildError) {
        if self.config.accepts_more_errors(self.diagnostics.len()) {
            debug!(code = error.code(), pos = %error.pos(), "{}", error);
            self.diagnostics.push(error);
        }
        self.seen += 1;
    }

    fn shape(&mut self, node: &YamlNode, what: &str, expected: &str) {
        self.error(BuildError::ShapeMismatch {
            what: what.to_string(),
            expected: expected.to_string(),
            found: node.describe(),
            pos: node.pos,
        });
    }

    fn unexpected(&mut self, key: &Str, section: &str, expected: &[&str]) {
        if self.config.allow_unknown_keys {
            debug!(key = %key, section, "ignoring unknown key");
            return;
        }
        let expected = expected
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ");
        self.error(BuildError::UnexpectedKey {
            section: section.to_string(),
            key: key.value.clone(),
            expected,
            pos: key.pos,
        });
    }

    fn missing(&mut self, field: &str, section: &str, pos: Pos) {
        self.error(BuildError::MissingField {
            section: section.to_string(),
            field: field.to_string(),
            pos,
        });
    }

    /// Report a missing required key. Keys that were present but failed to
    /// parse are already reported.
    fn require<T>(
        &mut self,
        value: Option<T>,
        entries: &[Entry<'_>],
        field: &str,
        section: &str,
        pos: Pos,
    ) -> Option<T> {
        if value.is_none() && !entries.iter().any(|e| e.key == field) {
            self.missing(field, section, pos);
        }
        value
    }

    // ─────────────────────────────────────────────────────────────
    // Mappings
    // ─────────────────────────────────────────────────────────────

    /// All entries of a mapping in source order, duplicates included
    fn entries<'n>(&mut self, node: &'n YamlNode, what: &str) -> Option<Vec<Entry<'n>>> {
        let Some(pairs) = node.as_mapping() else {
            self.shape(node, what, "a mapping");
            return None;
        };
        let mut entries = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            match k.as_str_leaf() {
                Some(key) => entries.push(Entry { key, value: v }),
                None => self.shape(k, &format!("key in {}", what), "a string"),
            }
        }
        Some(entries)
    }

    /// Keep the first entry of each key and report the others, except keys
    /// in `reported` whose conflict was already diagnosed
    fn dedupe<'n>(
        &mut self,
        entries: Vec<Entry<'n>>,
        section: &str,
        reported: &[&str],
    ) -> Vec<Entry<'n>> {
        let mut first_seen: FxHashMap<String, Pos> = FxHashMap::default();
        let mut unique = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(&first) = first_seen.get(entry.key.as_str()) {
                if !reported.contains(&entry.key.as_str()) {
                    self.error(BuildError::DuplicateKey {
                        section: section.to_string(),
                        key: entry.key.value.clone(),
                        first,
                        pos: entry.key.pos,
                    });
                }
                continue;
            }
            first_seen.insert(entry.key.value.clone(), entry.key.pos);
            unique.push(entry);
        }
        unique
    }

    fn unique_entries<'n>(&mut self, node: &'n YamlNode, section: &str) -> Option<Vec<Entry<'n>>> {
        let entries = self.entries(node, section)?;
        Some(self.dedupe(entries, section, &[]))
    }

    /// Entries of a workflow or job mapping
    ///
    /// Repeated `permissions:` keys mixing the blanket and per-scope forms
    /// are reported as mutually exclusive rather than duplicated.
    fn section_entries<'n>(&mut self, node: &'n YamlNode, section: &str) -> Option<Vec<Entry<'n>>> {
        let entries = self.entries(node, section)?;
        let conflict = self.check_permission_forms(&entries, section);
        let reported: &[&str] = if conflict { &["permissions"] } else { &[] };
        Some(self.dedupe(entries, section, reported))
    }

    fn check_permission_forms(&mut self, entries: &[Entry<'_>], section: &str) -> bool {
        let mut blanket: Option<&Entry<'_>> = None;
        let mut scoped: Option<&Entry<'_>> = None;
        for entry in entries.iter().filter(|e| e.key == "permissions") {
            match entry.value.kind {
                NodeKind::Scalar { .. } => blanket = blanket.or(Some(entry)),
                NodeKind::Mapping(_) => scoped = scoped.or(Some(entry)),
                _ => {}
            }
        }
        let (Some(blanket), Some(scoped)) = (blanket, scoped) else {
            return false;
        };
        let later = blanket.key.pos.max(scoped.key.pos);
        self.error(BuildError::MutuallyExclusive {
            section: section.to_string(),
            first: format!(
                "blanket permissions \"{}\"",
                blanket.value.as_scalar().unwrap_or_default()
            ),
            second: "per-scope permissions".to_string(),
            pos: later,
        });
        true
    }

    // ─────────────────────────────────────────────────────────────
    // Scalars
    // ─────────────────────────────────────────────────────────────

    fn string(&mut self, node: &YamlNode, what: &str) -> Option<Str> {
        let leaf = node.as_str_leaf();
        if leaf.is_none() {
            self.shape(node, what, "a string");
        }
        leaf
    }

    fn boolean(&mut self, node: &YamlNode, what: &str) -> Option<Bool> {
        match node.as_plain_scalar() {
            Some("true" | "True" | "TRUE") => Some(Bool::new(true, node.pos)),
            Some("false" | "False" | "FALSE") => Some(Bool::new(false, node.pos)),
            _ => {
                self.shape(node, what, "a boolean (true or false)");
                None
            }
        }
    }

    fn int(&mut self, node: &YamlNode, what: &str) -> Option<Int> {
        match node.as_plain_scalar().and_then(|s| s.parse::<i64>().ok()) {
            Some(v) => Some(Int::new(v, node.pos)),
            None => {
                self.shape(node, what, "an integer");
                None
            }
        }
    }

    fn float(&mut self, node: &YamlNode, what: &str) -> Option<Float> {
        match node
            .as_plain_scalar()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
        {
            Some(v) => Some(Float::new(v, node.pos)),
            None => {
                self.shape(node, what, "a number");
                None
            }
        }
    }

    /// Sequence of strings, in source order
    fn strings(&mut self, node: &YamlNode, what: &str) -> Option<Vec<Str>> {
        let Some(items) = node.as_sequence() else {
            self.shape(node, what, "a sequence of strings");
            return None;
        };
        let element = format!("element of {}", what);
        Some(
            items
                .iter()
                .filter_map(|item| self.string(item, &element))
                .collect(),
        )
    }

    /// A single string, or a sequence of them
    fn string_or_strings(&mut self, node: &YamlNode, what: &str) -> Option<Vec<Str>> {
        match &node.kind {
            NodeKind::Scalar { .. } => node.as_str_leaf().map(|s| vec![s]),
            NodeKind::Sequence(_) => self.strings(node, what),
            _ => {
                self.shape(node, what, "a string or a sequence of strings");
                None
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Blocks shared by workflows and jobs
    // ─────────────────────────────────────────────────────────────

    fn env(&mut self, node: &YamlNode, section: &str) -> Option<Env> {
        let entries = self.unique_entries(node, section)?;
        let mut env = Env::default();
        for entry in entries {
            let what = format!("value of env var \"{}\" in {}", entry.key, section);
            if let Some(value) = self.string(entry.value, &what) {
                env.insert(
                    entry.key.value.clone(),
                    EnvVar {
                        name: entry.key,
                        value,
                    },
                );
            }
        }
        Some(env)
    }

    fn permissions(&mut self, node: &YamlNode, section: &str) -> Option<Permissions> {
        let what = format!("\"permissions\" in {}", section);
        match &node.kind {
            NodeKind::Scalar { value, .. } => match PermKind::from_blanket_value(value) {
                Some(kind) => Some(Permissions::all(kind, node.pos)),
                None => {
                    self.shape(node, &what, "\"read-all\", \"write-all\" or a mapping of scopes");
                    None
                }
            },
            NodeKind::Mapping(_) => {
                let entries = self.unique_entries(node, &what)?;
                let mut scopes = FxHashMap::default();
                for entry in entries {
                    let kind = entry
                        .value
                        .as_scalar()
                        .and_then(PermKind::from_scope_value);
                    let Some(kind) = kind else {
                        let scope = format!("permission of scope \"{}\"", entry.key);
                        self.shape(entry.value, &scope, "\"read\", \"write\" or \"none\"");
                        continue;
                    };
                    scopes.insert(
                        entry.key.value.clone(),
                        Permission {
                            pos: entry.key.pos,
                            name: Some(entry.key),
                            kind,
                        },
                    );
                }
                Some(Permissions::scoped(scopes, node.pos))
            }
            _ => {
                self.shape(node, &what, "\"read-all\", \"write-all\" or a mapping of scopes");
                None
            }
        }
    }

    fn defaults(&mut self, node: &YamlNode, section: &str) -> Option<Defaults> {
        let what = format!("\"defaults\" in {}", section);
        let entries = self.unique_entries(node, &what)?;
        let mut run = None;
        for entry in entries {
            match entry.key.as_str() {
                "run" => run = self.defaults_run(entry.value),
                _ => self.unexpected(&entry.key, &what, &["run"]),
            }
        }
        Some(Defaults {
            run,
            pos: node.pos,
        })
    }

    fn defaults_run(&mut self, node: &YamlNode) -> Option<DefaultsRun> {
        const SECTION: &str = "\"defaults.run\" section";
        let entries = self.unique_entries(node, SECTION)?;
        let mut shell = None;
        let mut working_directory = None;
        for entry in entries {
            match entry.key.as_str() {
                "shell" => shell = self.string(entry.value, "\"shell\" in defaults"),
                "working-directory" => {
                    working_directory = self.string(entry.value, "\"working-directory\" in defaults")
                }
                _ => self.unexpected(&entry.key, SECTION, &["shell", "working-directory"]),
            }
        }
        Some(DefaultsRun {
            shell,
            working_directory,
            pos: node.pos,
        })
    }

    fn concurrency(&mut self, node: &YamlNode, section: &str) -> Option<Concurrency> {
        let what = format!("\"concurrency\" in {}", section);
        if let Some(group) = node.as_str_leaf() {
            return Some(Concurrency {
                group,
                cancel_in_progress: None,
                pos: node.pos,
            });
        }
        let entries = self.unique_entries(node, &what)?;
        let mut group = None;
        let mut cancel_in_progress = None;
        for entry in &entries {
            match entry.key.as_str() {
                "group" => group = self.string(entry.value, "\"group\" in concurrency"),
                "cancel-in-progress" => {
                    cancel_in_progress =
                        self.boolean(entry.value, "\"cancel-in-progress\" in concurrency")
                }
                _ => self.unexpected(&entry.key, &what, &["group", "cancel-in-progress"]),
            }
        }
        let group = self.require(group, &entries, "group", &what, node.pos)?;
        Some(Concurrency {
            group,
            cancel_in_progress,
            pos: node.pos,
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Root
    // ─────────────────────────────────────────────────────────────

    fn workflow(&mut self, root: &YamlNode) -> Option<Workflow> {
        const SECTION: &str = "workflow";
        let entries = self.section_entries(root, SECTION)?;

        let mut name = None;
        let mut run_name = None;
        let mut on = None;
        let mut permissions = None;
        let mut env = None;
        let mut defaults = None;
        let mut concurrency = None;
        let mut jobs = None;

        for entry in &entries {
            let value = entry.value;
            match entry.key.as_str() {
                "name" => name = self.string(value, "\"name\" section"),
                "run-name" => run_name = self.string(value, "\"run-name\" section"),
                "on" => on = self.events(value),
                "permissions" => permissions = self.permissions(value, SECTION),
                "env" => env = self.env(value, "\"env\" section"),
                "defaults" => defaults = self.defaults(value, SECTION),
                "concurrency" => concurrency = self.concurrency(value, SECTION),
                "jobs" => jobs = self.jobs(value),
                _ => self.unexpected(&entry.key, SECTION, WORKFLOW_KEYS),
            }
        }

        let on = self.require(on, &entries, "on", SECTION, root.pos);
        let jobs = self.require(jobs, &entries, "jobs", SECTION, root.pos);

        Some(Workflow {
            name,
            run_name,
            on: on?,
            permissions,
            env: env.unwrap_or_default(),
            defaults,
            concurrency,
            jobs: jobs?,
        })
    }
}
