//! `on:` section
//!
//! Three spellings are accepted: `on: push`, `on: [push, pull_request]` and
//! the mapping form with per-event configuration.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::WorkflowParser;
use crate::ast::{
    DispatchInput, Event, Pos, RepositoryDispatchEvent, ScheduledEvent, Str, WebhookEvent,
    WorkflowDispatchEvent, REPOSITORY_DISPATCH, SCHEDULE, WORKFLOW_DISPATCH,
};
use crate::error::BuildError;
use crate::yaml::{NodeKind, YamlNode};

const SECTION: &str = "\"on\" section";

/// Webhook events that may appear under `on:`
pub static WEBHOOK_EVENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "branch_protection_rule",
        "check_run",
        "check_suite",
        "create",
        "delete",
        "deployment",
        "deployment_status",
        "discussion",
        "discussion_comment",
        "fork",
        "gollum",
        "issue_comment",
        "issues",
        "label",
        "merge_group",
        "milestone",
        "page_build",
        "project",
        "project_card",
        "project_column",
        "public",
        "pull_request",
        "pull_request_review",
        "pull_request_review_comment",
        "pull_request_target",
        "push",
        "registry_package",
        "release",
        "status",
        "watch",
        "workflow_call",
        "workflow_run",
    ]
    .into_iter()
    .collect()
});

const WEBHOOK_KEYS: &[&str] = &[
    "types",
    "branches",
    "branches-ignore",
    "tags",
    "tags-ignore",
    "paths",
    "paths-ignore",
    "workflows",
];

const DISPATCH_INPUT_KEYS: &[&str] = &["description", "required", "default", "type", "options"];

impl WorkflowParser<'_> {
    pub(super) fn events(&mut self, node: &YamlNode) -> Option<Vec<Event>> {
        match &node.kind {
            NodeKind::Scalar { .. } => {
                let hook = node.as_str_leaf()?;
                self.event(hook, None).map(|e| vec![e])
            }
            NodeKind::Sequence(items) => {
                let mut events = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str_leaf() {
                        Some(hook) => events.extend(self.event(hook, None)),
                        None => self.shape(item, &format!("element of {}", SECTION), "an event name"),
                    }
                }
                Some(events)
            }
            _ => {
                let entries = self.unique_entries(node, SECTION)?;
                let mut events = Vec::with_capacity(entries.len());
                for entry in entries {
                    events.extend(self.event(entry.key, Some(entry.value)));
                }
                Some(events)
            }
        }
    }

    fn is_webhook(&self, name: &str) -> bool {
        WEBHOOK_EVENTS.contains(name) || self.config.extra_webhook_events.iter().any(|e| e == name)
    }

    /// One trigger; `body` is `None` for the scalar and sequence spellings
    fn event(&mut self, hook: Str, body: Option<&YamlNode>) -> Option<Event> {
        let pos = hook.pos;
        let name = hook.value.clone();
        match name.as_str() {
            SCHEDULE => match body {
                Some(body) => self.scheduled(body, pos).map(Event::Scheduled),
                None => {
                    self.missing("cron", "\"schedule\" event", pos);
                    None
                }
            },
            WORKFLOW_DISPATCH => self
                .workflow_dispatch(body, pos)
                .map(Event::WorkflowDispatch),
            REPOSITORY_DISPATCH => self
                .repository_dispatch(body, pos)
                .map(Event::RepositoryDispatch),
            other if self.is_webhook(other) => self.webhook(hook, body, pos).map(Event::Webhook),
            other => {
                self.error(BuildError::ShapeMismatch {
                    what: "trigger".to_string(),
                    expected: "a webhook event, \"schedule\", \"workflow_dispatch\" or \"repository_dispatch\"".to_string(),
                    found: format!("unknown event \"{}\"", other),
                    pos,
                });
                None
            }
        }
    }

    fn webhook(&mut self, hook: Str, body: Option<&YamlNode>, pos: Pos) -> Option<WebhookEvent> {
        let mut event = WebhookEvent::new(hook, pos);
        let Some(body) = body.filter(|b| !b.is_null()) else {
            return Some(event);
        };
        let section = format!("\"{}\" event", event.hook);
        let entries = self.unique_entries(body, &section)?;
        for entry in entries {
            let slot = match entry.key.as_str() {
                "types" => &mut event.types,
                "branches" => &mut event.branches,
                "branches-ignore" => &mut event.branches_ignore,
                "tags" => &mut event.tags,
                "tags-ignore" => &mut event.tags_ignore,
                "paths" => &mut event.paths,
                "paths-ignore" => &mut event.paths_ignore,
                "workflows" => &mut event.workflows,
                _ => {
                    self.unexpected(&entry.key, &section, WEBHOOK_KEYS);
                    continue;
                }
            };
            let what = format!("\"{}\" in {}", entry.key, section);
            *slot = self.string_or_strings(entry.value, &what);
        }
        Some(event)
    }

    fn scheduled(&mut self, body: &YamlNode, pos: Pos) -> Option<ScheduledEvent> {
        const EVENT: &str = "\"schedule\" event";
        let Some(items) = body.as_sequence() else {
            self.shape(body, EVENT, "a sequence of mappings with \"cron\"");
            return None;
        };
        let mut cron = Vec::with_capacity(items.len());
        for item in items {
            let Some(entries) = self.unique_entries(item, EVENT) else {
                continue;
            };
            let mut expr = None;
            for entry in &entries {
                match entry.key.as_str() {
                    "cron" => expr = self.string(entry.value, "\"cron\" in schedule"),
                    _ => self.unexpected(&entry.key, EVENT, &["cron"]),
                }
            }
            cron.extend(self.require(expr, &entries, "cron", EVENT, item.pos));
        }
        Some(ScheduledEvent { cron, pos })
    }

    fn workflow_dispatch(
        &mut self,
        body: Option<&YamlNode>,
        pos: Pos,
    ) -> Option<WorkflowDispatchEvent> {
        const EVENT: &str = "\"workflow_dispatch\" event";
        let mut inputs = FxHashMap::default();
        if let Some(body) = body.filter(|b| !b.is_null()) {
            for entry in self.unique_entries(body, EVENT)? {
                match entry.key.as_str() {
                    "inputs" => inputs = self.dispatch_inputs(entry.value).unwrap_or_default(),
                    _ => self.unexpected(&entry.key, EVENT, &["inputs"]),
                }
            }
        }
        Some(WorkflowDispatchEvent { inputs, pos })
    }

    fn dispatch_inputs(&mut self, node: &YamlNode) -> Option<FxHashMap<String, DispatchInput>> {
        let entries = self.unique_entries(node, "\"inputs\" of workflow_dispatch")?;
        let mut inputs = FxHashMap::default();
        for entry in entries {
            let section = format!("input \"{}\" of workflow_dispatch", entry.key);
            let mut input = DispatchInput {
                name: entry.key.clone(),
                description: None,
                required: None,
                default: None,
                input_type: None,
                options: None,
            };
            if !entry.value.is_null() {
                let Some(fields) = self.unique_entries(entry.value, &section) else {
                    continue;
                };
                for field in fields {
                    let what = format!("\"{}\" in {}", field.key, section);
                    match field.key.as_str() {
                        "description" => input.description = self.string(field.value, &what),
                        "required" => input.required = self.boolean(field.value, &what),
                        "default" => input.default = self.string(field.value, &what),
                        "type" => input.input_type = self.string(field.value, &what),
                        "options" => input.options = self.strings(field.value, &what),
                        _ => self.unexpected(&field.key, &section, DISPATCH_INPUT_KEYS),
                    }
                }
            }
            inputs.insert(entry.key.value, input);
        }
        Some(inputs)
    }

    fn repository_dispatch(
        &mut self,
        body: Option<&YamlNode>,
        pos: Pos,
    ) -> Option<RepositoryDispatchEvent> {
        const EVENT: &str = "\"repository_dispatch\" event";
        let mut types = None;
        if let Some(body) = body.filter(|b| !b.is_null()) {
            for entry in self.unique_entries(body, EVENT)? {
                match entry.key.as_str() {
                    "types" => types = self.string_or_strings(entry.value, "\"types\" in repository_dispatch"),
                    _ => self.unexpected(&entry.key, EVENT, &["types"]),
                }
            }
        }
        Some(RepositoryDispatchEvent { types, pos })
    }
}
