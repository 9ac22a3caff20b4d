//! Workflow triggers (`on:` section)
//!
//! Each trigger shape is its own type; [`Event`] is the closed set of them.
//! Fields that only make sense for one shape live only on that shape.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::pos::{Bool, Pos, Str};

/// Canonical name of the scheduled trigger
pub const SCHEDULE: &str = "schedule";
/// Canonical name of the manual dispatch trigger
pub const WORKFLOW_DISPATCH: &str = "workflow_dispatch";
/// Canonical name of the repository dispatch trigger
pub const REPOSITORY_DISPATCH: &str = "repository_dispatch";

/// A trigger in the `on:` section
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Event {
    Webhook(WebhookEvent),
    Scheduled(ScheduledEvent),
    WorkflowDispatch(WorkflowDispatchEvent),
    RepositoryDispatch(RepositoryDispatchEvent),
}

impl Event {
    /// Canonical trigger name, used for lookup and duplicate detection
    pub fn name(&self) -> &str {
        match self {
            Event::Webhook(e) => e.name(),
            Event::Scheduled(e) => e.name(),
            Event::WorkflowDispatch(e) => e.name(),
            Event::RepositoryDispatch(e) => e.name(),
        }
    }

    pub fn pos(&self) -> Pos {
        match self {
            Event::Webhook(e) => e.pos,
            Event::Scheduled(e) => e.pos,
            Event::WorkflowDispatch(e) => e.pos,
            Event::RepositoryDispatch(e) => e.pos,
        }
    }

    pub fn as_webhook(&self) -> Option<&WebhookEvent> {
        match self {
            Event::Webhook(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_scheduled(&self) -> Option<&ScheduledEvent> {
        match self {
            Event::Scheduled(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_workflow_dispatch(&self) -> Option<&WorkflowDispatchEvent> {
        match self {
            Event::WorkflowDispatch(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_repository_dispatch(&self) -> Option<&RepositoryDispatchEvent> {
        match self {
            Event::RepositoryDispatch(e) => Some(e),
            _ => None,
        }
    }
}

/// Webhook-based trigger such as `push` or `pull_request`
///
/// Filters are `None` when the key is absent and `Some(vec![])` when it is
/// present but empty.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEvent {
    pub hook: Str,
    pub types: Option<Vec<Str>>,
    pub branches: Option<Vec<Str>>,
    pub branches_ignore: Option<Vec<Str>>,
    pub tags: Option<Vec<Str>>,
    pub tags_ignore: Option<Vec<Str>>,
    pub paths: Option<Vec<Str>>,
    pub paths_ignore: Option<Vec<Str>>,
    /// Only meaningful for `workflow_run`
    pub workflows: Option<Vec<Str>>,
    pub pos: Pos,
}

impl WebhookEvent {
    /// Webhook event with no filters
    pub fn new(hook: Str, pos: Pos) -> Self {
        Self {
            hook,
            types: None,
            branches: None,
            branches_ignore: None,
            tags: None,
            tags_ignore: None,
            paths: None,
            paths_ignore: None,
            workflows: None,
            pos,
        }
    }

    pub fn name(&self) -> &str {
        self.hook.as_str()
    }

    /// True when no filter key was written for this event
    pub fn is_unfiltered(&self) -> bool {
        self.types.is_none()
            && self.branches.is_none()
            && self.branches_ignore.is_none()
            && self.tags.is_none()
            && self.tags_ignore.is_none()
            && self.paths.is_none()
            && self.paths_ignore.is_none()
            && self.workflows.is_none()
    }
}

/// `schedule:` trigger with its cron expressions
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledEvent {
    pub cron: Vec<Str>,
    pub pos: Pos,
}

impl ScheduledEvent {
    pub fn name(&self) -> &str {
        SCHEDULE
    }
}

/// One input of a `workflow_dispatch` trigger
#[derive(Debug, Clone, Serialize)]
pub struct DispatchInput {
    pub name: Str,
    pub description: Option<Str>,
    pub required: Option<Bool>,
    pub default: Option<Str>,
    /// Value of the `type:` key (string, boolean, choice, environment, ...)
    pub input_type: Option<Str>,
    /// Choices of a `choice` input
    pub options: Option<Vec<Str>>,
}

/// `workflow_dispatch:` trigger
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDispatchEvent {
    pub inputs: FxHashMap<String, DispatchInput>,
    pub pos: Pos,
}

impl WorkflowDispatchEvent {
    pub fn name(&self) -> &str {
        WORKFLOW_DISPATCH
    }

    pub fn input(&self, name: &str) -> Option<&DispatchInput> {
        self.inputs.get(name)
    }
}

/// `repository_dispatch:` trigger
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryDispatchEvent {
    pub types: Option<Vec<Str>>,
    pub pos: Pos,
}

impl RepositoryDispatchEvent {
    pub fn name(&self) -> &str {
        REPOSITORY_DISPATCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str, line: usize) -> Str {
        Str::new(v.to_string(), Pos::new(line, 3))
    }

    #[test]
    fn each_variant_reports_canonical_name() {
        let events = vec![
            Event::Webhook(WebhookEvent::new(s("pull_request", 2), Pos::new(2, 3))),
            Event::Scheduled(ScheduledEvent {
                cron: vec![s("0 0 * * *", 4)],
                pos: Pos::new(3, 3),
            }),
            Event::WorkflowDispatch(WorkflowDispatchEvent {
                inputs: FxHashMap::default(),
                pos: Pos::new(5, 3),
            }),
            Event::RepositoryDispatch(RepositoryDispatchEvent {
                types: None,
                pos: Pos::new(6, 3),
            }),
        ];
        let names: Vec<&str> = events.iter().map(Event::name).collect();
        assert_eq!(
            names,
            ["pull_request", "schedule", "workflow_dispatch", "repository_dispatch"]
        );
        assert_eq!(events[2].pos(), Pos::new(5, 3));
    }

    #[test]
    fn variant_accessors_return_absent_for_other_shapes() {
        let e = Event::Webhook(WebhookEvent::new(s("push", 1), Pos::new(1, 5)));
        assert!(e.as_webhook().is_some());
        assert!(e.as_scheduled().is_none());
        assert!(e.as_workflow_dispatch().is_none());
        assert!(e.as_repository_dispatch().is_none());
    }

    #[test]
    fn absent_filter_differs_from_empty_filter() {
        let mut e = WebhookEvent::new(s("push", 1), Pos::new(1, 1));
        assert!(e.is_unfiltered());
        e.branches = Some(Vec::new());
        assert!(!e.is_unfiltered());
        assert_eq!(e.branches.as_deref().map(<[Str]>::len), Some(0));
    }
}
