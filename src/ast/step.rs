//! `jobs.<id>.steps[*]`

use serde::Serialize;

use super::exec::{Exec, ExecKind};
use super::pos::{Bool, Float, Pos, Str};
use super::settings::Env;

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// `id:`, referenced by `steps.<id>.outputs` elsewhere
    pub id: Option<Str>,
    /// `if:` as a raw expression string
    pub if_cond: Option<Str>,
    pub name: Option<Str>,
    pub exec: Exec,
    pub env: Env,
    pub continue_on_error: Option<Bool>,
    pub timeout_minutes: Option<Float>,
    pub pos: Pos,
}

impl Step {
    pub fn new(exec: Exec, pos: Pos) -> Self {
        Self {
            id: None,
            if_cond: None,
            name: None,
            exec,
            env: Env::default(),
            continue_on_error: None,
            timeout_minutes: None,
            pos,
        }
    }

    pub fn kind(&self) -> ExecKind {
        self.exec.kind()
    }

    /// Name shown in logs: `name:`, then the action reference or script
    pub fn display_name(&self) -> &str {
        if let Some(name) = &self.name {
            return name.as_str();
        }
        match &self.exec {
            Exec::Run(r) => r.run.as_str().lines().next().unwrap_or_default(),
            Exec::Action(a) => a.uses.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExecAction, ExecRun};

    fn s(v: &str) -> Str {
        Str::new(v.to_string(), Pos::new(8, 15))
    }

    #[test]
    fn absent_if_differs_from_empty_if() {
        let mut step = Step::new(Exec::Run(ExecRun::new(s("make"))), Pos::new(8, 9));
        assert!(step.if_cond.is_none());
        step.if_cond = Some(s(""));
        assert_eq!(step.if_cond.as_ref().map(Str::as_str), Some(""));
    }

    #[test]
    fn display_name_falls_back_to_exec() {
        let run = Step::new(
            Exec::Run(ExecRun::new(s("cargo build\ncargo test"))),
            Pos::new(8, 9),
        );
        assert_eq!(run.display_name(), "cargo build");
        assert_eq!(run.kind(), ExecKind::Run);

        let mut action = Step::new(
            Exec::Action(ExecAction::new(s("actions/checkout@v4"))),
            Pos::new(8, 9),
        );
        assert_eq!(action.display_name(), "actions/checkout@v4");
        action.name = Some(s("Checkout"));
        assert_eq!(action.display_name(), "Checkout");
    }
}
