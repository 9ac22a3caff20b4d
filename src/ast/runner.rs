//! `runs-on:` targets

use serde::Serialize;

use super::pos::{Pos, Str};

/// Label every self-hosted runner carries
pub const SELF_HOSTED_LABEL: &str = "self-hosted";

/// Where a job runs
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Runner {
    #[serde(rename = "github_hosted")]
    GitHubHosted(GitHubHostedRunner),
    SelfHosted(SelfHostedRunner),
}

impl Runner {
    /// Base label used for scheduling
    pub fn label(&self) -> &str {
        match self {
            Runner::GitHubHosted(r) => r.label(),
            Runner::SelfHosted(r) => r.label(),
        }
    }

    /// Base label followed by any extra labels, in source order
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Runner::GitHubHosted(r) => vec![r.label()],
            Runner::SelfHosted(r) => std::iter::once(r.label())
                .chain(r.labels.iter().map(Str::as_str))
                .collect(),
        }
    }

    pub fn pos(&self) -> Pos {
        match self {
            Runner::GitHubHosted(r) => r.pos,
            Runner::SelfHosted(r) => r.pos,
        }
    }
}

/// Hosted runner such as `ubuntu-latest`
#[derive(Debug, Clone, Serialize)]
pub struct GitHubHostedRunner {
    pub label: Str,
    pub pos: Pos,
}

impl GitHubHostedRunner {
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}

/// Self-hosted runner
///
/// `runs-on: [self-hosted, linux, ARM64]` keeps `linux` and `ARM64` in
/// `labels`.
#[derive(Debug, Clone, Serialize)]
pub struct SelfHostedRunner {
    pub labels: Vec<Str>,
    pub pos: Pos,
}

impl SelfHostedRunner {
    pub fn label(&self) -> &str {
        SELF_HOSTED_LABEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Str {
        Str::new(v.to_string(), Pos::new(7, 20))
    }

    #[test]
    fn hosted_runner_label() {
        let r = Runner::GitHubHosted(GitHubHostedRunner {
            label: s("ubuntu-latest"),
            pos: Pos::new(7, 14),
        });
        assert_eq!(r.label(), "ubuntu-latest");
        assert_eq!(r.labels(), ["ubuntu-latest"]);
        assert_eq!(r.pos(), Pos::new(7, 14));
    }

    #[test]
    fn self_hosted_labels_keep_order() {
        let r = Runner::SelfHosted(SelfHostedRunner {
            labels: vec![s("linux"), s("ARM64")],
            pos: Pos::new(7, 14),
        });
        assert_eq!(r.label(), "self-hosted");
        assert_eq!(r.labels(), ["self-hosted", "linux", "ARM64"]);
    }
}
