//! `jobs:` section

use rustc_hash::FxHashMap;

use super::{Entry, WorkflowParser};
use crate::ast::{
    Container, Credentials, Environment, GitHubHostedRunner, Job, Matrix, MatrixCombination,
    MatrixCombinations, MatrixRow, Output, Runner, SelfHostedRunner, Service, Strategy,
    SELF_HOSTED_LABEL,
};
use crate::error::BuildError;
use crate::yaml::{NodeKind, YamlNode};

const JOB_KEYS: &[&str] = &[
    "name",
    "needs",
    "runs-on",
    "permissions",
    "environment",
    "concurrency",
    "outputs",
    "env",
    "defaults",
    "if",
    "steps",
    "timeout-minutes",
    "strategy",
    "continue-on-error",
    "container",
    "services",
];

const CONTAINER_KEYS: &[&str] = &["image", "credentials", "env", "ports", "volumes", "options"];

impl WorkflowParser<'_> {
    pub(super) fn jobs(&mut self, node: &YamlNode) -> Option<FxHashMap<String, Job>> {
        let entries = self.unique_entries(node, "\"jobs\" section")?;
        let mut jobs = FxHashMap::default();
        for entry in entries {
            let id = entry.key.value.clone();
            if let Some(job) = self.job(entry) {
                jobs.insert(id, job);
            }
        }
        Some(jobs)
    }

    fn job(&mut self, entry: Entry<'_>) -> Option<Job> {
        let Entry { key: id, value: node } = entry;
        let section = format!("job \"{}\"", id);
        let entries = self.section_entries(node, &section)?;

        let mut name = None;
        let mut needs = None;
        let mut runs_on = None;
        let mut permissions = None;
        let mut environment = None;
        let mut concurrency = None;
        let mut outputs = None;
        let mut env = None;
        let mut defaults = None;
        let mut if_cond = None;
        let mut steps = None;
        let mut timeout_minutes = None;
        let mut strategy = None;
        let mut continue_on_error = None;
        let mut container = None;
        let mut services = None;

        for entry in &entries {
            let value = entry.value;
            let what = format!("\"{}\" in {}", entry.key, section);
            match entry.key.as_str() {
                "name" => name = self.string(value, &what),
                "needs" => needs = self.string_or_strings(value, &what),
                "runs-on" => runs_on = self.runner(value, &what),
                "permissions" => permissions = self.permissions(value, &section),
                "environment" => environment = self.environment(value, &what),
                "concurrency" => concurrency = self.concurrency(value, &section),
                "outputs" => outputs = self.outputs(value, &what),
                "env" => env = self.env(value, &what),
                "defaults" => defaults = self.defaults(value, &section),
                "if" => if_cond = self.string(value, &what),
                "steps" => steps = self.steps(value, &section),
                "timeout-minutes" => timeout_minutes = self.float(value, &what),
                "strategy" => strategy = self.strategy(value, &what),
                "continue-on-error" => continue_on_error = self.boolean(value, &what),
                "container" => container = self.container(value, &what),
                "services" => services = self.services(value, &what),
                _ => self.unexpected(&entry.key, &section, JOB_KEYS),
            }
        }

        let runs_on = self.require(runs_on, &entries, "runs-on", &section, id.pos);
        let steps = self.require(steps, &entries, "steps", &section, id.pos);

        Some(Job {
            pos: id.pos,
            id,
            name,
            needs: needs.unwrap_or_default(),
            runs_on: runs_on?,
            permissions,
            environment,
            concurrency,
            outputs: outputs.unwrap_or_default(),
            env: env.unwrap_or_default(),
            defaults,
            if_cond,
            steps: steps?,
            timeout_minutes,
            strategy,
            continue_on_error,
            container,
            services: services.unwrap_or_default(),
        })
    }

    /// `runs-on: ubuntu-latest`, `runs-on: self-hosted` or a label list
    fn runner(&mut self, node: &YamlNode, what: &str) -> Option<Runner> {
        const EXPECTED: &str = "a runner label or a sequence of labels";
        let labels = match &node.kind {
            NodeKind::Scalar { .. } => vec![node.as_str_leaf()?],
            NodeKind::Sequence(_) => self.strings(node, what)?,
            _ => {
                self.shape(node, what, EXPECTED);
                return None;
            }
        };

        if labels.iter().any(|l| l == SELF_HOSTED_LABEL) {
            return Some(Runner::SelfHosted(SelfHostedRunner {
                labels: labels
                    .into_iter()
                    .filter(|l| l != SELF_HOSTED_LABEL)
                    .collect(),
                pos: node.pos,
            }));
        }

        let mut labels = labels.into_iter();
        match (labels.next(), labels.next()) {
            (Some(label), None) => Some(Runner::GitHubHosted(GitHubHostedRunner {
                label,
                pos: node.pos,
            })),
            _ => {
                self.error(BuildError::ShapeMismatch {
                    what: what.to_string(),
                    expected: "a single hosted label, or \"self-hosted\" with extra labels"
                        .to_string(),
                    found: node.describe(),
                    pos: node.pos,
                });
                None
            }
        }
    }

    fn environment(&mut self, node: &YamlNode, what: &str) -> Option<Environment> {
        if let Some(name) = node.as_str_leaf() {
            return Some(Environment {
                name,
                url: None,
                pos: node.pos,
            });
        }
        let entries = self.unique_entries(node, what)?;
        let mut name = None;
        let mut url = None;
        for entry in &entries {
            match entry.key.as_str() {
                "name" => name = self.string(entry.value, "\"name\" in environment"),
                "url" => url = self.string(entry.value, "\"url\" in environment"),
                _ => self.unexpected(&entry.key, what, &["name", "url"]),
            }
        }
        let name = self.require(name, &entries, "name", what, node.pos)?;
        Some(Environment {
            name,
            url,
            pos: node.pos,
        })
    }

    fn outputs(&mut self, node: &YamlNode, what: &str) -> Option<FxHashMap<String, Output>> {
        let entries = self.unique_entries(node, what)?;
        let mut outputs = FxHashMap::default();
        for entry in entries {
            let of = format!("output \"{}\"", entry.key);
            if let Some(value) = self.string(entry.value, &of) {
                outputs.insert(
                    entry.key.value.clone(),
                    Output {
                        name: entry.key,
                        value,
                    },
                );
            }
        }
        Some(outputs)
    }

    // ─────────────────────────────────────────────────────────────
    // Strategy
    // ─────────────────────────────────────────────────────────────

    fn strategy(&mut self, node: &YamlNode, what: &str) -> Option<Strategy> {
        let entries = self.unique_entries(node, what)?;
        let mut strategy = Strategy {
            matrix: None,
            fail_fast: None,
            max_parallel: None,
            pos: node.pos,
        };
        for entry in entries {
            match entry.key.as_str() {
                "matrix" => strategy.matrix = self.matrix(entry.value),
                "fail-fast" => {
                    strategy.fail_fast = self.boolean(entry.value, "\"fail-fast\" in strategy")
                }
                "max-parallel" => {
                    strategy.max_parallel = self.int(entry.value, "\"max-parallel\" in strategy")
                }
                _ => self.unexpected(&entry.key, what, &["matrix", "fail-fast", "max-parallel"]),
            }
        }
        Some(strategy)
    }

    /// Rows are every key except `include` and `exclude`
    fn matrix(&mut self, node: &YamlNode) -> Option<Matrix> {
        const SECTION: &str = "\"matrix\" section";
        let entries = self.unique_entries(node, SECTION)?;
        let mut matrix = Matrix {
            rows: FxHashMap::default(),
            include: Vec::new(),
            exclude: Vec::new(),
            pos: node.pos,
        };
        for entry in entries {
            match entry.key.as_str() {
                "include" => matrix.include = self.combinations(entry.value, "include"),
                "exclude" => matrix.exclude = self.combinations(entry.value, "exclude"),
                _ => {
                    let what = format!("matrix row \"{}\"", entry.key);
                    if let Some(values) = self.strings(entry.value, &what) {
                        matrix.rows.insert(
                            entry.key.value.clone(),
                            MatrixRow {
                                name: entry.key,
                                values,
                            },
                        );
                    }
                }
            }
        }
        Some(matrix)
    }

    fn combinations(&mut self, node: &YamlNode, section: &str) -> Vec<MatrixCombinations> {
        let what = format!("\"{}\" in matrix", section);
        let Some(items) = node.as_sequence() else {
            self.shape(node, &what, "a sequence of mappings");
            return Vec::new();
        };
        let mut all = Vec::with_capacity(items.len());
        for item in items {
            let Some(entries) = self.unique_entries(item, &format!("element of {}", what)) else {
                continue;
            };
            let mut combination = MatrixCombinations::default();
            for entry in entries {
                let of = format!("value of \"{}\" in {}", entry.key, what);
                if let Some(value) = self.string(entry.value, &of) {
                    combination.insert(
                        entry.key.value.clone(),
                        MatrixCombination {
                            key: entry.key,
                            value,
                        },
                    );
                }
            }
            all.push(combination);
        }
        all
    }

    // ─────────────────────────────────────────────────────────────
    // Containers
    // ─────────────────────────────────────────────────────────────

    fn services(&mut self, node: &YamlNode, what: &str) -> Option<FxHashMap<String, Service>> {
        let entries = self.unique_entries(node, what)?;
        let mut services = FxHashMap::default();
        for entry in entries {
            let of = format!("service \"{}\"", entry.key);
            if let Some(container) = self.container(entry.value, &of) {
                services.insert(
                    entry.key.value.clone(),
                    Service {
                        name: entry.key,
                        container,
                    },
                );
            }
        }
        Some(services)
    }

    fn container(&mut self, node: &YamlNode, what: &str) -> Option<Container> {
        if let Some(image) = node.as_str_leaf() {
            return Some(Container::from_image(image, node.pos));
        }
        let entries = self.unique_entries(node, what)?;
        let mut image = None;
        let mut credentials = None;
        let mut env = None;
        let mut ports = None;
        let mut volumes = None;
        let mut options = None;
        for entry in &entries {
            let of = format!("\"{}\" in {}", entry.key, what);
            match entry.key.as_str() {
                "image" => image = self.string(entry.value, &of),
                "credentials" => credentials = self.credentials(entry.value, &of),
                "env" => env = self.env(entry.value, &of),
                "ports" => ports = self.strings(entry.value, &of),
                "volumes" => volumes = self.strings(entry.value, &of),
                "options" => options = self.string(entry.value, &of),
                _ => self.unexpected(&entry.key, what, CONTAINER_KEYS),
            }
        }
        let image = self.require(image, &entries, "image", what, node.pos)?;
        Some(Container {
            image,
            credentials,
            env: env.unwrap_or_default(),
            ports: ports.unwrap_or_default(),
            volumes: volumes.unwrap_or_default(),
            options,
            pos: node.pos,
        })
    }

    fn credentials(&mut self, node: &YamlNode, what: &str) -> Option<Credentials> {
        let entries = self.unique_entries(node, what)?;
        let mut username = None;
        let mut password = None;
        for entry in &entries {
            match entry.key.as_str() {
                "username" => username = self.string(entry.value, "\"username\" in credentials"),
                "password" => password = self.string(entry.value, "\"password\" in credentials"),
                _ => self.unexpected(&entry.key, what, &["username", "password"]),
            }
        }
        let username = self.require(username, &entries, "username", what, node.pos);
        let password = self.require(password, &entries, "password", what, node.pos);
        Some(Credentials {
            username: username?,
            password: password?,
            pos: node.pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Job, Runner, Str, Workflow};
    use crate::config::ParseConfig;
    use crate::error::{BuildError, Diagnostics};
    use crate::parse::parse_str;

    fn parse(src: &str) -> Result<Workflow, Diagnostics> {
        parse_str(src, &ParseConfig::default())
    }

    /// Parse a single job body, indented under `jobs.test`
    fn job(body: &str) -> Result<Job, Diagnostics> {
        let mut src = String::from("on: push\njobs:\n  test:\n");
        for line in body.trim_matches('\n').lines() {
            src.push_str("    ");
            src.push_str(line);
            src.push('\n');
        }
        parse(&src).map(|mut w| w.jobs.remove("test").unwrap())
    }

    /// Labels other than the base one, as written
    fn extra_labels(runner: &Runner) -> Vec<&str> {
        runner.labels().into_iter().skip(1).collect()
    }

    fn strs(list: &[Str]) -> Vec<&str> {
        list.iter().map(Str::as_str).collect()
    }

    #[test]
    fn hosted_runner() {
        let j = job("runs-on: ubuntu-latest\nsteps: []").unwrap();
        assert!(matches!(j.runs_on, Runner::GitHubHosted(_)));
        assert_eq!(j.runs_on.labels(), ["ubuntu-latest"]);
        assert_eq!(j.id, "test");
        assert_eq!(j.pos.line, 3);

        let j = job("runs-on: [windows-latest]\nsteps: []").unwrap();
        assert_eq!(j.runs_on.label(), "windows-latest");
    }

    #[test]
    fn self_hosted_runner_keeps_extra_labels() {
        let j = job("runs-on: [self-hosted, linux, ARM64]\nsteps: []").unwrap();
        assert!(matches!(j.runs_on, Runner::SelfHosted(_)));
        assert_eq!(j.runs_on.label(), "self-hosted");
        assert_eq!(extra_labels(&j.runs_on), ["linux", "ARM64"]);

        let j = job("runs-on: self-hosted\nsteps: []").unwrap();
        assert!(extra_labels(&j.runs_on).is_empty());
    }

    #[test]
    fn ambiguous_runner_labels() {
        let err = job("runs-on: [ubuntu-latest, windows-latest]\nsteps: []").unwrap_err();
        assert_eq!(err.first().unwrap().code(), "GHWF-001");

        let err = job("runs-on:\n  group: large\nsteps: []").unwrap_err();
        assert_eq!(err.first().unwrap().code(), "GHWF-001");
    }

    #[test]
    fn missing_runs_on_and_steps_point_at_job_id() {
        let err = job("name: nothing").unwrap_err();
        assert_eq!(err.len(), 2);
        for e in err.iter() {
            assert_eq!(e.code(), "GHWF-003");
            assert_eq!(e.pos().line, 3);
        }
    }

    #[test]
    fn needs_outputs_and_settings() {
        let j = job(
            r#"
name: Release
needs: [build, test]
runs-on: ubuntu-latest
if: github.ref == 'refs/heads/main'
timeout-minutes: 30
continue-on-error: false
environment:
  name: production
  url: https://example.com
outputs:
  version: ${{ steps.v.outputs.version }}
env:
  MODE: release
steps: []
"#,
        )
        .unwrap();
        assert_eq!(j.name.clone().unwrap(), "Release");
        assert_eq!(j.needs_ids().collect::<Vec<_>>(), ["build", "test"]);
        assert_eq!(j.if_cond.unwrap(), "github.ref == 'refs/heads/main'");
        assert_eq!(j.timeout_minutes.map(|t| t.value), Some(30.0));
        assert_eq!(j.continue_on_error.map(|b| b.value), Some(false));
        let env = j.environment.unwrap();
        assert_eq!(env.name, "production");
        assert_eq!(env.url.unwrap(), "https://example.com");
        assert_eq!(j.outputs["version"].value, "${{ steps.v.outputs.version }}");
        assert_eq!(j.env["MODE"].value, "release");
        assert!(j.steps.is_empty());
    }

    #[test]
    fn needs_shorthand_and_environment_name() {
        let j = job("needs: build\nenvironment: staging\nruns-on: ubuntu-latest\nsteps: []").unwrap();
        assert_eq!(strs(&j.needs), ["build"]);
        let env = j.environment.unwrap();
        assert_eq!(env.name, "staging");
        assert!(env.url.is_none());
    }

    #[test]
    fn absent_and_empty_if_differ() {
        let j = job("runs-on: ubuntu-latest\nsteps: []").unwrap();
        assert!(j.if_cond.is_none());

        let j = job("runs-on: ubuntu-latest\nif: ''\nsteps: []").unwrap();
        assert_eq!(j.if_cond.unwrap(), "");
    }

    #[test]
    fn matrix_rows_and_include() {
        let j = job(
            r#"
runs-on: ${{ matrix.os }}
strategy:
  fail-fast: false
  max-parallel: 2
  matrix:
    os: [ubuntu, windows]
    node: [18, 20]
    include:
      - os: macos
        extra: true
    exclude:
      - os: windows
        node: 18
steps: []
"#,
        )
        .unwrap();
        let strategy = j.strategy.unwrap();
        assert_eq!(strategy.fail_fast.map(|b| b.value), Some(false));
        assert_eq!(strategy.max_parallel.map(|i| i.value), Some(2));

        let matrix = strategy.matrix.unwrap();
        assert_eq!(strs(&matrix.row("os").unwrap().values), ["ubuntu", "windows"]);
        assert_eq!(matrix.row_product(), Some(4));
        assert_eq!(matrix.include.len(), 1);
        assert_eq!(matrix.include[0]["os"].value, "macos");
        assert_eq!(matrix.include[0]["extra"].value, "true");
        assert!(matrix.row("extra").is_none());
        assert_eq!(matrix.exclude[0]["node"].value, "18");
    }

    #[test]
    fn matrix_row_must_be_sequence() {
        let err = job("runs-on: x\nstrategy:\n  matrix:\n    os: ubuntu\nsteps: []").unwrap_err();
        assert_eq!(err.first().unwrap().code(), "GHWF-001");
    }

    #[test]
    fn container_forms() {
        let j = job("runs-on: ubuntu-latest\ncontainer: node:20\nsteps: []").unwrap();
        let c = j.container.unwrap();
        assert_eq!(c.image, "node:20");
        assert!(c.credentials.is_none());

        let j = job(
            r#"
runs-on: ubuntu-latest
container:
  image: ghcr.io/acme/build:1
  credentials:
    username: bot
    password: ${{ secrets.TOKEN }}
  env:
    CI: 'true'
  ports: [8080]
  volumes: ['/data:/data']
  options: --cpus 2
services:
  redis: redis:7
  db:
    image: postgres:16
    ports: ['5432:5432']
steps: []
"#,
        )
        .unwrap();
        let c = j.container.unwrap();
        let creds = c.credentials.unwrap();
        assert_eq!(creds.username, "bot");
        assert_eq!(c.env["CI"].value, "true");
        assert_eq!(strs(&c.ports), ["8080"]);
        assert_eq!(strs(&c.volumes), ["/data:/data"]);
        assert_eq!(c.options.unwrap(), "--cpus 2");

        assert_eq!(j.services.len(), 2);
        assert_eq!(j.services["redis"].container.image, "redis:7");
        assert_eq!(strs(&j.services["db"].container.ports), ["5432:5432"]);
    }

    #[test]
    fn credentials_need_both_fields() {
        let err = job(
            "runs-on: x\ncontainer:\n  image: a\n  credentials:\n    username: bot\nsteps: []",
        )
        .unwrap_err();
        match err.first().unwrap() {
            BuildError::MissingField { field, .. } => assert_eq!(field, "password"),
            other => panic!("expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn job_permissions_conflict() {
        let err = job(
            "runs-on: x\npermissions: read-all\npermissions:\n  contents: write\nsteps: []",
        )
        .unwrap_err();
        assert_eq!(err.first().unwrap().code(), "GHWF-002");
    }

    #[test]
    fn duplicate_job_ids() {
        let err = parse(
            r#"
on: push
jobs:
  build:
    runs-on: a
    steps: []
  build:
    runs-on: b
    steps: []
"#,
        )
        .unwrap_err();
        match err.first().unwrap() {
            BuildError::DuplicateKey { key, first, pos, .. } => {
                assert_eq!(key, "build");
                assert_eq!(first.line, 4);
                assert_eq!(pos.line, 7);
            }
            other => panic!("expected duplicate key, got {:?}", other),
        }
    }

    #[test]
    fn reusable_workflow_calls_are_rejected() {
        let err = job("uses: ./.github/workflows/shared.yml").unwrap_err();
        let codes: Vec<&str> = err.iter().map(BuildError::code).collect();
        assert!(codes.contains(&"GHWF-005"));
    }
}
