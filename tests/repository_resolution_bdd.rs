//! Behavioural tests for repository resolution.

use std::collections::HashMap;
use std::fs;

use git2::Repository;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tally_pr_install::resolver::{ProbeEnvironment, ProcessTable, RepositoryResolver};
use tally_pr_install::{RepositorySpec, Resolution};
use tempfile::TempDir;

/// PID handed to the ancestry walk as the installer's parent.
const PARENT_PID: u32 = 4242;

/// In-memory process table.
#[derive(Debug, Clone, Default)]
struct FakeProcessTable {
    listing: Vec<String>,
    ancestry: HashMap<u32, (u32, String)>,
}

impl ProcessTable for FakeProcessTable {
    fn command_lines(&self) -> Vec<String> {
        self.listing.clone()
    }

    fn parent_pid(&self, pid: u32) -> Option<u32> {
        self.ancestry.get(&pid).map(|(parent, _)| *parent)
    }

    fn command_line(&self, pid: u32) -> Option<String> {
        self.ancestry.get(&pid).map(|(_, line)| line.clone())
    }
}

#[derive(ScenarioState, Default)]
struct ResolutionState {
    sandbox: Slot<TempDir>,
    table: Slot<FakeProcessTable>,
    environment: Slot<ProbeEnvironment>,
    override_repository: Slot<RepositorySpec>,
    resolution: Slot<Resolution>,
}

impl ResolutionState {
    /// Creates the sandbox and an environment rooted in it on first use.
    #[expect(
        clippy::expect_used,
        reason = "integration test helper; allow-expect-in-tests does not cover integration tests"
    )]
    fn prepare(&self) {
        if self.sandbox.with_ref(|_| ()).is_some() {
            return;
        }
        let sandbox = TempDir::new().expect("should create sandbox");
        let home = sandbox.path().join("home");
        let work = sandbox.path().join("work");
        fs::create_dir_all(&home).expect("should create home");
        fs::create_dir_all(&work).expect("should create working directory");

        self.environment.set(ProbeEnvironment {
            histfile: None,
            shell: Some("/bin/bash".to_owned()),
            home: Some(home.to_string_lossy().into_owned()),
            working_dir: Some(work),
            parent_pid: None,
        });
        self.table.set(FakeProcessTable::default());
        self.sandbox.set(sandbox);
    }

    #[expect(
        clippy::expect_used,
        reason = "integration test helper; allow-expect-in-tests does not cover integration tests"
    )]
    fn environment(&self) -> ProbeEnvironment {
        self.prepare();
        self.environment.get().expect("environment prepared")
    }

    #[expect(
        clippy::expect_used,
        reason = "integration test helper; allow-expect-in-tests does not cover integration tests"
    )]
    fn table(&self) -> FakeProcessTable {
        self.prepare();
        self.table.get().expect("process table prepared")
    }
}

#[fixture]
fn resolution_state() -> ResolutionState {
    ResolutionState::default()
}

#[given("a shell history ending with {command}")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
fn write_history(resolution_state: &ResolutionState, command: String) {
    let environment = resolution_state.environment();
    let home = environment.home.clone().expect("home prepared");
    let history = format!("cd ~\ngit status\n{}\n", command.trim_matches('"'));
    fs::write(format!("{home}/.bash_history"), history).expect("should write history");
}

#[given("a running process {command}")]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
fn add_running_process(resolution_state: &ResolutionState, command: String) {
    let mut table = resolution_state.table();
    table.listing.push("/sbin/init".to_owned());
    table.listing.push(command.trim_matches('"').to_owned());
    resolution_state.table.set(table);
}

#[given("a parent process {command}")]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
fn add_parent_process(resolution_state: &ResolutionState, command: String) {
    let mut table = resolution_state.table();
    table
        .ancestry
        .insert(PARENT_PID, (1, command.trim_matches('"').to_owned()));
    resolution_state.table.set(table);

    let mut environment = resolution_state.environment();
    environment.parent_pid = Some(PARENT_PID);
    resolution_state.environment.set(environment);
}

#[given("a working directory cloned from {origin_url}")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
fn clone_working_directory(resolution_state: &ResolutionState, origin_url: String) {
    let environment = resolution_state.environment();
    let work = environment.working_dir.expect("working directory prepared");
    let repo = Repository::init(&work).expect("should init repository");
    repo.remote("origin", origin_url.trim_matches('"'))
        .expect("should add origin remote");
}

#[given("the override repository {repository}")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
fn set_override(resolution_state: &ResolutionState, repository: String) {
    let spec = RepositorySpec::parse(repository.trim_matches('"')).expect("valid repository");
    resolution_state.override_repository.set(spec);
}

#[when("the repository is resolved")]
fn resolve_repository(resolution_state: &ResolutionState) {
    let environment = resolution_state.environment();
    let table = resolution_state.table();
    let resolution = RepositoryResolver::new()
        .with_override(resolution_state.override_repository.get())
        .with_system_probes(&table, &environment)
        .resolve();
    resolution_state.resolution.set(resolution);
}

#[then("the chosen repository is {expected}")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
fn assert_repository(resolution_state: &ResolutionState, expected: String) {
    let actual = resolution_state
        .resolution
        .with_ref(|resolution| resolution.repository().to_string())
        .expect("resolution missing");

    assert_eq!(actual, expected.trim_matches('"'), "repository mismatch");
}

#[then("the resolution is reported as {expected}")]
#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
fn assert_method(resolution_state: &ResolutionState, expected: String) {
    let actual = resolution_state
        .resolution
        .with_ref(|resolution| resolution.method().to_string())
        .expect("resolution missing");

    assert_eq!(actual, expected.trim_matches('"'), "method mismatch");
}

#[scenario(path = "tests/features/repository_resolution.feature", index = 0)]
fn history_wins_over_processes(resolution_state: ResolutionState) {
    let _ = resolution_state;
}

#[scenario(path = "tests/features/repository_resolution.feature", index = 1)]
fn curl_process_used_when_history_is_silent(resolution_state: ResolutionState) {
    let _ = resolution_state;
}

#[scenario(path = "tests/features/repository_resolution.feature", index = 2)]
fn parent_command_line_is_inspected(resolution_state: ResolutionState) {
    let _ = resolution_state;
}

#[scenario(path = "tests/features/repository_resolution.feature", index = 3)]
fn checkout_is_last_resort(resolution_state: ResolutionState) {
    let _ = resolution_state;
}

#[scenario(path = "tests/features/repository_resolution.feature", index = 4)]
fn override_beats_heuristics(resolution_state: ResolutionState) {
    let _ = resolution_state;
}

#[scenario(path = "tests/features/repository_resolution.feature", index = 5)]
fn nothing_matches_uses_default(resolution_state: ResolutionState) {
    let _ = resolution_state;
}
