//! Integration tests for the ctrack CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a ctrack command
fn ctrack() -> Command {
    let mut cmd = Command::cargo_bin("ctrack").unwrap();
    cmd.env_remove("CTRACK_DATABASE")
        .env_remove("CTRACK_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    ctrack().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a command with `--format id` and return the printed ID
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = ctrack()
        .current_dir(tmp.path())
        .args(["--format", "id"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn stdout_of(tmp: &TempDir, args: &[&str]) -> String {
    let output = ctrack().current_dir(tmp.path()).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

struct Fixture {
    tmp: TempDir,
    component: String,
    campaign: String,
}

/// A project with one software, one component with contacts, and an open campaign
fn setup_fixture() -> Fixture {
    let tmp = setup_test_project();
    let eng = create(
        &tmp,
        &["contact", "new", "--name", "Eve", "--email", "eve@example.com"],
    );
    let biz = create(
        &tmp,
        &[
            "contact", "new", "--name", "Bob", "--email", "bob@example.com", "--kind", "business",
        ],
    );
    let sw = create(&tmp, &["software", "new", "--name", "Platform"]);
    let component = create(
        &tmp,
        &[
            "component",
            "new",
            "--name",
            "kernel",
            "--software",
            &sw,
            "--engineering",
            &eng,
            "--business",
            &biz,
        ],
    );
    let campaign = create(&tmp, &["campaign", "new", "--name", "Q3 hardening"]);
    Fixture {
        tmp,
        component,
        campaign,
    }
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    ctrack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Compliance and program tracking"));
}

#[test]
fn test_version_displays() {
    ctrack()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ctrack"));
}

#[test]
fn test_unknown_command_fails() {
    ctrack().arg("frobnicate").assert().failure();
}

#[test]
fn test_completions_bash() {
    ctrack()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ctrack"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();
    ctrack()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized tracker project"));

    assert!(tmp.path().join(".ctrack/config.yaml").is_file());
    assert!(tmp.path().join(".ctrack/tracker.db").is_file());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();
    ctrack()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    ctrack()
        .current_dir(tmp.path())
        .args(["software", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a ctrack project"));
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_software_create_list_show() {
    let tmp = setup_test_project();
    let id = create(
        &tmp,
        &["software", "new", "--name", "Platform", "-d", "Core product"],
    );
    assert!(id.starts_with("SW-"));

    ctrack()
        .current_dir(tmp.path())
        .args(["software", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform"))
        .stdout(predicate::str::contains("1 software(s) found."));

    ctrack()
        .current_dir(tmp.path())
        .args(["software", "show", &id, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"description\": \"Core product\""));
}

#[test]
fn test_duplicate_software_name_rejected() {
    let tmp = setup_test_project();
    create(&tmp, &["software", "new", "--name", "Platform"]);
    ctrack()
        .current_dir(tmp.path())
        .args(["software", "new", "--name", "Platform"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name"));
}

#[test]
fn test_component_requires_existing_software() {
    let tmp = setup_test_project();
    let sw = create(&tmp, &["software", "new", "--name", "Platform"]);
    ctrack()
        .current_dir(tmp.path())
        .args(["software", "delete", &sw, "--yes"])
        .assert()
        .success();

    ctrack()
        .current_dir(tmp.path())
        .args(["component", "new", "--name", "kernel", "--software", &sw])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_wrong_id_type_rejected() {
    let tmp = setup_test_project();
    let sw = create(&tmp, &["software", "new", "--name", "Platform"]);
    ctrack()
        .current_dir(tmp.path())
        .args(["component", "show", &sw])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a component id"));
}

#[test]
fn test_component_edit_and_filter_by_software() {
    let fx = setup_fixture();
    let other = create(&fx.tmp, &["software", "new", "--name", "Other"]);
    create(
        &fx.tmp,
        &["component", "new", "--name", "shell", "--software", &other],
    );

    ctrack()
        .current_dir(fx.tmp.path())
        .args([
            "component",
            "edit",
            &fx.component,
            "--ga",
            "2025-03-01",
            "--repo-url",
            "https://git.example.com/kernel",
        ])
        .assert()
        .success();

    let json = stdout_of(&fx.tmp, &["component", "show", &fx.component, "-f", "json"]);
    assert!(json.contains("2025-03-01"));
    assert!(json.contains("https://git.example.com/kernel"));

    let listed = stdout_of(&fx.tmp, &["component", "list", "--software", &other, "-f", "id"]);
    assert_eq!(listed.lines().count(), 1);
}

#[test]
fn test_component_rejects_invalid_url() {
    let tmp = setup_test_project();
    let sw = create(&tmp, &["software", "new", "--name", "Platform"]);
    ctrack()
        .current_dir(tmp.path())
        .args([
            "component",
            "new",
            "--name",
            "kernel",
            "--software",
            &sw,
            "--repo-url",
            "not a url",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repo_url"));
}

#[test]
fn test_list_csv_output() {
    let tmp = setup_test_project();
    create(&tmp, &["threat", "new", "--name", "Spoofing"]);
    ctrack()
        .current_dir(tmp.path())
        .args(["threat", "list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID,NAME,DESCRIPTION"))
        .stdout(predicate::str::contains("Spoofing"));
}

// ============================================================================
// Tracking Tests
// ============================================================================

#[test]
fn test_duplicate_component_feature_rejected() {
    let fx = setup_fixture();
    let feat = create(&fx.tmp, &["feature", "new", "--name", "FIPS mode"]);
    create(
        &fx.tmp,
        &["cfeat", "new", "--component", &fx.component, "--feature", &feat],
    );
    ctrack()
        .current_dir(fx.tmp.path())
        .args(["cfeat", "new", "--component", &fx.component, "--feature", &feat])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_campaign_buckets_report() {
    let fx = setup_fixture();
    let feat = create(&fx.tmp, &["feature", "new", "--name", "FIPS mode"]);
    let act = create(&fx.tmp, &["activity", "new", "--name", "Threat model"]);
    create(
        &fx.tmp,
        &[
            "cfeat",
            "new",
            "--component",
            &fx.component,
            "--feature",
            &feat,
            "--status",
            "in-progress",
            "--campaigns",
            &fx.campaign,
        ],
    );
    create(
        &fx.tmp,
        &[
            "cact",
            "new",
            "--component",
            &fx.component,
            "--activity",
            &act,
            "--status",
            "done",
            "--campaigns",
            &fx.campaign,
        ],
    );

    let json = stdout_of(
        &fx.tmp,
        &["report", "buckets", &fx.campaign, "--format", "json"],
    );
    let buckets: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(buckets["todo"], 0);
    assert_eq!(buckets["in_progress"], 1);
    assert_eq!(buckets["done"], 1);
    assert_eq!(buckets["pending"], 1);

    ctrack()
        .current_dir(fx.tmp.path())
        .args(["report", "dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Q3 hardening"));
}

#[test]
fn test_campaign_edit_replaces_members() {
    let fx = setup_fixture();
    let f1 = create(&fx.tmp, &["feature", "new", "--name", "FIPS mode"]);
    let f2 = create(&fx.tmp, &["feature", "new", "--name", "SBOM"]);
    let c1 = create(
        &fx.tmp,
        &["cfeat", "new", "--component", &fx.component, "--feature", &f1],
    );
    let c2 = create(
        &fx.tmp,
        &["cfeat", "new", "--component", &fx.component, "--feature", &f2],
    );

    let both = format!("{},{}", c1, c2);
    ctrack()
        .current_dir(fx.tmp.path())
        .args(["campaign", "edit", &fx.campaign, "--features", &both])
        .assert()
        .success();
    let members = stdout_of(
        &fx.tmp,
        &["assoc", "list", "campaign-component-features", &fx.campaign, "-f", "id"],
    );
    assert_eq!(members.lines().count(), 2);

    ctrack()
        .current_dir(fx.tmp.path())
        .args(["campaign", "edit", &fx.campaign, "--features", &c2])
        .assert()
        .success();
    let members = stdout_of(
        &fx.tmp,
        &["assoc", "list", "campaign-component-features", &fx.campaign, "-f", "id"],
    );
    assert_eq!(members.trim(), c2);
}

#[test]
fn test_assoc_set_is_idempotent() {
    let fx = setup_fixture();
    let std_id = create(&fx.tmp, &["standard", "new", "--name", "ISO 27001"]);

    for _ in 0..2 {
        ctrack()
            .current_dir(fx.tmp.path())
            .args(["assoc", "set", "component-standards", &fx.component, &std_id])
            .assert()
            .success();
    }

    let linked = stdout_of(
        &fx.tmp,
        &["assoc", "list", "standard-components", &std_id, "-f", "id"],
    );
    assert_eq!(linked.trim(), fx.component);
}

#[test]
fn test_done_campaign_not_a_candidate() {
    let fx = setup_fixture();
    let done = create(
        &fx.tmp,
        &["campaign", "new", "--name", "Closed", "--status", "done"],
    );

    let candidates = stdout_of(
        &fx.tmp,
        &["assoc", "candidates", "component-feature-campaigns", "-f", "id"],
    );
    assert!(candidates.contains(&fx.campaign));
    assert!(!candidates.contains(&done));
}

#[test]
fn test_link_attached_to_activity_execution() {
    let fx = setup_fixture();
    let act = create(&fx.tmp, &["activity", "new", "--name", "Pen test"]);
    let cact = create(
        &fx.tmp,
        &["cact", "new", "--component", &fx.component, "--activity", &act],
    );
    create(
        &fx.tmp,
        &[
            "link",
            "new",
            "--kind",
            "result",
            "--name",
            "Report",
            "--url",
            "https://results.example.com/1",
            "--owner",
            &cact,
        ],
    );

    ctrack()
        .current_dir(fx.tmp.path())
        .args(["link", "list", "--owner", &cact])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report"));
}

#[test]
fn test_result_link_cannot_attach_to_component_feature() {
    let fx = setup_fixture();
    let feat = create(&fx.tmp, &["feature", "new", "--name", "FIPS mode"]);
    let cfeat = create(
        &fx.tmp,
        &["cfeat", "new", "--component", &fx.component, "--feature", &feat],
    );
    ctrack()
        .current_dir(fx.tmp.path())
        .args([
            "link",
            "new",
            "--kind",
            "result",
            "--name",
            "Report",
            "--url",
            "https://results.example.com/1",
            "--owner",
            &cfeat,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner"));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_compliance_report_shows_gaps() {
    let fx = setup_fixture();
    let std_id = create(&fx.tmp, &["standard", "new", "--name", "ISO 27001"]);
    let covered = create(
        &fx.tmp,
        &[
            "req", "new", "--standard", &std_id, "--definition", "Threat model", "--code", "A.1",
        ],
    );
    create(
        &fx.tmp,
        &[
            "req", "new", "--standard", &std_id, "--definition", "Pen test", "--code", "A.2",
        ],
    );
    let act = create(
        &fx.tmp,
        &["activity", "new", "--name", "Threat modeling", "--requirements", &covered],
    );
    create(
        &fx.tmp,
        &["cact", "new", "--component", &fx.component, "--activity", &act],
    );

    ctrack()
        .current_dir(fx.tmp.path())
        .args([
            "report",
            "compliance",
            &fx.component,
            &std_id,
            "--gaps-only",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("A.2"))
        .stdout(predicate::str::contains("A.1").not());
}

#[test]
fn test_contacts_report_lists_emails() {
    let fx = setup_fixture();
    let feat = create(&fx.tmp, &["feature", "new", "--name", "FIPS mode"]);
    create(
        &fx.tmp,
        &[
            "cfeat",
            "new",
            "--component",
            &fx.component,
            "--feature",
            &feat,
            "--campaigns",
            &fx.campaign,
        ],
    );

    ctrack()
        .current_dir(fx.tmp.path())
        .args(["report", "contacts", &fx.campaign, "--emails"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob@example.com"))
        .stdout(predicate::str::contains("eve@example.com"));
}

// ============================================================================
// Delete Tests
// ============================================================================

#[test]
fn test_delete_software_cascades_to_components() {
    let fx = setup_fixture();
    let sw_list = stdout_of(&fx.tmp, &["software", "list", "-f", "id"]);
    let sw = sw_list.trim().to_string();

    ctrack()
        .current_dir(fx.tmp.path())
        .args(["software", "delete", &sw, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    ctrack()
        .current_dir(fx.tmp.path())
        .args(["component", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No components found."));
}

#[test]
fn test_delete_missing_record_fails() {
    let tmp = setup_test_project();
    ctrack()
        .current_dir(tmp.path())
        .args(["threat", "delete", "THR-01ARZ3NDEKTSV4RRFFQ69G5FAV", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
