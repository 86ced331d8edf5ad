mod common;

use assert_cmd::Command;
use predicates::str::contains;

use common::TestWorkspace;

const CASES_CSV: &str = "\
Thana,Date,Count,Remarks
Kotwali,10/01/2024,5,pending
Babupurwa,11/01/2024,3,closed
Kotwali,12/01/2024,2,FIR registered
Chakeri,13/01/2024,4,pending
";

fn binary() -> Command {
    Command::cargo_bin("sheet-dashboard").expect("binary exists")
}

#[test]
fn columns_lists_kinds_and_roles() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("cases.csv", CASES_CSV);
    binary()
        .args(["columns", "-i", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("cases.csv / CSV"))
        .stdout(contains("Count    numeric"))
        .stdout(contains("Thana    text     category"))
        .stdout(contains("Date     text     date"));
}

#[test]
fn report_renders_cards_charts_and_rows() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("cases.csv", CASES_CSV);
    binary()
        .args(["report", "-i", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("== CSV =="))
        .stdout(contains("Bar summary (Thana → Count)"))
        .stdout(contains("Kotwali"))
        .stdout(contains("Rows (page 1 of 1, 4 matching)"));
}

#[test]
fn report_applies_category_and_search_filters() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("cases.csv", CASES_CSV);
    binary()
        .args([
            "report",
            "-i",
            path.to_str().unwrap(),
            "--category-value",
            "Kotwali",
            "--search",
            "fir",
        ])
        .assert()
        .success()
        .stdout(contains("Rows (page 1 of 1, 1 matching)"))
        .stdout(contains("FIR registered"));
}

#[test]
fn report_custom_range_rejects_reversed_bounds() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("cases.csv", CASES_CSV);
    binary()
        .args([
            "report",
            "-i",
            path.to_str().unwrap(),
            "--range",
            "custom",
            "--from",
            "2024-01-12",
            "--to",
            "2024-01-10",
        ])
        .assert()
        .failure()
        .stderr(contains("is after --to"));
}

#[test]
fn report_fails_for_unreadable_input() {
    let workspace = TestWorkspace::new();
    let missing = workspace.path().join("missing.csv");
    binary()
        .args(["report", "-i", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("error: Reading spreadsheet"));
}

#[test]
fn dashboard_rejects_wrong_credentials() {
    let workspace = TestWorkspace::new();
    let config = workspace.write(
        "dashboard.yml",
        "sections: []\nauth:\n  email: admin@example.org\n  password: Secret@2026\n",
    );
    binary()
        .args([
            "dashboard",
            "-c",
            config.to_str().unwrap(),
            "--email",
            "admin@example.org",
            "--password",
            "wrong",
        ])
        .env_remove("DASHBOARD_EMAIL")
        .env_remove("DASHBOARD_PASSWORD")
        .assert()
        .failure()
        .stderr(contains("Invalid email or password"));
}

#[test]
fn dashboard_reports_unknown_section() {
    let workspace = TestWorkspace::new();
    let config = workspace.write(
        "dashboard.yml",
        "sections:\n  - key: notices\n    title: Notices\n    source:\n      spreadsheet_id: abc\n",
    );
    binary()
        .args(["dashboard", "-c", config.to_str().unwrap(), "--section", "missing"])
        .assert()
        .failure()
        .stderr(contains("No section with key 'missing'"));
}
