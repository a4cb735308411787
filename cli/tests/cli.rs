//! Black-box CLI tests using `assert_cmd`, scoped to behavior that
//! doesn't require a `go` toolchain on the test machine: a translation
//! error must abort before any host command runs.

use assert_cmd::Command;
use predicates::str::contains;

fn mx() -> Command {
    Command::cargo_bin("mx").unwrap()
}

#[test]
fn const_mutation_aborts_build_without_invoking_go() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("main.mx"),
        "package main\n\nconst limit = 10\n\nfunc main() {\n\tlimit = 20\n}\n",
    )
    .unwrap();

    mx()
        .arg("build")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(contains("const-mutation"));
}

#[test]
fn json_format_emits_a_summary_object() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("main.mx"),
        "package main\n\nconst limit = 10\n\nfunc main() {\n\tlimit = 20\n}\n",
    )
    .unwrap();

    mx()
        .args(["--format", "json", "build"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(contains("\"summary\""));
}

#[test]
fn clean_tree_translates_and_attempts_the_host_toolchain() {
    if std::process::Command::new("go").arg("version").status().is_err() {
        eprintln!("skipping: no `go` toolchain on this machine");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("main.mx"),
        "package main\n\nfunc main() {\n}\n",
    )
    .unwrap();

    mx().arg("build").arg(dir.path()).assert().success();
}
