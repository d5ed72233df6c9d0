//! Shared helpers for integration tests driving the real git binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// Whether a usable `git` binary is on PATH. Tests that need one skip
/// themselves when it is missing.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run a git command inside `dir`, asserting success.
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=githerd-tests",
            "-c",
            "user.email=tests@githerd.invalid",
        ])
        .args(args)
        .output()
        .expect("failed to invoke git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run a git command inside `dir` and return its stdout.
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to invoke git");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Initialize an empty repository named `name` under `root`, on branch
/// `main` regardless of the git default.
pub fn init_repo(root: &Path, name: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::create_dir_all(&path).unwrap();
    run_git(&path, &["init", "--quiet"]);
    run_git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    path
}

/// Write a file and commit it.
pub fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo.join(file), content).unwrap();
    run_git(repo, &["add", "--all"]);
    run_git(repo, &["commit", "--quiet", "-m", message]);
}

/// Clone `origin` into `root/name` and return the clone's path.
pub fn clone_repo(origin: &Path, root: &Path, name: &str) -> PathBuf {
    let dest = root.join(name);
    let output = Command::new("git")
        .arg("clone")
        .arg("--quiet")
        .arg(origin)
        .arg(&dest)
        .output()
        .expect("failed to invoke git clone");
    assert!(
        output.status.success(),
        "git clone failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    dest
}

/// Create a bare clone of `source` at `dest`.
pub fn bare_clone(source: &Path, dest: &Path) {
    let output = Command::new("git")
        .arg("clone")
        .arg("--quiet")
        .arg("--bare")
        .arg(source)
        .arg(dest)
        .output()
        .expect("failed to invoke git clone --bare");
    assert!(
        output.status.success(),
        "git clone --bare failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
