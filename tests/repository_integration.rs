//! Integration tests for the repository facade.
//!
//! Each test builds a bare "remote" repository with the git CLI, seeds it
//! through a second working copy, and then drives gitclerk against it over
//! the local transport.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use gitclerk::core::config::ClientConfig;
use gitclerk::core::refspec::RefKind;
use gitclerk::git::{Client, GitError, RemoteRef, SyncOutcome};
use gitclerk::ui::output::MemorySink;

/// A bare remote plus the working copy used to seed and advance it.
///
/// Layout after construction:
/// - `main`: one commit with `README.md`, tagged `v0.1`
/// - `dev`: `main` plus a commit adding `dev.txt`
struct TestRemote {
    dir: TempDir,
}

impl TestRemote {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let remote = Self { dir };

        run_git(remote.dir.path(), &["init", "--bare", "remote.git"]);
        run_git(&remote.bare(), &["symbolic-ref", "HEAD", "refs/heads/main"]);

        run_git(remote.dir.path(), &["init", "seed"]);
        let seed = remote.seed();
        run_git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(&seed, &["config", "user.email", "seed@example.com"]);
        run_git(&seed, &["config", "user.name", "Seed"]);

        std::fs::write(seed.join("README.md"), "# Test Repo\n").unwrap();
        run_git(&seed, &["add", "README.md"]);
        run_git(&seed, &["commit", "-m", "Initial commit"]);
        run_git(&seed, &["tag", "v0.1"]);

        run_git(&seed, &["checkout", "-b", "dev"]);
        std::fs::write(seed.join("dev.txt"), "work in progress\n").unwrap();
        run_git(&seed, &["add", "dev.txt"]);
        run_git(&seed, &["commit", "-m", "Start dev"]);
        run_git(&seed, &["checkout", "main"]);

        let url = remote.url();
        run_git(&seed, &["remote", "add", "origin", &url]);
        run_git(&seed, &["push", "origin", "main", "dev"]);
        run_git(&seed, &["push", "origin", "--tags"]);

        remote
    }

    fn bare(&self) -> PathBuf {
        self.dir.path().join("remote.git")
    }

    fn seed(&self) -> PathBuf {
        self.dir.path().join("seed")
    }

    fn url(&self) -> String {
        self.bare().display().to_string()
    }

    /// Object a ref points to on the remote, if it exists.
    fn remote_ref(&self, spec: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", spec])
            .current_dir(self.bare())
            .output()
            .expect("git rev-parse failed");
        output
            .status
            .success()
            .then(|| String::from_utf8(output.stdout).unwrap().trim().to_string())
    }

    fn remote_object_type(&self, spec: &str) -> String {
        git_output(&self.bare(), &["cat-file", "-t", spec])
    }

    /// Commit a file on `main` from another working copy and push it.
    fn advance_main(&self, file: &str, content: &str) -> String {
        let seed = self.seed();
        std::fs::write(seed.join(file), content).unwrap();
        run_git(&seed, &["add", file]);
        run_git(&seed, &["commit", "-m", &format!("Update {file}")]);
        run_git(&seed, &["push", "origin", "main"]);
        git_output(&seed, &["rev-parse", "HEAD"])
    }
}

/// Client for tests: full-depth clones (the local transport cannot do
/// shallow fetches), a fixed identity and an in-memory log.
fn client() -> (Client, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let config = ClientConfig::default()
        .with_depth(0)
        .with_identity("Test Bot", "bot@example.com")
        .with_ssh_key("/nonexistent/id_rsa");
    (Client::with_sink(config, sink.clone()), sink)
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

// =============================================================================
// Clone and Open
// =============================================================================

#[test]
fn ephemeral_clone_is_removed_on_drop() {
    let remote = TestRemote::new();
    let (client, _) = client();

    let repo = client.clone_ephemeral(&remote.url()).unwrap();
    let root = repo.root().to_path_buf();
    assert!(repo.is_ephemeral());
    assert!(root.join("README.md").exists());
    assert!(repo
        .head()
        .describe()
        .unwrap()
        .starts_with("branch: main, hash: "));

    drop(repo);
    assert!(!root.exists());
}

#[test]
fn clone_to_dir_writes_identity() {
    let remote = TestRemote::new();
    let target = TempDir::new().unwrap();
    let (client, _) = client();

    let repo = client
        .clone_to_dir(&remote.url(), Some(&target.path().join("work")))
        .unwrap();
    assert!(!repo.is_ephemeral());
    assert_eq!(repo.user_name().as_deref(), Some("Test Bot"));
    assert_eq!(repo.user_email().as_deref(), Some("bot@example.com"));
}

#[test]
fn clone_to_temp_dir_survives_until_remove_all() {
    let remote = TestRemote::new();
    let (client, _) = client();

    let repo = client.clone_to_dir(&remote.url(), None).unwrap();
    let root = repo.root().to_path_buf();
    drop(repo);
    assert!(root.exists());

    let repo = client.open(&root).unwrap();
    repo.remove_all().unwrap();
    assert!(!root.exists());
}

#[test]
fn clone_from_missing_remote_fails() {
    let dir = TempDir::new().unwrap();
    let (client, sink) = client();

    let result = client.clone_ephemeral(&dir.path().join("nope.git").display().to_string());
    assert!(result.is_err());
    assert!(sink.lines()[0].starts_with("[git] failed! clone ephemeral"));
}

#[test]
fn open_non_repository_fails() {
    let dir = TempDir::new().unwrap();
    let (client, _) = client();
    assert!(matches!(
        client.open(dir.path()),
        Err(GitError::NotARepo { .. })
    ));
}

// =============================================================================
// Checkout
// =============================================================================

#[test]
fn checkout_remote_only_branch_creates_tracking_branch() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    repo.checkout_branch("dev").unwrap();
    assert!(repo.root().join("dev.txt").exists());
    assert_eq!(
        repo.head().reference().unwrap().as_str(),
        "refs/heads/dev"
    );

    let branch = repo.branch("dev").unwrap();
    assert_eq!(branch.merge_ref().unwrap().as_str(), "refs/heads/dev");
}

#[test]
fn checkout_accepts_remote_tracking_names() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    repo.checkout_branch("refs/remotes/origin/dev").unwrap();
    assert_eq!(repo.head().reference().unwrap().short(), "dev");
}

#[test]
fn checkout_empty_name_stays_on_current_branch() {
    let remote = TestRemote::new();
    let (client, sink) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    repo.checkout_branch("").unwrap();
    assert_eq!(repo.head().reference().unwrap().short(), "main");
    assert!(sink
        .lines()
        .iter()
        .any(|l| l.starts_with("[git] success! checkout, want: refs/heads/main, branch: main")));
}

#[test]
fn checkout_missing_branch_is_not_found() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    assert!(matches!(
        repo.checkout_branch("does-not-exist"),
        Err(GitError::NotFound { kind: "branch", .. })
    ));
}

#[test]
fn checkout_refuses_dirty_worktree() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    std::fs::write(repo.root().join(".env"), "SECRET=1\n").unwrap();
    assert!(repo.is_clean().unwrap());

    std::fs::write(repo.root().join("notes.txt"), "scratch\n").unwrap();
    assert!(!repo.is_clean().unwrap());
    assert!(matches!(
        repo.checkout_branch("dev"),
        Err(GitError::DirtyWorktree { .. })
    ));
    assert!(!repo.root().join("dev.txt").exists());
}

#[test]
fn checkout_refuses_modified_tracked_files() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    std::fs::write(repo.root().join("README.md"), "# Edited\n").unwrap();
    assert!(!repo.is_clean().unwrap());
    assert!(matches!(
        repo.checkout_branch("dev"),
        Err(GitError::DirtyWorktree { .. })
    ));
    assert_eq!(repo.head().reference().unwrap().short(), "main");

    // Restore README, then track a dotfile and edit it.
    std::fs::write(repo.root().join("README.md"), "# Test Repo\n").unwrap();
    repo.rewrite_file(".tool-versions", b"rust 1.80\n").unwrap();
    repo.commit("Pin toolchain").unwrap().unwrap();
    assert!(repo.is_clean().unwrap());

    std::fs::write(repo.root().join(".tool-versions"), "rust 1.81\n").unwrap();
    assert!(!repo.is_clean().unwrap());
    assert!(matches!(
        repo.checkout_branch("dev"),
        Err(GitError::DirtyWorktree { .. })
    ));
}

#[test]
fn checkout_tag_detaches_head() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    repo.checkout_branch("dev").unwrap();

    repo.checkout_tag("v0.1").unwrap();
    assert!(!repo.root().join("dev.txt").exists());
    assert!(repo
        .head()
        .describe()
        .unwrap()
        .starts_with("tag: v0.1, hash: "));

    // An empty name resolves against the tag HEAD was checked out from.
    repo.checkout_tag("").unwrap();
    assert_eq!(repo.head().reference().unwrap().as_str(), "refs/tags/v0.1");
}

#[test]
fn checkout_tag_with_empty_name_on_branch_is_not_found() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    assert!(matches!(
        repo.checkout_tag(""),
        Err(GitError::NotFound { kind: "tag", .. })
    ));
}

// =============================================================================
// Commit, Push, Pull, Fetch
// =============================================================================

#[test]
fn commit_and_push_update_remote() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    repo.rewrite_file("config/app.toml", b"replicas = 3\n").unwrap();
    let oid = repo.commit("scale to 3").unwrap().expect("commit created");
    assert_eq!(repo.head().oid(), Some(&oid));

    let info = repo.head_commit().unwrap();
    assert_eq!(info.summary, "scale to 3");
    assert_eq!(info.author_name, "Test Bot");

    assert_eq!(repo.push().unwrap(), SyncOutcome::Updated);
    assert_eq!(
        remote.remote_ref("refs/heads/main").as_deref(),
        Some(oid.as_str())
    );

    assert_eq!(repo.push().unwrap(), SyncOutcome::UpToDate);
}

#[test]
fn commit_without_changes_returns_none() {
    let remote = TestRemote::new();
    let (client, sink) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    let before = repo.head().oid().cloned();

    assert_eq!(repo.commit("nothing").unwrap(), None);
    assert_eq!(repo.head().oid().cloned(), before);
    assert!(sink.lines().last().unwrap().contains("nothing to commit"));
}

#[test]
fn add_stages_directories() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    std::fs::create_dir_all(repo.root().join("charts/app")).unwrap();
    std::fs::write(repo.root().join("charts/app/values.yaml"), "a: 1\n").unwrap();
    repo.add(&["charts"]).unwrap();
    assert_eq!(repo.status().unwrap().staged, 1);
    assert!(repo.commit("add chart").unwrap().is_some());
    assert!(repo.is_clean().unwrap());
}

#[test]
fn rewrite_file_rejects_paths_outside_worktree() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();

    assert!(matches!(
        repo.rewrite_file("../escape.txt", b"x"),
        Err(GitError::Io { .. })
    ));
}

#[test]
fn pull_fast_forwards_current_branch() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    let upstream = remote.advance_main("CHANGELOG.md", "v0.2\n");
    assert_eq!(repo.pull().unwrap(), SyncOutcome::Updated);
    assert!(repo.root().join("CHANGELOG.md").exists());
    assert_eq!(repo.head().oid().unwrap().as_str(), upstream);

    assert_eq!(repo.pull().unwrap(), SyncOutcome::UpToDate);
}

#[test]
fn pull_refuses_dirty_worktree() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    std::fs::write(repo.root().join("README.md"), "edited\n").unwrap();
    assert!(matches!(
        repo.pull(),
        Err(GitError::DirtyWorktree { .. })
    ));
}

#[test]
fn pull_on_detached_head_fails() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    repo.checkout_tag("v0.1").unwrap();

    assert!(matches!(
        repo.pull(),
        Err(GitError::DetachedHead { operation: "pull" })
    ));
}

#[test]
fn diverged_push_and_pull_are_skipped() {
    let remote = TestRemote::new();
    let (client, sink) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();

    let theirs = remote.advance_main("theirs.txt", "remote side\n");
    repo.rewrite_file("ours.txt", b"local side\n").unwrap();
    repo.commit("local change").unwrap();

    assert_eq!(repo.push().unwrap(), SyncOutcome::NonFastForwardSkipped);
    assert_eq!(remote.remote_ref("refs/heads/main").as_deref(), Some(theirs.as_str()));
    assert!(sink
        .lines()
        .last()
        .unwrap()
        .starts_with("[git] success! push (non-fast-forward skipped)"));

    assert_eq!(repo.pull().unwrap(), SyncOutcome::NonFastForwardSkipped);
    assert!(!repo.root().join("theirs.txt").exists());
}

#[test]
fn fetch_reports_new_and_unchanged_refs() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();

    assert_eq!(repo.fetch().unwrap(), SyncOutcome::UpToDate);
    remote.advance_main("fetched.txt", "x\n");
    assert_eq!(repo.fetch().unwrap(), SyncOutcome::Updated);
}

// =============================================================================
// Branches
// =============================================================================

#[test]
fn create_and_push_branch() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();

    let branch = repo.create_branch("feature/login", None).unwrap();
    assert_eq!(branch.kind(), RefKind::Branch);
    assert_eq!(branch.name(), "feature/login");
    assert!(branch.refspecs().is_empty());
    assert_eq!(branch.push().unwrap(), SyncOutcome::Updated);

    assert_eq!(
        remote.remote_ref("refs/heads/feature/login"),
        remote.remote_ref("refs/heads/main")
    );
}

#[test]
fn create_branch_at_commit() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    let first = repo.head().oid().unwrap().clone();

    repo.rewrite_file("next.txt", b"next\n").unwrap();
    repo.commit("next").unwrap();

    repo.create_branch("hotfix", Some(first.as_str())).unwrap();
    repo.checkout_branch("hotfix").unwrap();
    assert_eq!(repo.head().oid(), Some(&first));
}

#[test]
fn create_branch_errors() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();

    assert!(matches!(
        repo.create_branch("main", None),
        Err(GitError::AlreadyExists { kind: "branch", .. })
    ));
    assert!(matches!(
        repo.create_branch("other", Some("not-a-hash")),
        Err(GitError::InvalidOid { .. })
    ));
    assert!(matches!(
        repo.create_branch("bad..name", None),
        Err(GitError::InvalidRefName { .. })
    ));
}

#[test]
fn delete_branch_removes_local_and_remote() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    repo.checkout_branch("dev").unwrap();
    repo.checkout_branch("main").unwrap();

    assert_eq!(repo.delete_branch("dev").unwrap(), SyncOutcome::Updated);
    assert!(remote.remote_ref("refs/heads/dev").is_none());
    assert!(matches!(
        repo.branch("dev"),
        Err(GitError::NotFound { kind: "branch", .. })
    ));
}

#[test]
fn delete_marks_handle_for_deletion_push() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();

    let mut branch = repo.create_branch("tmp", None).unwrap();
    branch.push().unwrap();
    assert!(remote.remote_ref("refs/heads/tmp").is_some());

    branch.delete().unwrap();
    assert!(branch.is_deleted());
    assert_eq!(branch.refspecs()[0].to_string(), ":refs/heads/tmp");
    // Deleting again is not an error.
    branch.delete().unwrap();

    assert_eq!(branch.push().unwrap(), SyncOutcome::Updated);
    assert!(remote.remote_ref("refs/heads/tmp").is_none());
}

#[test]
fn delete_local_branch_keeps_remote() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    repo.checkout_branch("dev").unwrap();
    repo.checkout_branch("main").unwrap();

    repo.delete_local_branch("dev").unwrap();
    assert!(repo.branch("dev").is_err());
    assert!(remote.remote_ref("refs/heads/dev").is_some());
}

// =============================================================================
// Tags
// =============================================================================

#[test]
fn lightweight_and_annotated_tags() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();
    let head = repo.head().oid().unwrap().clone();

    let light = repo.create_tag("v1", "", None).unwrap();
    assert_eq!(light.target(), Some(&head));
    assert_eq!(light.refspecs()[0].to_string(), "+refs/tags/v1:refs/tags/v1");
    assert_eq!(light.push().unwrap(), SyncOutcome::Updated);
    assert_eq!(remote.remote_object_type("refs/tags/v1"), "commit");

    repo.create_tag("v2", "release 2", None)
        .unwrap()
        .push()
        .unwrap();
    assert_eq!(remote.remote_object_type("refs/tags/v2"), "tag");
    assert_eq!(
        remote.remote_ref("refs/tags/v2^{commit}").as_deref(),
        Some(head.as_str())
    );

    assert!(matches!(
        repo.create_tag("v1", "", None),
        Err(GitError::AlreadyExists { kind: "tag", .. })
    ));
}

#[test]
fn tag_push_moves_remote_tag_backwards() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    let first = repo.head().oid().unwrap().clone();

    repo.rewrite_file("next.txt", b"next\n").unwrap();
    let second = repo.commit("next").unwrap().unwrap();
    repo.create_tag("release", "", None).unwrap().push().unwrap();
    assert_eq!(remote.remote_ref("refs/tags/release").as_deref(), Some(second.as_str()));

    repo.delete_local_tag("release").unwrap();
    let moved = repo
        .create_tag("release", "", Some(first.as_str()))
        .unwrap();
    assert_eq!(moved.push().unwrap(), SyncOutcome::Updated);
    assert_eq!(remote.remote_ref("refs/tags/release").as_deref(), Some(first.as_str()));
}

#[test]
fn delete_tag_removes_local_and_remote() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();

    assert!(repo.tag("v0.1").is_ok());
    assert_eq!(repo.delete_tag("v0.1").unwrap(), SyncOutcome::Updated);
    assert!(remote.remote_ref("refs/tags/v0.1").is_none());
    assert!(matches!(
        repo.tag("v0.1"),
        Err(GitError::NotFound { kind: "tag", .. })
    ));
}

// =============================================================================
// Ignore
// =============================================================================

#[test]
fn ignore_patterns_and_queries() {
    let remote = TestRemote::new();
    let (client, _) = client();
    let repo = client.clone_ephemeral(&remote.url()).unwrap();

    assert_eq!(repo.ignore(&["*.log", "build/"]).unwrap(), 2);
    assert_eq!(repo.ignore(&["*.log"]).unwrap(), 0);

    assert!(repo.is_ignored_file("server.log").unwrap());
    assert!(!repo.is_ignored_file("README.md").unwrap());
    assert!(repo.is_ignored_dir("build").unwrap());

    // server.log is ignored and .gitignore is hidden, so neither blocks.
    std::fs::write(repo.root().join("server.log"), "noise\n").unwrap();
    assert!(repo.is_clean().unwrap());
}

// =============================================================================
// Logging
// =============================================================================

#[test]
fn every_operation_logs_one_line() {
    let remote = TestRemote::new();
    let (client, sink) = client();
    let mut repo = client.clone_ephemeral(&remote.url()).unwrap();
    assert_eq!(sink.lines().len(), 1);

    repo.checkout_branch("dev").unwrap();
    let _ = repo.checkout_branch("missing");
    repo.fetch().unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("[git] success! checkout, want: refs/heads/dev, branch: dev, hash: "));
    assert!(lines[2].starts_with("[git] failed! checkout, want: missing, branch: dev"));
    assert!(lines[2].ends_with("error: branch not found: missing"));
    assert!(lines[3].starts_with("[git] success! fetch (already up to date)"));
}

#[test]
fn missing_ssh_key_is_reported_once_asked_for() {
    let (client, sink) = client();
    assert!(matches!(client.ssh_key(), Err(GitError::Auth { .. })));
    assert!(sink.lines()[0].starts_with("[git] failed! auth, path: /nonexistent/id_rsa"));
}
