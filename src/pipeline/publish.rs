// src/pipeline/publish.rs

//! Diff artifact publishing.
//!
//! Runs at most once per run, after all URLs are processed, and only
//! when at least one diff artifact was produced. Git plumbing beyond
//! stage/commit/push stays inside `git2`.

use std::path::{Path, PathBuf};

use git2::{Repository, Signature, StatusOptions};

use crate::error::Result;
use crate::models::PublishConfig;
use crate::storage::StorePaths;

/// Publishes the run's artifacts. The orchestrator catches failures
/// and degrades them to a log warning.
pub trait DiffPublisher: Send + Sync {
    fn publish(&self, date: &str) -> Result<()>;
}

/// Commits and pushes over a git working copy rooted at the base
/// directory.
///
/// Staging rule: untracked files are picked up only under the output
/// root (the diff artifacts); tracked files are staged wherever they
/// changed, which covers the metadata file, the live store and the
/// daily log.
pub struct GitPublisher {
    base: PathBuf,
    output_prefix: PathBuf,
    remote: String,
    commit_prefix: String,
}

impl GitPublisher {
    pub fn new(paths: &StorePaths, config: &PublishConfig) -> Self {
        let output_prefix = paths
            .output_dir()
            .strip_prefix(paths.base())
            .unwrap_or(paths.output_dir())
            .to_path_buf();
        Self {
            base: paths.base().to_path_buf(),
            output_prefix,
            remote: config.remote.clone(),
            commit_prefix: config.commit_prefix.clone(),
        }
    }

    /// Stage per the publishing rule and return how many paths were
    /// staged.
    fn stage(&self, repo: &Repository) -> Result<usize> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .include_ignored(false)
            .recurse_untracked_dirs(true);

        let statuses = repo.statuses(Some(&mut opts))?;
        let mut index = repo.index()?;
        let mut staged = 0;

        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let status = entry.status();

            if status.is_wt_new() {
                if Path::new(path).starts_with(&self.output_prefix) {
                    index.add_path(Path::new(path))?;
                    staged += 1;
                }
            } else if status.is_wt_modified() {
                index.add_path(Path::new(path))?;
                staged += 1;
            } else if status.is_wt_deleted() {
                index.remove_path(Path::new(path))?;
                staged += 1;
            }
        }

        index.write()?;
        Ok(staged)
    }

    fn signature(repo: &Repository) -> Result<Signature<'static>> {
        // Fall back when no user.name/email is configured (CI, cron).
        repo.signature()
            .or_else(|_| Signature::now("docwatch", "docwatch@localhost"))
            .map_err(Into::into)
    }
}

impl DiffPublisher for GitPublisher {
    fn publish(&self, date: &str) -> Result<()> {
        let repo = Repository::open(&self.base)?;
        self.stage(&repo)?;

        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                log::debug!("Nothing staged; skipping commit");
                return Ok(());
            }
        }

        let sig = Self::signature(&repo)?;
        let parents: Vec<_> = parent.iter().collect();
        let message = format!("{} {date}", self.commit_prefix);
        repo.commit(Some("HEAD"), &sig, &sig, &message, &tree, &parents)?;

        let head = repo.head()?;
        let branch = head.shorthand().unwrap_or("HEAD");
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        repo.find_remote(&self.remote)?.push(&[refspec], None)?;

        log::info!("Pushed '{message}' to {}", self.remote);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PathsConfig;
    use tempfile::TempDir;

    /// Work repo wired to a local bare remote named `origin`.
    fn setup() -> (TempDir, Repository) {
        let tmp = TempDir::new().unwrap();
        let bare = tmp.path().join("remote.git");
        Repository::init_bare(&bare).unwrap();

        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let repo = Repository::init(&work).unwrap();
        repo.remote("origin", bare.to_str().unwrap()).unwrap();
        (tmp, repo)
    }

    fn publisher_for(repo: &Repository) -> GitPublisher {
        let paths = StorePaths::resolve(repo.workdir().unwrap(), &PathsConfig::default());
        GitPublisher::new(&paths, &PublishConfig::default())
    }

    fn write(repo: &Repository, rel: &str, text: &str) {
        let path = repo.workdir().unwrap().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    fn commit_all(repo: &Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("test", "test@localhost").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parents: Vec<_> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    fn head_tree_paths(repo: &Repository) -> Vec<String> {
        let tree = repo.head().unwrap().peel_to_tree().unwrap();
        let mut paths = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                paths.push(format!("{dir}{}", entry.name().unwrap()));
            }
            git2::TreeWalkResult::Ok
        })
        .unwrap();
        paths.sort();
        paths
    }

    #[test]
    fn test_stages_artifacts_and_tracked_updates_only() {
        let (_tmp, repo) = setup();

        write(&repo, "status.json", "{}");
        commit_all(&repo, "baseline");

        write(&repo, "out/a/2023-01-02.html", "<html>diff</html>");
        write(&repo, "status.json", "{\"a.html\":{}}");
        write(&repo, "stray.txt", "not published");

        publisher_for(&repo).publish("2023-01-02").unwrap();

        let paths = head_tree_paths(&repo);
        assert!(paths.contains(&"out/a/2023-01-02.html".to_string()));
        assert!(paths.contains(&"status.json".to_string()));
        assert!(!paths.contains(&"stray.txt".to_string()));

        let message = repo
            .head()
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .message()
            .unwrap()
            .to_string();
        assert_eq!(message, "Changes from 2023-01-02");
    }

    #[test]
    fn test_pushes_to_bare_remote() {
        let (tmp, repo) = setup();

        write(&repo, "out/a/2023-01-02.html", "<html>diff</html>");
        publisher_for(&repo).publish("2023-01-02").unwrap();

        let bare = Repository::open_bare(tmp.path().join("remote.git")).unwrap();
        let pushed = bare.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(pushed.message().unwrap(), "Changes from 2023-01-02");
    }

    #[test]
    fn test_missing_remote_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        write(&repo, "out/a/2023-01-02.html", "diff");

        let paths = StorePaths::resolve(repo.workdir().unwrap(), &PathsConfig::default());
        let publisher = GitPublisher::new(&paths, &PublishConfig::default());
        assert!(publisher.publish("2023-01-02").is_err());
    }

    #[test]
    fn test_nothing_to_commit_is_ok() {
        let (_tmp, repo) = setup();
        write(&repo, "status.json", "{}");
        commit_all(&repo, "baseline");

        let before = repo.head().unwrap().peel_to_commit().unwrap().id();
        publisher_for(&repo).publish("2023-01-02").unwrap();
        let after = repo.head().unwrap().peel_to_commit().unwrap().id();
        assert_eq!(before, after);
    }
}
