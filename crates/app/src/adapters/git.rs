use anyhow::{Context, Result};
use git2::{
    Commit, Delta, Diff, ErrorCode, Index, Oid, Repository as GitRepository, Sort, Status,
    StatusOptions,
};
use lgit_core::domain::{CommitRecord, FileStatusEntry, StatusFlag, StatusFlags};
use lgit_core::error::ProviderError;
use lgit_core::ports::{RepositoryHandle, Revision, VcsProvider};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Provider-level knobs, filled from the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GitOptions {
    /// Branch whose tip starts the history walk
    pub primary_branch: Option<String>,
    /// Also list ignored files in status
    pub include_ignored: bool,
}

/// Git adapter that implements VcsProvider using git2
#[derive(Debug, Default)]
pub struct GitAdapter {
    options: GitOptions,
}

impl GitAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GitOptions) -> Self {
        Self { options }
    }
}

impl VcsProvider for GitAdapter {
    fn open(&self, path: &Path) -> Result<Box<dyn RepositoryHandle>> {
        Ok(Box::new(GitRepositoryHandle::open(path, self.options.clone())?))
    }
}

/// One open git2 repository
pub struct GitRepositoryHandle {
    repo: GitRepository,
    path: PathBuf,
    options: GitOptions,
}

impl GitRepositoryHandle {
    pub fn open(path: &Path, options: GitOptions) -> Result<Self> {
        let repo = GitRepository::open(path)
            .with_git_context(|| format!("Failed to open git repository at {}", path.display()))?;

        let root = repo.workdir().unwrap_or_else(|| repo.path());
        let canonical = dunce::canonicalize(root)
            .with_context(|| format!("Failed to resolve repository path {}", root.display()))?;

        Ok(Self {
            repo,
            path: canonical,
            options,
        })
    }

    fn find_commit(&self, spec: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(spec)
            .and_then(|object| object.peel_to_commit())
            .with_git_context(|| format!("Failed to find commit {}", spec))
    }

    /// HEAD's commit, `None` on an unborn branch
    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(reference) => reference
                .peel_to_commit()
                .map(Some)
                .git_context("Failed to resolve HEAD commit"),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e).git_context("Failed to read HEAD"),
        }
    }

    /// Tip of the configured primary branch, else master, main, then HEAD
    fn primary_tip(&self) -> Result<Oid> {
        if let Some(branch) = &self.options.primary_branch {
            return self
                .repo
                .refname_to_id(&format!("refs/heads/{}", branch))
                .with_git_context(|| format!("Primary branch '{}' not found", branch));
        }

        for branch in ["master", "main"] {
            if let Ok(oid) = self.repo.refname_to_id(&format!("refs/heads/{}", branch)) {
                return Ok(oid);
            }
        }

        self.repo
            .head()
            .and_then(|reference| reference.peel_to_commit())
            .map(|commit| commit.id())
            .git_context("Failed to resolve a branch to read history from")
    }

    fn relative_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            let normalized = dunce::simplified(path);
            normalized
                .strip_prefix(&self.path)
                .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
        } else {
            path.to_path_buf()
        }
    }

    fn apply_to_index(&self, index: &mut Index, paths: &[&str]) -> Result<()> {
        let workdir = self.repo.workdir();
        for path in paths {
            let relative = self.relative_path(path);
            let on_disk = workdir
                .map(|root| root.join(&relative).symlink_metadata().is_ok())
                .unwrap_or(false);

            if !on_disk && index.get_path(&relative, 0).is_some() {
                debug!("Staging deletion of {}", relative.display());
                index
                    .remove_path(&relative)
                    .with_git_context(|| format!("Failed to stage deletion of {}", path))?;
            } else {
                index
                    .add_path(&relative)
                    .with_git_context(|| format!("Failed to stage {}", path))?;
            }
        }
        Ok(())
    }
}

impl RepositoryHandle for GitRepositoryHandle {
    fn path(&self) -> &Path {
        &self.path
    }

    fn status(&self) -> Result<Vec<FileStatusEntry>> {
        let mut status_options = StatusOptions::new();
        status_options.include_untracked(true);
        status_options.recurse_untracked_dirs(true);
        status_options.include_ignored(self.options.include_ignored);

        let statuses = self
            .repo
            .statuses(Some(&mut status_options))
            .git_context("Failed to get git status")?;

        Ok(statuses
            .iter()
            .map(|entry| {
                FileStatusEntry::new(
                    String::from_utf8_lossy(entry.path_bytes()).into_owned(),
                    status_flags(entry.status()),
                )
            })
            .collect())
    }

    fn commit_changes(&self, sha: &str) -> Result<Vec<FileStatusEntry>> {
        let commit = self.find_commit(sha)?;
        let tree = commit.tree().git_context("Failed to read commit tree")?;

        let parent_tree = if commit.parent_count() > 0 {
            let parent = commit
                .parent(0)
                .with_git_context(|| format!("Failed to read first parent of {}", sha))?;
            Some(parent.tree().git_context("Failed to read parent tree")?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .with_git_context(|| format!("Failed to diff commit {}", sha))?;

        Ok(diff_entries(&diff))
    }

    fn diff_commits(&self, new_sha: &str, old_sha: &str) -> Result<Vec<FileStatusEntry>> {
        let new_tree = self
            .find_commit(new_sha)?
            .tree()
            .git_context("Failed to read new commit tree")?;
        let old_tree = self
            .find_commit(old_sha)?
            .tree()
            .git_context("Failed to read old commit tree")?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .with_git_context(|| format!("Failed to diff {} against {}", new_sha, old_sha))?;

        Ok(diff_entries(&diff))
    }

    fn history(&self) -> Result<Vec<CommitRecord>> {
        let tip = self.primary_tip()?;

        let mut revwalk = self.repo.revwalk().git_context("Failed to start history walk")?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .git_context("Failed to sort history walk")?;
        revwalk.push(tip).git_context("Failed to push history tip")?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid.git_context("Failed to walk history")?;
            let commit = self
                .repo
                .find_commit(oid)
                .with_git_context(|| format!("Failed to read commit {}", oid))?;
            let author = commit.author();

            commits.push(CommitRecord::new(
                oid.to_string(),
                String::from_utf8_lossy(commit.message_bytes()),
                String::from_utf8_lossy(author.name_bytes()),
                commit.time().seconds() * 1000,
            ));
        }

        Ok(commits)
    }

    fn stage(&mut self, paths: &[&str]) -> Result<String> {
        let mut index = self.repo.index().git_context("Failed to open index")?;
        index.read(false).git_context("Failed to refresh index")?;

        let staged = self.apply_to_index(&mut index, paths).and_then(|()| {
            index.write().git_context("Failed to write index")?;
            index.write_tree().git_context("Failed to write tree from index")
        });

        match staged {
            Ok(tree_id) => Ok(tree_id.to_string()),
            Err(e) => {
                // Drop in-memory additions so later writes don't pick them up
                if let Err(reload) = index.read(true) {
                    warn!("Failed to reload index after staging error: {}", reload);
                }
                Err(e)
            }
        }
    }

    fn commit(&mut self, message: &str) -> Result<String> {
        let signature = self
            .repo
            .signature()
            .git_context("Failed to build signature from repository config")?;

        let mut index = self.repo.index().git_context("Failed to open index")?;
        index.read(false).git_context("Failed to refresh index")?;
        let tree_id = index.write_tree().git_context("Failed to write tree from index")?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .git_context("Failed to read written tree")?;

        let parent = self.head_commit()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .git_context("Failed to create commit")?;

        Ok(oid.to_string())
    }

    fn file_at(&self, revision: &Revision, path: &str) -> Result<Option<String>> {
        let commit = match revision {
            Revision::Head => match self.head_commit()? {
                Some(commit) => commit,
                None => return Ok(None),
            },
            Revision::Commit(spec) => self.find_commit(spec)?,
        };

        let tree = commit.tree().git_context("Failed to read commit tree")?;
        let content = tree
            .get_path(&self.relative_path(path))
            .and_then(|entry| entry.to_object(&self.repo))
            .and_then(|object| object.peel_to_blob())
            .map(|blob| String::from_utf8_lossy(blob.content()).into_owned());

        match content {
            Ok(content) => Ok(Some(content)),
            Err(e) => {
                debug!("{} not readable at {:?}: {}", path, revision, e.message());
                Ok(None)
            }
        }
    }

    fn working_file(&self, path: &str) -> Option<String> {
        let root = self.repo.workdir()?;
        fs::read(root.join(self.relative_path(path)))
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Map a working tree/index status onto the shared flag set
pub fn status_flags(status: Status) -> StatusFlags {
    let mut flags = StatusFlags::empty();
    if status.intersects(Status::INDEX_NEW | Status::WT_NEW) {
        flags.insert(StatusFlag::New);
    }
    if status.intersects(Status::INDEX_MODIFIED | Status::WT_MODIFIED) {
        flags.insert(StatusFlag::Modified);
    }
    if status.intersects(Status::INDEX_TYPECHANGE | Status::WT_TYPECHANGE) {
        flags.insert(StatusFlag::TypeChanged);
    }
    if status.intersects(Status::INDEX_RENAMED | Status::WT_RENAMED) {
        flags.insert(StatusFlag::Renamed);
    }
    if status.contains(Status::IGNORED) {
        flags.insert(StatusFlag::Ignored);
    }
    if status.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
        flags.insert(StatusFlag::Deleted);
    }
    flags
}

/// Map a patch delta onto the shared flag set
pub fn delta_flags(delta: Delta) -> StatusFlags {
    let flag = match delta {
        Delta::Added => StatusFlag::New,
        Delta::Modified => StatusFlag::Modified,
        Delta::Typechange => StatusFlag::TypeChanged,
        Delta::Renamed => StatusFlag::Renamed,
        Delta::Ignored => StatusFlag::Ignored,
        Delta::Deleted => StatusFlag::Deleted,
        _ => return StatusFlags::empty(),
    };
    StatusFlags::empty().with(flag)
}

fn diff_entries(diff: &Diff<'_>) -> Vec<FileStatusEntry> {
    diff.deltas()
        .map(|delta| {
            let file = delta.new_file();
            let path = file
                .path_bytes()
                .or_else(|| delta.old_file().path_bytes())
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default();
            FileStatusEntry::new(path, delta_flags(delta.status()))
        })
        .collect()
}

fn provider_error(e: git2::Error) -> anyhow::Error {
    anyhow::Error::new(ProviderError {
        code: format!("{:?}", e.code()),
        message: e.message().to_string(),
    })
}

/// `anyhow::Context` for git2 results that keeps the git error code
trait GitContext<T> {
    fn git_context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn with_git_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> GitContext<T> for std::result::Result<T, git2::Error> {
    fn git_context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| provider_error(e).context(context))
    }

    fn with_git_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| provider_error(e).context(f()))
    }
}
