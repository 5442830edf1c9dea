use lgit_core::app::{Command, CommandKind};
use lgit_core::domain::{CommitRecord, FileStatusEntry, Outcome};
use lgit_core::error::{CoreError, Result};
use lgit_core::ports::{RecentStore, RepositoryHandle, Revision, VcsProvider};
use lgit_core::protocol::{Request, Response};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single repository session: at most one open repository, commands run
/// one at a time against it.
pub struct RepositorySession {
    provider: Arc<dyn VcsProvider>,
    recent: Arc<dyn RecentStore>,
    repository: Option<Box<dyn RepositoryHandle>>,
}

impl RepositorySession {
    pub fn new(provider: Arc<dyn VcsProvider>, recent: Arc<dyn RecentStore>) -> Self {
        Self {
            provider,
            recent,
            repository: None,
        }
    }

    /// Path of the open repository, empty when none is open
    pub fn repository_path(&self) -> String {
        self.repository
            .as_ref()
            .map(|repo| repo.path().display().to_string())
            .unwrap_or_default()
    }

    /// Run one request and build its reply. Never fails: every error is
    /// turned into a failure outcome.
    pub fn dispatch(&mut self, request: &Request) -> Response {
        debug!(
            id = request.id,
            cmd = %request.cmd,
            args = request.args.len(),
            "Dispatching command"
        );

        let outcome = match self.execute(request) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(id = request.id, cmd = %request.cmd, code = %err.code(), "Command failed: {}", err);
                Outcome::from(err)
            }
        };

        Response::new(request, self.repository_path(), outcome)
    }

    fn execute(&mut self, request: &Request) -> Result<Outcome> {
        let command = request.command();

        let opens = matches!(&command, Ok(Command { kind: CommandKind::Open, .. }));
        if !opens && self.repository.is_none() {
            return Err(CoreError::NoRepository);
        }

        let command = match command {
            Ok(command) => command,
            Err(CoreError::UnknownCommand { token }) => {
                warn!("Ignoring unknown command '{}'", token);
                return Ok(Outcome::empty());
            }
            Err(err) => return Err(err),
        };

        match command.kind {
            CommandKind::Open => self.open(&command),
            CommandKind::Status => self.status(),
            CommandKind::Changes => self.changes(&command),
            CommandKind::Diff => self.diff(&command),
            CommandKind::Log => self.log(),
            CommandKind::Stage => self.stage(&command),
            CommandKind::Compare => self.compare(&command),
            CommandKind::Commit => self.commit(&command),
        }
    }

    fn repo(&self) -> Result<&dyn RepositoryHandle> {
        self.repository.as_deref().ok_or(CoreError::NoRepository)
    }

    fn repo_mut(&mut self) -> Result<&mut (dyn RepositoryHandle + 'static)> {
        self.repository.as_deref_mut().ok_or(CoreError::NoRepository)
    }

    /// Replace the open repository. A failed open keeps the previous one.
    fn open(&mut self, command: &Command) -> Result<Outcome> {
        let target = command.open_target();
        let handle = self.provider.open(&target).map_err(CoreError::port)?;
        let path = handle.path().to_path_buf();

        info!("Opened repository {}", path.display());
        self.repository = Some(handle);

        if let Err(e) = self.recent.add_path(&path) {
            warn!("Failed to record recent repository {}: {:#}", path.display(), e);
        }

        Ok(Outcome::empty())
    }

    fn status(&self) -> Result<Outcome> {
        let entries = self.repo()?.status().map_err(CoreError::port)?;
        status_records(&entries)
    }

    fn changes(&self, command: &Command) -> Result<Outcome> {
        let sha = command.required_arg(0, "commit sha")?;
        let entries = self.repo()?.commit_changes(sha).map_err(CoreError::port)?;
        status_records(&entries)
    }

    fn diff(&self, command: &Command) -> Result<Outcome> {
        let new_sha = command.required_arg(0, "new commit sha")?;
        let old_sha = command.required_arg(1, "old commit sha")?;
        let entries = self
            .repo()?
            .diff_commits(new_sha, old_sha)
            .map_err(CoreError::port)?;
        status_records(&entries)
    }

    fn log(&self) -> Result<Outcome> {
        let history = self.repo()?.history().map_err(CoreError::port)?;
        commit_records(&history)
    }

    fn stage(&mut self, command: &Command) -> Result<Outcome> {
        let paths: Vec<&str> = command
            .args
            .iter()
            .map(String::as_str)
            .filter(|path| !path.is_empty())
            .collect();

        let tree_id = self.repo_mut()?.stage(&paths).map_err(CoreError::port)?;
        info!("Staged {} path(s), tree {}", paths.len(), tree_id);
        Ok(Outcome::success(vec![tree_id]))
    }

    /// `[old, new]` contents of one file. With a new revision the sides are
    /// read from commits, otherwise HEAD is compared with the working tree.
    fn compare(&self, command: &Command) -> Result<Outcome> {
        let path = command.required_arg(0, "file path")?;
        let repo = self.repo()?;

        let read = |sha: &str| -> Result<String> {
            let content = repo
                .file_at(&Revision::Commit(sha.to_string()), path)
                .map_err(CoreError::port)?;
            Ok(content.unwrap_or_default())
        };

        let (old, new) = match command.arg(1) {
            Some(new_sha) => {
                let new = read(new_sha)?;
                let old = match command.arg(2) {
                    Some(old_sha) => read(old_sha)?,
                    None => String::new(),
                };
                (old, new)
            }
            None => {
                let old = repo
                    .file_at(&Revision::Head, path)
                    .map_err(CoreError::port)?
                    .unwrap_or_default();
                let new = repo.working_file(path).unwrap_or_default();
                (old, new)
            }
        };

        Ok(Outcome::success(vec![old, new]))
    }

    fn commit(&mut self, command: &Command) -> Result<Outcome> {
        // An explicitly empty message is allowed, a missing one is not
        let message = command
            .args
            .first()
            .ok_or_else(|| CoreError::MissingArgument {
                command: command.kind.to_string(),
                position: 0,
                name: "message",
            })?;

        let sha = self.repo_mut()?.commit(message).map_err(CoreError::port)?;
        info!("Created commit {}", sha);
        Ok(Outcome::success(vec![sha]))
    }
}

fn status_records(entries: &[FileStatusEntry]) -> Result<Outcome> {
    entries
        .iter()
        .map(FileStatusEntry::to_record)
        .collect::<Result<Vec<_>>>()
        .map(Outcome::success)
}

fn commit_records(commits: &[CommitRecord]) -> Result<Outcome> {
    commits
        .iter()
        .map(CommitRecord::to_record)
        .collect::<Result<Vec<_>>>()
        .map(Outcome::success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use lgit_core::domain::{RecentRepositories, StatusFlag, StatusFlags};
    use lgit_core::error::{ProviderError, E001};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// In-memory repository with canned answers
    struct StubRepository {
        path: PathBuf,
    }

    impl RepositoryHandle for StubRepository {
        fn path(&self) -> &Path {
            &self.path
        }

        fn status(&self) -> anyhow::Result<Vec<FileStatusEntry>> {
            Ok(vec![FileStatusEntry::new(
                "a.txt",
                StatusFlags::empty().with(StatusFlag::Deleted),
            )])
        }

        fn commit_changes(&self, sha: &str) -> anyhow::Result<Vec<FileStatusEntry>> {
            Err(anyhow::Error::new(ProviderError {
                code: "NotFound".to_string(),
                message: format!("revspec '{}' not found", sha),
            }))
        }

        fn diff_commits(&self, _new: &str, _old: &str) -> anyhow::Result<Vec<FileStatusEntry>> {
            Ok(Vec::new())
        }

        fn history(&self) -> anyhow::Result<Vec<CommitRecord>> {
            Ok(vec![CommitRecord::new("c1", "first", "Test", 1_000)])
        }

        fn stage(&mut self, paths: &[&str]) -> anyhow::Result<String> {
            Ok(paths.join(","))
        }

        fn commit(&mut self, message: &str) -> anyhow::Result<String> {
            Ok(format!("sha-of-{}", message))
        }

        fn file_at(&self, revision: &Revision, path: &str) -> anyhow::Result<Option<String>> {
            match revision {
                Revision::Head => Ok(Some(format!("head:{}", path))),
                Revision::Commit(sha) if sha == "missing" => Ok(None),
                Revision::Commit(sha) => Ok(Some(format!("{}:{}", sha, path))),
            }
        }

        fn working_file(&self, path: &str) -> Option<String> {
            Some(format!("worktree:{}", path))
        }
    }

    struct StubProvider;

    impl VcsProvider for StubProvider {
        fn open(&self, path: &Path) -> anyhow::Result<Box<dyn RepositoryHandle>> {
            if path.ends_with("not-a-repo") {
                return Err(anyhow!("could not find repository at '{}'", path.display()));
            }
            Ok(Box::new(StubRepository {
                path: path.to_path_buf(),
            }))
        }
    }

    #[derive(Default)]
    struct MemoryStore(Mutex<RecentRepositories>);

    impl RecentStore for MemoryStore {
        fn load(&self) -> anyhow::Result<RecentRepositories> {
            Ok(self.0.lock().map_err(|e| anyhow!("{e}"))?.clone())
        }

        fn save(&self, recent: &RecentRepositories) -> anyhow::Result<()> {
            *self.0.lock().map_err(|e| anyhow!("{e}"))? = recent.clone();
            Ok(())
        }
    }

    fn session() -> (RepositorySession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (RepositorySession::new(Arc::new(StubProvider), store.clone()), store)
    }

    fn send(session: &mut RepositorySession, command: Command) -> Response {
        session.dispatch(&Request::new(7, command))
    }

    fn failure_code(response: &Response) -> Option<&str> {
        match &response.result {
            Outcome::Failure { code, .. } => Some(code.as_str()),
            Outcome::Success(_) => None,
        }
    }

    fn raw(cmd: &str) -> Request {
        Request {
            id: 3,
            cmd: cmd.to_string(),
            args: Vec::new(),
            cwd: String::new(),
        }
    }

    #[test]
    fn test_commands_before_open_fail_with_e001() {
        let (mut session, _) = session();

        for command in [Command::status(), Command::log(), Command::commit("x")] {
            let response = send(&mut session, command);
            assert_eq!(response.id, 7);
            assert_eq!(response.repository, "");
            assert_eq!(
                response.result,
                Outcome::failure(E001, "Please open a git repository first.")
            );
        }
    }

    #[test]
    fn test_unknown_command_needs_a_repository_too() {
        let (mut session, _) = session();

        let response = session.dispatch(&raw("unstage"));
        assert_eq!(failure_code(&response), Some(E001));

        send(&mut session, Command::open("/repos/one"));
        let response = session.dispatch(&raw("unstage"));
        assert_eq!(response.cmd, "unstage");
        assert_eq!(response.repository, "/repos/one");
        assert_eq!(response.result, Outcome::empty());
    }

    #[test]
    fn test_open_records_recent_and_failed_open_keeps_previous() -> anyhow::Result<()> {
        let (mut session, store) = session();

        let response = send(&mut session, Command::open("/repos/one"));
        assert!(response.result.is_success());
        assert_eq!(response.repository, "/repos/one");

        let response = send(&mut session, Command::open("/repos/not-a-repo"));
        assert!(!response.result.is_success());
        assert_eq!(response.repository, "/repos/one");

        assert_eq!(store.load()?.paths(), &[PathBuf::from("/repos/one")]);
        Ok(())
    }

    #[test]
    fn test_open_without_argument_uses_cwd() {
        let (mut session, _) = session();
        let response = send(&mut session, Command::open_cwd("/work/here"));
        assert_eq!(response.repository, "/work/here");
    }

    #[test]
    fn test_status_renders_records() {
        let (mut session, _) = session();
        send(&mut session, Command::open("/r"));

        let response = send(&mut session, Command::status());
        assert_eq!(
            response.result,
            Outcome::success(vec![r#"{"file":"a.txt","status":"IGNORED"}"#.to_string()])
        );
    }

    #[test]
    fn test_provider_code_reaches_the_wire() {
        let (mut session, _) = session();
        send(&mut session, Command::open("/r"));

        let response = send(&mut session, Command::changes("deadbeef"));
        assert_eq!(
            response.result,
            Outcome::failure("NotFound", "revspec 'deadbeef' not found")
        );
    }

    #[test]
    fn test_missing_arguments_fail_with_eargs() {
        let (mut session, _) = session();
        send(&mut session, Command::open("/r"));

        let diff = Command::new(CommandKind::Diff, vec!["only-new".to_string()], "");
        let response = send(&mut session, diff);
        assert_eq!(failure_code(&response), Some("EARGS"));

        let commit = Command::new(CommandKind::Commit, Vec::new(), "");
        let response = send(&mut session, commit);
        assert_eq!(failure_code(&response), Some("EARGS"));
    }

    #[test]
    fn test_compare_modes() {
        let (mut session, _) = session();
        send(&mut session, Command::open("/r"));

        let working = send(&mut session, Command::compare("a.txt", None, None));
        assert_eq!(working.result.data(), Some(&["head:a.txt".to_string(), "worktree:a.txt".to_string()][..]));

        let root = send(&mut session, Command::compare("a.txt", Some("c1"), None));
        assert_eq!(root.result.data(), Some(&[String::new(), "c1:a.txt".to_string()][..]));

        let pair = send(&mut session, Command::compare("a.txt", Some("c2"), Some("missing")));
        assert_eq!(pair.result.data(), Some(&[String::new(), "c2:a.txt".to_string()][..]));
    }

    #[test]
    fn test_commit_accepts_empty_message() {
        let (mut session, _) = session();
        send(&mut session, Command::open("/r"));

        let response = send(&mut session, Command::commit(""));
        assert_eq!(response.result, Outcome::success(vec!["sha-of-".to_string()]));
    }

    #[test]
    fn test_stage_skips_empty_paths() {
        let (mut session, _) = session();
        send(&mut session, Command::open("/r"));

        let response = send(&mut session, Command::stage(["a.txt", "", "b.txt"]));
        assert_eq!(response.result, Outcome::success(vec!["a.txt,b.txt".to_string()]));
    }
}
