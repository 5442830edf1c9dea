use lgit_core::app::{Command, CommandKind, SelectionState};
use lgit_core::domain::{CommitRecord, FileStatusEntry, Outcome};
use lgit_core::protocol::{Request, RequestId, Response};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The client Model: everything a front end needs to render the session
#[derive(Debug, Default)]
pub struct ClientModel {
    /// Path reported by the last reply, empty before any repository is open
    pub repository_path: String,

    /// Selected commits and files
    pub selection: SelectionState,

    /// History as returned by the last `log`
    pub log: Vec<CommitRecord>,

    /// File list currently shown
    pub changes: Vec<FileStatusEntry>,

    /// What `changes` lists
    pub change_context: ChangeContext,

    /// Last file comparison
    pub comparison: Option<Comparison>,

    /// Informational message, e.g. a written tree or commit id
    pub info: Option<String>,

    /// Last failure as "code: message"
    pub error: Option<String>,

    /// In-flight requests by id
    pending: HashMap<RequestId, Command>,

    next_request_id: RequestId,
}

/// Source of the file list
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChangeContext {
    /// Working tree status
    #[default]
    Status,
    /// Changes of a commit, or between two commits
    Commit,
}

/// Both sides of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub path: String,
    pub old: String,
    pub new: String,
}

impl ClientModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next request id and remember the command until its reply
    pub fn prepare(&mut self, command: Command) -> Request {
        self.next_request_id += 1;
        let id = self.next_request_id;
        let request = Request::new(id, command.clone());
        self.pending.insert(id, command);
        request
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn clear_messages(&mut self) {
        self.info = None;
        self.error = None;
    }

    /// Fold a reply into the model. Replies to unknown or already answered
    /// ids are dropped. Returns the kind of the command that was applied.
    pub fn apply_response(&mut self, response: Response) -> Option<CommandKind> {
        let Some(command) = self.pending.remove(&response.id) else {
            warn!("Dropping reply {} ({}): no such request in flight", response.id, response.cmd);
            return None;
        };

        self.repository_path = response.repository;

        match response.result {
            Outcome::Failure { code, message } => {
                debug!("Request {} failed: {}: {}", response.id, code, message);
                self.error = Some(format!("{}: {}", code, message));
            }
            Outcome::Success(data) => self.apply_success(&command, data),
        }

        Some(command.kind)
    }

    fn apply_success(&mut self, command: &Command, data: Vec<String>) {
        match command.kind {
            CommandKind::Open => {
                self.log.clear();
                self.changes.clear();
                self.change_context = ChangeContext::Status;
                self.comparison = None;
                self.info = None;
                self.selection.reset();
            }
            CommandKind::Log => {
                match data
                    .iter()
                    .map(|r| CommitRecord::from_record(r))
                    .collect::<lgit_core::Result<Vec<_>>>()
                {
                    Ok(log) => {
                        self.log = log;
                        self.selection.retain_commits_in(&self.log);
                    }
                    Err(e) => self.error = Some(format!("{}: {}", e.code(), e)),
                }
            }
            CommandKind::Status => self.set_changes(&data, ChangeContext::Status),
            CommandKind::Changes | CommandKind::Diff => {
                self.set_changes(&data, ChangeContext::Commit)
            }
            CommandKind::Compare => {
                let mut sides = data.into_iter();
                self.comparison = Some(Comparison {
                    path: command.arg(0).unwrap_or_default().to_string(),
                    old: sides.next().unwrap_or_default(),
                    new: sides.next().unwrap_or_default(),
                });
            }
            CommandKind::Stage => {
                self.info = data.first().map(|tree| format!("Staged tree {}", tree));
            }
            CommandKind::Commit => {
                self.info = data.first().map(|sha| format!("Committed {}", sha));
            }
        }
    }

    fn set_changes(&mut self, data: &[String], context: ChangeContext) {
        match data
            .iter()
            .map(|r| FileStatusEntry::from_record(r))
            .collect::<lgit_core::Result<Vec<_>>>()
        {
            Ok(changes) => {
                self.changes = changes;
                self.change_context = context;
            }
            Err(e) => self.error = Some(format!("{}: {}", e.code(), e)),
        }
    }
}
