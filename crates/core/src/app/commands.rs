use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// The closed command vocabulary of a repository session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Open,
    Status,
    Changes,
    Diff,
    Log,
    Stage,
    Compare,
    Commit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 8] = [
        CommandKind::Open,
        CommandKind::Status,
        CommandKind::Changes,
        CommandKind::Diff,
        CommandKind::Log,
        CommandKind::Stage,
        CommandKind::Compare,
        CommandKind::Commit,
    ];

    pub fn token(self) -> &'static str {
        match self {
            CommandKind::Open => "open",
            CommandKind::Status => "status",
            CommandKind::Changes => "changes",
            CommandKind::Diff => "diff",
            CommandKind::Log => "log",
            CommandKind::Stage => "stage",
            CommandKind::Compare => "compare",
            CommandKind::Commit => "commit",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CommandKind {
    type Err = CoreError;

    fn from_str(token: &str) -> Result<Self> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.token() == token)
            .ok_or_else(|| CoreError::UnknownCommand {
                token: token.to_string(),
            })
    }
}

/// A command addressed to the repository session.
///
/// `args` is positional and kind-specific; `cwd` is the caller's working
/// directory, used by `Open` when no path argument is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub args: Vec<String>,
    pub cwd: String,
}

impl Command {
    pub fn new(kind: CommandKind, args: Vec<String>, cwd: impl Into<String>) -> Self {
        Self {
            kind,
            args,
            cwd: cwd.into(),
        }
    }

    pub fn open(path: impl Into<String>) -> Self {
        Self::new(CommandKind::Open, vec![path.into()], "")
    }

    /// Open whatever repository `cwd` points at
    pub fn open_cwd(cwd: impl Into<String>) -> Self {
        Self::new(CommandKind::Open, Vec::new(), cwd)
    }

    pub fn status() -> Self {
        Self::new(CommandKind::Status, Vec::new(), "")
    }

    pub fn changes(sha: impl Into<String>) -> Self {
        Self::new(CommandKind::Changes, vec![sha.into()], "")
    }

    /// Tree diff moving from `old_sha` to `new_sha`
    pub fn diff(new_sha: impl Into<String>, old_sha: impl Into<String>) -> Self {
        Self::new(CommandKind::Diff, vec![new_sha.into(), old_sha.into()], "")
    }

    pub fn log() -> Self {
        Self::new(CommandKind::Log, Vec::new(), "")
    }

    pub fn stage<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            CommandKind::Stage,
            paths.into_iter().map(Into::into).collect(),
            "",
        )
    }

    /// Compare `path` between two revisions. With no `new_sha` the comparison
    /// is HEAD against the working tree.
    pub fn compare(path: impl Into<String>, new_sha: Option<&str>, old_sha: Option<&str>) -> Self {
        let mut args = vec![path.into()];
        if let Some(new_sha) = new_sha {
            args.push(new_sha.to_string());
            if let Some(old_sha) = old_sha {
                args.push(old_sha.to_string());
            }
        }
        Self::new(CommandKind::Compare, args, "")
    }

    pub fn commit(message: impl Into<String>) -> Self {
        Self::new(CommandKind::Commit, vec![message.into()], "")
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Target directory of an `Open`: the first argument, else the caller's
    /// cwd. A relative argument is taken relative to the cwd when one is given.
    pub fn open_target(&self) -> PathBuf {
        match self.arg(0) {
            Some(path) if Path::new(path).is_relative() && !self.cwd.is_empty() => {
                Path::new(&self.cwd).join(path)
            }
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.cwd),
        }
    }

    /// Positional argument, treating an empty string as absent
    pub fn arg(&self, position: usize) -> Option<&str> {
        self.args
            .get(position)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Positional argument that must be present
    pub fn required_arg(&self, position: usize, name: &'static str) -> Result<&str> {
        self.arg(position).ok_or_else(|| CoreError::MissingArgument {
            command: self.kind.to_string(),
            position,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_parses_from_its_token() -> anyhow::Result<()> {
        for kind in CommandKind::ALL {
            assert_eq!(kind.token().parse::<CommandKind>()?, kind);
        }
        Ok(())
    }

    #[test]
    fn unknown_token_is_rejected() {
        let err = "unstage".parse::<CommandKind>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownCommand { ref token } if token == "unstage"));
        assert!("STATUS".parse::<CommandKind>().is_err());
    }

    #[test]
    fn compare_builder_omits_absent_revisions() {
        assert_eq!(Command::compare("a.txt", None, Some("x")).args, vec!["a.txt"]);
        assert_eq!(Command::compare("a.txt", Some("n"), None).args, vec!["a.txt", "n"]);
        assert_eq!(
            Command::compare("a.txt", Some("n"), Some("o")).args,
            vec!["a.txt", "n", "o"]
        );
    }

    #[test]
    fn empty_argument_counts_as_absent() {
        let cmd = Command::new(
            CommandKind::Compare,
            vec!["a.txt".to_string(), "abc".to_string(), String::new()],
            "",
        );
        assert_eq!(cmd.arg(1), Some("abc"));
        assert_eq!(cmd.arg(2), None);
        assert_eq!(cmd.arg(7), None);
    }

    #[test]
    fn open_target_prefers_argument_over_cwd() {
        assert_eq!(Command::open("/repo").with_cwd("/cwd").open_target(), PathBuf::from("/repo"));
        assert_eq!(Command::open_cwd("/cwd").open_target(), PathBuf::from("/cwd"));
    }

    #[test]
    fn relative_open_target_joins_cwd() {
        assert_eq!(
            Command::open("repo").with_cwd("/work").open_target(),
            PathBuf::from("/work/repo")
        );
        assert_eq!(Command::open("repo").open_target(), PathBuf::from("repo"));
    }

    #[test]
    fn missing_required_argument_names_the_command() {
        let err = Command::log().required_arg(0, "commit sha").unwrap_err();
        assert_eq!(err.code(), "EARGS");
        assert_eq!(err.to_string(), "Command 'log' requires argument #0 (commit sha)");
    }
}
