use serde::{Deserialize, Serialize};
use std::fmt;

/// A single classification bit for a file, shared by working-tree status and
/// commit-to-commit patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFlag {
    New,
    Modified,
    TypeChanged,
    Renamed,
    Ignored,
    Deleted,
}

impl StatusFlag {
    /// Declaration order, which is also the serialization order.
    pub const ALL: [StatusFlag; 6] = [
        StatusFlag::New,
        StatusFlag::Modified,
        StatusFlag::TypeChanged,
        StatusFlag::Renamed,
        StatusFlag::Ignored,
        StatusFlag::Deleted,
    ];

    fn bit(self) -> u8 {
        match self {
            StatusFlag::New => 1 << 0,
            StatusFlag::Modified => 1 << 1,
            StatusFlag::TypeChanged => 1 << 2,
            StatusFlag::Renamed => 1 << 3,
            StatusFlag::Ignored => 1 << 4,
            StatusFlag::Deleted => 1 << 5,
        }
    }

    /// Wire token. Deleted shares the IGNORED token; existing consumers read it
    /// that way.
    pub fn token(self) -> &'static str {
        match self {
            StatusFlag::New => "NEW",
            StatusFlag::Modified => "MODIFIED",
            StatusFlag::TypeChanged => "TYPECHANGE",
            StatusFlag::Renamed => "RENAMED",
            StatusFlag::Ignored | StatusFlag::Deleted => "IGNORED",
        }
    }

    /// Parse a wire token. `IGNORED` always reads back as `Ignored`, and
    /// `DELETED` is accepted for forward compatibility.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "NEW" => Some(StatusFlag::New),
            "MODIFIED" => Some(StatusFlag::Modified),
            "TYPECHANGE" => Some(StatusFlag::TypeChanged),
            "RENAMED" => Some(StatusFlag::Renamed),
            "IGNORED" => Some(StatusFlag::Ignored),
            "DELETED" => Some(StatusFlag::Deleted),
            _ => None,
        }
    }
}

/// Set of [`StatusFlag`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, flag: StatusFlag) {
        self.0 |= flag.bit();
    }

    pub fn with(mut self, flag: StatusFlag) -> Self {
        self.insert(flag);
        self
    }

    pub fn contains(&self, flag: StatusFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = StatusFlag> + '_ {
        StatusFlag::ALL.into_iter().filter(|flag| self.contains(*flag))
    }

    /// Space-joined tokens in declaration order.
    pub fn to_tokens(&self) -> String {
        self.iter()
            .map(StatusFlag::token)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a space-joined token list; unknown tokens are skipped.
    pub fn from_tokens(tokens: &str) -> Self {
        tokens
            .split_whitespace()
            .filter_map(StatusFlag::from_token)
            .fold(Self::empty(), Self::with)
    }
}

impl FromIterator<StatusFlag> for StatusFlags {
    fn from_iter<I: IntoIterator<Item = StatusFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tokens())
    }
}

/// One file in a status listing or a change list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatusEntry {
    #[serde(rename = "file")]
    pub path: String,
    #[serde(rename = "status", with = "flags_as_tokens")]
    pub flags: StatusFlags,
}

impl FileStatusEntry {
    pub fn new(path: impl Into<String>, flags: StatusFlags) -> Self {
        Self {
            path: path.into(),
            flags,
        }
    }

    /// Serialize to the record string carried in a result's data.
    pub fn to_record(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_record(record: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(record)?)
    }
}

mod flags_as_tokens {
    use super::StatusFlags;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flags: &StatusFlags, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&flags.to_tokens())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StatusFlags, D::Error> {
        let tokens = String::deserialize(deserializer)?;
        Ok(StatusFlags::from_tokens(&tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_follow_declaration_order() {
        let flags = StatusFlags::empty()
            .with(StatusFlag::Renamed)
            .with(StatusFlag::New);
        assert_eq!(flags.to_tokens(), "NEW RENAMED");
    }

    #[test]
    fn deleted_renders_as_ignored() {
        let flags = StatusFlags::empty().with(StatusFlag::Deleted);
        assert_eq!(flags.to_tokens(), "IGNORED");

        let both = StatusFlags::empty()
            .with(StatusFlag::Ignored)
            .with(StatusFlag::Deleted);
        assert_eq!(both.to_tokens(), "IGNORED IGNORED");
    }

    #[test]
    fn empty_flags_render_as_empty_string() {
        assert_eq!(StatusFlags::empty().to_tokens(), "");
        assert!(StatusFlags::from_tokens("").is_empty());
    }

    #[test]
    fn parse_tokens_skips_unknown() {
        let flags = StatusFlags::from_tokens("MODIFIED WHATEVER TYPECHANGE");
        assert!(flags.contains(StatusFlag::Modified));
        assert!(flags.contains(StatusFlag::TypeChanged));
        assert_eq!(flags.iter().count(), 2);
    }

    #[test]
    fn entry_record_uses_file_and_status_keys() -> anyhow::Result<()> {
        let entry = FileStatusEntry::new("src/lib.rs", StatusFlags::empty().with(StatusFlag::Modified));
        let record = entry.to_record()?;
        assert_eq!(record, r#"{"file":"src/lib.rs","status":"MODIFIED"}"#);

        let parsed = FileStatusEntry::from_record(&record)?;
        assert_eq!(parsed, entry);
        Ok(())
    }
}
