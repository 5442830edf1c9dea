use serde::{Deserialize, Serialize};

/// One entry of the commit history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "author")]
    pub author_name: String,
    /// Commit time in milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
}

impl CommitRecord {
    pub fn new(
        sha: impl Into<String>,
        message: impl Into<String>,
        author_name: impl Into<String>,
        timestamp_millis: i64,
    ) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author_name: author_name.into(),
            timestamp_millis,
        }
    }

    pub fn to_record(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_record(record: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_wire_keys() -> anyhow::Result<()> {
        let commit = CommitRecord::new("abc123", "Initial commit\n", "Test User", 1_700_000_000_000);
        let value: serde_json::Value = serde_json::from_str(&commit.to_record()?)?;

        assert_eq!(value["sha"], "abc123");
        assert_eq!(value["msg"], "Initial commit\n");
        assert_eq!(value["author"], "Test User");
        assert_eq!(value["timestamp"], 1_700_000_000_000_i64);
        Ok(())
    }
}
