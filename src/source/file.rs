//! Ticket source backed by a JSON export.
//!
//! The file is re-read on every fetch so edits show up on the next refresh.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::domain::Ticket;
use crate::source::{SourceError, TicketSource};

pub struct FileTicketSource {
    path: PathBuf,
}

impl FileTicketSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Ticket>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let tickets: Vec<Ticket> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %self.path.display(), tickets = tickets.len(), "Loaded ticket file");
        Ok(tickets)
    }
}

#[async_trait]
impl TicketSource for FileTicketSource {
    async fn fetch_all(&self) -> Result<Vec<Ticket>, SourceError> {
        self.load().await
    }

    async fn fetch_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, SourceError> {
        let mut tickets = self.load().await?;
        tickets.retain(|t| t.created_at >= start && t.created_at <= end);
        Ok(tickets)
    }

    async fn fetch_by_key(&self, key: &str) -> Result<Option<Ticket>, SourceError> {
        Ok(self.load().await?.into_iter().find(|t| t.key == key))
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use chrono::TimeZone;
    use std::io::Write;

    fn write_tickets(tickets: &[Ticket]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(tickets).unwrap().as_bytes())
            .unwrap();
        file
    }

    fn ticket_on(key: &str, day: u32) -> Ticket {
        Ticket::new(key, key, "Export row", User::new("c-1", "Customer"))
            .created(Utc.with_ymd_and_hms(2025, 4, day, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_reads_export() {
        let file = write_tickets(&[ticket_on("SUP-1", 1), ticket_on("SUP-2", 2)]);
        let source = FileTicketSource::new(file.path());

        let tickets = source.fetch_all().await.unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(
            source.fetch_by_key("SUP-2").await.unwrap().unwrap().key,
            "SUP-2"
        );
        assert!(source.fetch_by_key("SUP-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let file = write_tickets(&[
            ticket_on("SUP-1", 1),
            ticket_on("SUP-2", 2),
            ticket_on("SUP-3", 3),
        ]);
        let source = FileTicketSource::new(file.path());

        let start = Utc.with_ymd_and_hms(2025, 4, 2, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 4, 3, 12, 0, 0).unwrap();
        let tickets = source.fetch_by_date_range(start, end).await.unwrap();

        let keys: Vec<_> = tickets.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["SUP-2", "SUP-3"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileTicketSource::new(dir.path().join("absent.json"));

        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[tokio::test]
    async fn test_garbage_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not tickets").unwrap();

        let source = FileTicketSource::new(file.path());
        assert!(matches!(
            source.fetch_all().await.unwrap_err(),
            SourceError::Decode(_)
        ));
    }
}
