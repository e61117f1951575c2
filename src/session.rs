//! Session naming and per-session file numbering
//!
//! A session is a named capture context. Every artifact produced while it is
//! active is named `{safe}.{nnn}.{ext}` and stored under `{safe}/`, where
//! `safe` is the session name with everything outside `[A-Za-z0-9\- ]`
//! replaced by `_` and `nnn` is a 1-based, zero-padded counter that is never
//! reused within the session, even across restarts: numbering resumes after
//! the highest number already present.

use crate::errors::StudioError;
use crate::storage::FileStore;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Map a raw session name to its filesystem-safe form
pub fn safe_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Default session name: product name plus local date and time to the minute
pub fn default_session_name<Tz: TimeZone>(product_name: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{} {}", product_name, now.format("%Y-%m-%d %H:%M"))
}

/// Sequence number of `entry` if it is named `{safe}.{n}.{ext}`
fn label_number(safe: &str, entry: &str) -> Option<u32> {
    let rest = entry.strip_prefix(safe)?.strip_prefix('.')?;
    let (digits, _) = rest.split_once('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// File name and directory of one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactName {
    /// Session directory (the safe session name)
    pub directory: String,
    /// `{safe}.{nnn}.{ext}`
    pub file_name: String,
}

impl ArtifactName {
    /// `{directory}/{file_name}`, relative to the files root
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.directory, self.file_name)
    }
}

/// The active session and its file counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    name: String,
    counter: u32,
}

impl Session {
    /// Start a session with a fresh counter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counter: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn safe_name(&self) -> String {
        safe_name(&self.name)
    }

    /// Number of labels handed out since the last reset (plus any seeded entries)
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Rename the session. Returns `Ok(false)` when the trimmed name is unchanged.
    ///
    /// A changed name resets the counter; with a file store the counter is seeded
    /// from the entries already in the session directory (created if missing).
    pub fn set_name(&mut self, raw: &str, files: Option<&dyn FileStore>) -> Result<bool, StudioError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StudioError::InvalidInput(
                "Session name must not be empty".to_string(),
            ));
        }
        if trimmed == self.name {
            return Ok(false);
        }

        log::info!("Session renamed from {:?} to {:?}", self.name, trimmed);
        self.name = trimmed.to_string();
        self.reset_counter(files)?;
        Ok(true)
    }

    /// Reset the counter, seeding it from the session directory when a file store is given
    pub fn reset_counter(&mut self, files: Option<&dyn FileStore>) -> Result<(), StudioError> {
        self.counter = 0;

        let Some(files) = files else {
            return Ok(());
        };

        let dir = self.safe_name();
        match files.read_dir(&dir)? {
            Some(entries) => {
                self.skip_existing(entries.iter().map(String::as_str));
                log::debug!(
                    "Session directory {:?} is numbered up to {:03}",
                    dir,
                    self.counter
                );
            }
            None => {
                files.mkdir(&dir)?;
                log::debug!("Created session directory {:?}", dir);
            }
        }
        Ok(())
    }

    /// Move the counter past the highest `{safe}.{n}.{ext}` name in `entries`.
    /// Names of other sessions and anything else in the listing are ignored.
    pub fn skip_existing<'a>(&mut self, entries: impl IntoIterator<Item = &'a str>) {
        let safe = self.safe_name();
        if let Some(highest) = entries
            .into_iter()
            .filter_map(|entry| label_number(&safe, entry))
            .max()
        {
            self.counter = self.counter.max(highest);
        }
    }

    /// Consume the next sequence number: "001", "002", ...
    pub fn next_file_label(&mut self) -> String {
        self.counter = self.counter.saturating_add(1);
        format!("{:03}", self.counter)
    }

    /// Consume the next label and build the artifact name for an extension
    pub fn next_artifact_name(&mut self, extension: &str) -> ArtifactName {
        let safe = self.safe_name();
        let label = self.next_file_label();
        ArtifactName {
            file_name: format!("{}.{}.{}", safe, label, extension),
            directory: safe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalFileStore;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_safe_name_replaces_disallowed_characters() {
        assert_eq!(safe_name("Test Run"), "Test Run");
        assert_eq!(safe_name("EndoStudio 2026-10-18 14:05"), "EndoStudio 2026-10-18 14_05");
        assert_eq!(safe_name("a/b\\c.d"), "a_b_c_d");
        assert_eq!(safe_name("Pipe #3 é"), "Pipe _3 _");
    }

    #[test]
    fn test_labels_start_at_001_and_increase() {
        let mut session = Session::new("Inspection");
        assert_eq!(session.next_file_label(), "001");
        assert_eq!(session.next_file_label(), "002");
        assert_eq!(session.next_file_label(), "003");
    }

    #[test]
    fn test_labels_widen_past_999() {
        let mut session = Session::new("Long");
        for _ in 0..999 {
            session.next_file_label();
        }
        assert_eq!(session.next_file_label(), "1000");
    }

    #[test]
    fn test_rename_resets_counter() {
        let mut session = Session::new("First");
        session.next_file_label();
        session.next_file_label();

        assert!(session.set_name("Second", None).unwrap());
        assert_eq!(session.next_file_label(), "001");
    }

    #[test]
    fn test_same_name_keeps_counter() {
        let mut session = Session::new("Same");
        session.next_file_label();
        assert!(!session.set_name("  Same  ", None).unwrap());
        assert_eq!(session.next_file_label(), "002");
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut session = Session::new("Keep");
        assert!(session.set_name("   ", None).is_err());
        assert_eq!(session.name(), "Keep");
    }

    #[test]
    fn test_rename_seeds_counter_from_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileStore::new(dir.path());
        files.create("Pipe/Pipe.001.jpeg", b"x").unwrap();
        files.create("Pipe/Pipe.002.mp4", b"y").unwrap();

        let mut session = Session::new("Other");
        session.set_name("Pipe", Some(&files)).unwrap();
        assert_eq!(session.next_file_label(), "003");
    }

    #[test]
    fn test_seeding_skips_past_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileStore::new(dir.path());
        files.create("Pipe/Pipe.001.jpeg", b"ONE").unwrap();
        files.create("Pipe/Pipe.003.jpeg", b"THREE").unwrap();

        let mut session = Session::new("Other");
        session.set_name("Pipe", Some(&files)).unwrap();
        let next = session.next_artifact_name("jpeg");
        assert_eq!(next.file_name, "Pipe.004.jpeg");

        // The existing numbers stay untouched
        assert!(files.create(&next.relative_path(), b"NEW").is_ok());
        assert_eq!(std::fs::read(dir.path().join("Pipe/Pipe.003.jpeg")).unwrap(), b"THREE");
    }

    #[test]
    fn test_seeding_ignores_unrelated_entries() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileStore::new(dir.path());
        files.mkdir("Pipe/raw").unwrap();
        files.create("Pipe/notes.txt", b"n").unwrap();
        files.create("Pipe/Other.007.jpeg", b"o").unwrap();
        files.create("Pipe/Pipe.x01.jpeg", b"o").unwrap();

        let mut session = Session::new("Other");
        session.set_name("Pipe", Some(&files)).unwrap();
        assert_eq!(session.next_file_label(), "001");
    }

    #[test]
    fn test_skip_existing_only_moves_forward() {
        let mut session = Session::new("Test Run");
        for _ in 0..5 {
            session.next_file_label();
        }
        session.skip_existing(["Test Run.002.jpeg", "Test Run 2.009.jpeg"]);
        assert_eq!(session.next_file_label(), "006");

        session.skip_existing(["Test Run.011.mp4"]);
        assert_eq!(session.next_file_label(), "012");
    }

    #[test]
    fn test_rename_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileStore::new(dir.path());

        let mut session = Session::new("Other");
        session.set_name("Fresh", Some(&files)).unwrap();
        assert!(dir.path().join("Fresh").is_dir());
        assert_eq!(session.next_file_label(), "001");
    }

    #[test]
    fn test_artifact_name() {
        let mut session = Session::new("Test Run");
        let name = session.next_artifact_name("jpeg");
        assert_eq!(name.file_name, "Test Run.001.jpeg");
        assert_eq!(name.relative_path(), "Test Run/Test Run.001.jpeg");
    }

    #[test]
    fn test_default_session_name() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 10, 18, 14, 5, 37).unwrap();
        assert_eq!(
            default_session_name("EndoStudio", &now),
            "EndoStudio 2026-10-18 14:05"
        );
    }
}
