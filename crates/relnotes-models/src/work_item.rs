//! Work item types.
//!
//! A work item is created when it is fetched from the tracking service and
//! is mutated exactly once afterwards, when its generated note is attached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a work item in the tracking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(pub u64);

impl WorkItemId {
    /// Returns the raw numeric identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for WorkItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A work item flagged for release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Identifier in the tracking service.
    pub id: WorkItemId,

    /// Work item title.
    pub title: String,

    /// Work item description. May contain markup.
    #[serde(default)]
    pub description: String,

    /// Release note produced by the language model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_note: Option<String>,
}

impl WorkItem {
    /// Creates a work item without a generated note.
    pub fn new(
        id: impl Into<WorkItemId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            generated_note: None,
        }
    }

    /// Builder-style variant of [`WorkItem::attach_note`].
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.attach_note(note);
        self
    }

    /// Attaches the generated release note.
    pub fn attach_note(&mut self, note: impl Into<String>) {
        self.generated_note = Some(note.into());
    }

    /// Returns the generated note, or an empty string if none is attached yet.
    pub fn note(&self) -> &str {
        self.generated_note.as_deref().unwrap_or("")
    }

    /// Returns true once a note has been attached.
    pub fn has_note(&self) -> bool {
        self.generated_note.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_item_new() {
        let item = WorkItem::new(101, "Fix login bug", "Users cannot log in with SSO");
        assert_eq!(item.id, WorkItemId(101));
        assert_eq!(item.title, "Fix login bug");
        assert_eq!(item.description, "Users cannot log in with SSO");
        assert!(!item.has_note());
        assert_eq!(item.note(), "");
    }

    #[test]
    fn test_attach_note() {
        let mut item = WorkItem::new(7, "Title", "Description");
        item.attach_note("Resolved an SSO login failure.");
        assert!(item.has_note());
        assert_eq!(item.note(), "Resolved an SSO login failure.");
    }

    #[test]
    fn test_id_display() {
        assert_eq!(WorkItemId(4521).to_string(), "4521");
        assert_eq!(WorkItemId::from(12).get(), 12);
    }

    #[test]
    fn test_serialization() {
        let item = WorkItem::new(3, "Add export", "<div>CSV export</div>").with_note("Added CSV export.");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"id\":3"));

        let parsed: WorkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn test_note_omitted_when_absent() {
        let item = WorkItem::new(3, "Add export", "");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("generated_note"));
    }
}
