//! Classification of scanned documents against the stored state

use serde::Serialize;

/// How a scanned document relates to what is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// No stored article belongs to the document
    New,
    /// A stored article exists with a different content hash
    Changed,
    /// A stored article exists with the same content hash
    Unchanged,
}

impl ChangeKind {
    /// Whether documents of this kind have to be persisted again
    pub fn needs_update(&self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::New => write!(f, "new"),
            ChangeKind::Changed => write!(f, "changed"),
            ChangeKind::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Classification of one scanned document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedDocument {
    /// Document id
    pub id: String,
    pub title: String,
    /// File the document was read from
    pub path: String,
    pub kind: ChangeKind,
}
