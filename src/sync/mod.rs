//! Change-set resolution
//!
//! Scanned documents carry one content hash each, while articles are stored
//! once per specialty under `"{document id}-{specialty slug}"`. A document is
//! matched to the stored articles by that `"{id}-"` prefix.
//!
//! Known limitation: a document id that is a hyphen-prefix of another id
//! (`react` and `react-native`) can match the other document's articles.

mod change;

pub use change::{ChangeKind, ChangedDocument};

use crate::extract::Document;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::{debug, info, warn};

/// Source of previously persisted fingerprints (`article slug -> hash`)
pub trait HashSource {
    fn file_hashes(&self) -> anyhow::Result<BTreeMap<String, String>>;
}

impl HashSource for BTreeMap<String, String> {
    fn file_hashes(&self) -> anyhow::Result<BTreeMap<String, String>> {
        Ok(self.clone())
    }
}

/// Result of comparing a scan against the stored state
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Documents classified new or changed, in scan order
    pub to_update: Vec<Document>,
    /// Classification of every scanned document, in scan order
    pub entries: Vec<ChangedDocument>,
    pub total: usize,
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// Stored hashes could not be read and every document was marked changed
    pub degraded: bool,
}

/// Counts reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub total: usize,
    pub to_update: usize,
    pub unchanged: usize,
    pub new: usize,
    pub changed: usize,
}

impl ChangeSet {
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            total: self.total,
            to_update: self.to_update.len(),
            unchanged: self.unchanged,
            new: self.new,
            changed: self.changed,
        }
    }

    /// Whether anything needs to be persisted
    pub fn is_empty(&self) -> bool {
        self.to_update.is_empty()
    }

    fn push(&mut self, document: Document, kind: ChangeKind) {
        self.total += 1;
        match kind {
            ChangeKind::New => self.new += 1,
            ChangeKind::Changed => self.changed += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
        }

        self.entries.push(ChangedDocument {
            id: document.id.clone(),
            title: document.title.clone(),
            path: document.source_path.display().to_string(),
            kind,
        });

        if kind.needs_update() {
            self.to_update.push(document);
        }
    }
}

/// Stored hash of the first article (in slug order) belonging to `document_id`
pub fn stored_hash<'a>(stored: &'a BTreeMap<String, String>, document_id: &str) -> Option<&'a str> {
    let prefix = format!("{}-", document_id);
    stored
        .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
        .next()
        .filter(|(slug, _)| slug.starts_with(&prefix))
        .map(|(_, hash)| hash.as_str())
}

/// Classify one document against the stored hashes
pub fn classify_document(document: &Document, stored: &BTreeMap<String, String>) -> ChangeKind {
    match stored_hash(stored, &document.id) {
        None => ChangeKind::New,
        Some(hash) if hash == document.content_hash => ChangeKind::Unchanged,
        Some(_) => ChangeKind::Changed,
    }
}

/// Classify every document against the stored hashes
pub fn classify(documents: Vec<Document>, stored: &BTreeMap<String, String>) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for document in documents {
        let kind = classify_document(&document, stored);
        debug!("{} is {}", document.id, kind);
        changes.push(document, kind);
    }

    changes
}

/// Resolve which documents need persisting.
///
/// If the stored hashes cannot be read, every document is marked changed.
pub fn resolve_changes<S: HashSource + ?Sized>(documents: Vec<Document>, source: &S) -> ChangeSet {
    let changes = match source.file_hashes() {
        Ok(stored) => classify(documents, &stored),
        Err(e) => {
            warn!(
                "Could not read stored hashes, treating every document as changed: {:#}",
                e
            );
            let mut changes = ChangeSet {
                degraded: true,
                ..ChangeSet::default()
            };
            for document in documents {
                changes.push(document, ChangeKind::Changed);
            }
            changes
        }
    };

    info!(
        "Change set: {} total, {} to update, {} unchanged",
        changes.total,
        changes.to_update.len(),
        changes.unchanged
    );
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn doc(id: &str, hash: &str) -> Document {
        Document {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            description: String::new(),
            technology: "React".to_string(),
            specialty: "Frontend".to_string(),
            priority: 1,
            tags: Vec::new(),
            links: Vec::new(),
            content_hash: hash.to_string(),
            source_path: PathBuf::from(format!("docs/React/{}.md", id)),
        }
    }

    fn stored(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(slug, hash)| (slug.to_string(), hash.to_string()))
            .collect()
    }

    struct FailingSource;

    impl HashSource for FailingSource {
        fn file_hashes(&self) -> anyhow::Result<BTreeMap<String, String>> {
            anyhow::bail!("store unreachable")
        }
    }

    #[test]
    fn test_classify_new_changed_unchanged() {
        let stored = stored(&[("hooks-frontend", "h1"), ("state-frontend", "old")]);
        let docs = vec![doc("hooks", "h1"), doc("state", "new"), doc("router", "r1")];

        let changes = classify(docs, &stored);

        assert_eq!(changes.total, 3);
        assert_eq!(changes.unchanged, 1);
        assert_eq!(changes.changed, 1);
        assert_eq!(changes.new, 1);
        let ids: Vec<&str> = changes.to_update.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["state", "router"]);

        let kinds: Vec<ChangeKind> = changes.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ChangeKind::Unchanged, ChangeKind::Changed, ChangeKind::New]
        );
    }

    #[test]
    fn test_classify_multi_specialty_article() {
        let stored = stored(&[("git-backend", "g1"), ("git-frontend", "g1")]);
        let changes = classify(vec![doc("git", "g1")], &stored);
        assert_eq!(changes.unchanged, 1);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_prefix_requires_delimiter() {
        let stored = stored(&[("hooksy-frontend", "x")]);
        assert_eq!(stored_hash(&stored, "hooks"), None);
        assert_eq!(stored_hash(&stored, "hooksy"), Some("x"));
    }

    #[test]
    fn test_hyphen_prefixed_ids_can_collide() {
        // "react" matches the stored article of "react-native"
        let stored = stored(&[("react-native-mobile", "n1")]);
        assert_eq!(
            classify_document(&doc("react", "r1"), &stored),
            ChangeKind::Changed
        );
    }

    #[test]
    fn test_first_matching_slug_wins() {
        let stored = stored(&[("git-backend", "b"), ("git-frontend", "f")]);
        assert_eq!(stored_hash(&stored, "git"), Some("b"));
    }

    #[test]
    fn test_resolve_with_empty_store() {
        let changes = resolve_changes(
            vec![doc("a", "1"), doc("b", "2")],
            &BTreeMap::<String, String>::new(),
        );
        assert_eq!(changes.new, 2);
        assert_eq!(changes.summary().to_update, 2);
        assert!(!changes.degraded);
    }

    #[test]
    fn test_resolve_fails_open() {
        let changes = resolve_changes(vec![doc("a", "1"), doc("b", "2")], &FailingSource);

        assert!(changes.degraded);
        assert_eq!(changes.to_update.len(), 2);
        assert_eq!(changes.changed, 2);
        assert_eq!(changes.unchanged, 0);
    }

    #[test]
    fn test_change_kind_display() {
        assert_eq!(ChangeKind::New.to_string(), "new");
        assert_eq!(ChangeKind::Unchanged.to_string(), "unchanged");
        assert!(!ChangeKind::Unchanged.needs_update());
        assert!(ChangeKind::Changed.needs_update());
    }
}
