//! Eager-load lists.
//!
//! An eager-load list is the `with` list of a fetch call: relation names or
//! dotted paths such as `"comments.user"`. Each resolution level consumes the
//! entry naming the relation it loads and hands the remainder of matching
//! paths to the next level.

use serde::{Deserialize, Serialize};

/// How entries that do not continue the matched path are treated when the
/// list is handed to the next level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrunePolicy {
    /// Replace them with an empty marker that never matches a relation.
    #[default]
    BlankUnmatched,
    /// Remove them.
    DropUnmatched,
}

/// The ordered `with` list of a fetch call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EagerLoad(Vec<String>);

impl EagerLoad {
    /// Create an empty list (no relations are loaded).
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an entry.
    pub fn with(mut self, path: impl Into<String>) -> Self {
        self.0.push(path.into());
        self
    }

    /// The raw entries, including empty markers.
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Check whether the list has no entry that could match a relation.
    pub fn is_exhausted(&self) -> bool {
        self.0.iter().all(|entry| entry.is_empty())
    }

    /// Check whether an entry equals `name` exactly.
    pub fn contains(&self, name: &str) -> bool {
        !name.is_empty() && self.0.iter().any(|entry| entry == name)
    }

    /// Pick the entry selecting a relation: its target name first, then the
    /// field it is attached under.
    pub fn matched<'a>(&self, relation: &'a str, local_field: &'a str) -> Option<&'a str> {
        if self.contains(relation) {
            Some(relation)
        } else if self.contains(local_field) {
            Some(local_field)
        } else {
            None
        }
    }

    /// Derive the list for the level below the relation matched by `name`.
    ///
    /// The first entry equal to `name` is removed; every other entry of the
    /// form `name.rest` becomes `rest`; the remaining entries are handled
    /// according to `policy`.
    pub fn descend(&self, name: &str, policy: PrunePolicy) -> EagerLoad {
        let mut entries = self.0.clone();
        if let Some(pos) = entries.iter().position(|entry| entry == name) {
            entries.remove(pos);
        }

        let entries = entries.into_iter().filter_map(|entry| {
            match entry
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('.'))
            {
                Some(rest) => Some(rest.to_string()),
                None => match policy {
                    PrunePolicy::BlankUnmatched => Some(String::new()),
                    PrunePolicy::DropUnmatched => None,
                },
            }
        });

        EagerLoad(entries.collect())
    }
}

impl<S: Into<String>> FromIterator<S> for EagerLoad {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for EagerLoad {
    fn from(entries: Vec<String>) -> Self {
        Self(entries)
    }
}

impl From<&[&str]> for EagerLoad {
    fn from(entries: &[&str]) -> Self {
        entries.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_prefers_relation_name() {
        let spec = EagerLoad::from(&["user", "author"][..]);
        assert_eq!(spec.matched("user", "author"), Some("user"));
        assert_eq!(spec.matched("profile", "author"), Some("author"));
        assert_eq!(spec.matched("profile", "avatar"), None);
    }

    #[test]
    fn test_descend_blanks_unrelated_entries() {
        let spec = EagerLoad::from(&["user", "user.profile", "post", "post.user"][..]);

        let below_user = spec.descend("user", PrunePolicy::BlankUnmatched);
        assert_eq!(below_user.entries(), &["profile", "", ""]);

        let below_post = spec.descend("post", PrunePolicy::BlankUnmatched);
        assert_eq!(below_post.entries(), &["", "", "user"]);
    }

    #[test]
    fn test_descend_drop_policy() {
        let spec = EagerLoad::from(&["comment", "comment.user", "comment.user.profile", "user"][..]);

        let below = spec.descend("comment", PrunePolicy::DropUnmatched);
        assert_eq!(below.entries(), &["user", "user.profile"]);

        let deeper = below.descend("user", PrunePolicy::DropUnmatched);
        assert_eq!(deeper.entries(), &["profile"]);
    }

    #[test]
    fn test_descend_requires_dot_boundary() {
        let spec = EagerLoad::from(&["post", "posts.user", "post.user"][..]);
        let below = spec.descend("post", PrunePolicy::DropUnmatched);
        assert_eq!(below.entries(), &["user"]);
    }

    #[test]
    fn test_empty_markers_never_match() {
        let spec = EagerLoad::from(&["", ""][..]);
        assert!(spec.is_exhausted());
        assert!(!spec.contains(""));
        assert_eq!(spec.matched("", ""), None);
    }
}
