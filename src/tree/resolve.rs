//! Slug path resolution
//!
//! A navigation URL is a slug sequence (`/explore/10th-class/science/pcm`).
//! Resolution starts at the first key, in dataset order, whose whole composite
//! key slugifies to the first slug (roots in practice, but `10th-science`
//! reaches `10th/Science` directly), then walks down one child per remaining
//! slug. Every input yields exactly one [`Resolution`]; nothing here returns
//! an error.
//!
//! Siblings are scanned in stored order and the first slug match wins, so of
//! two siblings whose names slugify identically only the first is reachable.

use super::slug;
use super::{CareerTree, TreeEntry};

/// Outcome of resolving a slug sequence
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// No key matches the first slug, or a slug matches no child name of the
    /// current node
    NotFound,

    /// The slug names a listed child that has no entry yet (a ghost)
    Pending {
        /// Display name of the unmapped child, as listed by its parent
        name: &'a str,
        /// Last node that did resolve
        parent: &'a TreeEntry,
    },

    /// Every slug resolved to an entry
    Found {
        node: &'a TreeEntry,
        /// The entry that lists this node as a child, so names containing the
        /// key separator still get their real parent. Absent for roots and
        /// orphans.
        parent: Option<&'a TreeEntry>,
        /// The slug sequence that was resolved, for building links
        slugs: Vec<String>,
    },
}

impl Resolution<'_> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Pending { .. } => "pending",
            Self::Found { .. } => "found",
        }
    }
}

/// Resolve a slug sequence against the tree.
///
/// An empty sequence is `NotFound`.
pub fn resolve<'a, S: AsRef<str>>(tree: &'a CareerTree, slugs: &[S]) -> Resolution<'a> {
    let Some((first, rest)) = slugs.split_first() else {
        return Resolution::NotFound;
    };

    let Some(mut current) = tree
        .entries()
        .find(|entry| slug::matches(entry.key(), first.as_ref()))
    else {
        return Resolution::NotFound;
    };

    for target in rest {
        let target = target.as_ref();
        let Some(child) = current
            .children()
            .iter()
            .find(|child| slug::matches(&child.name, target))
        else {
            return Resolution::NotFound;
        };

        match child.target {
            Some(id) => current = tree.get(id),
            None => {
                return Resolution::Pending {
                    name: &child.name,
                    parent: current,
                }
            }
        }
    }

    Resolution::Found {
        node: current,
        parent: current.parent().map(|id| tree.get(id)),
        slugs: slugs.iter().map(|s| s.as_ref().to_string()).collect(),
    }
}

impl CareerTree {
    /// See [`resolve`]
    pub fn resolve<S: AsRef<str>>(&self, slugs: &[S]) -> Resolution<'_> {
        resolve(self, slugs)
    }

    /// Slug sequence that navigates to `entry`: one slug per ancestor name,
    /// root first. Follows parent links, so names containing the key
    /// separator still produce one slug each.
    pub fn slug_path(&self, entry: &TreeEntry) -> Vec<String> {
        let mut slugs = vec![slug::slugify(entry.name())];
        let mut current = entry;
        while let Some(parent) = current.parent() {
            current = self.get(parent);
            slugs.push(slug::slugify(current.name()));
        }
        slugs.reverse();
        slugs
    }
}

/// Site path for a slug sequence: `/explore/a/b`, or `/` when empty
pub fn explore_href<S: AsRef<str>>(slugs: &[S]) -> String {
    if slugs.is_empty() {
        return "/".to_string();
    }
    let joined: Vec<&str> = slugs.iter().map(|s| s.as_ref()).collect();
    format!("/explore/{}", joined.join("/"))
}
