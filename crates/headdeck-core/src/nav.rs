// ── Derived navigation summary ──
//
// Pure functions from collection counts and the current path to the nav
// list and the selected entry. `Navigation` calls these on every change.

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::kind::{NavIcon, ResourceKind};

/// One row of the navigation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub kind: ResourceKind,
    pub label: &'static str,
    pub path: &'static str,
    pub icon: NavIcon,
    pub count: usize,
}

/// Current length of each collection's data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavCounts {
    pub users: usize,
    pub nodes: usize,
    pub routes: usize,
    pub api_keys: usize,
}

impl NavCounts {
    pub fn get(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Users => self.users,
            ResourceKind::Nodes => self.nodes,
            ResourceKind::Routes => self.routes,
            ResourceKind::ApiKeys => self.api_keys,
        }
    }
}

/// The fixed four-entry navigation list, in display order.
pub fn nav_entries(counts: &NavCounts) -> Vec<NavEntry> {
    ResourceKind::iter()
        .map(|kind| NavEntry {
            kind,
            label: kind.label(),
            path: kind.path(),
            icon: kind.icon(),
            count: counts.get(kind),
        })
        .collect()
}

/// The entry whose path equals `path` exactly, if any.
pub fn select(entries: &[NavEntry], path: &str) -> Option<NavEntry> {
    entries.iter().find(|e| e.path == path).cloned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn always_four_entries_in_fixed_order() {
        let entries = nav_entries(&NavCounts::default());
        let labels: Vec<_> = entries.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["Users", "Nodes", "Routes", "API Keys"]);
        assert!(entries.iter().all(|e| e.count == 0));
    }

    #[test]
    fn counts_land_on_their_entries() {
        let counts = NavCounts {
            users: 2,
            nodes: 3,
            routes: 0,
            api_keys: 1,
        };
        let entries = nav_entries(&counts);
        assert_eq!(
            entries.iter().map(|e| e.count).collect::<Vec<_>>(),
            vec![2, 3, 0, 1]
        );
    }

    #[test]
    fn select_matches_path_exactly() {
        let entries = nav_entries(&NavCounts::default());

        let nodes = select(&entries, "/nodes").map(|e| e.kind);
        assert_eq!(nodes, Some(ResourceKind::Nodes));

        assert_eq!(select(&entries, "/unknown"), None);
        assert_eq!(select(&entries, "/nodes/"), None);
        assert_eq!(select(&entries, "/api-keys").map(|e| e.icon), Some(NavIcon::BookKey));
    }
}
