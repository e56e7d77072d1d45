// ── Navigation state ──
//
// Holds the current view path and the derived nav list / selection.
// Also the `Navigator` the API client uses to send the user to setup.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use headdeck_api::Navigator;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::nav::{NavCounts, NavEntry, nav_entries, select};

/// Shared navigation state. Cheap to clone; clones observe the same
/// path, entries and selection.
#[derive(Clone)]
pub struct Navigation {
    inner: Arc<NavigationInner>,
}

struct NavigationInner {
    path: watch::Sender<String>,
    entries: watch::Sender<Arc<Vec<NavEntry>>>,
    selected: watch::Sender<Option<NavEntry>>,
    /// Bumped on every `replace`. Fetches started under an older epoch
    /// must not publish their results.
    epoch: AtomicU64,
}

impl std::fmt::Debug for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigation")
            .field("path", &*self.inner.path.borrow())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

impl Navigation {
    pub fn new(initial_path: impl Into<String>) -> Self {
        let path = initial_path.into();
        let entries = nav_entries(&NavCounts::default());
        let selected = select(&entries, &path);

        let (path_tx, _) = watch::channel(path);
        let (entries_tx, _) = watch::channel(Arc::new(entries));
        let (selected_tx, _) = watch::channel(selected);

        Self {
            inner: Arc::new(NavigationInner {
                path: path_tx,
                entries: entries_tx,
                selected: selected_tx,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    // ── Path changes ─────────────────────────────────────────────────

    /// Ordinary navigation (history push). In-flight fetches stay valid.
    pub fn navigate(&self, path: &str) {
        debug!(path, "navigate");
        self.set_path(path);
    }

    fn set_path(&self, path: &str) {
        self.inner.path.send_if_modified(|current| {
            if current == path {
                false
            } else {
                path.clone_into(current);
                true
            }
        });
        self.refresh_selection();
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn current_path(&self) -> String {
        self.inner.path.borrow().clone()
    }

    pub fn entries(&self) -> Arc<Vec<NavEntry>> {
        self.inner.entries.borrow().clone()
    }

    pub fn selected(&self) -> Option<NavEntry> {
        self.inner.selected.borrow().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_path(&self) -> watch::Receiver<String> {
        self.inner.path.subscribe()
    }

    pub fn subscribe_entries(&self) -> watch::Receiver<Arc<Vec<NavEntry>>> {
        self.inner.entries.subscribe()
    }

    pub fn subscribe_selected(&self) -> watch::Receiver<Option<NavEntry>> {
        self.inner.selected.subscribe()
    }

    // ── Derivation ───────────────────────────────────────────────────

    pub(crate) fn update_counts(&self, counts: NavCounts) {
        let fresh = nav_entries(&counts);
        self.inner.entries.send_if_modified(|current| {
            if **current == fresh {
                false
            } else {
                *current = Arc::new(fresh);
                true
            }
        });
        self.refresh_selection();
    }

    fn refresh_selection(&self) {
        let entries = self.entries();
        let path = self.current_path();
        let next = select(&entries, &path);
        self.inner.selected.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for Navigation {
    fn replace(&self, path: &str) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        info!(path, epoch, "redirecting");
        self.set_path(path);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::kind::ResourceKind;

    use super::*;

    #[test]
    fn selection_follows_path() {
        let nav = Navigation::new("/");
        assert!(nav.selected().is_none());

        nav.navigate("/routes");
        assert_eq!(nav.selected().unwrap().kind, ResourceKind::Routes);

        nav.navigate("/elsewhere");
        assert!(nav.selected().is_none());
    }

    #[test]
    fn replace_bumps_epoch_but_navigate_does_not() {
        let nav = Navigation::new("/nodes");
        nav.navigate("/users");
        assert_eq!(nav.epoch(), 0);

        nav.replace("/setup");
        assert_eq!(nav.epoch(), 1);
        assert_eq!(nav.current_path(), "/setup");
        assert!(nav.selected().is_none());
    }

    #[test]
    fn selected_entry_tracks_counts() {
        let nav = Navigation::new("/nodes");
        nav.update_counts(NavCounts {
            nodes: 3,
            ..NavCounts::default()
        });
        assert_eq!(nav.selected().unwrap().count, 3);
        assert_eq!(nav.entries()[1].count, 3);
    }

    #[test]
    fn unchanged_counts_do_not_notify() {
        let nav = Navigation::new("/");
        let mut rx = nav.subscribe_entries();
        rx.borrow_and_update();

        nav.update_counts(NavCounts::default());
        assert!(!rx.has_changed().unwrap());

        nav.update_counts(NavCounts {
            users: 1,
            ..NavCounts::default()
        });
        assert!(rx.has_changed().unwrap());
    }
}
