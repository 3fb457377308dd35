//! Which threads a WebSocket connection follows.

use std::collections::BTreeSet;

use crate::domain::ThreadId;

/// Thread ids named in one `subscribe`/`unsubscribe` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadSelection {
    /// Parsed thread ids, in command order.
    pub ids: Vec<ThreadId>,
    /// `true` if the command contained `"*"`.
    pub every_thread: bool,
}

impl ThreadSelection {
    /// Parses raw command ids. Entries that are neither `"*"` nor an
    /// integer are skipped.
    #[must_use]
    pub fn parse(raw: &[String]) -> Self {
        let mut selection = Self::default();
        for entry in raw {
            if entry.trim() == "*" {
                selection.every_thread = true;
            } else if let Ok(id) = entry.parse::<ThreadId>() {
                selection.ids.push(id);
            }
        }
        selection
    }
}

/// Event filter of one connection. A fresh connection follows nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadFilter {
    /// Only events of these threads are forwarded.
    Threads(BTreeSet<ThreadId>),
    /// Every board event is forwarded.
    Everything,
}

impl Default for ThreadFilter {
    fn default() -> Self {
        Self::Threads(BTreeSet::new())
    }
}

impl ThreadFilter {
    /// Starts following the selected threads.
    pub fn follow(&mut self, selection: &ThreadSelection) {
        if selection.every_thread {
            *self = Self::Everything;
            return;
        }
        if let Self::Threads(ids) = self {
            ids.extend(selection.ids.iter().copied());
        }
    }

    /// Stops following the selected threads.
    ///
    /// `"*"` clears the filter entirely. Single ids cannot be carved out of
    /// [`ThreadFilter::Everything`] and are ignored there.
    pub fn unfollow(&mut self, selection: &ThreadSelection) {
        if selection.every_thread {
            *self = Self::default();
            return;
        }
        if let Self::Threads(ids) = self {
            for id in &selection.ids {
                ids.remove(id);
            }
        }
    }

    /// Returns `true` if events of `thread_id` should be forwarded.
    #[must_use]
    pub fn admits(&self, thread_id: ThreadId) -> bool {
        match self {
            Self::Threads(ids) => ids.contains(&thread_id),
            Self::Everything => true,
        }
    }

    /// JSON form used in command replies: a sorted id list, or `"*"`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Threads(ids) => serde_json::json!(ids),
            Self::Everything => serde_json::json!("*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(raw: &[&str]) -> ThreadSelection {
        let raw: Vec<String> = raw.iter().map(|s| (*s).to_string()).collect();
        ThreadSelection::parse(&raw)
    }

    #[test]
    fn fresh_filter_admits_nothing() {
        let filter = ThreadFilter::default();
        assert!(!filter.admits(ThreadId::from(1)));
        assert_eq!(filter.to_json(), serde_json::json!([]));
    }

    #[test]
    fn selection_skips_garbage() {
        let selection = select(&["4", "x", " * ", "5"]);
        assert_eq!(selection.ids, vec![ThreadId::from(4), ThreadId::from(5)]);
        assert!(selection.every_thread);
    }

    #[test]
    fn follows_only_named_threads() {
        let mut filter = ThreadFilter::default();
        filter.follow(&select(&["7", "3", "7"]));
        assert!(filter.admits(ThreadId::from(7)));
        assert!(!filter.admits(ThreadId::from(8)));
        assert_eq!(filter.to_json(), serde_json::json!([3, 7]));

        filter.unfollow(&select(&["7"]));
        assert!(!filter.admits(ThreadId::from(7)));
        assert!(filter.admits(ThreadId::from(3)));
    }

    #[test]
    fn star_follows_everything_until_star_unfollowed() {
        let mut filter = ThreadFilter::default();
        filter.follow(&select(&["2"]));
        filter.follow(&select(&["*"]));
        assert!(filter.admits(ThreadId::from(99)));

        filter.unfollow(&select(&["2"]));
        assert_eq!(filter, ThreadFilter::Everything);

        filter.follow(&select(&["5"]));
        assert_eq!(filter.to_json(), serde_json::json!("*"));

        filter.unfollow(&select(&["*"]));
        assert!(!filter.admits(ThreadId::from(2)));
        assert_eq!(filter, ThreadFilter::default());
    }
}
