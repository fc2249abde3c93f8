//! Directory navigation state machine.
//!
//! Every navigation is split in three steps so the slow part can run off the
//! UI loop: `begin_*` checks the guards and issues a [`NavTicket`],
//! [`NavigationController::execute`] performs the `cd` + `ls` round trips, and
//! [`NavigationController::apply`] folds the outcome back in. Only the most
//! recently issued ticket may change state; anything older is dropped.

use super::dispatcher::CommandDispatcher;
use super::error::ExplorerError;
use super::path::{join_child, matches_wire};
use super::types::{
    ApplyOutcome, DirectoryListing, FileEntry, NavKind, NavStatus, NavTicket, WirePath,
};

#[derive(Debug)]
pub struct NavigationController {
    status: NavStatus,
    listing: DirectoryListing,
    history: Vec<String>,
    last_error: Option<ExplorerError>,
    seq: u64,
    failed: Option<NavTicket>,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationController {
    pub fn new() -> Self {
        Self {
            status: NavStatus::Idle,
            listing: DirectoryListing::missing(),
            history: Vec::new(),
            last_error: None,
            seq: 0,
            failed: None,
        }
    }

    pub fn status(&self) -> NavStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == NavStatus::Loading
    }

    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&ExplorerError> {
        self.last_error.as_ref()
    }

    pub fn current_path(&self) -> &str {
        &self.listing.path
    }

    pub fn can_go_back(&self) -> bool {
        self.history.len() > 1 && !self.is_loading()
    }

    /// Argument for downloading `entry` from the current directory
    pub fn file_target(&self, entry: &FileEntry) -> WirePath {
        join_child(&self.listing.path, &entry.name)
    }

    fn issue(&mut self, kind: NavKind, target: Option<WirePath>) -> NavTicket {
        self.seq += 1;
        self.status = NavStatus::Loading;
        self.last_error = None;
        let ticket = NavTicket {
            seq: self.seq,
            kind,
            target,
        };
        tracing::info!(
            "Navigation #{} {:?} -> {}",
            ticket.seq,
            ticket.kind,
            ticket.target.as_ref().map(WirePath::as_str).unwrap_or("(ls)")
        );
        ticket
    }

    /// First listing of the agent's starting directory. Always allowed; supersedes
    /// anything in flight.
    pub fn begin_initial(&mut self) -> NavTicket {
        self.issue(NavKind::Initial, None)
    }

    /// Re-list the current directory without `cd`
    pub fn begin_refresh(&mut self) -> Option<NavTicket> {
        if self.is_loading() {
            return None;
        }
        if self.history.is_empty() {
            return Some(self.begin_initial());
        }
        Some(self.issue(NavKind::Refresh, None))
    }

    /// Descend into a directory entry of the current listing
    pub fn begin_open(&mut self, entry: &FileEntry) -> Option<NavTicket> {
        if self.is_loading() || !entry.is_dir || self.history.is_empty() {
            return None;
        }
        let target = join_child(&self.listing.path, &entry.name);
        Some(self.issue(NavKind::Open, Some(target)))
    }

    /// Return to the previous directory in history
    pub fn begin_back(&mut self) -> Option<NavTicket> {
        if !self.can_go_back() {
            return None;
        }
        let previous = &self.history[self.history.len() - 2];
        let target = WirePath::from_display(previous);
        Some(self.issue(NavKind::Back, Some(target)))
    }

    /// Jump to a path typed by the operator
    pub fn begin_manual(&mut self, typed: &str) -> Option<NavTicket> {
        let typed = typed.trim();
        if self.is_loading() || typed.is_empty() {
            return None;
        }
        Some(self.issue(NavKind::Manual, Some(WirePath::from_display(typed))))
    }

    /// Re-issue the navigation that put the controller into `Error`
    pub fn retry(&mut self) -> Option<NavTicket> {
        if self.status != NavStatus::Error {
            return None;
        }
        let failed = self.failed.take()?;
        Some(self.issue(failed.kind, failed.target))
    }

    /// Perform the remote round trips for `ticket`: `cd` when it has a target,
    /// then `ls`. Touches no controller state.
    pub async fn execute(
        dispatcher: &CommandDispatcher,
        ticket: &NavTicket,
    ) -> Result<DirectoryListing, ExplorerError> {
        if let Some(target) = &ticket.target {
            let reported = dispatcher.change_directory(target).await?;
            if !matches_wire(&reported, target) {
                tracing::warn!(
                    "cd {} landed in {:?}; using the agent's listing as-is",
                    target,
                    reported
                );
            }
        }
        let listing = dispatcher.list().await?;
        if listing.path.trim().is_empty() {
            return Err(ExplorerError::Protocol(
                "agent listing did not report a path".to_string(),
            ));
        }
        Ok(listing)
    }

    /// Fold the outcome of `ticket` into the navigation state
    pub fn apply(
        &mut self,
        ticket: &NavTicket,
        result: Result<DirectoryListing, ExplorerError>,
    ) -> ApplyOutcome {
        if ticket.seq != self.seq {
            tracing::warn!(
                "Dropping stale result of navigation #{} (latest is #{})",
                ticket.seq,
                self.seq
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(listing) => {
                let path = listing.path.clone();
                match ticket.kind {
                    NavKind::Initial => self.history = vec![path],
                    NavKind::Open => self.history.push(path),
                    NavKind::Back => {
                        if self.history.len() > 1 {
                            self.history.pop();
                        }
                        self.replace_top(path);
                    }
                    NavKind::Manual | NavKind::Refresh => self.replace_top(path),
                }
                tracing::info!(
                    "Navigation #{} done: {} ({} entries, history {})",
                    ticket.seq,
                    listing.path,
                    listing.entries.len(),
                    self.history.len()
                );
                self.listing = listing;
                self.status = NavStatus::Ready;
                self.last_error = None;
                self.failed = None;
                ApplyOutcome::Applied
            }
            Err(err) => {
                tracing::error!("Navigation #{} failed: {}", ticket.seq, err);
                self.listing.entries.clear();
                self.status = NavStatus::Error;
                self.last_error = Some(err.clone());
                self.failed = Some(ticket.clone());
                ApplyOutcome::Failed(err)
            }
        }
    }

    fn replace_top(&mut self, path: String) {
        match self.history.last_mut() {
            Some(top) => *top = path,
            None => self.history.push(path),
        }
    }
}

/// Inline drivers: begin, execute and apply in one call
#[cfg(test)]
impl NavigationController {
    pub async fn run(&mut self, dispatcher: &CommandDispatcher, ticket: NavTicket) -> ApplyOutcome {
        let result = Self::execute(dispatcher, &ticket).await;
        self.apply(&ticket, result)
    }

    pub async fn load(&mut self, dispatcher: &CommandDispatcher) -> ApplyOutcome {
        let ticket = self.begin_initial();
        self.run(dispatcher, ticket).await
    }

    pub async fn open_directory(
        &mut self,
        dispatcher: &CommandDispatcher,
        entry: &FileEntry,
    ) -> Option<ApplyOutcome> {
        let ticket = self.begin_open(entry)?;
        Some(self.run(dispatcher, ticket).await)
    }

    pub async fn go_back(&mut self, dispatcher: &CommandDispatcher) -> Option<ApplyOutcome> {
        let ticket = self.begin_back()?;
        Some(self.run(dispatcher, ticket).await)
    }

    pub async fn enter_path(
        &mut self,
        dispatcher: &CommandDispatcher,
        typed: &str,
    ) -> Option<ApplyOutcome> {
        let ticket = self.begin_manual(typed)?;
        Some(self.run(dispatcher, ticket).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::transport::MockTransport;
    use std::sync::Arc;

    fn listing_text(path: &str, names: &[(&str, bool)]) -> String {
        let mut out = format!("Path: \"{}\"\nExists: true\ntimezone: \"IST\"\ntimezoneOffset: 19800\n", path);
        for (name, is_dir) in names {
            out.push_str(&format!(
                "Files {{\nName: \"{}\"\nIsDir: {}\nSize: 0\nModTime: 1700000000\nMode: \"drwxr-xr-x\"\n}}\n",
                name, is_dir
            ));
        }
        out
    }

    fn setup() -> (Arc<MockTransport>, CommandDispatcher) {
        let transport = Arc::new(MockTransport::default());
        (transport.clone(), CommandDispatcher::new(transport))
    }

    fn dir(name: &str) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            is_dir: true,
            ..FileEntry::default()
        }
    }

    async fn loaded(transport: &MockTransport, dispatcher: &CommandDispatcher) -> NavigationController {
        transport.push_text("ls", &listing_text(r"C:\Users\alice", &[("logs", true), ("a.txt", false)]));
        let mut nav = NavigationController::new();
        assert_eq!(nav.load(dispatcher).await, ApplyOutcome::Applied);
        nav
    }

    #[tokio::test]
    async fn initial_load_seeds_history() {
        let (transport, dispatcher) = setup();
        let nav = loaded(&transport, &dispatcher).await;
        assert_eq!(nav.status(), NavStatus::Ready);
        assert_eq!(nav.history(), [r"C:\Users\alice"]);
        assert_eq!(nav.listing().entries.len(), 2);
        assert!(!nav.can_go_back());
    }

    #[tokio::test]
    async fn open_directory_pushes_reported_path() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        transport.push_text(r"cd,C:\\Users\\alice\\logs", "Path: \"C:\\Users\\alice\\logs\"\n");
        // Agent reports a different canonical spelling than the one computed locally
        transport.push_text("ls", &listing_text(r"C:\USERS\alice\logs", &[]));

        let outcome = nav.open_directory(&dispatcher, &dir("logs")).await;
        assert_eq!(outcome, Some(ApplyOutcome::Applied));
        assert_eq!(
            transport.sent(),
            vec!["ls", r"cd,C:\\Users\\alice\\logs", "ls"]
        );
        assert_eq!(nav.history().len(), 2);
        assert_eq!(nav.history().last().unwrap(), r"C:\USERS\alice\logs");
    }

    #[tokio::test]
    async fn failed_list_after_cd_keeps_history() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        transport.push_text(r"cd,C:\\Users\\alice\\logs", "Path: \"C:\\Users\\alice\\logs\"\n");
        transport.push_failure("ls", Some(200), "StatusCode.UNKNOWN");

        let outcome = nav.open_directory(&dispatcher, &dir("logs")).await.unwrap();
        assert!(matches!(outcome, ApplyOutcome::Failed(ExplorerError::RemoteUnknown { .. })));
        assert_eq!(nav.history().len(), 1);
        assert!(nav.listing().entries.is_empty());
        assert_eq!(nav.current_path(), r"C:\Users\alice");
        assert_eq!(nav.status(), NavStatus::Error);
        assert!(nav.last_error().is_some());
    }

    #[tokio::test]
    async fn cd_without_path_aborts_before_listing() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        transport.push_text(r"cd,C:\\Users\\alice\\logs", "Exists: false\n");

        let outcome = nav.open_directory(&dispatcher, &dir("logs")).await.unwrap();
        assert!(matches!(outcome, ApplyOutcome::Failed(ExplorerError::Protocol(_))));
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn missing_directory_listing_still_advances() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        transport.push_text(r"cd,C:\\Users\\alice\\logs", "Path: \"C:\\Users\\alice\\logs\"\n");
        transport.push_text("ls", "Path: \"C:\\Users\\alice\\logs\"\nExists: false\n");

        let outcome = nav.open_directory(&dispatcher, &dir("logs")).await.unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(nav.history().len(), 2);
        assert!(!nav.listing().exists);
    }

    #[tokio::test]
    async fn back_restores_previous_length() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        assert!(nav.go_back(&dispatcher).await.is_none());

        transport.push_text(r"cd,C:\\Users\\alice\\logs", "Path: \"C:\\Users\\alice\\logs\"\n");
        transport.push_text("ls", &listing_text(r"C:\Users\alice\logs", &[]));
        nav.open_directory(&dispatcher, &dir("logs")).await.unwrap();
        assert!(nav.can_go_back());

        transport.push_text(r"cd,C:\\Users\\alice", "Path: \"C:\\Users\\alice\"\n");
        transport.push_text("ls", &listing_text(r"C:\Users\alice", &[("logs", true)]));
        assert_eq!(nav.go_back(&dispatcher).await, Some(ApplyOutcome::Applied));
        assert_eq!(nav.history(), [r"C:\Users\alice"]);
        assert_eq!(nav.listing().entries.len(), 1);
    }

    #[tokio::test]
    async fn failed_back_leaves_history_alone() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        transport.push_text(r"cd,C:\\Users\\alice\\logs", "Path: \"C:\\Users\\alice\\logs\"\n");
        transport.push_text("ls", &listing_text(r"C:\Users\alice\logs", &[]));
        nav.open_directory(&dispatcher, &dir("logs")).await.unwrap();

        transport.push_failure(r"cd,C:\\Users\\alice", Some(401), "expired");
        let outcome = nav.go_back(&dispatcher).await.unwrap();
        assert_eq!(outcome, ApplyOutcome::Failed(ExplorerError::AuthenticationExpired));
        assert_eq!(nav.history().len(), 2);
    }

    #[tokio::test]
    async fn manual_entry_replaces_top() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        transport.push_text(r"cd,D:\\loot", "Path: \"D:\\loot\"\n");
        transport.push_text("ls", &listing_text(r"D:\loot", &[]));

        let outcome = nav.enter_path(&dispatcher, r"  D:\loot ").await;
        assert_eq!(outcome, Some(ApplyOutcome::Applied));
        assert_eq!(nav.history(), [r"D:\loot"]);
        assert!(nav.enter_path(&dispatcher, "   ").await.is_none());
    }

    #[tokio::test]
    async fn navigation_is_ignored_while_loading() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        nav.begin_open(&dir("logs")).unwrap();
        assert!(nav.begin_refresh().is_none());
        assert!(nav.begin_open(&dir("logs")).is_none());
        assert!(nav.begin_manual("/tmp").is_none());
        assert!(nav.begin_back().is_none());
        assert!(nav.begin_open(&FileEntry::default()).is_none());
    }

    #[tokio::test]
    async fn stale_results_are_dropped() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        let first = nav.begin_open(&dir("logs")).unwrap();
        let second = nav.begin_initial();

        let stale = DirectoryListing {
            path: r"C:\Users\alice\logs".to_string(),
            exists: true,
            ..DirectoryListing::default()
        };
        assert_eq!(nav.apply(&first, Ok(stale)), ApplyOutcome::Stale);
        assert_eq!(nav.history().len(), 1);
        assert!(nav.is_loading());

        transport.push_text("ls", &listing_text(r"C:\Users\alice", &[("logs", true)]));
        assert_eq!(nav.run(&dispatcher, second).await, ApplyOutcome::Applied);
        assert_eq!(nav.history(), [r"C:\Users\alice"]);
    }

    #[tokio::test]
    async fn retry_reissues_failed_navigation() {
        let (transport, dispatcher) = setup();
        let mut nav = NavigationController::new();
        transport.push_failure("ls", Some(200), "implant timeout");
        assert!(matches!(
            nav.load(&dispatcher).await,
            ApplyOutcome::Failed(ExplorerError::RemoteTimeout { .. })
        ));
        assert!(nav.history().is_empty());

        transport.push_text("ls", &listing_text("/root", &[]));
        let ticket = nav.retry().unwrap();
        assert_eq!(ticket.kind, NavKind::Initial);
        assert_eq!(nav.run(&dispatcher, ticket).await, ApplyOutcome::Applied);
        assert_eq!(nav.history(), ["/root"]);
        assert!(nav.retry().is_none());
    }

    #[tokio::test]
    async fn pathless_listing_is_protocol_error() {
        let (transport, dispatcher) = setup();
        let mut nav = NavigationController::new();
        transport.push_text("ls", "");
        assert!(matches!(
            nav.load(&dispatcher).await,
            ApplyOutcome::Failed(ExplorerError::Protocol(_))
        ));
        assert_eq!(nav.status(), NavStatus::Error);
    }

    #[tokio::test]
    async fn refresh_cannot_overtake_open_in_flight() {
        let (transport, dispatcher) = setup();
        let mut nav = loaded(&transport, &dispatcher).await;
        let open = nav.begin_open(&dir("logs")).unwrap();
        assert!(nav.begin_refresh().is_none());

        transport.push_text(r"cd,C:\\Users\\alice\\logs", "Path: \"C:\\Users\\alice\\logs\"\n");
        transport.push_text("ls", &listing_text(r"C:\Users\alice\logs", &[]));
        assert_eq!(nav.run(&dispatcher, open).await, ApplyOutcome::Applied);
        assert_eq!(nav.history(), [r"C:\Users\alice", r"C:\Users\alice\logs"]);
        assert!(nav.can_go_back());

        transport.push_text("ls", &listing_text(r"C:\Users\alice\logs", &[]));
        let refresh = nav.begin_refresh().unwrap();
        assert_eq!(nav.run(&dispatcher, refresh).await, ApplyOutcome::Applied);
        assert_eq!(nav.history().len(), 2);
    }

    #[tokio::test]
    async fn new_navigation_clears_last_error() {
        let (transport, dispatcher) = setup();
        let mut nav = NavigationController::new();
        transport.push_failure("ls", Some(200), "implant timeout");
        nav.load(&dispatcher).await;
        assert!(nav.last_error().is_some());

        nav.retry().unwrap();
        assert_eq!(nav.status(), NavStatus::Loading);
        assert!(nav.last_error().is_none());
    }
}
