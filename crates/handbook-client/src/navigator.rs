//! # Navigator
//!
//! The navigation controller. It owns the sidebar, the display surface and
//! the page URL, and every mutation of them goes through its methods.
//!
//! ## Concurrency
//!
//! Loads are not cancelled when a newer one starts. Each load takes a
//! generation number when it begins; when its response arrives it is applied
//! only if no newer load has begun since. Superseded responses, successful or
//! not, are dropped.
//!
//! The state lock is only taken in short synchronous sections and never held
//! across an await, so any number of loads may be in flight on one
//! `Navigator` (it is cheap to clone).

use std::sync::Arc;

use handbook_core::{extract_policy_id, policy_content_path, PolicyId};
use parking_lot::Mutex;

use crate::display::{DisplaySurface, Displayed};
use crate::error::{FetchError, NavigationError};
use crate::page_url::PageUrl;
use crate::sidebar::{EntryKind, Sidebar};
use crate::source::{ContentSource, PolicyEnvelope};

/// How a single load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was shown.
    Applied,
    /// The load failed and the error notice was shown.
    Failed,
    /// A newer load started first; nothing was changed.
    Superseded,
}

/// Everything the user can see.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub sidebar: Sidebar,
    pub display: DisplaySurface,
    pub page_url: PageUrl,
    generation: u64,
}

impl NavigationState {
    pub fn new(sidebar: Sidebar, page_url: PageUrl) -> Self {
        Self {
            sidebar,
            display: DisplaySurface::default(),
            page_url,
            generation: 0,
        }
    }

    /// Number of loads started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct Navigator<S> {
    source: Arc<S>,
    state: Arc<Mutex<NavigationState>>,
}

impl<S> Clone for Navigator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: ContentSource> Navigator<S> {
    pub fn new(source: S, sidebar: Sidebar, page_url: PageUrl) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(NavigationState::new(sidebar, page_url))),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Initial-load dispatch.
    ///
    /// With a valid `?policy=` ID the sidebar is synchronized to it and the
    /// policy is loaded without touching the URL. Otherwise the introduction
    /// is loaded; an unparsable `policy` value is logged and ignored.
    pub async fn attach(&self) -> LoadOutcome {
        let raw = self.state.lock().page_url.raw_policy();
        let id = match raw.as_deref().map(str::parse::<PolicyId>) {
            Some(Ok(id)) => Some(id),
            Some(Err(err)) => {
                tracing::warn!(%err, "ignoring invalid policy query parameter");
                None
            }
            None => None,
        };

        match id {
            Some(id) => {
                self.update_sidebar_state(id);
                self.load_policy_details(&policy_content_path(id), false).await
            }
            None => self.load_introduction().await,
        }
    }

    /// Fetch and show the introduction. On success the `policy` parameter is
    /// cleared and only the introduction entry stays active.
    pub async fn load_introduction(&self) -> LoadOutcome {
        let generation = self.begin();
        let result = self.source.fetch_introduction().await;
        self.apply_introduction(generation, result)
    }

    /// Fetch and show the policy behind `url`.
    ///
    /// On success the view scrolls to the top and the new related-policy
    /// triggers are bound. When `update_history` is set, the policy ID is
    /// taken from `url`, written to the page URL and synchronized into the
    /// sidebar. A failure shows the error notice and leaves URL and sidebar
    /// alone.
    pub async fn load_policy_details(&self, url: &str, update_history: bool) -> LoadOutcome {
        let generation = self.begin();
        let result = self.source.fetch_policy(url).await;
        self.apply_policy(generation, url, update_history, result)
    }

    /// Mark the sidebar entry for `id` active and expand its section.
    pub fn update_sidebar_state(&self, id: PolicyId) -> bool {
        self.state.lock().sidebar.sync(id)
    }

    /// The user activated sidebar entry `index`.
    pub async fn activate_entry(&self, index: usize) -> Result<LoadOutcome, NavigationError> {
        let entry = self
            .state
            .lock()
            .sidebar
            .entry(index)
            .cloned()
            .ok_or(NavigationError::UnknownEntry(index))?;
        Ok(match entry.kind {
            EntryKind::Introduction => self.load_introduction().await,
            EntryKind::Policy => self.load_policy_details(&entry.href, true).await,
        })
    }

    /// The user activated related-policy trigger `index` in the current
    /// content.
    pub async fn activate_related(&self, index: usize) -> Result<LoadOutcome, NavigationError> {
        let url = self
            .state
            .lock()
            .display
            .trigger(index)
            .map(|t| t.url.clone())
            .ok_or(NavigationError::UnboundTrigger(index))?;
        Ok(self.load_policy_details(&url, true).await)
    }

    /// The user toggled a sidebar section. Returns its new state.
    pub fn toggle_section(&self, index: usize) -> Option<bool> {
        self.state.lock().sidebar.toggle_section(index)
    }

    /// The user scrolled the content region.
    pub fn scroll_to(&self, offset: u32) {
        self.state.lock().display.scroll_to(offset);
    }

    pub fn snapshot(&self) -> NavigationState {
        self.state.lock().clone()
    }

    fn begin(&self) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        state.generation
    }

    fn apply_introduction(&self, generation: u64, result: Result<String, FetchError>) -> LoadOutcome {
        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(generation, current = state.generation, "dropping superseded introduction response");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(markup) => {
                let triggers = state.display.replace(markup, Displayed::Introduction);
                state.display.bind(triggers);
                state.page_url.clear_policy();
                state.sidebar.activate_introduction();
                LoadOutcome::Applied
            }
            Err(err) => {
                tracing::error!(url = err.url(), error = %err, "failed to load introduction");
                state.display.show_error();
                LoadOutcome::Failed
            }
        }
    }

    fn apply_policy(
        &self,
        generation: u64,
        url: &str,
        update_history: bool,
        result: Result<PolicyEnvelope, FetchError>,
    ) -> LoadOutcome {
        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(url, generation, current = state.generation, "dropping superseded policy response");
            return LoadOutcome::Superseded;
        }

        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(url = err.url(), error = %err, "failed to load policy");
                state.display.show_error();
                return LoadOutcome::Failed;
            }
        };

        let triggers = state.display.replace(
            envelope.content,
            Displayed::Policy {
                url: url.to_string(),
            },
        );
        state.display.scroll_to_top();
        state.display.bind(triggers);

        if update_history {
            match extract_policy_id(url) {
                Some(id) => {
                    state.page_url.set_policy(id);
                    state.sidebar.sync(id);
                }
                None => tracing::warn!(url, "loaded policy URL carries no policy ID; page URL unchanged"),
            }
        }
        LoadOutcome::Applied
    }
}
