use crate::client::FetchError;
use crate::conductor::Conductor;
use crate::config::AppConfig;
use crate::models::user::{UserDirectory, UserRecord};
use crate::tui::detail::DetailPanel;
use crate::tui::event::MountId;
use chrono::{DateTime, Local};
use tokio_util::sync::{CancellationToken, DropGuard};

/// UI-local state of one mounted list. Discarded on unmount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub items: Vec<UserRecord>,
    pub selected: Option<UserRecord>,
    /// Open requests for the detail panel; each increase expands it once.
    pub detail_open_counter: u32,
}

#[derive(Debug, PartialEq)]
pub enum Presentation<'a> {
    /// Nothing to show yet. An empty directory also lands here.
    Loading,
    Failed(&'a str),
    Populated(&'a [UserRecord]),
}

pub struct ListController {
    mount: MountId,
    state: ViewState,
    detail: DetailPanel,
    applied_open_requests: u32,
    highlighted: Option<usize>,
    offset: usize,
    fetch_error: Option<String>,
    fetched_at: Option<DateTime<Local>>,
    surface_fetch_errors: bool,
    // Cancels the in-flight fetch when the controller goes away.
    _fetch_guard: DropGuard,
}

impl ListController {
    /// Create fresh state and start the one fetch this mount gets.
    pub fn mount(mount: MountId, conductor: &Conductor, config: &AppConfig) -> Self {
        let token = CancellationToken::new();
        conductor.fetch_directory(mount, token.clone());
        Self::with_token(mount, config, token)
    }

    fn with_token(mount: MountId, config: &AppConfig, token: CancellationToken) -> Self {
        Self {
            mount,
            state: ViewState::default(),
            detail: DetailPanel::new(config.detail_panel_height),
            applied_open_requests: 0,
            highlighted: None,
            offset: 0,
            fetch_error: None,
            fetched_at: None,
            surface_fetch_errors: config.surface_fetch_errors,
            _fetch_guard: token.drop_guard(),
        }
    }

    pub fn mount_id(&self) -> MountId {
        self.mount
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }

    /// Apply a fetch outcome. Returns false when it belongs to another mount.
    pub fn apply_fetch(
        &mut self,
        mount: MountId,
        result: Result<UserDirectory, FetchError>,
    ) -> bool {
        if mount != self.mount {
            tracing::debug!(mount, current = self.mount, "ignoring stale directory result");
            return false;
        }

        match result {
            Ok(directory) => {
                self.state.items = directory.entries;
                self.fetch_error = None;
                self.fetched_at = Some(Local::now());
                self.highlighted = match (self.state.items.len(), self.highlighted) {
                    (0, _) => None,
                    (len, Some(i)) => Some(i.min(len - 1)),
                    (_, None) => Some(0),
                };
                self.offset = 0;
            }
            Err(e) if self.surface_fetch_errors => {
                self.fetch_error = Some(e.to_string());
            }
            Err(_) => {}
        }
        true
    }

    pub fn presentation(&self) -> Presentation<'_> {
        if let Some(error) = &self.fetch_error {
            return Presentation::Failed(error);
        }
        if self.state.items.is_empty() {
            Presentation::Loading
        } else {
            Presentation::Populated(&self.state.items)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.fetch_error.is_some()
    }

    /// Row activation: select the record and request the panel if it is not already open.
    pub fn tap(&mut self, index: usize) {
        let Some(record) = self.state.items.get(index) else {
            return;
        };
        self.state.selected = Some(record.clone());
        self.highlighted = Some(index);
        if !self.detail.is_expanded() {
            self.state.detail_open_counter += 1;
        }
        self.run_detail_effect();
    }

    pub fn tap_highlighted(&mut self) {
        if let Some(index) = self.highlighted {
            self.tap(index);
        }
    }

    fn run_detail_effect(&mut self) {
        if self.state.detail_open_counter == self.applied_open_requests {
            return;
        }
        self.applied_open_requests = self.state.detail_open_counter;
        if self.state.detail_open_counter > 0 {
            self.detail.expand();
        }
    }

    /// Collapse the panel. Returns whether anything changed.
    pub fn dismiss_detail(&mut self) -> bool {
        if self.detail.is_expanded() {
            self.detail.collapse();
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) {
        let len = self.state.items.len();
        if len == 0 {
            return;
        }
        let i = match self.highlighted {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.highlighted = Some(i);
    }

    pub fn previous(&mut self) {
        let len = self.state.items.len();
        if len == 0 {
            return;
        }
        let i = match self.highlighted {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.highlighted = Some(i);
    }

    /// Shift the scroll offset so the highlighted row sits inside a window of `visible` rows.
    pub fn scroll_into_view(&mut self, visible: usize) {
        let visible = visible.max(1);
        let Some(i) = self.highlighted else {
            self.offset = 0;
            return;
        };
        if i < self.offset {
            self.offset = i;
        } else if i >= self.offset + visible {
            self.offset = i + 1 - visible;
        }
    }
}
