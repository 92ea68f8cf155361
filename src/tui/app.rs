use crate::conductor::Conductor;
use crate::config::{AppConfig, ScreenLayout};
use crate::tui::avatar::AvatarStore;
use crate::tui::event::{Event, MountId};
use crate::tui::list::ListController;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

pub const TAB_TITLES: [&str; 3] = ["Tab 1", "Tab 2", "Tab 3"];

/// The tab that hosts the directory list.
const USERS_TAB: usize = 0;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum AppMode {
    #[default]
    Browse,
    Help,
}

/// Screen regions from the last draw, used to route mouse clicks.
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    pub tabs: Vec<(Rect, usize)>,
    pub rows: Vec<(Rect, usize)>,
    pub detail: Option<Rect>,
}

impl HitMap {
    fn find(regions: &[(Rect, usize)], column: u16, row: u16) -> Option<usize> {
        regions
            .iter()
            .find(|(rect, _)| rect.contains(Position { x: column, y: row }))
            .map(|(_, index)| *index)
    }
}

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct App {
    pub conductor: Conductor,
    pub config: AppConfig,
    pub mode: AppMode,
    pub should_quit: bool,
    pub selected_tab: usize,
    pub users: Option<ListController>,
    pub avatars: AvatarStore,
    pub hit_map: HitMap,
    pub spinner_frame: usize,
    next_mount: MountId,
}

impl App {
    /// Build the app and mount whatever the initial screen shows.
    pub fn new(conductor: Conductor, config: AppConfig) -> Self {
        let mut app = Self {
            conductor,
            config,
            mode: AppMode::default(),
            should_quit: false,
            selected_tab: USERS_TAB,
            users: None,
            avatars: AvatarStore::default(),
            hit_map: HitMap::default(),
            spinner_frame: 0,
            next_mount: 1,
        };
        app.mount_users();
        app
    }

    pub fn layout(&self) -> ScreenLayout {
        self.config.layout
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    fn mount_users(&mut self) {
        let mount = self.next_mount;
        self.next_mount += 1;
        tracing::info!(mount, "mounting user list");
        self.users = Some(ListController::mount(mount, &self.conductor, &self.config));
    }

    fn unmount_users(&mut self) {
        if let Some(list) = self.users.take() {
            tracing::info!(mount = list.mount_id(), "unmounting user list");
        }
    }

    pub fn select_tab(&mut self, index: usize) {
        if self.layout() == ScreenLayout::Single
            || index >= TAB_TITLES.len()
            || index == self.selected_tab
        {
            return;
        }
        if self.selected_tab == USERS_TAB {
            self.unmount_users();
        }
        self.selected_tab = index;
        if index == USERS_TAB {
            self.mount_users();
        }
    }

    pub fn next_tab(&mut self) {
        self.select_tab((self.selected_tab + 1) % TAB_TITLES.len());
    }

    pub fn previous_tab(&mut self) {
        self.select_tab((self.selected_tab + TAB_TITLES.len() - 1) % TAB_TITLES.len());
    }

    /// Remount the list after a surfaced failure.
    pub fn retry(&mut self) {
        if self.users.as_ref().is_some_and(|list| list.is_failed()) {
            self.unmount_users();
            self.mount_users();
        }
    }

    pub fn tick(&mut self) {
        self.advance_spinner();
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize => {}
            Event::Tick => self.tick(),
            Event::DirectoryFetched { mount, result } => match self.users.as_mut() {
                Some(list) => {
                    list.apply_fetch(mount, result);
                }
                None => tracing::debug!(mount, "directory result arrived with no list mounted"),
            },
            Event::AvatarFetched { url, result } => self.avatars.apply(url, result),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Esc unwinds one layer at a time: open sheet, then help, then the app.
        if key.code == KeyCode::Esc
            && self.users.as_mut().is_some_and(|list| list.dismiss_detail())
        {
            return;
        }

        // Help mode: any key closes help
        if self.mode == AppMode::Help {
            self.mode = AppMode::Browse;
            return;
        }

        match key.code {
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.next_tab(),
            KeyCode::BackTab => self.previous_tab(),
            KeyCode::Char(c @ '1'..='3') => self.select_tab(c as usize - '1' as usize),
            KeyCode::Char('r') => self.retry(),
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(list) = self.users.as_mut() {
                    list.previous();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(list) = self.users.as_mut() {
                    list.next();
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(list) = self.users.as_mut() {
                    list.tap_highlighted();
                }
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.mode == AppMode::Help {
                    self.mode = AppMode::Browse;
                    return;
                }

                // Tapping outside an open sheet dismisses it and nothing else.
                if let Some(list) = self.users.as_mut() {
                    if list.detail().is_expanded() {
                        let inside = self
                            .hit_map
                            .detail
                            .is_some_and(|rect| rect.contains(Position { x: column, y: row }));
                        if !inside {
                            list.dismiss_detail();
                        }
                        return;
                    }
                }

                if let Some(tab) = HitMap::find(&self.hit_map.tabs, column, row) {
                    self.select_tab(tab);
                } else if let Some(index) = HitMap::find(&self.hit_map.rows, column, row) {
                    if let Some(list) = self.users.as_mut() {
                        list.tap(index);
                    }
                }
            }
            MouseEventKind::ScrollDown => {
                if let Some(list) = self.users.as_mut() {
                    list.next();
                }
            }
            MouseEventKind::ScrollUp => {
                if let Some(list) = self.users.as_mut() {
                    list.previous();
                }
            }
            _ => {}
        }
    }
}
