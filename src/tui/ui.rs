use crate::conductor::Conductor;
use crate::config::ScreenLayout;
use crate::tui::app::{App, AppMode, HitMap, TAB_TITLES};
use crate::tui::avatar::{AvatarStore, AvatarWidget, AVATAR_COLS, AVATAR_ROWS};
use crate::tui::detail::FILLER_TEXT;
use crate::tui::list::{ListController, Presentation};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

/// One avatar plus a blank separator line.
pub const ROW_HEIGHT: u16 = AVATAR_ROWS + 1;

const TAB_PADDING: u16 = 1;
const TAB_DIVIDER_WIDTH: u16 = 1;

pub fn render(app: &mut App, frame: &mut Frame) {
    app.hit_map = HitMap::default();

    let (tabs_area, content, status_area) = match app.layout() {
        ScreenLayout::Tabbed => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(frame.size());
            (Some(chunks[0]), chunks[1], chunks[2])
        }
        ScreenLayout::Single => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(3)])
                .split(frame.size());
            (None, chunks[0], chunks[1])
        }
    };

    if let Some(area) = tabs_area {
        render_tabs(app, frame, area);
    }

    let shows_users = app.layout() == ScreenLayout::Single || app.selected_tab == 0;
    if app.mode == AppMode::Help {
        render_help_view(frame, content);
    } else if shows_users {
        let spinner = app.spinner_char();
        let App {
            users,
            avatars,
            conductor,
            hit_map,
            ..
        } = &mut *app;
        if let Some(list) = users.as_mut() {
            render_users(list, avatars, conductor, hit_map, spinner, frame, content);
        }
    } else {
        frame.render_widget(Block::default().borders(Borders::ALL), content);
    }

    render_status_bar(app, frame, status_area);
}

fn render_tabs(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);

    let tabs = Tabs::new(TAB_TITLES.to_vec())
        .block(block)
        .select(app.selected_tab)
        .style(Style::default().fg(Color::Magenta).bg(Color::Cyan))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, area);

    // Mirrors the Tabs widget layout: " title " separated by a one-column divider.
    let mut x = inner.x;
    for (index, title) in TAB_TITLES.iter().enumerate() {
        let width = title.len() as u16 + TAB_PADDING * 2;
        let rect = Rect::new(x, inner.y, width, inner.height).intersection(inner);
        app.hit_map.tabs.push((rect, index));
        x = x.saturating_add(width + TAB_DIVIDER_WIDTH);
    }
}

fn users_title(presentation: &Presentation<'_>) -> String {
    match presentation {
        Presentation::Populated(items) => format!("Users ({})", items.len()),
        _ => "Users".to_string(),
    }
}

fn render_users(
    list: &mut ListController,
    avatars: &mut AvatarStore,
    conductor: &Conductor,
    hit_map: &mut HitMap,
    spinner: char,
    frame: &mut Frame,
    area: Rect,
) {
    let presentation = list.presentation();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(users_title(&presentation));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match presentation {
        Presentation::Loading => {
            render_loading(frame, inner);
            return;
        }
        Presentation::Failed(error) => {
            render_error(error, frame, inner);
            return;
        }
        Presentation::Populated(_) => {}
    }

    let visible = (inner.height / ROW_HEIGHT).max(1) as usize;
    list.scroll_into_view(visible);
    let highlighted = list.highlighted();
    let offset = list.offset();

    for (slot, (index, user)) in list
        .state()
        .items
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .enumerate()
    {
        let row = Rect::new(
            inner.x,
            inner.y + slot as u16 * ROW_HEIGHT,
            inner.width,
            ROW_HEIGHT,
        )
        .intersection(inner);
        hit_map.rows.push((row, index));

        let is_highlighted = highlighted == Some(index);
        if is_highlighted {
            frame.render_widget(
                Block::default().style(Style::default().bg(Color::DarkGray)),
                Rect::new(row.x, row.y, row.width, row.height.min(AVATAR_ROWS)),
            );
        }

        let avatar_area = Rect::new(row.x + 1, row.y, AVATAR_COLS, AVATAR_ROWS).intersection(row);
        avatars.ensure(&user.avatar_url, conductor);
        frame.render_widget(
            AvatarWidget::new(avatars.get(&user.avatar_url), spinner),
            avatar_area,
        );

        let text_x = row.x + 1 + AVATAR_COLS + 2;
        if text_x < row.right() {
            let name_style = if is_highlighted {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            let lines = vec![
                Line::from(""),
                Line::from(""),
                Line::from(Span::styled(user.display_name(), name_style)),
                Line::from(user.email.as_str()),
            ];
            let text_area = Rect::new(
                text_x,
                row.y,
                row.right() - text_x,
                row.height.min(AVATAR_ROWS),
            );
            frame.render_widget(Paragraph::new(lines), text_area);
        }
    }

    if list.detail().is_expanded() {
        let height = list.detail().height().min(area.height);
        let sheet = Rect::new(area.x, area.bottom() - height, area.width, height);
        hit_map.detail = Some(sheet);

        let avatar_url = list
            .state()
            .selected
            .as_ref()
            .map(|user| user.avatar_url.clone())
            .unwrap_or_default();
        avatars.ensure(&avatar_url, conductor);
        render_detail_sheet(avatars, &avatar_url, spinner, frame, sheet);
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let middle = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    frame.render_widget(
        Paragraph::new("Loading...").alignment(Alignment::Center),
        middle,
    );
}

fn render_error(error: &str, frame: &mut Frame, area: Rect) {
    let error_detail = format!("  {}", error);
    let error_text: Vec<String> = vec![
        "".to_string(),
        "  ✗ Could not load users".to_string(),
        "".to_string(),
        error_detail,
        "".to_string(),
        "  Troubleshooting:".to_string(),
        "  • Check the base URL and path in config.toml or --base-url".to_string(),
        "  • Verify network connectivity to the directory host".to_string(),
        "  • Press r to try again".to_string(),
        "".to_string(),
    ];

    let items: Vec<ListItem> = error_text
        .into_iter()
        .map(|line| ListItem::new(line).style(Style::default().fg(Color::Red)))
        .collect();

    frame.render_widget(List::new(items), area);
}

fn render_detail_sheet(
    avatars: &AvatarStore,
    avatar_url: &str,
    spinner: char,
    frame: &mut Frame,
    area: Rect,
) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title("Details")
        .style(Style::default().bg(Color::Gray).fg(Color::Black));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(AVATAR_ROWS),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let avatar_row = chunks[1];
    let avatar_x = avatar_row.x + avatar_row.width.saturating_sub(AVATAR_COLS) / 2;
    let avatar_area =
        Rect::new(avatar_x, avatar_row.y, AVATAR_COLS, AVATAR_ROWS).intersection(avatar_row);
    frame.render_widget(
        AvatarWidget::new(avatars.get(avatar_url), spinner),
        avatar_area,
    );

    let text_area = chunks[3];
    let text = Paragraph::new(FILLER_TEXT)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(
        text,
        Rect::new(
            text_area.x + 1,
            text_area.y,
            text_area.width.saturating_sub(2),
            text_area.height,
        ),
    );
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let failed = app.users.as_ref().is_some_and(|list| list.is_failed());
    let expanded = app
        .users
        .as_ref()
        .is_some_and(|list| list.detail().is_expanded());

    let mut status_text = if app.mode == AppMode::Help {
        "Press any key to close help".to_string()
    } else if failed {
        "r: Retry | ?: Help | q: Quit".to_string()
    } else if expanded {
        "Esc/click outside: Close details | ↑/↓: Navigate | q: Quit".to_string()
    } else {
        match app.layout() {
            ScreenLayout::Tabbed => {
                "↑/↓: Navigate | Enter: Details | Tab/1-3: Switch tab | ?: Help | q: Quit"
                    .to_string()
            }
            ScreenLayout::Single => "↑/↓: Navigate | Enter: Details | ?: Help | q: Quit".to_string(),
        }
    };

    // An empty result must stay indistinguishable from loading.
    let fetched_at = app
        .users
        .as_ref()
        .filter(|list| matches!(list.presentation(), Presentation::Populated(_)))
        .and_then(|list| list.fetched_at());
    if let Some(fetched_at) = fetched_at {
        status_text.push_str(&format!(" | Updated {}", fetched_at.format("%H:%M:%S")));
    }

    let status = Paragraph::new(status_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn render_help_view(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        "User Directory TUI - Help",
        "---------",
        "",
        "Navigation:",
        "  ↑/↓ or k/j    Move between users",
        "  Enter/Space   Open the detail sheet for a user",
        "  Mouse click   Select a user or a tab",
        "  Esc           Close the detail sheet / Quit",
        "  Tab/Shift-Tab Switch tab (also 1, 2, 3)",
        "  r             Retry after a failed load",
        "  ?             Toggle this help",
        "  q             Quit application",
        "",
        "Press any key to close help",
    ];

    let items: Vec<ListItem> = help_text.into_iter().map(ListItem::new).collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FetchError;
    use crate::conductor::tests::{sample_directory, FakeSource};
    use crate::config::AppConfig;
    use crate::models::user::UserDirectory;
    use crate::tui::avatar::AvatarSlot;
    use crate::tui::event::Event;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const WIDTH: u16 = 80;
    const HEIGHT: u16 = 40;

    fn new_app(config: AppConfig) -> (App, mpsc::UnboundedReceiver<Event>) {
        let source = Arc::new(FakeSource::returning(sample_directory()));
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Conductor::new(source, tx), config), rx)
    }

    fn draw(app: &mut App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text_of(buffer: &Buffer, rows: std::ops::Range<u16>) -> String {
        let mut out = String::new();
        for y in rows {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn screen_text(buffer: &Buffer) -> String {
        text_of(buffer, 0..buffer.area.height)
    }

    fn load(app: &mut App, directory: UserDirectory) {
        let mount = app.users.as_ref().unwrap().mount_id();
        app.handle_event(Event::DirectoryFetched {
            mount,
            result: Ok(directory),
        });
    }

    #[tokio::test]
    async fn test_renders_loading_before_fetch_resolves() {
        let (mut app, _rx) = new_app(AppConfig::default());

        let text = screen_text(&draw(&mut app));

        assert!(text.contains("Loading..."));
        assert!(text.contains("Tab 1"));
        assert!(text.contains("Tab 3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_keeps_loading_across_ticks_then_populates() {
        let release = Arc::new(tokio::sync::Notify::new());
        let source = Arc::new(FakeSource {
            release: Some(release.clone()),
            ..FakeSource::returning(sample_directory())
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = AppConfig::default();
        let tick_rate = config.tick_rate();
        let mut app = App::new(Conductor::new(source.clone(), tx), config);

        for _ in 0..5 {
            tokio::time::advance(tick_rate).await;
            app.handle_event(Event::Tick);
            let text = screen_text(&draw(&mut app));
            assert!(text.contains("Loading..."));
            assert!(!text.contains("George Bluth"));
        }
        assert!(rx.try_recv().is_err());

        release.notify_one();
        let event = rx.recv().await.expect("event channel closed");
        app.handle_event(event);

        let text = screen_text(&draw(&mut app));
        assert!(!text.contains("Loading..."));
        assert!(text.contains("George Bluth"));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_renders_rows_after_fetch() {
        let (mut app, _rx) = new_app(AppConfig::default());
        load(&mut app, sample_directory());

        let text = screen_text(&draw(&mut app));

        assert!(!text.contains("Loading..."));
        assert!(text.contains("Users (2)"));
        assert!(text.contains("George Bluth"));
        assert!(text.contains("janet.weaver@reqres.in"));
        assert_eq!(app.hit_map.rows.len(), 2);
        assert!(matches!(
            app.avatars.get("https://reqres.in/img/faces/1-image.jpg"),
            Some(AvatarSlot::Loading)
        ));
    }

    #[tokio::test]
    async fn test_empty_directory_looks_like_loading() {
        let (mut app, _rx) = new_app(AppConfig::default());
        let before = draw(&mut app);

        load(&mut app, UserDirectory::default());
        let after = draw(&mut app);

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_identical_refetch_renders_identical_list() {
        let (mut app, _rx) = new_app(AppConfig::default());
        load(&mut app, sample_directory());
        let first = draw(&mut app);

        load(&mut app, sample_directory());
        let second = draw(&mut app);

        // The status bar carries the fetch time; compare everything above it.
        let list_rows = 0..HEIGHT - 3;
        assert_eq!(
            text_of(&first, list_rows.clone()),
            text_of(&second, list_rows)
        );
    }

    #[tokio::test]
    async fn test_other_tabs_are_empty() {
        let (mut app, _rx) = new_app(AppConfig::default());
        load(&mut app, sample_directory());
        app.select_tab(1);

        let text = screen_text(&draw(&mut app));

        assert!(!text.contains("Loading..."));
        assert!(!text.contains("George"));
        assert!(app.hit_map.rows.is_empty());
    }

    #[tokio::test]
    async fn test_single_layout_has_no_tabs() {
        let config = AppConfig {
            layout: ScreenLayout::Single,
            ..AppConfig::default()
        };
        let (mut app, _rx) = new_app(config);

        let text = screen_text(&draw(&mut app));

        assert!(!text.contains("Tab 1"));
        assert!(text.contains("Loading..."));
        assert!(app.hit_map.tabs.is_empty());
    }

    #[tokio::test]
    async fn test_tab_hit_regions_follow_titles() {
        let (mut app, _rx) = new_app(AppConfig::default());
        draw(&mut app);

        assert_eq!(app.hit_map.tabs.len(), 3);
        let (first, _) = app.hit_map.tabs[0];
        let (second, _) = app.hit_map.tabs[1];
        assert_eq!(first, Rect::new(1, 1, 7, 1));
        assert_eq!(second.x, 9);
    }

    #[tokio::test]
    async fn test_detail_sheet_shows_filler_text() {
        let (mut app, _rx) = new_app(AppConfig::default());
        load(&mut app, sample_directory());
        app.users.as_mut().unwrap().tap(0);

        let text = screen_text(&draw(&mut app));

        assert!(text.contains("Details"));
        assert!(text.contains("Lorem ipsum"));
        let sheet = app.hit_map.detail.expect("sheet region");
        assert_eq!(sheet.height, AppConfig::default().detail_panel_height);
    }

    #[tokio::test]
    async fn test_collapsed_sheet_is_not_drawn() {
        let (mut app, _rx) = new_app(AppConfig::default());
        load(&mut app, sample_directory());

        let text = screen_text(&draw(&mut app));

        assert!(!text.contains("Lorem ipsum"));
        assert!(app.hit_map.detail.is_none());
    }

    #[tokio::test]
    async fn test_failure_renders_error_with_retry_hint() {
        let (mut app, _rx) = new_app(AppConfig::default());
        let mount = app.users.as_ref().unwrap().mount_id();
        app.handle_event(Event::DirectoryFetched {
            mount,
            result: Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY)),
        });

        let text = screen_text(&draw(&mut app));

        assert!(text.contains("Could not load users"));
        assert!(text.contains("502"));
        assert!(text.contains("r: Retry"));
    }

    #[tokio::test]
    async fn test_help_view() {
        let (mut app, _rx) = new_app(AppConfig::default());
        app.mode = AppMode::Help;

        let text = screen_text(&draw(&mut app));

        assert!(text.contains("User Directory TUI - Help"));
        assert!(!text.contains("Loading..."));
    }
}
