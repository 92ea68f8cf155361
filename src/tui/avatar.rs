use crate::client::FetchError;
use crate::conductor::Conductor;
use crate::models::avatar::{inside_circle, AvatarImage, AVATAR_PIXELS};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};
use std::collections::HashMap;

pub const AVATAR_COLS: u16 = AVATAR_PIXELS as u16;
pub const AVATAR_ROWS: u16 = (AVATAR_PIXELS / 2) as u16;

#[derive(Debug)]
pub enum AvatarSlot {
    Loading,
    Ready(AvatarImage),
    Failed,
}

/// Per-URL avatar load state for the lifetime of the app. Memory only.
#[derive(Debug, Default)]
pub struct AvatarStore {
    slots: HashMap<String, AvatarSlot>,
}

impl AvatarStore {
    /// Start loading `url` unless it is already known.
    pub fn ensure(&mut self, url: &str, conductor: &Conductor) {
        if self.slots.contains_key(url) {
            return;
        }
        if url.is_empty() {
            self.slots.insert(String::new(), AvatarSlot::Failed);
            return;
        }
        self.slots.insert(url.to_string(), AvatarSlot::Loading);
        conductor.fetch_avatar(url.to_string());
    }

    pub fn apply(&mut self, url: String, result: Result<AvatarImage, FetchError>) {
        let slot = match result {
            Ok(image) => AvatarSlot::Ready(image),
            Err(_) => AvatarSlot::Failed,
        };
        self.slots.insert(url, slot);
    }

    pub fn get(&self, url: &str) -> Option<&AvatarSlot> {
        self.slots.get(url)
    }
}

/// Circular avatar drawn with half blocks; a spinner overlays the placeholder while loading.
pub struct AvatarWidget<'a> {
    slot: Option<&'a AvatarSlot>,
    spinner: char,
}

impl<'a> AvatarWidget<'a> {
    pub fn new(slot: Option<&'a AvatarSlot>, spinner: char) -> Self {
        Self { slot, spinner }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

impl Widget for AvatarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = area.width.min(AVATAR_COLS);
        let rows = area.height.min(AVATAR_ROWS);

        if let Some(AvatarSlot::Ready(image)) = self.slot {
            let cols = cols.min(image.size() as u16);
            for row in 0..rows {
                for col in 0..cols {
                    let top = image.pixel(col as u32, row as u32 * 2);
                    let bottom = image.pixel(col as u32, row as u32 * 2 + 1);
                    let cell = buf.get_mut(area.x + col, area.y + row);
                    match (top, bottom) {
                        (Some(t), Some(b)) => {
                            cell.set_symbol("▀").set_fg(rgb(t)).set_bg(rgb(b));
                        }
                        (Some(t), None) => {
                            cell.set_symbol("▀").set_fg(rgb(t));
                        }
                        (None, Some(b)) => {
                            cell.set_symbol("▄").set_fg(rgb(b));
                        }
                        (None, None) => {}
                    }
                }
            }
            return;
        }

        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = (col as u32, row as u32 * 2);
                if inside_circle(AVATAR_PIXELS, x, y) || inside_circle(AVATAR_PIXELS, x, y + 1) {
                    buf.get_mut(area.x + col, area.y + row)
                        .set_symbol("░")
                        .set_fg(Color::DarkGray);
                }
            }
        }

        let loading = matches!(self.slot, None | Some(AvatarSlot::Loading));
        if loading && cols > 0 && rows > 0 {
            buf.get_mut(area.x + cols / 2, area.y + rows / 2)
                .set_char(self.spinner)
                .set_fg(Color::Yellow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductor::tests::{sample_directory, FakeSource};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn area() -> Rect {
        Rect::new(0, 0, AVATAR_COLS, AVATAR_ROWS)
    }

    fn solid_avatar(color: [u8; 3]) -> AvatarImage {
        let img = image::RgbImage::from_pixel(AVATAR_PIXELS, AVATAR_PIXELS, image::Rgb(color));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        AvatarImage::decode(bytes.get_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_fetches_each_url_once() {
        let source = Arc::new(FakeSource::returning(sample_directory()));
        let (tx, _rx) = mpsc::unbounded_channel();
        let conductor = Conductor::new(source.clone(), tx);
        let mut store = AvatarStore::default();

        store.ensure("https://reqres.in/img/faces/1-image.jpg", &conductor);
        store.ensure("https://reqres.in/img/faces/1-image.jpg", &conductor);
        tokio::task::yield_now().await;

        assert!(matches!(
            store.get("https://reqres.in/img/faces/1-image.jpg"),
            Some(AvatarSlot::Loading)
        ));
        // The spawned task may not have run yet; at most one call is allowed.
        assert!(source.avatar_calls.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test]
    async fn test_ensure_empty_url_fails_without_fetch() {
        let source = Arc::new(FakeSource::returning(sample_directory()));
        let (tx, _rx) = mpsc::unbounded_channel();
        let conductor = Conductor::new(source.clone(), tx);
        let mut store = AvatarStore::default();

        store.ensure("", &conductor);

        assert!(matches!(store.get(""), Some(AvatarSlot::Failed)));
        assert_eq!(source.avatar_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_apply_sets_ready_or_failed() {
        let mut store = AvatarStore::default();
        store.apply("a".to_string(), Ok(solid_avatar([1, 2, 3])));
        store.apply(
            "b".to_string(),
            Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND)),
        );

        assert!(matches!(store.get("a"), Some(AvatarSlot::Ready(_))));
        assert!(matches!(store.get("b"), Some(AvatarSlot::Failed)));
        assert!(store.get("c").is_none());
    }

    #[test]
    fn test_loading_placeholder_shows_spinner_in_center() {
        let mut buf = Buffer::empty(area());
        AvatarWidget::new(Some(&AvatarSlot::Loading), '⠋').render(area(), &mut buf);

        assert_eq!(buf.get(AVATAR_COLS / 2, AVATAR_ROWS / 2).symbol(), "⠋");
        assert_eq!(buf.get(0, 0).symbol(), " ");
        assert_eq!(buf.get(0, AVATAR_ROWS / 2).symbol(), "░");
    }

    #[test]
    fn test_failed_placeholder_has_no_spinner() {
        let mut buf = Buffer::empty(area());
        AvatarWidget::new(Some(&AvatarSlot::Failed), '⠋').render(area(), &mut buf);

        assert_eq!(buf.get(AVATAR_COLS / 2, AVATAR_ROWS / 2).symbol(), "░");
    }

    #[test]
    fn test_ready_avatar_draws_half_blocks_inside_circle() {
        let slot = AvatarSlot::Ready(solid_avatar([10, 20, 30]));
        let mut buf = Buffer::empty(area());
        AvatarWidget::new(Some(&slot), '⠋').render(area(), &mut buf);

        let center = buf.get(AVATAR_COLS / 2, AVATAR_ROWS / 2);
        assert_eq!(center.symbol(), "▀");
        assert_eq!(center.fg, Color::Rgb(10, 20, 30));
        assert_eq!(center.bg, Color::Rgb(10, 20, 30));
        assert_eq!(buf.get(0, 0).symbol(), " ");
    }

    #[test]
    fn test_render_clips_to_small_area() {
        let small = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(small);
        AvatarWidget::new(None, '⠋').render(small, &mut buf);
        assert_eq!(buf.get(1, 1).symbol(), "⠋");
    }
}
