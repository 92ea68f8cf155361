use crate::client::FetchError;
use crate::models::avatar::AvatarImage;
use crate::models::user::UserDirectory;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Identifies one mount of the directory list; results for older mounts are dropped.
pub type MountId = u64;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
    DirectoryFetched {
        mount: MountId,
        result: Result<UserDirectory, FetchError>,
    },
    AvatarFetched {
        url: String,
        result: Result<AvatarImage, FetchError>,
    },
}

pub type EventSender = mpsc::UnboundedSender<Event>;

pub struct EventHandler {
    sender: EventSender,
    receiver: mpsc::UnboundedReceiver<Event>,
    cancellation_token: CancellationToken,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();
        let terminal_sender = sender.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut ticker = tokio::time::interval(tick_rate);
            use futures::StreamExt;

            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => {
                        break;
                    }
                    Some(Ok(event)) = reader.next() => match event {
                        // Windows reports both press and release.
                        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                        CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
                        CrosstermEvent::Resize(_, _) => Event::Resize,
                        _ => continue,
                    },
                    _ = ticker.tick() => Event::Tick,
                };

                if terminal_sender.send(event).is_err() {
                    break;
                }
            }
        });

        Self {
            sender,
            receiver,
            cancellation_token,
        }
    }

    /// Handle for background tasks that report back to the UI loop.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn stop(&self) {
        self.cancellation_token.cancel();
    }
}
