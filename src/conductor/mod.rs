use crate::client::{DirectorySource, FetchError};
use crate::models::avatar::AvatarImage;
use crate::tui::event::{Event, EventSender, MountId};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs network work off the UI loop and posts the outcome back as events.
#[derive(Clone)]
pub struct Conductor {
    source: Arc<dyn DirectorySource>,
    events: EventSender,
}

impl Conductor {
    pub fn new(source: Arc<dyn DirectorySource>, events: EventSender) -> Self {
        Self { source, events }
    }

    /// Fetch the directory for `mount`. Nothing is posted if `token` is cancelled first.
    pub fn fetch_directory(&self, mount: MountId, token: CancellationToken) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let events = self.events.clone();

        tokio::spawn(async move {
            tracing::info!(mount, "directory fetch started");
            let result = tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!(mount, "directory fetch cancelled by unmount");
                    return;
                }
                result = source.fetch_all() => result,
            };

            match &result {
                Ok(directory) => {
                    tracing::info!(mount, users = directory.len(), "directory fetch finished")
                }
                Err(e) => {
                    tracing::error!(mount, kind = ?e.kind(), error = %e, "directory fetch failed")
                }
            }

            if events.send(Event::DirectoryFetched { mount, result }).is_err() {
                tracing::debug!(mount, "ui loop gone, dropping directory result");
            }
        })
    }

    pub fn fetch_avatar(&self, url: String) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = match source.fetch_avatar(url.clone()).await {
                Ok(bytes) => tokio::task::spawn_blocking(move || AvatarImage::decode(&bytes))
                    .await
                    .unwrap_or_else(|join_err| {
                        Err(image::ImageError::IoError(std::io::Error::other(join_err)))
                    })
                    .map_err(FetchError::from),
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                tracing::warn!(%url, error = %e, "avatar unavailable");
            }

            if let Err(unsent) = events.send(Event::AvatarFetched { url, result }) {
                if let Event::AvatarFetched { url, .. } = unsent.0 {
                    tracing::debug!(%url, "ui loop gone, dropping avatar result");
                }
            }
        })
    }
}
