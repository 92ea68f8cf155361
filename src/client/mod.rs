mod error;

pub use error::{FaultKind, FetchError};

use crate::models::user::UserDirectory;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;

/// Anything that can produce the user directory and avatar bytes.
pub trait DirectorySource: Send + Sync {
    fn fetch_all(&self) -> BoxFuture<'_, Result<UserDirectory, FetchError>>;

    fn fetch_avatar(&self, url: String) -> BoxFuture<'_, Result<Vec<u8>, FetchError>>;
}

#[derive(Clone)]
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    users_path: String,
}

impl DirectoryClient {
    pub fn new(base_url: String, users_path: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build reqwest client")?;

        Ok(Self {
            client,
            base_url,
            users_path,
        })
    }

    pub fn users_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.users_path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub async fn fetch_directory(&self) -> Result<UserDirectory, FetchError> {
        let url = self.users_url();
        tracing::debug!(%url, "fetching user directory");

        let response = self.request(Method::GET, &url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let directory: UserDirectory = serde_json::from_slice(&body)?;
        Ok(directory)
    }

    pub async fn fetch_avatar_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.request(Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl DirectorySource for DirectoryClient {
    fn fetch_all(&self) -> BoxFuture<'_, Result<UserDirectory, FetchError>> {
        Box::pin(self.fetch_directory())
    }

    fn fetch_avatar(&self, url: String) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        Box::pin(async move { self.fetch_avatar_bytes(&url).await })
    }
}
