//! Remote preference REST API implementation of PreferenceStore
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation              | Request                                             |
//! |------------------------|-----------------------------------------------------|
//! | get_preferences        | `GET    {app}/preference/v1/preferences`            |
//! | get_preference_by_key  | `GET    {app}/preference/v1/preferences/{key}`      |
//! | create_preference      | `POST   {app}/preference/v1/preferences`            |
//! | update_preference      | `PUT    {app}/preference/v1/preferences/{key}`      |
//! | delete_preference      | `DELETE {app}/preference/v1/preferences/{key}`      |
//!
//! The app name and key are each sent as one percent-encoded path segment.
//!
//! Single entries travel as `{ "entry": { "key": ..., "value": "<json text>" } }`,
//! write bodies as `{ "key": ..., "value": "<json text>" }`.

use crate::core::error::{StoreError, StoreResult};
use crate::core::preference::{PreferenceEntry, PreferenceItem, PreferenceList, PreferenceStore};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

/// Preference store backed by the remote preference API
#[derive(Clone)]
pub struct HttpPreferenceStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPreferenceStore {
    pub fn new(base_url: impl Into<String>) -> StoreResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use an existing client, e.g. one with custom timeouts
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn collection_url(&self, app_name: &str) -> StoreResult<Url> {
        self.url(app_name, None)
    }

    fn entry_url(&self, app_name: &str, key: &str) -> StoreResult<Url> {
        self.url(app_name, Some(key))
    }

    fn url(&self, app_name: &str, key: Option<&str>) -> StoreResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StoreError::Transport(format!("invalid base url '{}': {}", self.base_url, e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::Transport(format!("base url '{}' cannot take a path", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .push(app_name)
                .extend(["preference", "v1", "preferences"]);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Preference API request failed");
        Err(StoreError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_entry(response: Response) -> StoreResult<Value> {
        let item: PreferenceItem = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        item.entry.decode()
    }
}

#[async_trait]
impl PreferenceStore for HttpPreferenceStore {
    async fn get_preferences(&self, app_name: &str, _key: &str) -> StoreResult<PreferenceList> {
        let response = self
            .send(self.client.get(self.collection_url(app_name)?))
            .await?;
        let response = Self::check(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(PreferenceList::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_preference_by_key(&self, app_name: &str, key: &str) -> StoreResult<Option<Value>> {
        let response = self
            .send(self.client.get(self.entry_url(app_name, key)?))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response).await?;
        Self::read_entry(response).await.map(Some)
    }

    async fn create_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        let body = PreferenceEntry::encode(key, &value)?;
        let response = self
            .send(self.client.post(self.collection_url(app_name)?).json(&body))
            .await?;

        let response = Self::check(response).await?;
        Self::read_entry(response).await
    }

    async fn update_preference(&self, app_name: &str, key: &str, value: Value) -> StoreResult<Value> {
        let body = PreferenceEntry::encode(key, &value)?;
        let response = self
            .send(self.client.put(self.entry_url(app_name, key)?).json(&body))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                app_name: app_name.to_string(),
                key: key.to_string(),
            });
        }

        let response = Self::check(response).await?;
        Self::read_entry(response).await
    }

    async fn delete_preference(&self, app_name: &str, key: &str) -> StoreResult<()> {
        let response = self
            .send(self.client.delete(self.entry_url(app_name, key)?))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Self::check(response).await?;
        Ok(())
    }
}
