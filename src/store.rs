//! Client for the remote entry API.
//!
//! Each entry kind lives under its own REST resource with three calls:
//! `GET /{resource}`, `POST /{resource}` and `DELETE /{resource}/{id}`.

use crate::errors::StoreError;
use crate::models::{ExerciseEntry, MealEntry, NewExercise, NewMeal, NewWeight, WeightEntry};
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, time::Duration};
use tracing::debug;

/// A record persisted by the remote store.
pub trait Entry: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Body sent on create; the store answers with the full record.
    type Draft: Serialize + Send + Sync;

    const RESOURCE: &'static str;

    fn id(&self) -> &str;
}

impl Entry for MealEntry {
    type Draft = NewMeal;
    const RESOURCE: &'static str = "meals";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entry for ExerciseEntry {
    type Draft = NewExercise;
    const RESOURCE: &'static str = "exercises";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entry for WeightEntry {
    type Draft = NewWeight;
    const RESOURCE: &'static str = "weights";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Builds the shared HTTP client used by every store.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, StoreError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// List/create/delete access to one resource of the remote API.
#[derive(Debug)]
pub struct RemoteStore<R> {
    http: reqwest::Client,
    base_url: String,
    _entry: PhantomData<fn() -> R>,
}

impl<R> Clone for RemoteStore<R> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            _entry: PhantomData,
        }
    }
}

impl<R: Entry> RemoteStore<R> {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            _entry: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, R::RESOURCE)
    }

    /// Fetches the full collection.
    pub async fn list(&self) -> Result<Vec<R>, StoreError> {
        let response = self.http.get(self.collection_url()).send().await?;
        let entries: Vec<R> = decode(response).await?;
        debug!(resource = R::RESOURCE, count = entries.len(), "listed entries");
        Ok(entries)
    }

    /// Posts a draft; the returned record carries the server-assigned id.
    pub async fn create(&self, draft: &R::Draft) -> Result<R, StoreError> {
        let response = self
            .http
            .post(self.collection_url())
            .json(draft)
            .send()
            .await?;
        let created: R = decode(response).await?;
        debug!(resource = R::RESOURCE, id = created.id(), "created entry");
        Ok(created)
    }

    /// Deletes one entry. Blank or `"undefined"` ids never reach the network;
    /// anything else is sent as a single percent-encoded path segment.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        let url = format!("{}/{}", self.collection_url(), urlencoding::encode(id));
        let response = self.http.delete(url).send().await?;
        check_status(response).await?;
        debug!(resource = R::RESOURCE, id, "deleted entry");
        Ok(())
    }
}

fn validate_id(id: &str) -> Result<(), StoreError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
        return Err(StoreError::validation(format!("invalid entry id '{id}'")));
    }
    if trimmed.contains('/') {
        return Err(StoreError::validation(format!("entry id '{id}' contains '/'")));
    }
    Ok(())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Server { status, body })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| StoreError::Decode(err.to_string()))
}
