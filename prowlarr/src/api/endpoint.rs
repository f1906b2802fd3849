//! CRUD operations shared by every collection endpoint

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::client::Client;
use super::error::ApiError;

/// A `/api/v1/<path>` collection supporting list, get, create, update and delete
pub struct Endpoint<'a, T> {
    client: &'a Client,
    path: &'static str,
    _model: PhantomData<fn() -> T>,
}

impl<'a, T: Serialize + DeserializeOwned> Endpoint<'a, T> {
    pub fn new(client: &'a Client, path: &'static str) -> Self {
        Self {
            client,
            path,
            _model: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.client.get(self.path).await
    }

    pub async fn get(&self, id: i64) -> Result<T, ApiError> {
        self.client.get(&format!("{}/{}", self.path, id)).await
    }

    pub async fn create(&self, item: &T) -> Result<T, ApiError> {
        self.client.post(self.path, item).await
    }

    pub async fn update(&self, id: i64, item: &T) -> Result<T, ApiError> {
        self.client.put(&format!("{}/{}", self.path, id), item).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("{}/{}", self.path, id)).await
    }
}
