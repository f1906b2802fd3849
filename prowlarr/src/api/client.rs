use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::app_profiles::AppProfile;
use super::applications::Application;
use super::download_clients::DownloadClient;
use super::endpoint::Endpoint;
use super::error::ApiError;
use super::host::HostApi;
use super::indexer_proxies::IndexerProxy;
use super::indexers::IndexersApi;
use super::notifications::Notification;
use super::system::SystemApi;
use super::tags::TagsApi;

pub const API_PREFIX: &str = "/api/v1";
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// How requests authenticate against Prowlarr
#[derive(Clone, Debug, PartialEq)]
pub enum Credentials {
    /// Sent as the `X-Api-Key` header
    ApiKey(String),
    /// Sent verbatim as the `Authorization` header
    Authorization(String),
}

/// Prowlarr API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl Client {
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(endpoint).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                endpoint,
                parsed.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: parsed.as_str().trim_end_matches('/').to_string(),
                credentials,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}{}", self.inner.base_url, API_PREFIX, path);
        tracing::debug!(%method, %url, "prowlarr request");

        let builder = self.inner.http_client.request(method, &url);
        match &self.inner.credentials {
            Credentials::ApiKey(key) => builder.header(API_KEY_HEADER, key),
            Credentials::Authorization(value) => builder.header(AUTHORIZATION, value),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(self.request(Method::GET, path), path).await?;
        parse_json(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(self.request(Method::POST, path).json(body), path)
            .await?;
        parse_json(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(self.request(Method::PUT, path).json(body), path)
            .await?;
        parse_json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, path), path)
            .await
            .map(|_| ())
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), path, "prowlarr request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::AuthError { body },
            StatusCode::NOT_FOUND => ApiError::NotFound {
                path: path.to_string(),
                body,
            },
            _ => ApiError::ApiError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            },
        })
    }

    pub fn applications(&self) -> Endpoint<'_, Application> {
        Endpoint::new(self, "/applications")
    }

    pub fn app_profiles(&self) -> Endpoint<'_, AppProfile> {
        Endpoint::new(self, "/appprofile")
    }

    pub fn download_clients(&self) -> Endpoint<'_, DownloadClient> {
        Endpoint::new(self, "/downloadclient")
    }

    pub fn indexer_proxies(&self) -> Endpoint<'_, IndexerProxy> {
        Endpoint::new(self, "/indexerproxy")
    }

    pub fn notifications(&self) -> Endpoint<'_, Notification> {
        Endpoint::new(self, "/notification")
    }

    pub fn indexers(&self) -> IndexersApi<'_> {
        IndexersApi::new(self)
    }

    pub fn tags(&self) -> TagsApi<'_> {
        TagsApi::new(self)
    }

    pub fn host(&self) -> HostApi<'_> {
        HostApi::new(self)
    }

    pub fn system(&self) -> SystemApi<'_> {
        SystemApi::new(self)
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!("Failed to deserialize response: {}", e);
        ApiError::ParseError(e.to_string())
    })
}
