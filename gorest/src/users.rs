//! Client for the `users` resource
//!
//! Every call is a single GET with the configured read timeout. Non-success
//! responses surface as [`Error::Status`]; nothing is retried.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};

/// Name of the remote collection
pub const RESOURCE: &str = "users";

/// Operations the handler layer needs from the users resource
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// GET `{base}/v2/users/{user_id}`
    async fn fetch(&self, user_id: i64) -> Result<Value>;

    /// GET `{base}/v2/users`, with `page` and `per_page` only when given
    async fn fetch_all(&self, page: Option<i64>, limit: Option<i64>) -> Result<Value>;
}

/// HTTP implementation of [`UsersApi`]
#[derive(Debug, Clone)]
pub struct UsersClient {
    http: reqwest::Client,
    resource_url: String,
}

impl UsersClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.read_timeout())
            .read_timeout(config.read_timeout())
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            http,
            resource_url: config.resource_url(RESOURCE),
        })
    }

    /// Build a client from the layered configuration sources
    pub fn from_env() -> Result<Self> {
        Self::new(&Config::load()?)
    }

    /// Collection URL this client talks to
    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    async fn get_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let response = check_status(response)?;
        let url = response.url().to_string();

        response
            .json::<Value>()
            .await
            .map_err(|source| Error::Decode { url, source })
    }
}

/// Build the query for a collection fetch, skipping absent values
pub fn list_query(page: Option<i64>, limit: Option<i64>) -> Vec<(&'static str, i64)> {
    [("page", page), ("per_page", limit)]
        .into_iter()
        .filter_map(|(param, value)| value.map(|v| (param, v)))
        .collect()
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!(status = %status, url = %response.url(), "response received");

    if status.is_client_error() || status.is_server_error() {
        return Err(Error::Status {
            status,
            url: response.url().to_string(),
        });
    }

    Ok(response)
}

#[async_trait]
impl UsersApi for UsersClient {
    async fn fetch(&self, user_id: i64) -> Result<Value> {
        let url = format!("{}/{}", self.resource_url, user_id);
        tracing::debug!("url={}", url);

        self.get_json(self.http.get(&url)).await
    }

    async fn fetch_all(&self, page: Option<i64>, limit: Option<i64>) -> Result<Value> {
        let query = list_query(page, limit);
        tracing::debug!("url={}, query={:?}", self.resource_url, query);

        let mut request = self.http.get(&self.resource_url);
        if !query.is_empty() {
            request = request.query(&query);
        }

        self.get_json(request).await
    }
}
