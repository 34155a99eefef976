//! HTTP gateways to the product, order and user stores.
//!
//! Each store is reached through a trait so the storefront can be driven
//! against in-memory fakes; the `Http*` implementations share one
//! [`ApiClient`] that speaks the API's response envelope.

pub mod catalog;
pub mod orders;
pub mod users;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::ClientConfig;

pub use catalog::{CatalogGateway, HttpCatalogGateway, ProductFilter};
pub use orders::{HttpOrderGateway, OrderGateway};
pub use users::{HttpUserGateway, UserGateway};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Network failure, timeout or a 5xx from the store.
    #[error("store unreachable: {0}")]
    Transport(String),

    #[error("Not Found")]
    NotFound,

    #[error("authentication required")]
    Unauthenticated,

    #[error("admin access required")]
    Forbidden,

    /// The store refused the request on business grounds (validation, stock).
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Maps a non-success status and the server's message onto the taxonomy.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            StatusCode::UNAUTHORIZED => GatewayError::Unauthenticated,
            StatusCode::FORBIDDEN => GatewayError::Forbidden,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                GatewayError::Transport(format!("{status}: {message}"))
            }
            s if s.is_client_error() => GatewayError::Rejected(message),
            s => GatewayError::Transport(format!("{s}: {message}")),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// The `{ message, data, meta }` wrapper every API response uses.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Shared HTTP plumbing for the gateways.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, GatewayError> {
        Self::new(config.api_url.clone(), config.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, GatewayError> {
        let builder = self.request(Method::GET, path, token).query(query);
        data(execute(builder).await?)
    }

    pub(crate) async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, GatewayError> {
        let builder = self.request(method, path, token).json(body);
        data(execute(builder).await?)
    }

    /// Issues a request whose only useful output is the confirmation message.
    pub(crate) async fn message(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<String, GatewayError> {
        let envelope: Envelope<serde_json::Value> =
            execute(self.request(method, path, token)).await?;
        Ok(envelope.message)
    }
}

async fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Envelope<T>, GatewayError> {
    let response = builder.send().await.map_err(|err| {
        tracing::warn!(error = %err, "store request failed");
        GatewayError::from(err)
    })?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<Envelope<T>>().await.map_err(|err| {
            tracing::warn!(error = %err, %status, "undecodable store response");
            GatewayError::Decode(err.to_string())
        });
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
    tracing::warn!(%status, %message, "store returned an error");
    Err(GatewayError::from_status(status, message))
}

fn data<T>(envelope: Envelope<T>) -> Result<T, GatewayError> {
    envelope
        .data
        .ok_or_else(|| GatewayError::Decode(format!("response `{}` has no data", envelope.message)))
}
