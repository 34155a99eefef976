use async_trait::async_trait;
use reqwest::Method;

use super::{ApiClient, GatewayError};
use crate::{
    dto::auth::{LoginRequest, RegisterRequest, TokenResponse},
    models::UserProfile,
};

/// Identity collaborator: issues credentials and resolves them to a profile.
#[async_trait]
pub trait UserGateway: Send + Sync {
    async fn profile(&self, token: &str) -> Result<UserProfile, GatewayError>;

    /// Returns a bearer credential.
    async fn login(&self, request: &LoginRequest) -> Result<String, GatewayError>;

    /// Creates the account and returns a bearer credential for it.
    async fn register(&self, request: &RegisterRequest) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpUserGateway {
    api: ApiClient,
}

impl HttpUserGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UserGateway for HttpUserGateway {
    async fn profile(&self, token: &str) -> Result<UserProfile, GatewayError> {
        self.api.get("/users/profile", &[], Some(token)).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<String, GatewayError> {
        let resp: TokenResponse = self
            .api
            .send(Method::POST, "/users/login", request, None)
            .await?;
        Ok(resp.token)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<String, GatewayError> {
        let resp: TokenResponse = self.api.send(Method::POST, "/users", request, None).await?;
        Ok(resp.token)
    }
}
