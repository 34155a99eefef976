use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, GatewayError};
use crate::{cart::OrderRequest, models::Order};

#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Creates the order; the returned value carries the store-assigned id
    /// and status.
    async fn submit(&self, request: &OrderRequest, token: &str) -> Result<Order, GatewayError>;

    async fn list_mine(&self, token: &str) -> Result<Vec<Order>, GatewayError>;

    /// Every order in the store. Requires an admin credential.
    async fn list_all(&self, token: &str) -> Result<Vec<Order>, GatewayError>;

    async fn fetch_by_id(&self, id: Uuid, token: &str) -> Result<Order, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    api: ApiClient,
}

impl HttpOrderGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn submit(&self, request: &OrderRequest, token: &str) -> Result<Order, GatewayError> {
        self.api
            .send(Method::POST, "/orders", request, Some(token))
            .await
    }

    async fn list_mine(&self, token: &str) -> Result<Vec<Order>, GatewayError> {
        self.api.get("/orders/myorders", &[], Some(token)).await
    }

    async fn list_all(&self, token: &str) -> Result<Vec<Order>, GatewayError> {
        self.api.get("/orders", &[], Some(token)).await
    }

    async fn fetch_by_id(&self, id: Uuid, token: &str) -> Result<Order, GatewayError> {
        self.api.get(&format!("/orders/{id}"), &[], Some(token)).await
    }
}
