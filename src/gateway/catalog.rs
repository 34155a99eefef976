use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, GatewayError};
use crate::{
    dto::products::ProductInput,
    models::{Category, Product},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub limit: Option<u64>,
    pub category: Option<Category>,
}

impl ProductFilter {
    pub fn featured(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            category: None,
        }
    }

    fn as_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.as_str().to_string()));
        }
        query
    }
}

/// Read access to the catalog, plus the admin-only product mutations.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn fetch_by_id(&self, id: Uuid) -> Result<Product, GatewayError>;

    async fn fetch_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, GatewayError>;

    async fn fetch_featured(&self, limit: u64) -> Result<Vec<Product>, GatewayError> {
        self.fetch_all(&ProductFilter::featured(limit)).await
    }

    async fn create(&self, input: &ProductInput, token: &str) -> Result<Product, GatewayError>;

    async fn update(
        &self,
        id: Uuid,
        input: &ProductInput,
        token: &str,
    ) -> Result<Product, GatewayError>;

    /// Returns the store's confirmation message.
    async fn delete(&self, id: Uuid, token: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpCatalogGateway {
    api: ApiClient,
}

impl HttpCatalogGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CatalogGateway for HttpCatalogGateway {
    async fn fetch_by_id(&self, id: Uuid) -> Result<Product, GatewayError> {
        self.api.get(&format!("/products/{id}"), &[], None).await
    }

    async fn fetch_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, GatewayError> {
        self.api.get("/products", &filter.as_query(), None).await
    }

    async fn create(&self, input: &ProductInput, token: &str) -> Result<Product, GatewayError> {
        self.api
            .send(Method::POST, "/products", input, Some(token))
            .await
    }

    async fn update(
        &self,
        id: Uuid,
        input: &ProductInput,
        token: &str,
    ) -> Result<Product, GatewayError> {
        self.api
            .send(Method::PUT, &format!("/products/{id}"), input, Some(token))
            .await
    }

    async fn delete(&self, id: Uuid, token: &str) -> Result<String, GatewayError> {
        self.api
            .message(Method::DELETE, &format!("/products/{id}"), Some(token))
            .await
    }
}
