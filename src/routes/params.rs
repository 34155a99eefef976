use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::Category;

const MAX_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Maximum number of products to return. Omitted means the whole catalog.
    pub limit: Option<u64>,
    pub category: Option<Category>,
}

impl ProductQuery {
    pub fn normalized_limit(&self) -> Option<u64> {
        self.limit.map(|limit| limit.clamp(1, MAX_LIMIT))
    }
}
