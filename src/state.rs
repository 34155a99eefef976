use std::sync::Arc;

use crate::db::{DbPool, OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(orm: OrmConn, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            pool: orm.get_postgres_connection_pool().clone(),
            orm,
            jwt_secret: jwt_secret.into(),
        }
    }
}
