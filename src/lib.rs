//! QUENX storefront: the REST API that owns the catalog, accounts and orders,
//! and the client core that keeps a shopper's cart and turns it into orders.

pub mod cart;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod storefront;
