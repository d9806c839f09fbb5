pub mod auth;
pub mod categories;
pub mod config;
pub mod docs;
pub mod error;
pub mod flowers;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;
pub mod users;
pub mod validation;
