pub mod app;
pub mod auth;
pub mod config;
pub mod entities;
pub mod graphql;
pub mod services;
