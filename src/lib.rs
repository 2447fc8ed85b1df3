pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod docs;
pub mod error;
pub mod extraction;
pub mod form;
pub mod model;
pub mod routes;
pub mod utils;
