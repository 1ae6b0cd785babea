pub mod activity;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod routes;
pub mod schema;
pub mod state;
