//! Library exports for grocery-relay, shared between the binary and tests.

pub mod auth;
pub mod config;
pub mod models;
pub mod relay;
pub mod routes;
pub mod startup;
pub mod state;
pub mod upstream;
pub mod utils;
