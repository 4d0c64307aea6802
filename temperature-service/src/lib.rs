//! Temperature record service: a request-to-storage mapping layer over a
//! PostgreSQL `temperatures` table, exposed over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod rest;
pub mod validate;
