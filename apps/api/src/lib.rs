//! Resume service backed by the GridDB Web API.
//!
//! `store` is the typed SQL-over-HTTP client; the remaining modules are the
//! HTTP surface and the resume generator that sit on top of it.

pub mod config;
pub mod errors;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod resumes;
pub mod routes;
pub mod state;
pub mod store;
