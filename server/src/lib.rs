//! Poster studio backend: simulated STK-push billing and AI copy generation.

pub mod billing;
pub mod config;
pub mod error;
pub mod llm;
pub mod routes;
pub mod services;
pub mod state;
