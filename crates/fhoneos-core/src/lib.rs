//! Core library for the FhoneOS serverless functions.
//!
//! Two stateless HTTP handlers behind one axum router: checkout-session
//! creation against Stripe (with account/plan/subscription lookups in
//! Supabase) and a single-turn chat relay to the OpenAI completion API.
//! The router is hosted either locally or behind AWS Lambda.

pub mod auth;
pub mod billing;
pub mod config;
pub mod error;
pub mod provider;
pub mod service;
pub mod store;
pub mod types;
pub mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
