//! API clients for Deezer.
//!
//! This module provides two API clients:
//! - [`DeezerApi`]: Public API for catalogue lookups (no auth required)
//! - [`GatewayApi`]: Gateway API for lyrics (ARL session required)

pub mod gateway;
pub mod public;

pub use gateway::GatewayApi;
pub use public::DeezerApi;
