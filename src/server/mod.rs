//! HTTP debugging server (devui).
//!
//! A small axum application for poking at a running assembly: list the
//! capability catalog, inspect discovered agents, chat with one, and trigger
//! rescans without restarting the process.
//!
//! # Endpoints
//!
//! - `GET  /health`             — Liveness probe
//! - `GET  /capabilities`       — Catalog summary plus every entry
//! - `GET  /agents`             — Discovered agents
//! - `GET  /agents/{name}`      — Agent detail
//! - `POST /agents/{name}/chat` — One message through the agent loop
//! - `POST /reload`             — Rescan manifests, reassemble agents

pub mod routes;

pub use routes::{app_router, AppState};
