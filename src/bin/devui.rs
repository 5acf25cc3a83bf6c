//! agentry devui server binary.
//!
//! Scans capability manifests and agent configs at startup, then serves the
//! devui HTTP API for inspecting the catalog and chatting with agents.
//!
//! # Environment Variables
//!
//! - `CAPABILITIES_DIR` — Root directory of capability manifests (default: "capabilities")
//! - `AGENTS_DIR` — Directory of agent YAML configs (default: "agents")
//! - `PORT` — HTTP port (default: 8080)
//! - `RUST_LOG` — Tracing filter (default: "info,agentry=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin devui
//! # point at another workspace:
//! CAPABILITIES_DIR=./my-caps AGENTS_DIR=./my-agents cargo run --bin devui
//! ```

use agentry::server::{app_router, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agentry=debug".into()),
        )
        .init();

    let capabilities_dir =
        std::env::var("CAPABILITIES_DIR").unwrap_or_else(|_| "capabilities".to_string());
    let agents_dir = std::env::var("AGENTS_DIR").unwrap_or_else(|_| "agents".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    // Build app state and run the initial scan
    let state = AppState::new(&capabilities_dir, &agents_dir);

    match state.reload().await {
        Ok(report) => {
            tracing::info!(
                "Initial scan: {} capabilities, {} agents",
                report["capabilities"]["discovered"],
                report["agents"]["loaded"]
            );
            let cap_failed = report["capabilities"]["failed"].as_u64().unwrap_or(0);
            let agent_failed = report["agents"]["failed"].as_u64().unwrap_or(0);
            if cap_failed + agent_failed > 0 {
                tracing::warn!(
                    "{} manifest file(s) and {} agent config(s) were withheld; POST /reload after fixing",
                    cap_failed,
                    agent_failed
                );
            }
        }
        Err(e) => tracing::error!("Initial scan failed: {}", e),
    }

    let app = app_router(state);

    tracing::info!("agentry devui starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health             — liveness probe");
    tracing::info!("  GET  /capabilities       — catalog summary and entries");
    tracing::info!("  GET  /agents             — discovered agents");
    tracing::info!("  GET  /agents/{{name}}      — agent detail");
    tracing::info!("  POST /agents/{{name}}/chat — chat with an agent");
    tracing::info!("  POST /reload             — rescan manifests and agents");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
