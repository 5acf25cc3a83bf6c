//! Axum route handlers for the devui debugging server.
//!
//! # Routes
//!
//! - `GET  /health`              — Returns `{"status": "ok", "version": ...}`
//! - `GET  /capabilities`        — Catalog summary plus every entry
//! - `GET  /agents`              — Discovered agents with capability counts
//! - `GET  /agents/{name}`       — Agent detail (instructions, capabilities, backend)
//! - `POST /agents/{name}/chat`  — Run one message through the agent loop
//! - `POST /reload`              — Rescan manifests and reassemble agents

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::agents::assembler::{discover_all, DiscoveredAgents};
use crate::agents::AssembledAgent;
use crate::capabilities::{CapabilityCatalog, CapabilityScanner, CatalogSummary, ScanReport};
use crate::tools::builtin_handlers;

/// Shared application state for the devui server.
///
/// The catalog and the agent map are replaced wholesale by a reload; request
/// handlers never mutate them in place. Agents are cloned out of the map
/// before running, so no lock is held across a conversation.
#[derive(Clone)]
pub struct AppState {
    /// Discovered capabilities, swapped on reload.
    pub catalog: Arc<RwLock<CapabilityCatalog>>,
    /// Assembled agents keyed by config file stem, swapped on reload.
    pub agents: Arc<RwLock<HashMap<String, AssembledAgent>>>,
    /// Root directory of capability manifests.
    pub capabilities_dir: PathBuf,
    /// Directory of agent descriptor files.
    pub agents_dir: PathBuf,
    /// Serializes reloads so two concurrent requests cannot interleave swaps.
    reload_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(capabilities_dir: impl Into<PathBuf>, agents_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(CapabilityCatalog::new())),
            agents: Arc::new(RwLock::new(HashMap::new())),
            capabilities_dir: capabilities_dir.into(),
            agents_dir: agents_dir.into(),
            reload_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Rescan the manifest directory and reassemble every agent.
    ///
    /// The scan runs on the blocking pool against fresh structures; the
    /// shared state is only touched for the final swap, so requests keep
    /// being served from the previous catalog until the reload lands.
    pub async fn reload(&self) -> Result<Value, String> {
        let _guard = self.reload_lock.lock().await;

        let capabilities_dir = self.capabilities_dir.clone();
        let agents_dir = self.agents_dir.clone();
        let (catalog, scan, discovered) = tokio::task::spawn_blocking(move || {
            let scanner = CapabilityScanner::new(capabilities_dir, builtin_handlers());
            let mut catalog = CapabilityCatalog::new();
            let scan = scanner.scan(&mut catalog);
            let discovered = discover_all(&agents_dir, &catalog);
            (catalog, scan, discovered)
        })
        .await
        .map_err(|e| format!("reload task panicked: {}", e))?;

        let summary = catalog.summary();
        let report = reload_report(&scan, &discovered, &summary);

        {
            let mut slot = self
                .catalog
                .write()
                .map_err(|_| "Catalog lock poisoned".to_string())?;
            *slot = catalog;
        }
        {
            let mut slot = self
                .agents
                .write()
                .map_err(|_| "Agents lock poisoned".to_string())?;
            *slot = discovered.agents;
        }

        Ok(report)
    }
}

/// Flatten scan and assembly outcomes into the reload response body.
fn reload_report(scan: &ScanReport, discovered: &DiscoveredAgents, summary: &CatalogSummary) -> Value {
    let scan_failures: Vec<Value> = scan
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "path": f.path.display().to_string(),
                "error": f.error.to_string(),
            })
        })
        .collect();

    let agent_failures: Vec<Value> = discovered
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "path": f.path.display().to_string(),
                "error": f.error.to_string(),
            })
        })
        .collect();

    let mut names: Vec<&String> = discovered.agents.keys().collect();
    names.sort();

    serde_json::json!({
        "capabilities": {
            "discovered": scan.discovered,
            "failed": scan.failed,
            "failures": scan_failures,
            "summary": summary,
        },
        "agents": {
            "loaded": discovered.agents.len(),
            "failed": discovered.failures.len(),
            "failures": agent_failures,
            "names": names,
        },
    })
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/capabilities", get(list_capabilities_handler))
        .route("/agents", get(list_agents_handler))
        .route("/agents/{name}", get(get_agent_handler))
        .route("/agents/{name}/chat", post(chat_handler))
        .route("/reload", post(reload_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "agentry-devui",
    }))
}

/// GET /capabilities — catalog summary plus per-entry metadata.
async fn list_capabilities_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let catalog = state.catalog.read().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Catalog lock poisoned"})),
        )
    })?;

    let entries: Vec<Value> = catalog
        .all()
        .iter()
        .map(|c| {
            serde_json::json!({
                "domain": c.meta.domain,
                "name": c.meta.name,
                "description": c.meta.description,
                "tags": c.meta.tags,
                "mock": c.meta.mock,
                "required_credential": c.meta.required_credential,
                "params": c.meta.params,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "summary": catalog.summary(),
        "capabilities": entries,
    })))
}

/// GET /agents — discovered agents, sorted by key.
async fn list_agents_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let agents = state.agents.read().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Agents lock poisoned"})),
        )
    })?;

    let mut keys: Vec<&String> = agents.keys().collect();
    keys.sort();

    let list: Vec<Value> = keys
        .iter()
        .filter_map(|key| agents.get(*key).map(|agent| (key, agent)))
        .map(|(key, agent)| {
            serde_json::json!({
                "key": key,
                "name": agent.name(),
                "description": agent.description(),
                "capabilities": agent.capability_names().len(),
                "provider": agent.provider(),
                "model": agent.model_id(),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({ "agents": list })))
}

/// GET /agents/{name} — full agent detail.
async fn get_agent_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let agents = state.agents.read().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Agents lock poisoned"})),
        )
    })?;

    let agent = agents.get(&name).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("Agent '{}' not found", name)})),
        )
    })?;

    Ok(Json(serde_json::json!({
        "key": name,
        "name": agent.name(),
        "description": agent.description(),
        "instructions": agent.instructions(),
        "provider": agent.provider(),
        "model": agent.model_id(),
        "capabilities": agent.capability_names(),
    })))
}

/// POST /agents/{name}/chat — run one message through the agent loop.
///
/// Request body: `{ "message": "..." }`
async fn chat_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let message = body
        .get("message")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Missing 'message' field in request body"})),
            )
        })?;

    // Clone the agent out so the lock is not held across the conversation.
    let agent = {
        let agents = state.agents.read().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Agents lock poisoned"})),
            )
        })?;
        agents.get(&name).cloned()
    };

    let Some(agent) = agent else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("Agent '{}' not found", name)})),
        ));
    };

    match agent.send(message).await {
        Ok(response) => Ok(Json(serde_json::json!({
            "agent": agent.name(),
            "response": response,
        }))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Agent run failed: {}", e)})),
        )),
    }
}

/// POST /reload — rescan capability manifests and reassemble agents.
async fn reload_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.reload().await.map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e})),
        )
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use async_trait::async_trait;

    use crate::llms::base::{ChatModel, LLMMessage};
    use crate::llms::error::LlmError;
    use crate::llms::selector::ModelSelection;

    const WEATHER_MANIFEST: &str = r#"
capabilities:
  - domain: weather
    name: get_weather
    description: Current conditions for a location
    tags: [weather, current]
    mock: true
    handler: weather.get_weather
    params:
      - name: location
        type: string
        description: The location to check
        required: true
  - domain: weather
    name: get_forecast
    description: Multi-day forecast
    tags: [weather, forecast]
    mock: true
    handler: weather.get_forecast
"#;

    const FORECASTER_AGENT: &str = r#"
name: forecaster
description: Answers weather questions
instructions: |
  You are a weather assistant. Use your tools to answer.
tool_domains: [weather]
model:
  providers: [azure]
  api_key: test-key
  endpoint: https://example.openai.azure.com
"#;

    /// Backend stub that always replies with the same text.
    #[derive(Debug)]
    struct CannedModel {
        reply: String,
    }

    #[async_trait]
    impl ChatModel for CannedModel {
        fn provider(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "stub"
        }

        async fn acall(
            &self,
            _messages: Vec<LLMMessage>,
            _tools: Option<Vec<Value>>,
        ) -> Result<Value, LlmError> {
            Ok(Value::String(self.reply.clone()))
        }
    }

    fn canned_agent(name: &str, reply: &str) -> AssembledAgent {
        let selection = ModelSelection {
            model: Arc::new(CannedModel {
                reply: reply.to_string(),
            }),
            provider: "canned".to_string(),
            attempts: vec![],
        };
        AssembledAgent::new(
            name.to_string(),
            "Echoes a canned reply".to_string(),
            "You are a canned assistant.".to_string(),
            vec![],
            selection,
        )
    }

    fn test_state() -> (AppState, tempfile::TempDir, tempfile::TempDir) {
        let caps = tempfile::tempdir().unwrap();
        let agents = tempfile::tempdir().unwrap();
        let state = AppState::new(caps.path(), agents.path());
        (state, caps, agents)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _caps, _agents) = test_state();
        let (status, json) = get_json(app_router(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "agentry-devui");
    }

    #[tokio::test]
    async fn test_capabilities_endpoint_empty() {
        let (state, _caps, _agents) = test_state();
        let (status, json) = get_json(app_router(state), "/capabilities").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["total"], 0);
        assert!(json["capabilities"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_populates_catalog_and_agents() {
        let (state, caps, agents) = test_state();
        std::fs::write(caps.path().join("weather.yaml"), WEATHER_MANIFEST).unwrap();
        std::fs::write(agents.path().join("forecaster.yaml"), FORECASTER_AGENT).unwrap();

        let (status, report) =
            post_json(app_router(state.clone()), "/reload", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["capabilities"]["discovered"], 2);
        assert_eq!(report["capabilities"]["failed"], 0);
        assert_eq!(report["capabilities"]["summary"]["domains"]["weather"], 2);
        assert_eq!(report["agents"]["loaded"], 1);
        assert_eq!(report["agents"]["names"][0], "forecaster");

        let (status, listing) = get_json(app_router(state.clone()), "/agents").await;
        assert_eq!(status, StatusCode::OK);
        let list = listing["agents"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["key"], "forecaster");
        assert_eq!(list[0]["capabilities"], 2);
        assert_eq!(list[0]["provider"], "azure");

        let (status, detail) = get_json(app_router(state), "/agents/forecaster").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["name"], "forecaster");
        assert!(detail["instructions"]
            .as_str()
            .unwrap()
            .contains("weather assistant"));
        assert_eq!(
            detail["capabilities"],
            serde_json::json!(["weather.get_weather", "weather.get_forecast"])
        );
    }

    #[tokio::test]
    async fn test_reload_reports_per_file_failures() {
        let (state, caps, agents) = test_state();
        std::fs::write(caps.path().join("weather.yaml"), WEATHER_MANIFEST).unwrap();
        std::fs::write(caps.path().join("broken.yaml"), "capabilities: [[[").unwrap();
        std::fs::write(agents.path().join("bad.yaml"), "name: [unclosed").unwrap();

        let (status, report) =
            post_json(app_router(state.clone()), "/reload", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["capabilities"]["discovered"], 2);
        assert_eq!(report["capabilities"]["failed"], 1);
        assert!(report["capabilities"]["failures"][0]["path"]
            .as_str()
            .unwrap()
            .ends_with("broken.yaml"));
        assert_eq!(report["agents"]["loaded"], 0);
        assert_eq!(report["agents"]["failed"], 1);

        // The broken manifest did not block its sibling.
        let (_, caps_json) = get_json(app_router(state), "/capabilities").await;
        assert_eq!(caps_json["summary"]["total"], 2);
    }

    #[tokio::test]
    async fn test_get_agent_unknown_is_404() {
        let (state, _caps, _agents) = test_state();
        let (status, json) = get_json(app_router(state), "/agents/nobody").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("nobody"));
    }

    #[tokio::test]
    async fn test_chat_roundtrip() {
        let (state, _caps, _agents) = test_state();
        state
            .agents
            .write()
            .unwrap()
            .insert("demo".to_string(), canned_agent("demo", "Canned hello."));

        let (status, json) = post_json(
            app_router(state),
            "/agents/demo/chat",
            serde_json::json!({"message": "Hi there"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["agent"], "demo");
        assert_eq!(json["response"], "Canned hello.");
    }

    #[tokio::test]
    async fn test_chat_missing_message_is_400() {
        let (state, _caps, _agents) = test_state();
        state
            .agents
            .write()
            .unwrap()
            .insert("demo".to_string(), canned_agent("demo", "x"));

        let (status, json) = post_json(
            app_router(state),
            "/agents/demo/chat",
            serde_json::json!({"text": "wrong field"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("'message'"));
    }

    #[tokio::test]
    async fn test_chat_unknown_agent_is_404() {
        let (state, _caps, _agents) = test_state();
        let (status, _) = post_json(
            app_router(state),
            "/agents/ghost/chat",
            serde_json::json!({"message": "anyone?"}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
