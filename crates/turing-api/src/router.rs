//! Router configuration and server setup.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::CorsPolicy;
use crate::handlers;
use crate::state::AppState;

fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let origin = match policy {
        CorsPolicy::Any => AllowOrigin::from(Any),
        CorsPolicy::Allow(allowed) => {
            let origins: Vec<HeaderValue> = allowed
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors));

    Router::new()
        .route("/api/health", get(handlers::health))
        // Conversations
        .route("/api/conversations", post(handlers::create_conversation))
        .route("/api/conversations/:id", get(handlers::get_conversation))
        .route(
            "/api/conversations/:id/start",
            post(handlers::start_conversation),
        )
        .route(
            "/api/conversations/:id/advance",
            post(handlers::advance_conversation),
        )
        .route("/api/conversations/:id/message", post(handlers::submit_message))
        .route("/api/conversations/:id/end", post(handlers::end_conversation))
        // Archive and catalogs
        .route("/api/history", get(handlers::list_history))
        .route("/api/personas", get(handlers::list_personas))
        .route("/api/models", get(handlers::list_models))
        .layer(middleware)
        .with_state(state)
}

/// Periodically drops finished conversations whose TTL ran out.
fn spawn_registry_sweep(state: &AppState, period: Duration) -> JoinHandle<()> {
    let orchestrator = Arc::clone(&state.orchestrator);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = orchestrator.registry().evict_expired().await;
            if evicted > 0 {
                debug!(evicted, "Registry sweep");
            }
        }
    })
}

/// Starts the API server.
pub async fn serve(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let sweep = state
        .config
        .sweep_interval
        .map(|period| spawn_registry_sweep(&state, period));
    info!(%addr, "API server listening");

    let result = axum::serve(listener, create_router(state)).await;
    if let Some(sweep) = sweep {
        sweep.abort();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use crate::config::ApiConfig;

    use turing_agent::verdict::VERDICT_INSTRUCTION;
    use turing_agent::{LlmGateway, Provider, ANALYSIS_DELIMITER};
    use turing_models::ChatTurn;
    use turing_orchestrator::Orchestrator;
    use turing_persistence::HistoryStore;

    struct EchoGateway;

    #[async_trait]
    impl LlmGateway for EchoGateway {
        async fn generate(
            &self,
            messages: &[ChatTurn],
            _temperature: f32,
            _model: &str,
        ) -> turing_agent::Result<String> {
            let last = messages.last().map(|t| t.content.as_str()).unwrap_or_default();
            if last == VERDICT_INSTRUCTION {
                return Ok(r#"{"verdict":"human","confidence":64,"reasoning":"typos"}"#.into());
            }
            if messages[0].content.contains(ANALYSIS_DELIMITER) {
                Ok(format!(
                    "so what do you do?\n{}\n{{\"thought\":\"fine\",\"suspicion\":30}}",
                    ANALYSIS_DELIMITER
                ))
            } else {
                Ok("eh, fixing wires mostly".into())
            }
        }
    }

    fn make_server() -> (TestServer, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(EchoGateway),
            Arc::new(HistoryStore::in_dir(dir.path())),
        );
        let state = AppState::new(ApiConfig::default(), orchestrator)
            .with_available_providers([Provider::OpenAI]);
        (TestServer::new(create_router(state)).unwrap(), dir)
    }

    async fn create(server: &TestServer, body: Value) -> String {
        let response = server.post("/api/conversations").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _dir) = make_server();

        let response = server.get("/api/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["live_conversations"], 0);
    }

    #[tokio::test]
    async fn test_create_clamps_and_resolves_persona() {
        let (server, _dir) = make_server();

        let response = server
            .post("/api/conversations")
            .json(&json!({"turn_limit": 100, "persona": "tom"}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["status"], "idle");
        assert_eq!(body["turn_limit"], 30);
        assert_eq!(body["config"]["persona"]["name"], "Tom");
        assert_eq!(body["config"]["interrogator_style"], "neutral");
        assert!(body.get("interrogator").is_none());
        assert!(body["transcript"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_preset() {
        let (server, _dir) = make_server();

        let response = server
            .post("/api/conversations")
            .json(&json!({"persona": "ghost"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_full_ai_conversation() {
        let (server, _dir) = make_server();
        let id = create(&server, json!({"turn_limit": 3})).await;

        let response = server.post(&format!("/api/conversations/{}/start", id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["transcript"][0]["agent"], "interrogator");
        assert_eq!(body["transcript"][0]["suspicion_score"], 30);
        assert_eq!(body["transcript"][0]["content"], "so what do you do?");

        let mut body = body;
        for _ in 0..6 {
            let response = server
                .post(&format!("/api/conversations/{}/advance", id))
                .await;
            response.assert_status_ok();
            body = response.json();
        }
        assert_eq!(body["status"], "completed");
        assert_eq!(body["transcript"].as_array().unwrap().len(), 6);
        assert_eq!(body["verdict"]["verdict"], "human");
        assert_eq!(body["verdict"]["confidence"], 64);
        assert!(body["next_speaker"].is_null());

        let response = server.post(&format!("/api/conversations/{}/end", id)).await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server.get("/api/history").await;
        response.assert_status_ok();
        let history: Value = response.json();
        assert_eq!(history["total"], 1);
        assert_eq!(history["conversations"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_human_message_flow() {
        let (server, _dir) = make_server();
        let id = create(&server, json!({"human_role": "convincer"})).await;
        server
            .post(&format!("/api/conversations/{}/start", id))
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("/api/conversations/{}/message", id))
            .json(&json!({"content": "   "}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post(&format!("/api/conversations/{}/message", id))
            .json(&json!({"content": " i'm an electrician "}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let transcript = body["transcript"].as_array().unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1]["content"], "i'm an electrician");
        assert_eq!(transcript[1]["role"], "user");
        assert_eq!(body["awaiting_human"], true);
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let (server, _dir) = make_server();

        let response = server.get("/api/conversations/conv-missing").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let response = server.post("/api/conversations/conv-missing/start").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_advance_before_start_conflicts() {
        let (server, _dir) = make_server();
        let id = create(&server, json!({})).await;

        let response = server
            .post(&format!("/api/conversations/{}/advance", id))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_catalogs() {
        let (server, _dir) = make_server();

        let personas: Value = server.get("/api/personas").await.json();
        assert_eq!(personas["total"], 5);
        assert_eq!(personas["personas"][0]["id"], "maya");

        let models: Value = server.get("/api/models").await.json();
        let models = models["models"].as_array().unwrap();
        let gpt = models.iter().find(|m| m["id"] == "gpt-4o").unwrap();
        let claude = models
            .iter()
            .find(|m| m["provider"] == "anthropic")
            .unwrap();
        assert_eq!(gpt["available"], true);
        assert_eq!(claude["available"], false);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (server, _dir) = make_server();

        let response = server
            .get("/api/health")
            .add_header(
                axum::http::header::ORIGIN,
                HeaderValue::from_static("http://localhost:5173"),
            )
            .await;
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_cors_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(EchoGateway),
            Arc::new(HistoryStore::in_dir(dir.path())),
        );
        let config = ApiConfig::default().with_cors(CorsPolicy::from_origins(vec![
            "http://localhost:5173".into(),
        ]));
        let server = TestServer::new(create_router(AppState::new(config, orchestrator))).unwrap();

        let allowed = server
            .get("/api/health")
            .add_header(
                axum::http::header::ORIGIN,
                HeaderValue::from_static("http://localhost:5173"),
            )
            .await;
        assert_eq!(
            allowed.headers()["access-control-allow-origin"],
            "http://localhost:5173"
        );

        let other = server
            .get("/api/health")
            .add_header(
                axum::http::header::ORIGIN,
                HeaderValue::from_static("http://evil.test"),
            )
            .await;
        assert!(!other.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_registry_sweep_evicts_expired() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(EchoGateway),
            Arc::new(HistoryStore::in_dir(dir.path())),
        )
        .with_policy(turing_orchestrator::RegistryPolicy {
            completed_ttl: Duration::ZERO,
            max_conversations: 8,
        });
        let state = AppState::new(ApiConfig::default(), orchestrator);

        let conv = state
            .orchestrator
            .create(turing_models::ConversationConfig::default())
            .await
            .unwrap();
        state.orchestrator.start(&conv.id).await.unwrap();
        state.orchestrator.end(&conv.id).await.unwrap();
        assert_eq!(state.orchestrator.registry().len().await, 1);

        let sweep = spawn_registry_sweep(&state, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweep.abort();

        assert!(state.orchestrator.registry().is_empty().await);
        // Still readable from history.
        assert!(state.orchestrator.get(&conv.id).await.is_ok());
    }
}
