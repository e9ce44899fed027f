//! Servidor web Axum (HTTP + WebSocket) para extração de endereços postais

mod settings;

use std::sync::Arc;

use address_core::{
    AddressModel, AddressPipeline, Detection, GazetteerStats, HttpClassifier, PipelineEvent,
};
use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::settings::load_settings;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: AddressPipeline,
}

#[derive(Deserialize)]
struct ExtractRequest {
    text: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    gazetteer: GazetteerStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("ADDRESS_ENV").ok();
    let settings = load_settings(env.as_deref()).context("configuração inválida")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let model = AddressModel::from_paths(&settings.datasets).context("falha ao montar o gazetteer")?;
    let classifier = HttpClassifier::new(settings.classifier.clone())?;
    let state = Arc::new(AppState {
        pipeline: AddressPipeline::new(model, Arc::new(classifier)),
    });

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("não foi possível escutar em {address}"))?;
    info!(%address, classifier = %settings.classifier.url, "servidor de endereços iniciado");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(extract_handler))
        .route("/extract", post(extract_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Extração via HTTP POST (sem streaming)
async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    match state.pipeline.extract(&req.text).await {
        Ok(detections) => Json::<Vec<Detection>>(detections).into_response(),
        Err(err) => {
            error!(error = %err, "extração falhou");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        gazetteer: state.pipeline.model().stats(),
    })
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe um texto por mensagem, executa o pipeline e devolve os eventos em ordem
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // JSON {text} ou texto puro
                let text = match serde_json::from_str::<ExtractRequest>(&text) {
                    Ok(req) => req.text,
                    Err(_) => text.to_string(),
                };
                if text.trim().is_empty() {
                    continue;
                }

                info!(chars = text.chars().count(), "extraindo via WebSocket");

                let events: Vec<PipelineEvent> = {
                    let (tx, rx) = std::sync::mpsc::channel();
                    // o erro já vem como último evento
                    let _ = state.pipeline.extract_streaming(&text, tx).await;
                    rx.try_iter().collect()
                };

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
