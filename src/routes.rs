//! HTTP route handlers for the Pressroom server.
//!
//! The API surface:
//!
//! - `GET /api/articles` - list all articles
//! - `GET /api/articles/{id}` - fetch one article
//! - `POST /api/articles` - create an article (201)
//! - `PUT /api/articles/{id}` - update an article (admin only)
//! - `DELETE /api/articles/{id}` - delete an article (admin only, 204)
//! - `GET /ws` - WebSocket subscription to mutation events
//! - `GET /health` - health check
//!
//! Every articles route passes through the authentication gate before the
//! service is invoked; mutation bodies are read as raw bytes and parsed
//! only after the credential has been verified, so an unauthenticated
//! request never gets further than the gate.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing::{debug, error, info, trace};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::broadcast::EventBroadcaster;
use crate::config::Config;
use crate::error::{ApiError, ErrorBody};
use crate::service::ArticleService;
use crate::store::{ArticleStore, MemoryArticleStore, MemoryUserStore, UserStore};
use crate::token::TokenVerifier;
use crate::types::{Article, ArticlePatch, NewArticle};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,

    /// Verifier for request credentials.
    pub verifier: Arc<TokenVerifier>,

    /// The article pipeline.
    pub service: ArticleService,

    /// Event fan-out, shared with the service.
    pub broadcaster: EventBroadcaster,

    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Creates application state with in-memory stores, the user store
    /// seeded from configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let users: Arc<dyn UserStore> =
            Arc::new(MemoryUserStore::with_users(config.users.iter().cloned()));
        let articles: Arc<dyn ArticleStore> = Arc::new(MemoryArticleStore::new(users.clone()));
        Self::with_stores(config, articles, users)
    }

    /// Creates application state over caller-provided store collaborators.
    ///
    /// Useful for tests that need to observe or pre-seed the stores.
    #[must_use]
    pub fn with_stores(
        config: Config,
        articles: Arc<dyn ArticleStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let verifier = Arc::new(TokenVerifier::new(&config.jwt_secret));
        let broadcaster = EventBroadcaster::new();
        let service = ArticleService::new(articles, users, broadcaster.clone());

        Self {
            config: Arc::new(config),
            verifier,
            service,
            broadcaster,
            start_time: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.service)
            .field("broadcaster", &self.broadcaster)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Creates the application router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/articles", get(list_articles).post(create_article))
        .route(
            "/api/articles/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/ws", get(get_ws))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds a 400 response for a body that failed to parse.
fn bad_request(err: &serde_json::Error) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: format!("invalid request body: {err}"),
        }),
    )
        .into_response()
}

// ============================================================================
// Article handlers
// ============================================================================

/// GET /api/articles - list all articles.
async fn list_articles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Article>>, ApiError> {
    let claims = authenticate(&headers, &state.verifier)?;
    let articles = state.service.list(&claims).await?;
    Ok(Json(articles))
}

/// GET /api/articles/{id} - fetch one article.
async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Article>, ApiError> {
    let claims = authenticate(&headers, &state.verifier)?;
    let article = state.service.get(&claims, id).await?;
    Ok(Json(article))
}

/// POST /api/articles - create an article authored by the caller.
async fn create_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let claims = match authenticate(&headers, &state.verifier) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let draft: NewArticle = match serde_json::from_slice(&body) {
        Ok(draft) => draft,
        Err(err) => {
            debug!(error = %err, "Failed to parse article draft");
            return bad_request(&err);
        }
    };

    match state.service.create(&claims, draft).await {
        Ok(article) => (StatusCode::CREATED, Json(article)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// PUT /api/articles/{id} - update an article (admin only).
async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let claims = match authenticate(&headers, &state.verifier) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let patch: ArticlePatch = match serde_json::from_slice(&body) {
        Ok(patch) => patch,
        Err(err) => {
            debug!(error = %err, "Failed to parse article patch");
            return bad_request(&err);
        }
    };

    match state.service.update(&claims, id, patch).await {
        Ok(article) => Json(article).into_response(),
        Err(err) => err.into_response(),
    }
}

/// DELETE /api/articles/{id} - delete an article (admin only, 204).
async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let claims = authenticate(&headers, &state.verifier)?;
    state.service.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// GET /ws - WebSocket Subscription
// ============================================================================

/// Query parameters for WebSocket subscription.
#[derive(Debug, Deserialize)]
pub struct WsQueryParams {
    /// The caller's token; the same credential the HTTP routes accept in
    /// the `x-access-token` header.
    pub token: Option<String>,
}

/// GET /ws - subscribe to article mutation events.
///
/// Authenticates via the `token` query parameter, then upgrades and
/// forwards every broadcast event to the client as a JSON text frame.
/// Delivery is best-effort: a subscriber that lags behind the channel
/// capacity skips the missed events.
async fn get_ws(
    State(state): State<AppState>,
    Query(params): Query<WsQueryParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = match params.token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => {
            debug!("Missing or empty token in WebSocket request");
            return ApiError::unauthorized("No token provided").into_response();
        }
    };

    if let Err(err) = state.verifier.verify(token) {
        debug!(error = %err, "Invalid token in WebSocket request");
        return ApiError::unauthorized(err.to_string()).into_response();
    }

    ws.on_upgrade(move |socket| handle_websocket(socket, state.broadcaster))
}

/// Forwards broadcast events to an established WebSocket connection until
/// the client disconnects.
async fn handle_websocket(socket: axum::extract::ws::WebSocket, broadcaster: EventBroadcaster) {
    use axum::extract::ws::Message;
    use futures_util::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut event_rx = broadcaster.subscribe();

    info!("WebSocket subscriber connected");

    let forward_task = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        trace!(event = event.name(), "Sending event to subscriber");
                        if let Err(err) = sender.send(Message::Text(json.into())).await {
                            debug!(error = %err, "Failed to send event to subscriber");
                            break;
                        }
                    }
                    Err(err) => {
                        error!(error = %err, "Failed to serialize event");
                    }
                },
                Err(RecvError::Lagged(count)) => {
                    debug!(skipped = count, "Subscriber lagged, skipped events");
                }
                Err(RecvError::Closed) => {
                    debug!("Event broadcaster closed");
                    break;
                }
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                debug!("Subscriber sent close frame");
                break;
            }
            Ok(_) => {
                // Subscribers have nothing to say; ignore inbound frames.
            }
            Err(err) => {
                debug!(error = %err, "WebSocket error");
                break;
            }
        }
    }

    forward_task.abort();
    info!("WebSocket subscriber disconnected");
}

// ============================================================================
// GET /health - Health Check
// ============================================================================

/// Response body for the health check endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status (always "ok" if responding).
    pub status: String,

    /// Number of active event subscribers.
    pub subscribers: usize,

    /// Server uptime in seconds.
    pub uptime_seconds: u64,
}

/// GET /health - health check. No authentication required.
async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        subscribers: state.broadcaster.subscriber_count(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Tests
// ============================================================================
