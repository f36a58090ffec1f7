// HTTP Handlers Module
// Implements the catch-all OpenAI-compatible chat completion endpoint.

use super::state::AppState;
use crate::{
    chunker,
    openai::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse, Usage},
    stream::{self, SessionOutcome, FINISH_REASON_STOP},
    StreamSession,
};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "quotesim"
    }))
}

/// POST /v1/chat/completions
///
/// Answers any request shape with a randomly selected quote.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request_start = Instant::now();
    let request = ChatCompletionRequest::from_body(&body);

    let session = {
        let mut rng = rand::rng();
        StreamSession::pick(&state.quotes, &state.speeds, &mut rng)
    };

    tracing::info!(
        id = %session.id,
        model = %request.model(),
        stream = request.wants_stream(),
        theme = %session.theme,
        speed = %session.speed_label,
        initial_ms = session.speed.initial_delay.as_millis() as u64,
        inter_chunk_ms = session.speed.inter_chunk_delay.as_millis() as u64,
        "Chat completion request"
    );
    tracing::debug!(id = %session.id, sample = %session.sample, "Selected quote");

    if request.wants_stream() {
        let session_id = session.id.clone();
        let emitter = session
            .emitter()
            .model(request.model())
            .cancel_token(state.shutdown.child_token())
            .on_finish(move |outcome| match outcome {
                SessionOutcome::Completed { emitted } => tracing::info!(
                    id = %session_id,
                    emitted,
                    elapsed_ms = request_start.elapsed().as_millis() as u64,
                    "Stream completed"
                ),
                SessionOutcome::Cancelled { emitted } => tracing::info!(
                    id = %session_id,
                    emitted,
                    elapsed_ms = request_start.elapsed().as_millis() as u64,
                    "Stream abandoned before finish"
                ),
            })
            .build();

        let body = Body::from_stream(emitter.into_sse_stream().map(Ok::<_, std::io::Error>));

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::CONNECTION, "keep-alive")
            .body(body)
            .map_err(|e| AppError::Internal(e.to_string()))
    } else {
        // Non-streaming response - the whole quote after the initial delay
        if !stream::wait(session.speed.initial_delay, &state.shutdown).await {
            tracing::info!(id = %session.id, "Completion abandoned on shutdown");
            return Err(AppError::Unavailable("Server is shutting down".to_string()));
        }

        let fragments = session.fragments();
        let usage = Usage::new(request.prompt_words() as u32, fragments.len() as u32);
        let response = ChatCompletionResponse::new(
            session.id.clone(),
            request.model().to_string(),
            chunker::reconstruct(&fragments),
            FINISH_REASON_STOP.to_string(),
            usage,
        );

        tracing::info!(
            id = %session.id,
            elapsed_ms = request_start.elapsed().as_millis() as u64,
            "Completion returned"
        );

        Ok(Json(response).into_response())
    }
}

/// Any unmatched route
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Unknown path '{}'", uri.path()))
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(msg, "service_unavailable"),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(msg, "internal_error"),
                )
            }
        };

        let mut response = Json(error_response).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Config;
    use crate::quotes::{QuotePool, Theme, WordListSource};

    fn state() -> Arc<AppState> {
        let quotes = QuotePool::load(&mut WordListSource::seeded(5)).unwrap();
        Arc::new(AppState::new(Config::default(), quotes))
    }

    #[tokio::test]
    async fn test_non_streaming_completion() {
        let state = state();
        let body = Bytes::from_static(br#"{"model": "gpt-4o-mini", "stream": false}"#);

        let response = chat_completions(State(state.clone()), body).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.model, "gpt-4o-mini");

        let content = parsed.choices[0].message.text();
        assert!(Theme::ALL
            .iter()
            .any(|t| state.quotes.samples(*t).contains(&content)));
    }

    #[tokio::test]
    async fn test_non_streaming_completion_stops_on_shutdown() {
        let state = state();
        state.shutdown.cancel();
        let body = Bytes::from_static(br#"{"stream": false}"#);

        let error = chat_completions(State(state), body).await.unwrap_err();
        assert!(matches!(error, AppError::Unavailable(_)));
        assert_eq!(
            error.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_streaming_headers() {
        let response = chat_completions(State(state()), Bytes::new()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_found() {
        let uri: Uri = "/v1/embeddings".parse().unwrap();
        let response = not_found(uri).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_status() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
