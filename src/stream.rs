// Streaming Engine Module
// Emits quote fragments with the session's delay schedule, then a finish marker.

use crate::chunker;
use crate::openai::{ChatCompletionChunk, DEFAULT_MODEL};
use crate::speed::SpeedProfile;
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Finish reason carried by the terminal event
pub const FINISH_REASON_STOP: &str = "stop";

/// SSE sentinel sent after the finish chunk
pub const SSE_DONE: &str = "data: [DONE]\n\n";

/// One event of a streaming session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A partial text fragment
    Delta(String),
    /// Terminal event; nothing follows it
    Finish(String),
}

/// How a streaming session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every fragment and the finish event were emitted
    Completed { emitted: usize },
    /// The session was abandoned before the finish event
    Cancelled { emitted: usize },
}

impl SessionOutcome {
    pub fn emitted(&self) -> usize {
        match self {
            SessionOutcome::Completed { emitted } | SessionOutcome::Cancelled { emitted } => {
                *emitted
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionOutcome::Cancelled { .. })
    }
}

type OutcomeCallback = Box<dyn FnOnce(SessionOutcome) + Send>;

/// Reports the session outcome exactly once, when the stream is dropped or finishes.
///
/// Lives inside the stream body, so a client disconnect (which drops the body)
/// is reported as a cancellation.
struct OutcomeGuard {
    id: String,
    emitted: usize,
    finished: bool,
    callback: Option<OutcomeCallback>,
}

impl OutcomeGuard {
    fn new(id: String, callback: Option<OutcomeCallback>) -> Self {
        Self {
            id,
            emitted: 0,
            finished: false,
            callback,
        }
    }
}

impl Drop for OutcomeGuard {
    fn drop(&mut self) {
        let outcome = if self.finished {
            SessionOutcome::Completed {
                emitted: self.emitted,
            }
        } else {
            SessionOutcome::Cancelled {
                emitted: self.emitted,
            }
        };

        match outcome {
            SessionOutcome::Completed { emitted } => {
                tracing::debug!(id = %self.id, emitted, "Stream session finished");
            }
            SessionOutcome::Cancelled { emitted } => {
                tracing::debug!(id = %self.id, emitted, "Stream session cancelled");
            }
        }

        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }
}

/// Sleep for `delay` unless `cancel` fires first. Returns `false` when cancelled.
pub(crate) async fn wait(delay: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = sleep(delay) => true,
    }
}

/// A streaming response that yields quote fragments with simulated delays
pub struct ChunkEmitter {
    /// The response ID (shared across all SSE chunks)
    id: String,
    /// Model name echoed back to the client
    model: String,
    /// Unix timestamp of creation
    created: i64,
    /// Fragments, in emission order
    fragments: Vec<String>,
    speed: SpeedProfile,
    finish_reason: String,
    cancel: CancellationToken,
    on_finish: Option<OutcomeCallback>,
}

impl ChunkEmitter {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Stream of session events.
    ///
    /// Waits `initial_delay` before the first event and `inter_chunk_delay`
    /// before every later fragment. The finish event follows the last
    /// fragment without delay. Cancellation ends the stream without a finish
    /// event.
    pub fn into_event_stream(self) -> Pin<Box<dyn Stream<Item = StreamEvent> + Send>> {
        let ChunkEmitter {
            id,
            fragments,
            speed,
            finish_reason,
            cancel,
            on_finish,
            ..
        } = self;

        Box::pin(stream! {
            let mut guard = OutcomeGuard::new(id, on_finish);

            if fragments.is_empty() && !wait(speed.initial_delay, &cancel).await {
                return;
            }

            for (index, fragment) in fragments.into_iter().enumerate() {
                let delay = if index == 0 {
                    speed.initial_delay
                } else {
                    speed.inter_chunk_delay
                };
                if !wait(delay, &cancel).await {
                    return;
                }

                guard.emitted += 1;
                yield StreamEvent::Delta(fragment);
            }

            guard.finished = true;
            yield StreamEvent::Finish(finish_reason);
        })
    }

    /// Stream of OpenAI `chat.completion.chunk` Server-Sent Events.
    ///
    /// A role chunk precedes the first content chunk; the finish chunk is
    /// followed by the `[DONE]` sentinel.
    pub fn into_sse_stream(self) -> Pin<Box<dyn Stream<Item = String> + Send>> {
        let id = self.id.clone();
        let model = self.model.clone();
        let created = self.created;
        let mut events = self.into_event_stream();

        Box::pin(stream! {
            let mut announced = false;

            while let Some(event) = events.next().await {
                if !announced {
                    announced = true;
                    let role_chunk = ChatCompletionChunk::new(id.clone(), model.clone(), created)
                        .with_role();
                    yield format_sse(&role_chunk);
                }

                match event {
                    StreamEvent::Delta(fragment) => {
                        let chunk = ChatCompletionChunk::new(id.clone(), model.clone(), created)
                            .with_content(fragment);
                        yield format_sse(&chunk);
                    }
                    StreamEvent::Finish(reason) => {
                        let chunk = ChatCompletionChunk::new(id.clone(), model.clone(), created)
                            .with_finish(reason);
                        yield format_sse(&chunk);
                        yield SSE_DONE.to_string();
                    }
                }
            }
        })
    }
}

/// Format a chunk as Server-Sent Event
pub fn format_sse(chunk: &ChatCompletionChunk) -> String {
    let json = serde_json::to_string(chunk).unwrap_or_else(|_| "{}".to_string());
    format!("data: {}\n\n", json)
}

/// Builder for creating chunk emitters
pub struct ChunkEmitterBuilder {
    id: Option<String>,
    model: String,
    fragments: Vec<String>,
    speed: SpeedProfile,
    finish_reason: String,
    cancel: Option<CancellationToken>,
    on_finish: Option<OutcomeCallback>,
}

impl ChunkEmitterBuilder {
    /// Emitter over pre-chunked fragments
    pub fn new(fragments: Vec<String>) -> Self {
        Self {
            id: None,
            model: DEFAULT_MODEL.to_string(),
            fragments,
            speed: SpeedProfile::instant(),
            finish_reason: FINISH_REASON_STOP.to_string(),
            cancel: None,
            on_finish: None,
        }
    }

    /// Emitter over the fragments of `text`
    pub fn from_text(text: &str) -> Self {
        Self::new(chunker::chunk(text))
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn speed(mut self, speed: SpeedProfile) -> Self {
        self.speed = speed;
        self
    }

    pub fn finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = reason.into();
        self
    }

    /// Token that aborts the session when cancelled
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Called once with the session outcome
    pub fn on_finish<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(SessionOutcome) + Send + 'static,
    {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> ChunkEmitter {
        ChunkEmitter {
            id: self
                .id
                .unwrap_or_else(|| format!("chatcmpl-{}", uuid::Uuid::new_v4())),
            model: self.model,
            created: chrono::Utc::now().timestamp(),
            fragments: self.fragments,
            speed: self.speed,
            finish_reason: self.finish_reason,
            cancel: self.cancel.unwrap_or_default(),
            on_finish: self.on_finish,
        }
    }
}
