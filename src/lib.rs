//! # QuoteSim - Mock OpenAI Streaming Server
//!
//! A mock chat completion server for local development. Every request is
//! answered with a canned quote, streamed word by word with a delay schedule
//! that mimics a real model.
//!
//! ## Features
//!
//! - Six quote themes, ten samples each, loaded once at startup
//! - Five speed profiles (slow, normal, fast, superfast, randomized)
//! - OpenAI `chat.completion.chunk` Server-Sent Events framing
//! - Cancellation of in-flight streams on client disconnect or shutdown
//!
//! ## Usage
//!
//! ### As a CLI
//!
//! ```bash
//! PORT=8080 VERBOSE=false quotesim
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use quotesim::{ChunkEmitterBuilder, SpeedProfile, StreamEvent};
//!
//! # async fn demo() {
//! let mut events = ChunkEmitterBuilder::from_text("The Matrix Neo")
//!     .speed(SpeedProfile::fast())
//!     .build()
//!     .into_event_stream();
//!
//! while let Some(event) = events.next().await {
//!     if let StreamEvent::Delta(text) = event {
//!         print!("{}", text);
//!     }
//! }
//! # }
//! ```

// Core library modules
pub mod chunker;
pub mod openai;
pub mod quotes;
pub mod session;
pub mod speed;
pub mod stream;

// CLI module (server wiring)
pub mod cli;

// Re-export commonly used types
pub use chunker::chunk;
pub use quotes::{QuoteError, QuotePool, QuoteSource, Theme, WordListSource, SAMPLES_PER_THEME};
pub use session::StreamSession;
pub use speed::{SpeedLabel, SpeedProfile, SpeedTable};
pub use stream::{ChunkEmitter, ChunkEmitterBuilder, SessionOutcome, StreamEvent};
