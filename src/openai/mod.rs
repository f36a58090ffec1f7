// OpenAI API Module
// Chat Completions wire types used by the mock endpoint.

mod types;

pub use types::*;
