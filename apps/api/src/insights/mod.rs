// Industry insights: generation with backoff + fallback, and create-once caching.
// All LLM calls go through llm_client; no direct HTTP calls here.

pub mod decoder;
pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod retry;
pub mod service;
pub mod store;
