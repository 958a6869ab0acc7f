// Profile/project matching: prompt building, model call, response validation.
// All model calls go through llm_client; nothing here talks to the provider directly.

pub mod handlers;
pub mod prompts;
pub mod service;
pub mod validator;
