// Generation gateways: prompt formatting and the two POST handlers.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod handlers;
pub mod prompts;
