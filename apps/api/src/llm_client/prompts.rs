// System messages and fixed prompts sent by the completion client.
// The few-shot title template itself lives in generation::prompts.

/// Persona for title generation calls.
pub const TITLE_EXPERT_SYSTEM: &str = "You are an expert at creating compelling Amazon product titles \
    that drive sales and improve search visibility.";

/// System message for the connection check.
pub const HEALTH_CHECK_SYSTEM: &str = "You are a helpful assistant.";

/// User message for the connection check.
pub const HEALTH_CHECK_PROMPT: &str = "Hello, can you respond?";
