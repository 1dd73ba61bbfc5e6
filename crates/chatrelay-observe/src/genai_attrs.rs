//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Declared as `Empty` fields on the completion span and filled in with
//! `Span::record` once the response arrives.

/// The model ID the provider reports having used.
pub const GEN_AI_RESPONSE_MODEL: &str = "gen_ai.response.model";

/// The unique response ID from the provider.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

/// The number of input tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";
