//! CompletionGateway trait definition.
//!
//! The seam between the relay and whatever text-generation service sits
//! behind it. Uses RPITIT, following the repository traits.

use chatrelay_types::error::GatewayError;

/// Adapter to an external text-completion service.
///
/// Implementations make exactly one attempt per call; retry policy, if any,
/// belongs to the caller.
pub trait CompletionGateway: Send + Sync {
    /// Human-readable backend name (e.g., "openai").
    fn name(&self) -> &str;

    /// Whether a credential is present. When `false`, `complete` fails with
    /// [`GatewayError::Unavailable`] without issuing a request.
    fn is_configured(&self) -> bool;

    /// Generate a reply for `prompt`.
    ///
    /// Returns the generated text trimmed of surrounding whitespace, or
    /// [`GatewayError::EmptyResponse`] if nothing usable came back.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GatewayError>> + Send;
}
