use super::types::GenerateRequest;
use std::future::Future;
use std::pin::Pin;

/// Transport seam to a hosted generative model.
///
/// A provider turns one `GenerateRequest` into one text completion. It does
/// not retry, cache, or validate schemas; those concerns live in the flow
/// layer above.
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
