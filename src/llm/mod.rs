// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod traits;
pub mod types;

// ── Provider implementations ────────────────────────────────────────────────
pub mod gemini;

pub use gemini::GeminiProvider;
pub use http_client::build_provider_client;
pub use traits::Provider;
pub use types::{GenerateRequest, ImagePart};
