//! Hosted model adapters.

mod gemini;
mod traits;

pub use gemini::GeminiAdapter;
pub use traits::ProviderAdapter;
