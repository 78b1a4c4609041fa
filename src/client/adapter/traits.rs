//! Provider adapter trait definition.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::Result;
use crate::client::GenerateRequest;
use crate::types::GenerateResponse;

/// Translates provider-neutral requests to one hosted model API.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Whether credentials are present; checked before any network I/O.
    fn is_configured(&self) -> bool;

    async fn send(
        &self,
        http: &reqwest::Client,
        request: GenerateRequest,
    ) -> Result<GenerateResponse>;
}
