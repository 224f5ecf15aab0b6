use anyhow::Result;
use async_trait::async_trait;

pub mod auth_view;
pub mod countdown_view;
pub mod market_view;
pub mod resource_view;

/// Failure reporting shared by every view
#[async_trait]
pub trait ErrorView: Send + Sync {
    async fn display_error(&self, error_message: String) -> Result<()>;
    /// Shown after a 401, the chat has been signed out
    async fn display_session_expired(&self) -> Result<()>;
}
