use anyhow::Result;
use log::warn;

use crate::entity::AppError;
use crate::interactor::AuthInteractor;
use crate::view::ErrorView;

pub mod auth_presenter;
pub mod countdown_presenter;
pub mod market_presenter;
pub mod resource_presenter;

/// Reports a failed call. A 401 signs the chat out before telling the user.
pub async fn report_error<V>(
    view: &V,
    auth: &dyn AuthInteractor,
    chat_id: i64,
    error: AppError,
) -> Result<()>
where
    V: ErrorView + ?Sized,
{
    match error {
        AppError::Unauthorized => {
            auth.force_logout(chat_id).await;
            view.display_session_expired().await
        }
        other => {
            warn!("Chat {}: {}", chat_id, other);
            view.display_error(other.to_string()).await
        }
    }
}
