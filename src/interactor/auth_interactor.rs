use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

use crate::api::AuthService;
use crate::entity::{AppError, PendingOrder, Session};
use crate::services::{CountdownService, SessionStore};

#[async_trait]
pub trait AuthInteractor: Send + Sync {
    async fn login(&self, chat_id: i64, email: &str, password: &str) -> Result<Session, AppError>;
    async fn current_session(&self, chat_id: i64) -> Option<Session>;
    /// Signs out, abandoning any running countdown
    async fn logout(&self, chat_id: i64) -> Result<Option<PendingOrder>, AppError>;
    async fn forgot_password(&self, email: &str) -> Result<(), AppError>;
    /// Local cleanup after the backend answered 401
    async fn force_logout(&self, chat_id: i64);
}

pub struct AuthInteractorImpl {
    auth_service: Arc<dyn AuthService>,
    sessions: Arc<SessionStore>,
    countdowns: Arc<CountdownService>,
}

impl AuthInteractorImpl {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        sessions: Arc<SessionStore>,
        countdowns: Arc<CountdownService>,
    ) -> Self {
        Self {
            auth_service,
            sessions,
            countdowns,
        }
    }
}

#[async_trait]
impl AuthInteractor for AuthInteractorImpl {
    async fn login(&self, chat_id: i64, email: &str, password: &str) -> Result<Session, AppError> {
        let session = self.auth_service.login(email, password).await?;
        self.sessions.set(chat_id, session.clone()).await;
        Ok(session)
    }

    async fn current_session(&self, chat_id: i64) -> Option<Session> {
        self.sessions.get(chat_id).await
    }

    async fn logout(&self, chat_id: i64) -> Result<Option<PendingOrder>, AppError> {
        let abandoned = self.countdowns.abandon(chat_id).await;

        let session = self.sessions.clear(chat_id).await.ok_or(AppError::NotLoggedIn)?;
        // The local session is gone either way
        if let Err(e) = self.auth_service.logout(&session).await {
            warn!("Backend logout failed for chat {}: {}", chat_id, e);
        }

        info!("Chat {} signed out", chat_id);
        Ok(abandoned)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        self.auth_service.forgot_password(email.trim()).await
    }

    async fn force_logout(&self, chat_id: i64) {
        self.countdowns.abandon(chat_id).await;
        self.sessions.clear(chat_id).await;
        warn!("Chat {} signed out after an unauthorized response", chat_id);
    }
}
