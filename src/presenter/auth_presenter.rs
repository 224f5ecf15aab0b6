use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::report_error;
use crate::entity::{AppError, CountdownPhase};
use crate::interactor::{AuthInteractor, CountdownInteractor};
use crate::view::auth_view::AuthView;

/// What happened to a logout request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    SignedOut,
    /// A countdown is running; the user was asked to confirm
    AwaitingConfirmation,
    Failed,
}

// A 401 on sign-in means bad credentials, there is no session to expire yet
fn login_failure_message(error: &AppError) -> String {
    match error {
        AppError::Unauthorized => "Wrong email or password".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
pub trait AuthPresenter: Send + Sync {
    async fn login(&self, args: &str) -> Result<bool>;
    /// `confirmed` skips the warning about a running countdown
    async fn logout(&self, confirmed: bool) -> Result<LogoutOutcome>;
    /// Warns about a running countdown. Returns false when nothing is counting.
    async fn confirm_abandon(&self) -> Result<bool>;
    async fn forgot_password(&self, email: &str) -> Result<()>;
    async fn show_profile(&self) -> Result<()>;
    async fn stay(&self) -> Result<()>;
}

pub struct AuthPresenterImpl<V> {
    chat_id: i64,
    interactor: Arc<dyn AuthInteractor>,
    countdowns: Arc<dyn CountdownInteractor>,
    view: Arc<V>,
}

impl<V> AuthPresenterImpl<V>
where
    V: AuthView,
{
    pub fn new(
        chat_id: i64,
        interactor: Arc<dyn AuthInteractor>,
        countdowns: Arc<dyn CountdownInteractor>,
        view: Arc<V>,
    ) -> Self {
        Self {
            chat_id,
            interactor,
            countdowns,
            view,
        }
    }
}

#[async_trait]
impl<V> AuthPresenter for AuthPresenterImpl<V>
where
    V: AuthView + Send + Sync,
{
    async fn login(&self, args: &str) -> Result<bool> {
        let parts: Vec<&str> = args.split_whitespace().collect();
        let [email, password] = parts.as_slice() else {
            self.view.display_login_usage().await?;
            return Ok(false);
        };

        match self.interactor.login(self.chat_id, email, password).await {
            Ok(session) => {
                self.view.display_logged_in(&session).await?;
                Ok(true)
            }
            Err(e) => {
                self.view.display_error(login_failure_message(&e)).await?;
                Ok(false)
            }
        }
    }

    async fn logout(&self, confirmed: bool) -> Result<LogoutOutcome> {
        if !confirmed && self.confirm_abandon().await? {
            return Ok(LogoutOutcome::AwaitingConfirmation);
        }

        match self.interactor.logout(self.chat_id).await {
            Ok(abandoned) => {
                self.view.display_logged_out(abandoned.as_ref()).await?;
                Ok(LogoutOutcome::SignedOut)
            }
            Err(e) => {
                report_error(&*self.view, &*self.interactor, self.chat_id, e).await?;
                Ok(LogoutOutcome::Failed)
            }
        }
    }

    async fn confirm_abandon(&self) -> Result<bool> {
        match self.countdowns.get_status(self.chat_id).await {
            (CountdownPhase::Counting { .. }, Some(order)) => {
                self.view.prompt_abandon(&order).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return self.view.display_login_usage().await;
        }

        match self.interactor.forgot_password(email).await {
            Ok(()) => self.view.display_reset_sent(email.trim()).await,
            Err(e) => self.view.display_error(e.to_string()).await,
        }
    }

    async fn show_profile(&self) -> Result<()> {
        match self.interactor.current_session(self.chat_id).await {
            Some(session) => {
                let (phase, _) = self.countdowns.get_status(self.chat_id).await;
                self.view.display_profile(&session, phase).await
            }
            None => self.view.display_login_usage().await,
        }
    }

    async fn stay(&self) -> Result<()> {
        self.view.display_stayed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_sign_in_is_not_reported_as_expired_session() {
        assert_eq!(
            login_failure_message(&AppError::Unauthorized),
            "Wrong email or password"
        );
        assert_eq!(
            login_failure_message(&AppError::validation("email", "must not be empty")),
            "Invalid email: must not be empty"
        );
    }
}
