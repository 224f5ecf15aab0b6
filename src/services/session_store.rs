use log::info;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::entity::{AppError, Role, Session};

/// Backend sessions per Telegram chat. Lost on restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: i64) -> Option<Session> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    pub async fn set(&self, chat_id: i64, session: Session) {
        info!("Session stored for chat {}", chat_id);
        self.sessions.write().await.insert(chat_id, session);
    }

    pub async fn clear(&self, chat_id: i64) -> Option<Session> {
        let removed = self.sessions.write().await.remove(&chat_id);
        if removed.is_some() {
            info!("Session cleared for chat {}", chat_id);
        }
        removed
    }

    pub async fn require(&self, chat_id: i64) -> Result<Session, AppError> {
        self.get(chat_id).await.ok_or(AppError::NotLoggedIn)
    }

    /// Returns the session if its role is at least `role`
    pub async fn require_role(&self, chat_id: i64, role: Role) -> Result<Session, AppError> {
        let session = self.require(chat_id).await?;
        if session.role() >= role {
            Ok(session)
        } else {
            Err(AppError::Forbidden(match role {
                Role::Member => "member",
                Role::Admin => "admin",
                Role::SuperAdmin => "super-admin",
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role_id: &str) -> Session {
        Session {
            session_id: "sid".to_string(),
            role_id: role_id.to_string(),
            full_name: "Test User".to_string(),
        }
    }

    #[tokio::test]
    async fn role_gate_respects_hierarchy() {
        let store = SessionStore::new();
        store.set(1, session("3")).await;
        store.set(2, session("1")).await;

        assert!(store.require_role(1, Role::Member).await.is_ok());
        assert!(matches!(
            store.require_role(1, Role::Admin).await,
            Err(AppError::Forbidden("admin"))
        ));
        assert!(store.require_role(2, Role::Admin).await.is_ok());
        assert!(store.require_role(2, Role::SuperAdmin).await.is_ok());
    }

    #[tokio::test]
    async fn cleared_session_requires_login() {
        let store = SessionStore::new();
        store.set(7, session("2")).await;
        assert!(store.clear(7).await.is_some());

        assert!(matches!(store.require(7).await, Err(AppError::NotLoggedIn)));
        assert!(store.clear(7).await.is_none());
    }
}
