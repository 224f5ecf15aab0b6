use async_trait::async_trait;
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::api::ResourceService;
use crate::entity::{
    AppError, Bank, FiatRequest, Member, ResourceAction, ResourceKind, ResourceRow, Role, Wallet,
};
use crate::services::SessionStore;

#[async_trait]
pub trait ResourceInteractor: Send + Sync {
    async fn list(&self, chat_id: i64, kind: ResourceKind) -> Result<Vec<ResourceRow>, AppError>;
    async fn view(&self, chat_id: i64, kind: ResourceKind, id: &str) -> Result<Value, AppError>;
    async fn add(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError>;
    async fn edit(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError>;
    async fn review(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        id: &str,
        action: ResourceAction,
    ) -> Result<(), AppError>;
    /// Member deposit or withdraw request
    async fn request_fiat(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        amount: Decimal,
        bank_id: &str,
    ) -> Result<Value, AppError>;
}

pub struct ResourceInteractorImpl {
    resource_service: Arc<dyn ResourceService>,
    sessions: Arc<SessionStore>,
}

impl ResourceInteractorImpl {
    pub fn new(resource_service: Arc<dyn ResourceService>, sessions: Arc<SessionStore>) -> Self {
        Self {
            resource_service,
            sessions,
        }
    }
}

fn typed_row<T>(value: Value) -> ResourceRow
where
    T: DeserializeOwned + Into<ResourceRow>,
{
    match serde_json::from_value::<T>(value.clone()) {
        Ok(record) => record.into(),
        Err(e) => {
            warn!("Unexpected record shape ({}), showing raw JSON", e);
            let id = match value.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "?".to_string(),
            };
            ResourceRow {
                id,
                summary: value.to_string(),
                reviewable: false,
            }
        }
    }
}

/// Converts a raw backend record into a listing row for its collection
pub fn to_row(kind: ResourceKind, value: Value) -> ResourceRow {
    match kind {
        ResourceKind::Banks => typed_row::<Bank>(value),
        ResourceKind::Users | ResourceKind::Admins => typed_row::<Member>(value),
        ResourceKind::Wallets => typed_row::<Wallet>(value),
        ResourceKind::Deposits | ResourceKind::Withdrawals => typed_row::<FiatRequest>(value),
    }
}

#[async_trait]
impl ResourceInteractor for ResourceInteractorImpl {
    async fn list(&self, chat_id: i64, kind: ResourceKind) -> Result<Vec<ResourceRow>, AppError> {
        let session = self.sessions.require_role(chat_id, kind.view_role()).await?;
        let records = self.resource_service.list(&session, kind).await?;

        Ok(records.into_iter().map(|r| to_row(kind, r)).collect())
    }

    async fn view(&self, chat_id: i64, kind: ResourceKind, id: &str) -> Result<Value, AppError> {
        let session = self.sessions.require_role(chat_id, kind.view_role()).await?;
        self.resource_service.view(&session, kind, id).await
    }

    async fn add(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError> {
        let session = self.sessions.require_role(chat_id, kind.manage_role()).await?;
        self.resource_service.add(&session, kind, fields).await
    }

    async fn edit(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError> {
        // Fiat requests are changed through review only
        let role = if kind.supports_review() {
            Role::Admin
        } else {
            kind.manage_role()
        };
        let session = self.sessions.require_role(chat_id, role).await?;
        self.resource_service.edit(&session, kind, id, fields).await
    }

    async fn review(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        id: &str,
        action: ResourceAction,
    ) -> Result<(), AppError> {
        let session = self.sessions.require_role(chat_id, Role::Admin).await?;
        self.resource_service.review(&session, kind, id, action).await
    }

    async fn request_fiat(
        &self,
        chat_id: i64,
        kind: ResourceKind,
        amount: Decimal,
        bank_id: &str,
    ) -> Result<Value, AppError> {
        if !kind.supports_review() {
            return Err(AppError::validation("resource", "expected deposits or withdrawals"));
        }
        let amount = amount
            .to_f64()
            .filter(|a| *a > 0.0)
            .ok_or(AppError::InvalidAmount)?;

        let mut fields = Map::new();
        fields.insert("amount".to_string(), Value::from(amount));
        fields.insert("bankId".to_string(), Value::String(bank_id.to_string()));

        self.add(chat_id, kind, fields).await
    }
}
