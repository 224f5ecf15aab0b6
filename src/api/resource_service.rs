use async_trait::async_trait;
use log::info;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::api::backend_client::BackendClient;
use crate::entity::{AppError, ResourceAction, ResourceKind, Session};

/// Add/edit/view/list/approve/reject calls for every backend collection
#[async_trait]
pub trait ResourceService: Send + Sync {
    async fn list(&self, session: &Session, kind: ResourceKind) -> Result<Vec<Value>, AppError>;
    async fn view(&self, session: &Session, kind: ResourceKind, id: &str) -> Result<Value, AppError>;
    async fn add(
        &self,
        session: &Session,
        kind: ResourceKind,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError>;
    async fn edit(
        &self,
        session: &Session,
        kind: ResourceKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError>;
    async fn review(
        &self,
        session: &Session,
        kind: ResourceKind,
        id: &str,
        action: ResourceAction,
    ) -> Result<(), AppError>;
}

pub struct BackendResourceService {
    client: Arc<BackendClient>,
}

impl BackendResourceService {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    fn path(kind: ResourceKind, action: ResourceAction) -> String {
        format!("{}/{}", kind.segment(), action.path())
    }
}

/// Checks the fields an add request must carry
pub fn validate_new_record(kind: ResourceKind, fields: &Map<String, Value>) -> Result<(), AppError> {
    for field in kind.required_fields() {
        match fields.get(*field) {
            None | Some(Value::Null) => {
                return Err(AppError::validation(*field, "is required"));
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(AppError::validation(*field, "must not be empty"));
            }
            _ => {}
        }
    }

    if let Some(amount) = fields.get("amount") {
        match amount.as_f64() {
            Some(a) if a > 0.0 => {}
            _ => return Err(AppError::InvalidAmount),
        }
    }

    Ok(())
}

#[async_trait]
impl ResourceService for BackendResourceService {
    async fn list(&self, session: &Session, kind: ResourceKind) -> Result<Vec<Value>, AppError> {
        let payload = self
            .client
            .post_value(Some(session), &Self::path(kind, ResourceAction::List), &json!({}))
            .await?;

        Ok(match payload {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }

    async fn view(&self, session: &Session, kind: ResourceKind, id: &str) -> Result<Value, AppError> {
        self.client
            .post_value(
                Some(session),
                &Self::path(kind, ResourceAction::View),
                &json!({ "id": id }),
            )
            .await
    }

    async fn add(
        &self,
        session: &Session,
        kind: ResourceKind,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError> {
        validate_new_record(kind, &fields)?;
        info!("Adding a record to {}", kind);

        self.client
            .post_value(
                Some(session),
                &Self::path(kind, ResourceAction::Add),
                &Value::Object(fields),
            )
            .await
    }

    async fn edit(
        &self,
        session: &Session,
        kind: ResourceKind,
        id: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Value, AppError> {
        if fields.is_empty() {
            return Err(AppError::validation("fields", "nothing to change"));
        }
        fields.insert("id".to_string(), Value::String(id.to_string()));
        info!("Editing {} record {}", kind, id);

        self.client
            .post_value(
                Some(session),
                &Self::path(kind, ResourceAction::Edit),
                &Value::Object(fields),
            )
            .await
    }

    async fn review(
        &self,
        session: &Session,
        kind: ResourceKind,
        id: &str,
        action: ResourceAction,
    ) -> Result<(), AppError> {
        if !kind.supports_review() {
            return Err(AppError::validation(
                "resource",
                format!("{} cannot be approved or rejected", kind),
            ));
        }
        if !matches!(action, ResourceAction::Approve | ResourceAction::Reject) {
            return Err(AppError::validation("action", "expected approve or reject"));
        }
        info!("{} {} record {}", action.path(), kind, id);

        self.client
            .post_value(Some(session), &Self::path(kind, action), &json!({ "id": id }))
            .await
            .map(|_| ())
    }
}
