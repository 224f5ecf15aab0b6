use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app_config::AppConfig;
use crate::entity::{AppError, Session, TradeReceipt, TradeRequest};

pub const LOGIN_PATH: &str = "auth/login";
pub const LOGOUT_PATH: &str = "auth/logout";
pub const FORGOT_PASSWORD_PATH: &str = "auth/forgot-password";
pub const TRADE_CHECKOUT_PATH: &str = "trade/checkout";

// Error body the backend sends with non-2xx answers
#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Sign-in, sign-out and password reset against the backend
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AppError>;
    async fn logout(&self, session: &Session) -> Result<(), AppError>;
    async fn forgot_password(&self, email: &str) -> Result<(), AppError>;
}

/// The single call that commits a trade to the backend ledger
#[async_trait]
pub trait TradeSettlement: Send + Sync {
    async fn settle(
        &self,
        session: &Session,
        request: &TradeRequest,
    ) -> Result<TradeReceipt, AppError>;
}

/// HTTP client for the SAXO backend. Every call is a JSON POST.
pub struct BackendClient {
    http_client: Client,
    config: AppConfig,
}

impl BackendClient {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let http_client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// POSTs `body` to `path` and returns the unwrapped response payload.
    /// The session id travels in the `authorization` header.
    pub async fn post_value<B>(
        &self,
        session: Option<&Session>,
        path: &str,
        body: &B,
    ) -> Result<Value, AppError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post_envelope(session, path, body)
            .await
            .map(unwrap_envelope)
    }

    /// Like `post_value`, but hands back the whole `{data, message}` envelope
    pub async fn post_envelope<B>(
        &self,
        session: Option<&Session>,
        path: &str,
        body: &B,
    ) -> Result<Value, AppError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.config.backend_endpoint(path);
        debug!("POST {}", url);

        let mut request = self.http_client.post(&url).json(body);
        if let Some(session) = session {
            request = request.header("authorization", session.session_id.as_str());
        }

        let response = request.send().await?;
        Self::read_payload(response).await
    }

    pub async fn post<B, R>(
        &self,
        session: Option<&Session>,
        path: &str,
        body: &B,
    ) -> Result<R, AppError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let payload = self.post_value(session, path, body).await?;

        serde_json::from_value(payload).map_err(|e| AppError::Backend {
            status: 200,
            message: format!("Unexpected response shape from {}: {}", path, e),
        })
    }

    async fn read_payload(response: Response) -> Result<Value, AppError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the session (401)");
            return Err(AppError::Unauthorized);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or_else(|_| {
                    if text.is_empty() {
                        status.to_string()
                    } else {
                        text.clone()
                    }
                });
            return Err(AppError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| AppError::Backend {
            status: status.as_u16(),
            message: format!("Invalid JSON response: {}", e),
        })?;

        Ok(value)
    }
}

/// The backend wraps most payloads as `{"data": ..., "message": ...}`
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Any 2xx settles the trade, the receipt is informational.
/// The envelope's `message` fills in when the payload has none.
pub fn trade_receipt(body: Value) -> TradeReceipt {
    let envelope_message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut receipt: TradeReceipt =
        serde_json::from_value(unwrap_envelope(body)).unwrap_or_default();
    if receipt.message.is_none() {
        receipt.message = envelope_message;
    }
    receipt
}

#[async_trait]
impl AuthService for BackendClient {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        if email.trim().is_empty() {
            return Err(AppError::validation("email", "must not be empty"));
        }
        if password.is_empty() {
            return Err(AppError::validation("password", "must not be empty"));
        }

        let session: Session = self
            .post(None, LOGIN_PATH, &LoginRequest { email, password })
            .await?;

        info!("Signed in {} as {}", session.full_name, session.role());
        Ok(session)
    }

    async fn logout(&self, session: &Session) -> Result<(), AppError> {
        self.post_value(Some(session), LOGOUT_PATH, &json!({}))
            .await
            .map(|_| ())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        if !email.contains('@') {
            return Err(AppError::validation("email", "is not a valid address"));
        }

        self.post_value(None, FORGOT_PASSWORD_PATH, &json!({ "email": email }))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl TradeSettlement for BackendClient {
    async fn settle(
        &self,
        session: &Session,
        request: &TradeRequest,
    ) -> Result<TradeReceipt, AppError> {
        info!(
            "Settling {} {} {} for {}",
            request.trade_type, request.amount, request.coin_code, request.total_value
        );

        let body = self
            .post_envelope(Some(session), TRADE_CHECKOUT_PATH, request)
            .await?;

        Ok(trade_receipt(body))
    }
}
