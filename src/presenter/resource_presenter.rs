use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::report_error;
use crate::entity::{AppError, ResourceAction, ResourceKind};
use crate::interactor::{AuthInteractor, ResourceInteractor};
use crate::utils::{parse_amount, parse_fields, split_first_word};
use crate::view::resource_view::ResourceView;

pub const LIST_USAGE: &str =
    "Use: /list <banks|users|admins|wallets|deposits|withdrawals>";
pub const VIEW_USAGE: &str = "Use: /view <resource> <id>";
pub const ADD_USAGE: &str = "Use: /add <resource> key=value ...\nExample: /add banks bankName=\"Bank Central Asia\" accountNumber=0123456 accountHolder=\"PT SAXO\"";
pub const EDIT_USAGE: &str = "Use: /edit <resource> <id> key=value ...";
pub const REVIEW_USAGE: &str = "Use: /approve <deposits|withdrawals> <id> or /reject <deposits|withdrawals> <id>";
pub const FIAT_USAGE: &str = "Use: /deposit <amount> <bank id> or /withdraw <amount> <bank id>";

#[async_trait]
pub trait ResourcePresenter: Send + Sync {
    async fn list(&self, args: &str) -> Result<()>;
    async fn view(&self, args: &str) -> Result<()>;
    async fn add(&self, args: &str) -> Result<()>;
    async fn edit(&self, args: &str) -> Result<()>;
    async fn review(&self, args: &str, action: ResourceAction) -> Result<()>;
    async fn review_record(&self, kind: ResourceKind, id: &str, action: ResourceAction) -> Result<()>;
    async fn request_fiat(&self, kind: ResourceKind, args: &str) -> Result<()>;
}

pub struct ResourcePresenterImpl<V> {
    chat_id: i64,
    interactor: Arc<dyn ResourceInteractor>,
    auth: Arc<dyn AuthInteractor>,
    view: Arc<V>,
}

impl<V> ResourcePresenterImpl<V>
where
    V: ResourceView,
{
    pub fn new(
        chat_id: i64,
        interactor: Arc<dyn ResourceInteractor>,
        auth: Arc<dyn AuthInteractor>,
        view: Arc<V>,
    ) -> Self {
        Self {
            chat_id,
            interactor,
            auth,
            view,
        }
    }

    async fn report(&self, error: AppError) -> Result<()> {
        report_error(&*self.view, &*self.auth, self.chat_id, error).await
    }

    /// Splits `<resource> <rest>`, showing `usage` when the resource is missing
    async fn parse_kind<'a>(&self, args: &'a str, usage: &str) -> Result<Option<(ResourceKind, &'a str)>> {
        let (kind_text, rest) = split_first_word(args);
        if kind_text.is_empty() {
            self.view.display_usage(usage).await?;
            return Ok(None);
        }

        match kind_text.parse::<ResourceKind>() {
            Ok(kind) => Ok(Some((kind, rest))),
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<V> ResourcePresenter for ResourcePresenterImpl<V>
where
    V: ResourceView + Send + Sync,
{
    async fn list(&self, args: &str) -> Result<()> {
        let Some((kind, _)) = self.parse_kind(args, LIST_USAGE).await? else {
            return Ok(());
        };

        match self.interactor.list(self.chat_id, kind).await {
            Ok(rows) => {
                let can_review = kind.supports_review()
                    && self
                        .auth
                        .current_session(self.chat_id)
                        .await
                        .map(|s| s.role().is_admin())
                        .unwrap_or(false);
                self.view.display_rows(kind, &rows, can_review).await
            }
            Err(e) => self.report(e).await,
        }
    }

    async fn view(&self, args: &str) -> Result<()> {
        let Some((kind, rest)) = self.parse_kind(args, VIEW_USAGE).await? else {
            return Ok(());
        };
        let (id, _) = split_first_word(rest);
        if id.is_empty() {
            return self.view.display_usage(VIEW_USAGE).await;
        }

        match self.interactor.view(self.chat_id, kind, id).await {
            Ok(record) => self.view.display_record(kind, &record).await,
            Err(e) => self.report(e).await,
        }
    }

    async fn add(&self, args: &str) -> Result<()> {
        let Some((kind, rest)) = self.parse_kind(args, ADD_USAGE).await? else {
            return Ok(());
        };

        let fields = match parse_fields(rest) {
            Ok(fields) => fields,
            Err(e) => return self.report(e).await,
        };

        match self.interactor.add(self.chat_id, kind, fields).await {
            Ok(record) => {
                self.view
                    .display_saved(kind, ResourceAction::Add, &record)
                    .await
            }
            Err(e) => self.report(e).await,
        }
    }

    async fn edit(&self, args: &str) -> Result<()> {
        let Some((kind, rest)) = self.parse_kind(args, EDIT_USAGE).await? else {
            return Ok(());
        };
        let (id, rest) = split_first_word(rest);
        if id.is_empty() || id.contains('=') {
            return self.view.display_usage(EDIT_USAGE).await;
        }

        let fields = match parse_fields(rest) {
            Ok(fields) => fields,
            Err(e) => return self.report(e).await,
        };

        match self.interactor.edit(self.chat_id, kind, id, fields).await {
            Ok(record) => {
                self.view
                    .display_saved(kind, ResourceAction::Edit, &record)
                    .await
            }
            Err(e) => self.report(e).await,
        }
    }

    async fn review(&self, args: &str, action: ResourceAction) -> Result<()> {
        let Some((kind, rest)) = self.parse_kind(args, REVIEW_USAGE).await? else {
            return Ok(());
        };
        let (id, _) = split_first_word(rest);
        if id.is_empty() {
            return self.view.display_usage(REVIEW_USAGE).await;
        }

        self.review_record(kind, id, action).await
    }

    async fn review_record(&self, kind: ResourceKind, id: &str, action: ResourceAction) -> Result<()> {
        match self.interactor.review(self.chat_id, kind, id, action).await {
            Ok(()) => self.view.display_reviewed(kind, id, action).await,
            Err(e) => self.report(e).await,
        }
    }

    async fn request_fiat(&self, kind: ResourceKind, args: &str) -> Result<()> {
        let (amount_text, rest) = split_first_word(args);
        let (bank_id, _) = split_first_word(rest);
        if amount_text.is_empty() || bank_id.is_empty() {
            return self.view.display_usage(FIAT_USAGE).await;
        }

        let amount = match parse_amount(amount_text) {
            Ok(amount) => amount,
            Err(e) => return self.report(e).await,
        };

        match self
            .interactor
            .request_fiat(self.chat_id, kind, amount, bank_id)
            .await
        {
            Ok(record) => {
                self.view
                    .display_saved(kind, ResourceAction::Add, &record)
                    .await
            }
            Err(e) => self.report(e).await,
        }
    }
}
