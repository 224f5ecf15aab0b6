use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::resource_presenter;
use crate::di::ServiceContainer;
use crate::entity::ResourceKind;
use crate::presenter::resource_presenter::ResourcePresenter;

/// Member deposit or withdraw request: `<amount> <bank id>`
pub async fn request(
    bot: Bot,
    chat_id: ChatId,
    kind: ResourceKind,
    args: &str,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    info!("Chat {} requested a fiat {}", chat_id, kind);
    resource_presenter(&bot, chat_id, &services)
        .request_fiat(kind, args)
        .await
}
