use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{resource_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::ResourceAction;
use crate::presenter::resource_presenter::ResourcePresenter;

pub struct ListCommand;

impl CommandHandler for ListCommand {
    fn command_name() -> &'static str {
        "list"
    }

    fn description() -> &'static str {
        "list records of a resource"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        resource_presenter(&bot, msg.chat.id, &services)
            .list(&args)
            .await
    }
}

pub struct ViewCommand;

impl CommandHandler for ViewCommand {
    fn command_name() -> &'static str {
        "view"
    }

    fn description() -> &'static str {
        "show one record"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        resource_presenter(&bot, msg.chat.id, &services)
            .view(&args)
            .await
    }
}

pub struct AddCommand;

impl CommandHandler for AddCommand {
    fn command_name() -> &'static str {
        "add"
    }

    fn description() -> &'static str {
        "create a record"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        resource_presenter(&bot, msg.chat.id, &services)
            .add(&args)
            .await
    }
}

pub struct EditCommand;

impl CommandHandler for EditCommand {
    fn command_name() -> &'static str {
        "edit"
    }

    fn description() -> &'static str {
        "update a record"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        resource_presenter(&bot, msg.chat.id, &services)
            .edit(&args)
            .await
    }
}

/// `/approve` and `/reject`
pub async fn review(
    bot: Bot,
    chat_id: ChatId,
    args: &str,
    action: ResourceAction,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    resource_presenter(&bot, chat_id, &services)
        .review(args, action)
        .await
}
