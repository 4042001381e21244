use crate::bot::handlers::{is_free_text, Command};
use crate::bot::transport::TelegramTransport;
use crate::bot::ResourceDesk;
use crate::catalog::FileCatalog;
use crate::config::Settings;
use crate::ledger::{InMemoryLedger, UserId};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> UserId {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<Settings>) {
    let desk = init_desk(&settings);

    let bot = Bot::new(settings.telegram_bot_token.clone());
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![desk])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn init_desk(settings: &Settings) -> Arc<ResourceDesk> {
    let catalog = FileCatalog::new(settings.files_dir.clone(), &settings.file_extension);
    info!(
        "Serving '{}' files from {}",
        settings.extension_suffix(),
        catalog.dir().display()
    );
    if !catalog.dir().is_dir() {
        warn!(
            "Catalog directory {} does not exist yet; listings will be empty",
            catalog.dir().display()
        );
    }
    Arc::new(ResourceDesk::new(catalog, Arc::new(InMemoryLedger::new())))
}

/// Build the update routing tree.
#[must_use]
pub fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    dptree::filter(|msg: Message| msg.text().is_some_and(is_free_text))
                        .endpoint(handle_text),
                ),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    desk: Arc<ResourceDesk>,
) -> Result<(), teloxide::RequestError> {
    let user_id = get_user_id_safe(&msg);
    let transport = TelegramTransport::new(bot, msg.chat.id);
    let res = match cmd {
        Command::Start => desk.start(&transport, user_id).await,
        Command::Files => desk.list_files(&transport, user_id).await,
        Command::Help => desk.help(&transport).await,
        Command::Healthcheck => desk.healthcheck(&transport, user_id).await,
        Command::Stats => desk.stats(&transport, user_id).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    desk: Arc<ResourceDesk>,
) -> Result<(), teloxide::RequestError> {
    let user_id = get_user_id_safe(&msg);
    let text = msg.text().unwrap_or_default();
    let transport = TelegramTransport::new(bot, msg.chat.id);
    if let Err(e) = desk.handle_text(&transport, user_id, text).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    desk: Arc<ResourceDesk>,
) -> Result<(), teloxide::RequestError> {
    // Always answer so the client stops showing the loading indicator
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return respond(());
    };

    let user_id = q.from.id.0.cast_signed();
    let Some(chat_id) = q.message.as_ref().map(|msg| msg.chat().id) else {
        error!("Callback from user {user_id} is missing its message; cannot reply.");
        return respond(());
    };

    let transport = TelegramTransport::new(bot, chat_id);
    if let Err(e) = desk.handle_callback(&transport, user_id, data).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}
