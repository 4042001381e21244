use crate::bot::actions::{Action, FileRef};
use crate::bot::transport::ChatTransport;
use crate::bot::views::{welcome_options, DefaultResourceView, MenuOption, ResourceView};
use crate::catalog::FileCatalog;
use crate::ledger::{DownloadLedger, UserId};
use anyhow::Result;
use std::sync::Arc;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Free-text inputs answered with the greeting message
pub const GREETINGS: &[&str] = &["hi", "hello", "hai"];

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// List available files
    #[command(description = "View available files.")]
    Files,
    /// Show the command list
    #[command(description = "Show this help.")]
    Help,
    /// Check bot health
    #[command(description = "Check bot health.")]
    Healthcheck,
    /// Show delivery statistics
    #[command(description = "Show bot statistics.")]
    Stats,
}

/// Result of a file selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The file was sent to the user
    Delivered(String),
    /// The user had already received the file
    AlreadyDownloaded(String),
    /// No matching file exists in the catalog
    NotFound,
}

/// Returns true if `text` is one of the greeting words
///
/// # Examples
///
/// ```
/// use resource_bot::bot::handlers::is_greeting;
///
/// assert!(is_greeting(" Hi "));
/// assert!(!is_greeting("hi there"));
/// ```
#[must_use]
pub fn is_greeting(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    GREETINGS.contains(&normalized.as_str())
}

/// Returns true if `text` is free text rather than a slash command
///
/// Unrecognized commands are not free text and get no reply.
///
/// # Examples
///
/// ```
/// use resource_bot::bot::handlers::is_free_text;
///
/// assert!(is_free_text("hello"));
/// assert!(!is_free_text("/unknown"));
/// ```
#[must_use]
pub fn is_free_text(text: &str) -> bool {
    !text.trim_start().starts_with('/')
}

/// Serves catalog documents, at most once per user.
///
/// Owns the catalog and the download ledger; one instance is shared by all
/// dispatcher endpoints.
pub struct ResourceDesk {
    catalog: FileCatalog,
    ledger: Arc<dyn DownloadLedger>,
}

impl ResourceDesk {
    /// Create a desk over `catalog`, recording deliveries in `ledger`.
    #[must_use]
    pub fn new(catalog: FileCatalog, ledger: Arc<dyn DownloadLedger>) -> Self {
        Self { catalog, ledger }
    }

    /// Catalog served by this desk.
    #[must_use]
    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// `/start` handler
    ///
    /// # Errors
    ///
    /// Returns an error if the welcome message cannot be sent.
    pub async fn start<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
    ) -> Result<()> {
        info!("User {user_id} initiated /start command.");
        transport
            .send_menu(DefaultResourceView::welcome_message(), &welcome_options())
            .await
    }

    /// `/files` handler and list button
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be sent.
    pub async fn list_files<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
    ) -> Result<()> {
        let files = match self.catalog.list_available().await {
            Ok(files) => files,
            Err(e) => {
                error!("Failed to list files for user {user_id}: {e}");
                return transport
                    .send_text(DefaultResourceView::catalog_unavailable())
                    .await;
            }
        };

        info!("User {user_id} requested file list ({} files).", files.len());

        if files.is_empty() {
            return transport.send_text(DefaultResourceView::no_files()).await;
        }

        let options: Vec<MenuOption> = files.iter().map(|f| MenuOption::for_file(f)).collect();
        transport
            .send_menu(DefaultResourceView::files_header(), &options)
            .await
    }

    /// Free-text message handler
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be sent.
    pub async fn handle_text<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
        text: &str,
    ) -> Result<()> {
        if is_greeting(text) {
            info!("Greeting from user {user_id}.");
            return transport
                .send_text(DefaultResourceView::greeting_message())
                .await;
        }
        transport.send_text(DefaultResourceView::usage_hint()).await
    }

    /// Inline keyboard callback handler
    ///
    /// Unknown callback data is logged and ignored without replying.
    ///
    /// # Errors
    ///
    /// Returns an error if a reply cannot be sent or the file cannot be read.
    pub async fn handle_callback<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
        data: &str,
    ) -> Result<()> {
        match Action::decode(data) {
            Some(Action::ListFiles) => self.list_files(transport, user_id).await,
            Some(Action::SelectFile(file_ref)) => {
                self.select_file(transport, user_id, &file_ref).await?;
                Ok(())
            }
            None => {
                warn!("Ignoring malformed callback data from user {user_id}: '{data}'");
                Ok(())
            }
        }
    }

    /// Delivers the referenced file unless the user already received it.
    ///
    /// # Errors
    ///
    /// Returns an error if a reply cannot be sent or the file cannot be read.
    pub async fn select_file<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
        file_ref: &FileRef,
    ) -> Result<SelectionOutcome> {
        let resolved = match self.resolve_name(file_ref).await {
            Some(name) => self.catalog.resolve(&name).await.map(|path| (name, path)),
            None => None,
        };

        let Some((file_name, path)) = resolved else {
            info!("User {user_id} selected a missing file: {file_ref:?}");
            transport
                .send_text(DefaultResourceView::file_not_found())
                .await?;
            return Ok(SelectionOutcome::NotFound);
        };

        if !self.ledger.try_record(user_id, &file_name).await {
            info!("User {user_id} already downloaded '{file_name}'.");
            transport
                .send_text(DefaultResourceView::already_downloaded())
                .await?;
            return Ok(SelectionOutcome::AlreadyDownloaded(file_name));
        }

        transport.send_text(DefaultResourceView::downloading()).await?;

        let content = tokio::fs::read(&path).await?;
        transport
            .send_document(
                &file_name,
                content,
                &DefaultResourceView::file_caption(&file_name),
            )
            .await?;

        info!("Delivered '{file_name}' to user {user_id}.");
        Ok(SelectionOutcome::Delivered(file_name))
    }

    /// `/stats` handler
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be sent.
    pub async fn stats<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
    ) -> Result<()> {
        info!("Stats command received from user {user_id}.");
        let available = match self.catalog.list_available().await {
            Ok(files) => files.len(),
            Err(e) => {
                warn!("Failed to count files for stats: {e}");
                0
            }
        };
        let stats = self.ledger.stats().await;
        transport
            .send_text(&DefaultResourceView::stats_message(available, stats))
            .await
    }

    /// `/healthcheck` handler
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be sent.
    pub async fn healthcheck<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
    ) -> Result<()> {
        info!("Healthcheck command received from user {user_id}.");
        transport.send_text("OK").await
    }

    /// `/help` handler
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be sent.
    pub async fn help<T: ChatTransport + ?Sized>(&self, transport: &T) -> Result<()> {
        transport
            .send_text(&Command::descriptions().to_string())
            .await
    }

    async fn resolve_name(&self, file_ref: &FileRef) -> Option<String> {
        match file_ref {
            FileRef::Name(name) => Some(name.clone()),
            FileRef::Digest(_) => match self.catalog.list_available().await {
                Ok(files) => files.into_iter().find(|f| file_ref.matches(f)),
                Err(e) => {
                    warn!("Failed to scan catalog while resolving {file_ref:?}: {e}");
                    None
                }
            },
        }
    }
}
