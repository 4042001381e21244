//! User-facing texts and keyboards

use crate::bot::actions::{Action, FileRef};
use crate::ledger::LedgerStats;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// ─────────────────────────────────────────────────────────────────────────────
// Trait definition
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for resource bot view rendering
pub trait ResourceView {
    /// Reply to `/start`
    fn welcome_message() -> &'static str;

    /// Reply to a recognized greeting
    fn greeting_message() -> &'static str;

    /// Reply to any other free text
    fn usage_hint() -> &'static str;

    /// Header above the file selection menu
    fn files_header() -> &'static str;

    /// Reply when the catalog is empty
    fn no_files() -> &'static str;

    /// Reply when the catalog cannot be read
    fn catalog_unavailable() -> &'static str;

    /// Reply when the selected file is gone
    fn file_not_found() -> &'static str;

    /// Reply when the user already received the file
    fn already_downloaded() -> &'static str;

    /// Acknowledgment sent right before the attachment
    fn downloading() -> &'static str;

    /// Caption attached to a delivered file
    fn file_caption(file_name: &str) -> String;

    /// Reply to `/stats`
    fn stats_message(available_files: usize, stats: LedgerStats) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// Default implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Default implementation of `ResourceView`
pub struct DefaultResourceView;

impl ResourceView for DefaultResourceView {
    fn welcome_message() -> &'static str {
        "👋 Welcome to TNPSC Resources Bot 😊\n\n📂 Available PDFs & files பார்க்க:\n👉 /files"
    }

    fn greeting_message() -> &'static str {
        "👋 Hi! Welcome to TNPSC Resources Bot 😊\n\n📂 Files பார்க்க 👉 /files"
    }

    fn usage_hint() -> &'static str {
        "ℹ️ Please use commands:\n/files – View available files"
    }

    fn files_header() -> &'static str {
        "📂 Available Files:\nSelect the file you want 👇"
    }

    fn no_files() -> &'static str {
        "❌ Currently no files available."
    }

    fn catalog_unavailable() -> &'static str {
        "❌ Files are temporarily unavailable. Please try again later."
    }

    fn file_not_found() -> &'static str {
        "❌ File not found."
    }

    fn already_downloaded() -> &'static str {
        "⚠️ You already downloaded this file."
    }

    fn downloading() -> &'static str {
        "⬇️ Downloading your file..."
    }

    fn file_caption(file_name: &str) -> String {
        format!("📄 {file_name}\n\nAll the best 💪")
    }

    fn stats_message(available_files: usize, stats: LedgerStats) -> String {
        format!(
            "📊 Bot Statistics\n\n\
             • Available files: {available_files}\n\
             • Users served: {}\n\
             • Files delivered: {}\n\n\
             Delivery records are kept in memory and reset on restart.",
            stats.users, stats.records
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboards
// ─────────────────────────────────────────────────────────────────────────────

/// Menu option: visible label plus the action it triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    /// Button text
    pub label: String,
    /// Action sent back when the button is pressed
    pub action: Action,
}

impl MenuOption {
    /// One option per file, labelled with the file name
    #[must_use]
    pub fn for_file(file_name: &str) -> Self {
        Self {
            label: file_name.to_string(),
            action: Action::SelectFile(FileRef::for_file(file_name)),
        }
    }
}

/// Options attached to the welcome message
#[must_use]
pub fn welcome_options() -> Vec<MenuOption> {
    vec![MenuOption {
        label: "📂 Files".to_string(),
        action: Action::ListFiles,
    }]
}

/// Renders options as an inline keyboard, one button per row
///
/// # Examples
///
/// ```
/// use resource_bot::bot::views::{inline_keyboard, MenuOption};
///
/// let keyboard = inline_keyboard(&[MenuOption::for_file("guide.pdf")]);
/// assert_eq!(keyboard.inline_keyboard.len(), 1);
/// ```
#[must_use]
pub fn inline_keyboard(options: &[MenuOption]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(options.iter().map(|option| {
        vec![InlineKeyboardButton::callback(
            option.label.clone(),
            option.action.encode(),
        )]
    }))
}
