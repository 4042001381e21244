#![deny(missing_docs)]
//! Resource bot library.
//!
//! Serves documents from a directory to Telegram users, at most once per user.

/// Telegram-facing bot logic.
pub mod bot;
/// Document catalog.
pub mod catalog;
/// Configuration management.
pub mod config;
/// Per-user download records.
pub mod ledger;
/// Telegram runtime entrypoint.
pub mod runner;
