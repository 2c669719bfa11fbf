//! # Payment Reminder Bot
//!
//! A WhatsApp bot that helps an organizer collect a fixed amount from every
//! member of a group and keeps reminding the ones who have not paid yet.
//!
//! ## Features
//! - Event creation through a step-by-step wizard or a one-shot command
//! - Member lists pasted as free text (name and phone per line)
//! - Payment confirmation with disambiguation across several events
//! - Periodic reminders in a choice of tones
//! - Persistent storage with SQLite

/// Conversation state machine, command parsing and reply texts
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Reminder scheduling, outbound messaging and the HTTP surface
pub mod services;
/// Utility functions for datetime, validation, and logging
pub mod utils;
