//! Core trait abstractions.
//!
//! These traits are the boundaries to the external collaborators: the
//! automation engine, the spreadsheet store, and the notification channel.

pub mod browser;
pub mod notifier;
pub mod sheet;
